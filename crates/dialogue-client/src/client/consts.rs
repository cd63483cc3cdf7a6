pub const BASE_URL: &str = "http://localhost:8000";

pub const QUERY_PATH: &str = "/query";
pub const WELCOME_PATH: &str = "/";

pub const USER_AGENT: &str = concat!("trip-assistant/", env!("CARGO_PKG_VERSION"));
