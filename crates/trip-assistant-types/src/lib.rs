//now people using the types library can use these types
pub mod message;
pub mod query;

//re-export types for easier access
pub use message::{Message, Speaker};
pub use query::{DEMO_USER_ID, QueryRequest, QueryResponse, Welcome};
