mod client;

pub use trip_assistant_types as types;
pub use client::{Client, ClientError, Config, ConfigBuilder, Stats, consts};
