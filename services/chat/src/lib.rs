pub mod config;
pub mod http_adapter;
pub mod terminal;
