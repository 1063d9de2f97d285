pub mod config;
mod error;
mod feed;
mod http_layers;
pub mod metrics;
mod profile;
pub mod server;
mod session;
pub mod state;

pub use config::ServerConfig;
pub use http_layers::*;
pub use server::{make_app, run_server};
