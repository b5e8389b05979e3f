mod client;
mod config;
mod wire;

pub use client::MilvusClient;
pub use config::MilvusClientConfig;
