// diary-edge - rate-limited, cache-fronted edge API for the diary app

pub mod ai;
pub mod cli;
pub mod config;
pub mod error;
pub mod gemini;
pub mod metrics;
pub mod models;
pub mod ogp;
pub mod ratelimit;
pub mod server;
pub mod store;
pub mod utils;
