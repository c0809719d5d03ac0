//! quarry-rs library
//!
//! An item store served over HTTP with a reusable query-shaping layer
//! (pagination, filtering, sorting), file storage, a background task queue
//! and a broadcast chat socket.

use shadow_rs::shadow;
shadow!(build);

pub mod api;
pub mod chat;
pub mod cli;
pub mod common;
pub mod config;
pub mod db;
pub mod error;
pub mod logger;
pub mod models;
pub mod repositories;
pub mod schema;
pub mod server;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

pub use state::AppState;

pub fn pkg_version() -> &'static str {
    build::PKG_VERSION
}

pub fn clap_long_version() -> &'static str {
    build::CLAP_LONG_VERSION
}
