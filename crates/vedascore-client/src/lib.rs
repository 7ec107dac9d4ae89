//! vedascore-client: implementations of the `VedaApi` trait.
//!
//! `HttpApi` talks to a running VedaScore server over reqwest; `MockApi`
//! keeps everything in memory for tests and offline demos.

pub mod config;
pub mod http;
pub mod mock;

pub use config::{load_config, load_config_from, ClientConfig};
pub use http::HttpApi;
pub use mock::MockApi;
