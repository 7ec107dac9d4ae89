//! vedascore-core: Data model, API trait, quiz renderer and scoring.
//!
//! This crate defines the wire types and the `VedaApi` trait that the HTTP
//! client implements and the page controllers consume, plus the pure
//! rendering and scoring logic that needs no network.

pub mod analytics;
pub mod error;
pub mod leaderboard;
pub mod markup;
pub mod model;
pub mod quiz;
pub mod tools;
pub mod traits;

pub use error::{ApiError, ErrorKind};
pub use traits::VedaApi;
