//! vedascore-views: page controllers.
//!
//! Each page of the VedaScore front end is a controller struct that owns its
//! state, fetches through a `VedaApi`, and renders HTML fragments into a
//! `Surface`. User actions reach controllers through a `Dispatcher`.

pub mod analytics;
pub mod community;
pub mod dispatch;
pub mod editor;
pub mod instructor;
pub mod loader;
pub mod poll;
pub mod storage;
pub mod student;
pub mod surface;

pub use dispatch::{DispatchError, Dispatcher, Params};
pub use loader::{LoadSpec, ResourceLoader};
pub use storage::{DeletedSubmissions, LocalStore};
pub use surface::{MemorySurface, Surface};
