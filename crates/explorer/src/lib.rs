//! CLIP embedding explorer: a global 3D scatter of projected image/caption
//! embeddings and a local 2D view of one record's nearest neighbors.
//!
//! Projections, nearest-neighbor search and PCA all happen on the backend;
//! this crate owns the views, picking, camera bookkeeping and the session
//! state that ties them together.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod global_view;
pub mod layout;
pub mod local_view;
pub mod preview;
pub mod record;
pub mod session;

pub use api::{Backend, HttpBackend};
pub use app::{App, InputEvent};
pub use config::ExplorerConfig;
pub use error::ApiError;
pub use record::{Neighborhood, PointInfo, Record};
pub use session::{Session, ViewMode};
