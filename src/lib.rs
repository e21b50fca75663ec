//! Photo session core
//!
//! Capture photos, keep their handles in a durable list, browse and delete
//! them, behind a remote login. The durable list is the single source of
//! truth; each screen flow holds a snapshot and re-fetches at fixed points.

pub mod app;
pub mod auth;
pub mod config;
pub mod device;
pub mod error;
pub mod flows;
pub mod logging;
pub mod state;

pub use error::{Result, SessionError};
