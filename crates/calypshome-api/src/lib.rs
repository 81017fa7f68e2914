// calypshome-api: Async Rust client for the Calypshome gateway web API

pub mod actions;
pub mod auth;
pub mod client;
pub mod devices;
pub mod error;
pub mod models;
pub mod session;
pub mod transport;

pub use actions::{CoverAction, CoverCommand};
pub use auth::{Credentials, SessionToken};
pub use client::{CalypshomeClient, ClientConfig, DEFAULT_BASE_URL};
pub use error::{Error, ErrorKind};
pub use models::{Device, DeviceTarget, MotionStatus};
pub use session::{SessionManager, SessionState};
pub use transport::{ApiRequest, ApiResponse, TlsMode, Transport, TransportConfig};
