pub mod config;
pub mod error;
pub mod middleware;
pub mod router;
pub mod state;
pub mod tracing;
pub mod upstream;
pub mod user;

pub use config::ApiConfig;
pub use error::{ApiError, UpstreamError};
pub use state::ApiState;
