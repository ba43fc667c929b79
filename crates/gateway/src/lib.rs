pub mod config;
pub mod encode;
pub mod error;
pub mod handlers;
pub mod ingest;
pub mod metrics;
pub mod pipeline;
pub mod routes;
pub mod state;

pub use config::GatewayConfig;
pub use error::ApiError;
pub use routes::{router, run_server};
pub use state::{AppState, DetectResponse};
