//! Gateway: HTTP front for the inference endpoint.
//!
//! `POST /ask` normalizes and forwards a browser envelope; `GET /test-connection` checks the
//! endpoint with a canned message. Stateless per request.

mod cors;
mod error;
mod protocol;
mod server;

pub use cors::build_cors_layer;
pub use error::ApiError;
pub use protocol::{ConnectionReport, CONNECTED_STATUS, FAILED_STATUS};
pub use server::{check_connection, router, run_gateway, GatewayState};
