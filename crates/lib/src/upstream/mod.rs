//! Client for the remote inference endpoint.
//!
//! One POST per call with a bearer token and JSON body; no retries.

mod client;
mod reply;

pub use client::{UpstreamClient, UpstreamError};
pub use reply::reply_text;
