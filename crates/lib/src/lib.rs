//! askgate core library — config, envelope normalization, upstream client, and the HTTP
//! gateway used by the `askgate` binary.

pub mod config;
pub mod envelope;
pub mod gateway;
pub mod upstream;
