//! Windows support: registry discovery and the COM automation transport.

pub mod com;
pub mod registry;

pub use com::ComTransport;
