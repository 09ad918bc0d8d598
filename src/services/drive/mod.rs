pub mod client;
pub mod path;

pub use client::{DriveClient, UpstreamError};
