//! Outbound request construction and dispatch.

pub mod dispatch;
pub mod rewrite;

pub use dispatch::{dispatch, UpstreamResponse};
pub use rewrite::{rewrite, UpstreamCall};
