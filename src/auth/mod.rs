//! Credential acquisition for the upstream API.

pub mod credentials;

pub use credentials::{CredentialProvider, GcloudCredentialProvider, StaticCredentialProvider};
