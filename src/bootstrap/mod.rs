//! Startup-time collaborators: gcloud configuration, region listing, and
//! kubeconfig generation.

pub mod gcloud;
pub mod kubeconfig;
pub mod regions;
