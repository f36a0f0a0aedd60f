//! Mesh-specific error type.

use thiserror::Error;
use worthit_core::CoreError;

#[derive(Debug, Error, Clone)]
pub enum MeshError {
    #[error("no healthy instance registered for service {0}")]
    NoHealthyInstance(String),

    #[error("circuit open for service {0}")]
    CircuitOpen(String),

    #[error("upstream call to {service} failed: {message}")]
    Upstream { service: String, message: String },
}

impl From<MeshError> for CoreError {
    fn from(err: MeshError) -> Self {
        match err {
            MeshError::NoHealthyInstance(service) => CoreError::NoHealthyInstance { service },
            MeshError::CircuitOpen(service) => CoreError::CircuitOpen { service },
            MeshError::Upstream { service, message } => {
                CoreError::UpstreamTransient { service, message }
            }
        }
    }
}
