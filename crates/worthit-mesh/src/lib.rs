//! Service mesh: registry, load balancing, circuit breaking, request
//! batching and autoscaling for backend service instances.
//!
//! # Examples
//!
//! ```
//! use worthit_mesh::{MeshConfig, ServiceMesh, Strategy};
//!
//! let mesh: ServiceMesh<String> = ServiceMesh::new(MeshConfig::default());
//! mesh.register("pricing", "localhost", 8001, "/health");
//! let instance = mesh.get_service("pricing", Strategy::RoundRobin).unwrap();
//! assert_eq!(instance.port, 8001);
//! ```

mod autoscaler;
mod balancer;
mod batch;
mod circuit;
mod config;
mod error;
mod events;
mod mesh;
mod registry;

pub use autoscaler::{ScaleDecision, Utilization};
pub use balancer::Strategy;
pub use circuit::CircuitState;
pub use config::{AutoscaleConfig, BatchConfig, CircuitConfig, MeshConfig};
pub use error::MeshError;
pub use events::MeshEvent;
pub use mesh::ServiceMesh;
pub use registry::{Instance, InstanceStatus};
