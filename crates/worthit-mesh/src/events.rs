//! Observability events emitted by the mesh.

use crate::circuit::CircuitState;
use std::time::Instant;
use worthit_core::events::DomainEvent;

#[derive(Debug, Clone)]
pub enum MeshEvent {
    InstanceRegistered {
        timestamp: Instant,
        service: String,
        instance_id: String,
    },
    InstanceDeregistered {
        timestamp: Instant,
        service: String,
        instance_id: String,
    },
    CircuitStateChanged {
        timestamp: Instant,
        service: String,
        from: CircuitState,
        to: CircuitState,
    },
    NoHealthyInstance {
        timestamp: Instant,
        service: String,
    },
    Batched {
        timestamp: Instant,
        batch_key: String,
        size: usize,
    },
    ScaledUp {
        timestamp: Instant,
        service: String,
        instance_count: usize,
    },
    ScaledDown {
        timestamp: Instant,
        service: String,
        instance_count: usize,
    },
}

impl DomainEvent for MeshEvent {
    fn event_type(&self) -> &'static str {
        match self {
            MeshEvent::InstanceRegistered { .. } => "instance_registered",
            MeshEvent::InstanceDeregistered { .. } => "instance_deregistered",
            MeshEvent::CircuitStateChanged { .. } => "circuit_state_changed",
            MeshEvent::NoHealthyInstance { .. } => "no_healthy_instance",
            MeshEvent::Batched { .. } => "batched",
            MeshEvent::ScaledUp { .. } => "scaled_up",
            MeshEvent::ScaledDown { .. } => "scaled_down",
        }
    }

    fn source_name(&self) -> &str {
        "worthit-mesh"
    }

    fn timestamp(&self) -> Instant {
        match self {
            MeshEvent::InstanceRegistered { timestamp, .. }
            | MeshEvent::InstanceDeregistered { timestamp, .. }
            | MeshEvent::CircuitStateChanged { timestamp, .. }
            | MeshEvent::NoHealthyInstance { timestamp, .. }
            | MeshEvent::Batched { timestamp, .. }
            | MeshEvent::ScaledUp { timestamp, .. }
            | MeshEvent::ScaledDown { timestamp, .. } => *timestamp,
        }
    }
}
