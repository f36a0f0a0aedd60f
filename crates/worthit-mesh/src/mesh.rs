//! The service mesh facade: registry, load balancing, circuit breaking,
//! batching and autoscaling tied together behind one API.

use crate::autoscaler::{Autoscaler, ScaleDecision, Utilization};
use crate::balancer::{Balancer, Strategy};
use crate::batch::BatchQueue;
use crate::circuit::{CircuitRegistry, CircuitState};
use crate::config::MeshConfig;
use crate::error::MeshError;
use crate::events::MeshEvent;
use crate::registry::{Instance, Registry};
use std::future::Future;
use std::time::Instant;
use worthit_core::events::{EventListener, EventListeners};

pub struct ServiceMesh<R> {
    config: MeshConfig,
    registry: Registry,
    balancer: Balancer,
    circuits: CircuitRegistry,
    batches: BatchQueue<R>,
    autoscaler: Autoscaler,
    events: EventListeners<MeshEvent>,
}

impl<R: Clone + Send + Sync + 'static> ServiceMesh<R> {
    pub fn new(config: MeshConfig) -> Self {
        let autoscaler = Autoscaler::new(config.autoscale.clone());
        Self {
            config,
            registry: Registry::new(),
            balancer: Balancer::new(),
            circuits: CircuitRegistry::new(),
            batches: BatchQueue::new(),
            autoscaler,
            events: EventListeners::new(),
        }
    }

    pub fn add_listener<L>(&mut self, listener: L)
    where
        L: EventListener<MeshEvent> + 'static,
    {
        self.events.add(listener);
    }

    pub fn register(&self, service: &str, host: &str, port: u16, health_path: &str) -> String {
        let instance_id = self.registry.register(service, host, port, health_path);
        self.events.emit(&MeshEvent::InstanceRegistered {
            timestamp: Instant::now(),
            service: service.to_string(),
            instance_id: instance_id.clone(),
        });
        instance_id
    }

    pub fn deregister(&self, service: &str, instance_id: &str) {
        self.registry.deregister(service, instance_id);
        self.events.emit(&MeshEvent::InstanceDeregistered {
            timestamp: Instant::now(),
            service: service.to_string(),
            instance_id: instance_id.to_string(),
        });
    }

    pub fn heartbeat(&self, service: &str, instance_id: &str) {
        self.registry.heartbeat(service, instance_id);
    }

    /// Selects a healthy instance for `service`, honoring the circuit
    /// breaker. Returns `NoHealthyInstance` when the healthy set is empty
    /// and `CircuitOpen` when the service's breaker has tripped.
    pub fn get_service(&self, service: &str, strategy: Strategy) -> Result<Instance, MeshError> {
        if !self.circuits.try_acquire(service, &self.config.circuit, &self.events) {
            return Err(MeshError::CircuitOpen(service.to_string()));
        }

        let healthy = self.registry.healthy_instances(service);
        self.balancer
            .select(service, &healthy, strategy)
            .ok_or_else(|| {
                self.events.emit(&MeshEvent::NoHealthyInstance {
                    timestamp: Instant::now(),
                    service: service.to_string(),
                });
                MeshError::NoHealthyInstance(service.to_string())
            })
    }

    pub fn record_success(&self, service: &str) {
        self.circuits.record_success(service, &self.config.circuit, &self.events);
    }

    pub fn record_failure(&self, service: &str) {
        self.circuits.record_failure(service, &self.config.circuit, &self.events);
    }

    pub fn circuit_state(&self, service: &str) -> CircuitState {
        self.circuits.state_of(service)
    }

    /// Coalesces concurrent calls to `batch_key` behind one upstream
    /// invocation, per the trigger rules in `MeshConfig::batch`.
    pub async fn call_batched<F, Fut>(&self, batch_key: &str, call: F) -> Result<R, MeshError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<R, String>>,
    {
        let (result, size) = self.batches.join(batch_key, &self.config.batch, call).await;
        if size > 1 {
            self.events.emit(&MeshEvent::Batched {
                timestamp: Instant::now(),
                batch_key: batch_key.to_string(),
                size,
            });
        }
        result.map_err(|message| MeshError::Upstream {
            service: batch_key.to_string(),
            message,
        })
    }

    /// Runs one autoscaling decision cycle for `service` given an observed
    /// utilization sample, applying the decision to the registry.
    pub fn autoscale_tick(&self, service: &str, host: &str, utilization: Utilization) -> ScaleDecision {
        let decision = self.autoscaler.decide(&self.registry, service, utilization);
        match decision {
            ScaleDecision::Up => {
                self.autoscaler.scale_up(&self.registry, service, host);
                self.events.emit(&MeshEvent::ScaledUp {
                    timestamp: Instant::now(),
                    service: service.to_string(),
                    instance_count: self.registry.instance_count(service),
                });
            }
            ScaleDecision::Down => {
                if self.autoscaler.scale_down(&self.registry, service).is_some() {
                    self.events.emit(&MeshEvent::ScaledDown {
                        timestamp: Instant::now(),
                        service: service.to_string(),
                        instance_count: self.registry.instance_count(service),
                    });
                }
            }
            ScaleDecision::Hold => {}
        }
        decision
    }
}
