//! Cooldown-gated autoscaling control loop.

use crate::config::AutoscaleConfig;
use crate::registry::Registry;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Per-service resource utilization sample, in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy)]
pub struct Utilization(pub f64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleDecision {
    Up,
    Down,
    Hold,
}

pub struct Autoscaler {
    config: AutoscaleConfig,
    last_scale_action: Mutex<HashMap<String, Instant>>,
}

impl Autoscaler {
    pub fn new(config: AutoscaleConfig) -> Self {
        Self {
            config,
            last_scale_action: Mutex::new(HashMap::new()),
        }
    }

    fn cooldown_elapsed(&self, service: &str) -> bool {
        self.last_scale_action
            .lock()
            .get(service)
            .map_or(true, |at| at.elapsed() >= self.config.cooldown)
    }

    /// Decides whether `service` should scale given its current utilization
    /// and healthy instance count, without mutating the registry. Records
    /// the decision's cooldown timestamp immediately so repeated calls
    /// inside one cooldown window don't re-trigger.
    pub fn decide(&self, registry: &Registry, service: &str, utilization: Utilization) -> ScaleDecision {
        if !self.cooldown_elapsed(service) {
            return ScaleDecision::Hold;
        }

        let instances = registry.instance_count(service);
        let decision = if utilization.0 > self.config.scale_up_threshold && instances < self.config.max_instances {
            ScaleDecision::Up
        } else if utilization.0 < self.config.scale_down_threshold && instances > self.config.min_instances {
            ScaleDecision::Down
        } else {
            ScaleDecision::Hold
        };

        if decision != ScaleDecision::Hold {
            self.last_scale_action.lock().insert(service.to_string(), Instant::now());
        }
        decision
    }

    /// Applies a scale-up by registering a new instance on the next free
    /// port, returning its instance id.
    pub fn scale_up(&self, registry: &Registry, service: &str, host: &str) -> String {
        let port = registry.next_available_port(service, self.config.base_port);
        registry.register(service, host, port, "/health")
    }

    /// Applies a scale-down by deregistering the least-utilized healthy
    /// instance, returning its instance id if one existed.
    pub fn scale_down(&self, registry: &Registry, service: &str) -> Option<String> {
        let victim = registry.least_utilized_instance(service)?;
        registry.deregister(service, &victim.instance_id);
        Some(victim.instance_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_utilization_scales_up_below_max() {
        let registry = Registry::new();
        registry.register("pricing", "localhost", 8000, "/health");
        let autoscaler = Autoscaler::new(AutoscaleConfig::default());
        let decision = autoscaler.decide(&registry, "pricing", Utilization(0.9));
        assert_eq!(decision, ScaleDecision::Up);
    }

    #[test]
    fn low_utilization_scales_down_above_min() {
        let registry = Registry::new();
        registry.register("pricing", "localhost", 8000, "/health");
        registry.register("pricing", "localhost", 8001, "/health");
        let autoscaler = Autoscaler::new(AutoscaleConfig::default());
        let decision = autoscaler.decide(&registry, "pricing", Utilization(0.1));
        assert_eq!(decision, ScaleDecision::Down);
    }

    #[test]
    fn cooldown_blocks_repeated_scaling() {
        let registry = Registry::new();
        registry.register("pricing", "localhost", 8000, "/health");
        let autoscaler = Autoscaler::new(AutoscaleConfig::default());
        assert_eq!(autoscaler.decide(&registry, "pricing", Utilization(0.9)), ScaleDecision::Up);
        assert_eq!(autoscaler.decide(&registry, "pricing", Utilization(0.9)), ScaleDecision::Hold);
    }

    #[test]
    fn min_instances_floor_prevents_scale_down() {
        let registry = Registry::new();
        registry.register("pricing", "localhost", 8000, "/health");
        let autoscaler = Autoscaler::new(AutoscaleConfig::default());
        let decision = autoscaler.decide(&registry, "pricing", Utilization(0.1));
        assert_eq!(decision, ScaleDecision::Hold);
    }
}
