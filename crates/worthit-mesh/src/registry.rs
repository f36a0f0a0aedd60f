//! Service instance registry.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone)]
pub struct Instance {
    pub instance_id: String,
    pub host: String,
    pub port: u16,
    pub health_path: String,
    pub status: InstanceStatus,
    pub weight: u32,
    pub active_connections: u32,
    pub last_response_time: Option<std::time::Duration>,
    pub last_heartbeat: Instant,
}

impl Instance {
    fn new(instance_id: String, host: String, port: u16, health_path: String) -> Self {
        Self {
            instance_id,
            host,
            port,
            health_path,
            status: InstanceStatus::Healthy,
            weight: 1,
            active_connections: 0,
            last_response_time: None,
            last_heartbeat: Instant::now(),
        }
    }
}

#[derive(Default)]
pub struct Registry {
    services: RwLock<HashMap<String, HashMap<String, Instance>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, service: &str, host: &str, port: u16, health_path: &str) -> String {
        let instance_id = format!("{service}_{host}_{port}");
        let instance = Instance::new(instance_id.clone(), host.to_string(), port, health_path.to_string());
        self.services
            .write()
            .entry(service.to_string())
            .or_default()
            .insert(instance_id.clone(), instance);
        instance_id
    }

    pub fn deregister(&self, service: &str, instance_id: &str) {
        if let Some(instances) = self.services.write().get_mut(service) {
            instances.remove(instance_id);
        }
    }

    pub fn heartbeat(&self, service: &str, instance_id: &str) {
        if let Some(instances) = self.services.write().get_mut(service) {
            if let Some(instance) = instances.get_mut(instance_id) {
                instance.last_heartbeat = Instant::now();
                instance.status = InstanceStatus::Healthy;
            }
        }
    }

    pub fn mark_unhealthy(&self, service: &str, instance_id: &str) {
        if let Some(instances) = self.services.write().get_mut(service) {
            if let Some(instance) = instances.get_mut(instance_id) {
                instance.status = InstanceStatus::Unhealthy;
            }
        }
    }

    pub fn record_response(&self, service: &str, instance_id: &str, duration: std::time::Duration) {
        if let Some(instances) = self.services.write().get_mut(service) {
            if let Some(instance) = instances.get_mut(instance_id) {
                instance.last_response_time = Some(duration);
            }
        }
    }

    pub fn healthy_instances(&self, service: &str) -> Vec<Instance> {
        self.services
            .read()
            .get(service)
            .map(|instances| {
                instances
                    .values()
                    .filter(|i| i.status == InstanceStatus::Healthy)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn instance_count(&self, service: &str) -> usize {
        self.healthy_instances(service).len()
    }

    pub fn least_utilized_instance(&self, service: &str) -> Option<Instance> {
        self.healthy_instances(service)
            .into_iter()
            .min_by_key(|i| i.active_connections)
    }

    pub fn next_available_port(&self, service: &str, base_port: u16) -> u16 {
        let used: std::collections::HashSet<u16> = self
            .services
            .read()
            .get(service)
            .map(|instances| instances.values().map(|i| i.port).collect())
            .unwrap_or_default();
        let mut port = base_port;
        while used.contains(&port) {
            port += 1;
        }
        port
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_then_deregister_removes_instance() {
        let registry = Registry::new();
        let id = registry.register("pricing", "localhost", 8001, "/health");
        assert_eq!(registry.instance_count("pricing"), 1);
        registry.deregister("pricing", &id);
        assert_eq!(registry.instance_count("pricing"), 0);
    }

    #[test]
    fn next_available_port_skips_used_ports() {
        let registry = Registry::new();
        registry.register("pricing", "localhost", 8000, "/health");
        registry.register("pricing", "localhost", 8001, "/health");
        assert_eq!(registry.next_available_port("pricing", 8000), 8002);
    }

    #[test]
    fn unhealthy_instances_are_excluded_from_healthy_set() {
        let registry = Registry::new();
        let id = registry.register("pricing", "localhost", 8000, "/health");
        registry.mark_unhealthy("pricing", &id);
        assert!(registry.healthy_instances("pricing").is_empty());
    }
}
