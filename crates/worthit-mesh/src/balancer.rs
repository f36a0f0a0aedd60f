//! Load-balancing strategies over a service's healthy instance set.

use crate::registry::Instance;
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    RoundRobin,
    LeastConnections,
    Weighted,
    ResponseTime,
}

/// Holds the monotonic counters round-robin and weighted selection need,
/// one per service so concurrent callers interleave deterministically.
#[derive(Default)]
pub struct Balancer {
    counters: Mutex<HashMap<String, usize>>,
}

impl Balancer {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_index(&self, service: &str) -> usize {
        let mut counters = self.counters.lock();
        let counter = counters.entry(service.to_string()).or_insert(0);
        let value = *counter;
        *counter = counter.wrapping_add(1);
        value
    }

    /// Selects an instance from `healthy` per `strategy`. Returns `None` if
    /// `healthy` is empty (callers translate that into `NoHealthyInstance`).
    pub fn select(&self, service: &str, healthy: &[Instance], strategy: Strategy) -> Option<Instance> {
        if healthy.is_empty() {
            return None;
        }

        match strategy {
            Strategy::RoundRobin => {
                let index = self.next_index(service) % healthy.len();
                Some(healthy[index].clone())
            }
            Strategy::LeastConnections => {
                let min_connections = healthy.iter().map(|i| i.active_connections).min()?;
                let candidates: Vec<&Instance> = healthy
                    .iter()
                    .filter(|i| i.active_connections == min_connections)
                    .collect();
                let index = self.next_index(service) % candidates.len();
                Some(candidates[index].clone())
            }
            Strategy::Weighted => {
                let eligible: Vec<&Instance> = healthy.iter().filter(|i| i.weight > 0).collect();
                if eligible.is_empty() {
                    return Some(healthy[0].clone());
                }
                let total_weight: u32 = eligible.iter().map(|i| i.weight).sum();
                let mut point = (self.next_index(service) as u32) % total_weight;
                for instance in &eligible {
                    if point < instance.weight {
                        return Some((*instance).clone());
                    }
                    point -= instance.weight;
                }
                Some(eligible[0].clone())
            }
            Strategy::ResponseTime => healthy
                .iter()
                .min_by_key(|i| i.last_response_time.unwrap_or(std::time::Duration::MAX))
                .cloned(),
        }
    }
}
