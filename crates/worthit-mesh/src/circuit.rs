//! Per-service circuit breaker state machine.
//!
//! Trips on `consecutive_failures >= failure_threshold`, or on a sliding
//! window (last `window_size` calls or `window_duration`, whichever the
//! window type tracks) once at least `min_samples` calls have landed and
//! the error rate crosses `error_rate_threshold`. Half-open admits probes
//! one at a time; `success_threshold` consecutive successes close the
//! circuit, any single failure reopens it.

use crate::config::CircuitConfig;
use crate::events::MeshEvent;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use parking_lot::{Mutex, RwLock};
use worthit_core::events::EventListeners;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

struct CallRecord {
    at: Instant,
    failed: bool,
}

pub struct Circuit {
    state: CircuitState,
    consecutive_failures: u32,
    half_open_successes: u32,
    last_state_change: Instant,
    records: VecDeque<CallRecord>,
}

impl Circuit {
    fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            half_open_successes: 0,
            last_state_change: Instant::now(),
            records: VecDeque::new(),
        }
    }

    pub fn state(&self) -> CircuitState {
        self.state
    }

    fn prune(&mut self, config: &CircuitConfig) {
        while self.records.len() > config.window_size {
            self.records.pop_front();
        }
        while let Some(front) = self.records.front() {
            if front.at.elapsed() > config.window_duration {
                self.records.pop_front();
            } else {
                break;
            }
        }
    }

    fn error_rate(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        let failures = self.records.iter().filter(|r| r.failed).count();
        failures as f64 / self.records.len() as f64
    }

    fn transition(&mut self, to: CircuitState, service: &str, events: &EventListeners<MeshEvent>) {
        if self.state == to {
            return;
        }
        let from = self.state;
        self.state = to;
        self.last_state_change = Instant::now();
        self.consecutive_failures = 0;
        self.half_open_successes = 0;
        events.emit(&MeshEvent::CircuitStateChanged {
            timestamp: Instant::now(),
            service: service.to_string(),
            from,
            to,
        });
    }

    /// Checks whether a probe into `Open` should admit now, transitioning
    /// to `HalfOpen` if the reset timeout has elapsed.
    pub fn try_acquire(&mut self, service: &str, config: &CircuitConfig, events: &EventListeners<MeshEvent>) -> bool {
        match self.state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                if self.last_state_change.elapsed() >= config.reset_timeout {
                    self.transition(CircuitState::HalfOpen, service, events);
                    true
                } else {
                    false
                }
            }
            CircuitState::HalfOpen => true,
        }
    }

    pub fn record_success(&mut self, service: &str, config: &CircuitConfig, events: &EventListeners<MeshEvent>) {
        self.consecutive_failures = 0;
        self.records.push_back(CallRecord {
            at: Instant::now(),
            failed: false,
        });
        self.prune(config);

        match self.state {
            CircuitState::HalfOpen => {
                self.half_open_successes += 1;
                if self.half_open_successes >= config.success_threshold {
                    self.transition(CircuitState::Closed, service, events);
                }
            }
            _ => {}
        }
    }

    pub fn record_failure(&mut self, service: &str, config: &CircuitConfig, events: &EventListeners<MeshEvent>) {
        self.consecutive_failures += 1;
        self.records.push_back(CallRecord {
            at: Instant::now(),
            failed: true,
        });
        self.prune(config);

        if self.state == CircuitState::HalfOpen {
            self.transition(CircuitState::Open, service, events);
            return;
        }

        let tripped_by_consecutive = self.consecutive_failures >= config.consecutive_failure_threshold;
        let tripped_by_window =
            self.records.len() >= config.min_samples && self.error_rate() >= config.error_rate_threshold;

        if tripped_by_consecutive || tripped_by_window {
            self.transition(CircuitState::Open, service, events);
        }
    }
}

/// Registry of circuits keyed by service id, one lock per circuit.
#[derive(Default)]
pub struct CircuitRegistry {
    circuits: RwLock<HashMap<String, Arc<Mutex<Circuit>>>>,
}

impl CircuitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn circuit_for(&self, service: &str) -> Arc<Mutex<Circuit>> {
        if let Some(circuit) = self.circuits.read().get(service) {
            return Arc::clone(circuit);
        }
        let mut circuits = self.circuits.write();
        Arc::clone(
            circuits
                .entry(service.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(Circuit::new()))),
        )
    }

    pub fn try_acquire(&self, service: &str, config: &CircuitConfig, events: &EventListeners<MeshEvent>) -> bool {
        self.circuit_for(service).lock().try_acquire(service, config, events)
    }

    pub fn record_success(&self, service: &str, config: &CircuitConfig, events: &EventListeners<MeshEvent>) {
        self.circuit_for(service).lock().record_success(service, config, events);
    }

    pub fn record_failure(&self, service: &str, config: &CircuitConfig, events: &EventListeners<MeshEvent>) {
        self.circuit_for(service).lock().record_failure(service, config, events);
    }

    pub fn state_of(&self, service: &str) -> CircuitState {
        self.circuit_for(service).lock().state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn harness() -> (CircuitRegistry, CircuitConfig, EventListeners<MeshEvent>) {
        (CircuitRegistry::new(), CircuitConfig::default(), EventListeners::new())
    }

    #[test]
    fn five_consecutive_failures_open_the_circuit() {
        let (registry, config, events) = harness();
        for _ in 0..5 {
            registry.record_failure("svc#1", &config, &events);
        }
        assert_eq!(registry.state_of("svc#1"), CircuitState::Open);
        assert!(!registry.try_acquire("svc#1", &config, &events));
    }

    #[test]
    fn half_open_closes_after_success_threshold() {
        let (registry, mut config, events) = harness();
        config.reset_timeout = Duration::from_millis(0);
        for _ in 0..5 {
            registry.record_failure("svc#1", &config, &events);
        }
        assert!(registry.try_acquire("svc#1", &config, &events));
        assert_eq!(registry.state_of("svc#1"), CircuitState::HalfOpen);

        registry.record_success("svc#1", &config, &events);
        assert_eq!(registry.state_of("svc#1"), CircuitState::HalfOpen);
        registry.record_success("svc#1", &config, &events);
        assert_eq!(registry.state_of("svc#1"), CircuitState::Closed);
    }

    #[test]
    fn half_open_reopens_on_any_failure() {
        let (registry, mut config, events) = harness();
        config.reset_timeout = Duration::from_millis(0);
        for _ in 0..5 {
            registry.record_failure("svc#1", &config, &events);
        }
        registry.try_acquire("svc#1", &config, &events);
        registry.record_failure("svc#1", &config, &events);
        assert_eq!(registry.state_of("svc#1"), CircuitState::Open);
    }

    #[test]
    fn window_error_rate_trips_without_consecutive_run() {
        let (registry, mut config, events) = harness();
        config.min_samples = 4;
        config.error_rate_threshold = 0.5;
        registry.record_success("svc#1", &config, &events);
        registry.record_failure("svc#1", &config, &events);
        registry.record_success("svc#1", &config, &events);
        registry.record_failure("svc#1", &config, &events);
        assert_eq!(registry.state_of("svc#1"), CircuitState::Open);
    }
}
