//! Tunables for the mesh, with production-sized defaults.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct CircuitConfig {
    pub consecutive_failure_threshold: u32,
    pub window_size: usize,
    pub window_duration: Duration,
    pub min_samples: usize,
    pub error_rate_threshold: f64,
    pub reset_timeout: Duration,
    pub success_threshold: u32,
}

impl Default for CircuitConfig {
    fn default() -> Self {
        Self {
            consecutive_failure_threshold: 5,
            window_size: 100,
            window_duration: Duration::from_secs(60),
            min_samples: 20,
            error_rate_threshold: 0.5,
            reset_timeout: Duration::from_secs(60),
            success_threshold: 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub batch_size: usize,
    pub batch_timeout: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            batch_timeout: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AutoscaleConfig {
    pub min_instances: usize,
    pub max_instances: usize,
    pub scale_up_threshold: f64,
    pub scale_down_threshold: f64,
    pub cooldown: Duration,
    pub base_port: u16,
}

impl Default for AutoscaleConfig {
    fn default() -> Self {
        Self {
            min_instances: 1,
            max_instances: 5,
            scale_up_threshold: 0.8,
            scale_down_threshold: 0.3,
            cooldown: Duration::from_secs(300),
            base_port: 8000,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MeshConfig {
    pub circuit: CircuitConfig,
    pub batch: BatchConfig,
    pub autoscale: AutoscaleConfig,
}
