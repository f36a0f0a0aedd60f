//! Observability events emitted by the cache.

use std::time::Instant;
use worthit_core::events::DomainEvent;

#[derive(Debug, Clone)]
pub enum CacheEvent {
    Hit {
        timestamp: Instant,
        fingerprint: String,
    },
    Miss {
        timestamp: Instant,
        fingerprint: String,
    },
    Eviction {
        timestamp: Instant,
        evicted: usize,
    },
    WarmedUp {
        timestamp: Instant,
        path: String,
    },
}

impl DomainEvent for CacheEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CacheEvent::Hit { .. } => "hit",
            CacheEvent::Miss { .. } => "miss",
            CacheEvent::Eviction { .. } => "eviction",
            CacheEvent::WarmedUp { .. } => "warmed_up",
        }
    }

    fn source_name(&self) -> &str {
        "worthit-cache"
    }

    fn timestamp(&self) -> Instant {
        match self {
            CacheEvent::Hit { timestamp, .. }
            | CacheEvent::Miss { timestamp, .. }
            | CacheEvent::Eviction { timestamp, .. }
            | CacheEvent::WarmedUp { timestamp, .. } => *timestamp,
        }
    }
}
