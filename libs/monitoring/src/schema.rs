//! Per-topic schema usage sampling
//!
//! Schema reports are rate-limited per topic: at most one report per
//! interval, weighted by the number of uses it stands for.

use dashmap::DashMap;
use parking_lot::Mutex;

#[derive(Debug, Default)]
struct SamplerState {
    weight: u32,
    last_sample_ms: Option<u64>,
}

/// Rate limiter for one topic
#[derive(Debug)]
pub struct SchemaSampler {
    interval_ms: u64,
    state: Mutex<SamplerState>,
}

impl SchemaSampler {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            state: Mutex::new(SamplerState::default()),
        }
    }

    /// Count one use; returns the accumulated weight when a sample is due, else 0
    pub fn try_sample(&self, now_ms: u64) -> u32 {
        let mut state = self.state.lock();
        state.weight = state.weight.saturating_add(1);
        if !Self::due(self.interval_ms, &state, now_ms) {
            return 0;
        }
        state.last_sample_ms = Some(now_ms);
        std::mem::take(&mut state.weight)
    }

    /// Whether the next `try_sample` would produce a sample
    pub fn can_sample(&self, now_ms: u64) -> bool {
        Self::due(self.interval_ms, &self.state.lock(), now_ms)
    }

    fn due(interval_ms: u64, state: &SamplerState, now_ms: u64) -> bool {
        match state.last_sample_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= interval_ms,
        }
    }
}

/// Samplers keyed by topic, created on first use
#[derive(Debug)]
pub struct SchemaSamplers {
    interval_ms: u64,
    by_topic: DashMap<String, SchemaSampler>,
}

impl SchemaSamplers {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            by_topic: DashMap::new(),
        }
    }

    pub fn try_sample(&self, topic: &str, now_ms: u64) -> u32 {
        if let Some(sampler) = self.by_topic.get(topic) {
            return sampler.try_sample(now_ms);
        }
        self.by_topic
            .entry(topic.to_owned())
            .or_insert_with(|| SchemaSampler::new(self.interval_ms))
            .try_sample(now_ms)
    }

    pub fn can_sample(&self, topic: &str, now_ms: u64) -> bool {
        match self.by_topic.get(topic) {
            Some(sampler) => sampler.can_sample(now_ms),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_use_is_sampled() {
        let sampler = SchemaSampler::new(30_000);
        assert!(sampler.can_sample(1_000));
        assert_eq!(sampler.try_sample(1_000), 1);
        assert!(!sampler.can_sample(1_001));
    }

    #[test]
    fn test_weight_accumulates_until_interval_elapses() {
        let sampler = SchemaSampler::new(30_000);
        assert_eq!(sampler.try_sample(0), 1);
        assert_eq!(sampler.try_sample(10_000), 0);
        assert_eq!(sampler.try_sample(20_000), 0);
        assert_eq!(sampler.try_sample(29_999), 0);
        assert!(sampler.can_sample(30_000));
        assert_eq!(sampler.try_sample(30_000), 4);
        assert_eq!(sampler.try_sample(30_001), 0);
    }

    #[test]
    fn test_topics_are_independent() {
        let samplers = SchemaSamplers::new(1_000);
        assert_eq!(samplers.try_sample("orders", 0), 1);
        assert_eq!(samplers.try_sample("orders", 10), 0);
        assert_eq!(samplers.try_sample("payments", 10), 1);
        assert!(!samplers.can_sample("orders", 500));
        assert!(samplers.can_sample("unseen", 500));
    }
}
