use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::{ENGINE_VERSION, MODEL_VERSION};

use super::types::Stage;

// ═══════════════════════════════════════════════════════════
// Latency history
// ═══════════════════════════════════════════════════════════

/// Bounded sample buffer. Past `limit` samples only the newest `retain`
/// are kept.
#[derive(Debug, Clone, Default)]
struct LatencyHistory {
    samples: Vec<u64>,
}

impl LatencyHistory {
    fn record(&mut self, micros: u64, limit: usize, retain: usize) {
        self.samples.push(micros);
        if self.samples.len() > limit {
            let drop = self.samples.len() - retain;
            self.samples.drain(..drop);
        }
    }

    fn stats(&self) -> Option<LatencyStats> {
        if self.samples.is_empty() {
            return None;
        }
        let mut sorted = self.samples.clone();
        sorted.sort_unstable();
        let n = sorted.len();
        let at = |q: f64| sorted[((n as f64 * q).floor() as usize).min(n - 1)];
        let sum: u64 = sorted.iter().sum();
        Some(LatencyStats {
            count: n,
            mean: (sum as f64 / n as f64).round() as u64,
            p50: at(0.5),
            p95: at(0.95),
            p99: at(0.99),
            max: sorted[n - 1],
        })
    }
}

/// Per-stage latency summary in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LatencyStats {
    pub count: usize,
    pub mean: u64,
    pub p50: u64,
    pub p95: u64,
    pub p99: u64,
    pub max: u64,
}

// ═══════════════════════════════════════════════════════════
// Metrics
// ═══════════════════════════════════════════════════════════

/// Counters and histograms since construction or the last reset.
#[derive(Debug, Clone)]
pub struct Metrics {
    history_limit: usize,
    history_retain: usize,
    pub total_processed: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub errors: u64,
    pub fallbacks: u64,
    pub low_confidence: u64,
    latencies: BTreeMap<Stage, LatencyHistory>,
    proc_distribution: BTreeMap<String, u64>,
}

impl Metrics {
    pub fn new(history_limit: usize, history_retain: usize) -> Self {
        Self {
            history_limit: history_limit.max(1),
            history_retain: history_retain.min(history_limit).max(1),
            total_processed: 0,
            cache_hits: 0,
            cache_misses: 0,
            errors: 0,
            fallbacks: 0,
            low_confidence: 0,
            latencies: BTreeMap::new(),
            proc_distribution: BTreeMap::new(),
        }
    }

    pub fn record_latency(&mut self, stage: Stage, micros: u64) {
        let (limit, retain) = (self.history_limit, self.history_retain);
        self.latencies.entry(stage).or_default().record(micros, limit, retain);
    }

    pub fn record_procedure(&mut self, proc_id: &str) {
        *self.proc_distribution.entry(proc_id.to_string()).or_insert(0) += 1;
    }

    pub fn latency(&self, stage: Stage) -> Option<LatencyStats> {
        self.latencies.get(&stage).and_then(LatencyHistory::stats)
    }

    pub fn samples(&self, stage: Stage) -> usize {
        self.latencies.get(&stage).map_or(0, |h| h.samples.len())
    }

    pub fn proc_distribution(&self) -> &BTreeMap<String, u64> {
        &self.proc_distribution
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.history_limit, self.history_retain);
    }

    pub fn snapshot(&self, cache: CacheStatus, pending_corrections: usize) -> MetricsSnapshot {
        MetricsSnapshot {
            total_processed: self.total_processed,
            cache_hits: self.cache_hits,
            cache_misses: self.cache_misses,
            cache_hit_rate: rate(self.cache_hits, self.total_processed),
            errors: self.errors,
            error_rate: rate(self.errors, self.total_processed),
            fallbacks: self.fallbacks,
            low_confidence: self.low_confidence,
            pending_corrections,
            latency: Stage::ALL.iter().map(|&s| (s, self.latency(s))).collect(),
            proc_distribution: self.proc_distribution.clone(),
            cache,
            engine_version: ENGINE_VERSION,
            model_version: MODEL_VERSION,
            generated_at: Utc::now(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new(1000, 500)
    }
}

fn rate(part: u64, total: u64) -> String {
    if total == 0 {
        return "0.0%".to_string();
    }
    format!("{:.1}%", part as f64 / total as f64 * 100.0)
}

// ═══════════════════════════════════════════════════════════
// Snapshot
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStatus {
    pub size: usize,
    pub capacity: usize,
    pub evictions: u64,
}

/// Point-in-time view of the engine's counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub total_processed: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_hit_rate: String,
    pub errors: u64,
    pub error_rate: String,
    pub fallbacks: u64,
    pub low_confidence: u64,
    pub pending_corrections: usize,
    /// `None` for stages with no samples yet.
    pub latency: BTreeMap<Stage, Option<LatencyStats>>,
    pub proc_distribution: BTreeMap<String, u64>,
    pub cache: CacheStatus,
    pub engine_version: &'static str,
    pub model_version: &'static str,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> CacheStatus {
        CacheStatus { size: 0, capacity: 200, evictions: 0 }
    }

    #[test]
    fn latency_percentiles_use_floor_index() {
        let mut m = Metrics::default();
        for us in 1..=100 {
            m.record_latency(Stage::Extract, us);
        }
        let stats = m.latency(Stage::Extract).unwrap();
        assert_eq!(stats.count, 100);
        assert_eq!(stats.p50, 51);
        assert_eq!(stats.p95, 96);
        assert_eq!(stats.p99, 100);
        assert_eq!(stats.max, 100);
        // 5050 / 100 = 50.5 rounds away from zero
        assert_eq!(stats.mean, 51);
    }

    #[test]
    fn single_sample_stats() {
        let mut m = Metrics::default();
        m.record_latency(Stage::Normalize, 7);
        let stats = m.latency(Stage::Normalize).unwrap();
        assert_eq!((stats.p50, stats.p99, stats.max), (7, 7, 7));
        assert!(m.latency(Stage::Validate).is_none());
    }

    #[test]
    fn history_trims_to_retained_tail() {
        let mut m = Metrics::new(10, 5);
        for us in 0..11 {
            m.record_latency(Stage::Classify, us);
        }
        assert_eq!(m.samples(Stage::Classify), 5);
        let stats = m.latency(Stage::Classify).unwrap();
        assert_eq!(stats.max, 10);
        assert_eq!(stats.p50, 8, "Expected newest samples 6..=10, got {stats:?}");
    }

    #[test]
    fn rates_format_with_one_decimal() {
        let mut m = Metrics::default();
        m.total_processed = 3;
        m.cache_hits = 1;
        let snap = m.snapshot(cache(), 0);
        assert_eq!(snap.cache_hit_rate, "33.3%");
        assert_eq!(snap.error_rate, "0.0%");
    }

    #[test]
    fn empty_metrics_rate_is_zero() {
        let snap = Metrics::default().snapshot(cache(), 2);
        assert_eq!(snap.cache_hit_rate, "0.0%");
        assert_eq!(snap.pending_corrections, 2);
        assert_eq!(snap.latency.len(), 4);
        assert!(snap.latency.values().all(Option::is_none));
        assert_eq!(snap.model_version, "1.0.0");
    }

    #[test]
    fn procedure_histogram_counts() {
        let mut m = Metrics::default();
        m.record_procedure("PROC-01");
        m.record_procedure("PROC-01");
        m.record_procedure("PROC-04");
        assert_eq!(m.proc_distribution()["PROC-01"], 2);
        assert_eq!(m.proc_distribution()["PROC-04"], 1);
    }

    #[test]
    fn reset_clears_everything() {
        let mut m = Metrics::new(10, 5);
        m.total_processed = 4;
        m.record_latency(Stage::Extract, 3);
        m.record_procedure("PROC-01");
        m.reset();
        assert_eq!(m.total_processed, 0);
        assert_eq!(m.samples(Stage::Extract), 0);
        assert!(m.proc_distribution().is_empty());
    }

    #[test]
    fn snapshot_serializes_stage_keys() {
        let mut m = Metrics::default();
        m.record_latency(Stage::Validate, 12);
        let json = serde_json::to_value(m.snapshot(cache(), 0)).unwrap();
        assert_eq!(json["latency"]["validate"]["max"], 12);
        assert!(json["latency"]["normalize"].is_null());
        assert!(json["generated_at"].is_string());
    }
}
