use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::decision::Decision;

/// In-memory counters shared by the admission path and background tasks.
#[derive(Debug)]
pub struct Metrics {
    started_at: DateTime<Utc>,
    events_received: AtomicU64,
    events_processed: AtomicU64,
    skipped_disabled: AtomicU64,
    skipped_duplicate: AtomicU64,
    skipped_irrelevant: AtomicU64,
    classification_failures: AtomicU64,
    decisions_auto_act: AtomicU64,
    decisions_offer: AtomicU64,
    decisions_clarify: AtomicU64,
    decisions_notify: AtomicU64,
    auto_spawned: AtomicU64,
    clarifications_posted: AtomicU64,
    notifications_sent: AtomicU64,
    errors: AtomicU64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionCounts {
    pub auto_act: u64,
    pub offer: u64,
    pub clarify: u64,
    pub notify: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub events_received: u64,
    pub events_processed: u64,
    /// Sum of every skip reason.
    pub events_skipped: u64,
    pub skipped_disabled: u64,
    pub skipped_duplicate: u64,
    pub skipped_irrelevant: u64,
    pub classification_failures: u64,
    pub decisions: DecisionCounts,
    pub auto_spawned: u64,
    pub clarifications_posted: u64,
    pub notifications_sent: u64,
    pub errors: u64,
    pub dedup_cache_size: usize,
    pub uptime_seconds: i64,
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

fn read(counter: &AtomicU64) -> u64 {
    counter.load(Ordering::Relaxed)
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            events_received: AtomicU64::new(0),
            events_processed: AtomicU64::new(0),
            skipped_disabled: AtomicU64::new(0),
            skipped_duplicate: AtomicU64::new(0),
            skipped_irrelevant: AtomicU64::new(0),
            classification_failures: AtomicU64::new(0),
            decisions_auto_act: AtomicU64::new(0),
            decisions_offer: AtomicU64::new(0),
            decisions_clarify: AtomicU64::new(0),
            decisions_notify: AtomicU64::new(0),
            auto_spawned: AtomicU64::new(0),
            clarifications_posted: AtomicU64::new(0),
            notifications_sent: AtomicU64::new(0),
            errors: AtomicU64::new(0),
        }
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn record_received(&self) {
        bump(&self.events_received);
    }

    pub fn record_processed(&self) {
        bump(&self.events_processed);
    }

    pub fn record_skipped_disabled(&self) {
        bump(&self.skipped_disabled);
    }

    pub fn record_skipped_duplicate(&self) {
        bump(&self.skipped_duplicate);
    }

    pub fn record_skipped_irrelevant(&self) {
        bump(&self.skipped_irrelevant);
    }

    /// Counts as an error as well.
    pub fn record_classification_failure(&self) {
        bump(&self.classification_failures);
        bump(&self.errors);
    }

    pub fn record_decision(&self, decision: Decision) {
        match decision {
            Decision::AutoAct => bump(&self.decisions_auto_act),
            Decision::Offer => bump(&self.decisions_offer),
            Decision::Clarify => bump(&self.decisions_clarify),
            Decision::Notify => bump(&self.decisions_notify),
        }
    }

    pub fn record_auto_spawned(&self) {
        bump(&self.auto_spawned);
    }

    pub fn record_clarification_posted(&self) {
        bump(&self.clarifications_posted);
    }

    pub fn record_notification_sent(&self) {
        bump(&self.notifications_sent);
    }

    pub fn record_error(&self) {
        bump(&self.errors);
    }

    pub fn snapshot(&self, dedup_cache_size: usize) -> MetricsSnapshot {
        let skipped_disabled = read(&self.skipped_disabled);
        let skipped_duplicate = read(&self.skipped_duplicate);
        let skipped_irrelevant = read(&self.skipped_irrelevant);
        MetricsSnapshot {
            events_received: read(&self.events_received),
            events_processed: read(&self.events_processed),
            events_skipped: skipped_disabled + skipped_duplicate + skipped_irrelevant,
            skipped_disabled,
            skipped_duplicate,
            skipped_irrelevant,
            classification_failures: read(&self.classification_failures),
            decisions: DecisionCounts {
                auto_act: read(&self.decisions_auto_act),
                offer: read(&self.decisions_offer),
                clarify: read(&self.decisions_clarify),
                notify: read(&self.decisions_notify),
            },
            auto_spawned: read(&self.auto_spawned),
            clarifications_posted: read(&self.clarifications_posted),
            notifications_sent: read(&self.notifications_sent),
            errors: read(&self.errors),
            dedup_cache_size,
            uptime_seconds: (Utc::now() - self.started_at).num_seconds(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
