//! Message throughput accounting
//!
//! Every consumed frame increments a global counter and, when its topic is
//! registered, a per-subscription counter. A reporter task drains the
//! counters once per second and logs the rates; seconds with no traffic
//! produce no output.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

/// Monotonically increasing counter with an atomic drain
#[derive(Debug, Default)]
pub struct AtomicCounter {
    value: AtomicU64,
}

impl AtomicCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    /// Read and zero the counter in one step
    pub fn reset_and_get(&self) -> u64 {
        self.value.swap(0, Ordering::Relaxed)
    }
}

/// Throughput counters for all active subscriptions
///
/// Counting is cheap enough to sit on the frame receipt path. Topics are
/// registered while their consumer runs; frames for unregistered topics
/// still count toward the global rate.
#[derive(Debug, Default)]
pub struct ThroughputCounter {
    global: AtomicCounter,
    per_topic: DashMap<Uuid, Arc<AtomicCounter>>,
}

impl ThroughputCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start per-topic counting; keeps the existing counter if registered
    pub fn register(&self, topic: Uuid) {
        self.per_topic.entry(topic).or_default();
    }

    /// Stop per-topic counting and drop the counter
    pub fn unregister(&self, topic: Uuid) {
        self.per_topic.remove(&topic);
    }

    /// Count one frame against the global rate and the topic, if registered
    pub fn increment(&self, topic: Uuid) {
        self.global.increment();
        if let Some(counter) = self.per_topic.get(&topic) {
            counter.increment();
        }
    }

    /// Global frame count since the last drain
    pub fn global_count(&self) -> u64 {
        self.global.get()
    }

    /// Frame count for a registered topic since the last drain
    pub fn topic_count(&self, topic: Uuid) -> Option<u64> {
        self.per_topic.get(&topic).map(|counter| counter.get())
    }

    /// Number of topics currently registered
    pub fn active_topics(&self) -> usize {
        self.per_topic.len()
    }

    /// Drain the counters and log one throughput report
    ///
    /// Returns the drained global count. A zero count skips all output,
    /// including the per-topic lines.
    pub fn report_once(&self) -> u64 {
        let global = self.global.reset_and_get();
        if global == 0 {
            return 0;
        }

        let active = self.active_topics();
        let average = if active > 0 { global / active as u64 } else { global };
        info!(
            "[throughput] global: {} msg/sec | active subscriptions: {} | avg per subscription: {}",
            global, active, average
        );

        for entry in self.per_topic.iter() {
            let count = entry.value().reset_and_get();
            if count > 0 {
                info!("[throughput] subscription {}: {} msg/sec", entry.key(), count);
            }
        }

        global
    }

    /// Spawn the once-per-second reporter; it exits when `cancel` fires
    pub fn spawn_reporter(self: &Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        let counter = Arc::clone(self);
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(Duration::from_secs(1));
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tick.tick() => {
                        counter.report_once();
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_counter_drains() {
        let counter = AtomicCounter::new();
        counter.increment();
        counter.increment();
        assert_eq!(counter.get(), 2);
        assert_eq!(counter.reset_and_get(), 2);
        assert_eq!(counter.get(), 0);
    }

    #[test]
    fn test_increment_counts_global_and_registered_topic() {
        let counter = ThroughputCounter::new();
        let registered = Uuid::new_v4();
        let unregistered = Uuid::new_v4();

        counter.register(registered);
        counter.increment(registered);
        counter.increment(registered);
        counter.increment(unregistered);

        assert_eq!(counter.global_count(), 3);
        assert_eq!(counter.topic_count(registered), Some(2));
        assert_eq!(counter.topic_count(unregistered), None);
        assert_eq!(counter.active_topics(), 1);
    }

    #[test]
    fn test_register_keeps_existing_counts() {
        let counter = ThroughputCounter::new();
        let topic = Uuid::new_v4();

        counter.register(topic);
        counter.increment(topic);
        counter.register(topic);

        assert_eq!(counter.topic_count(topic), Some(1));
    }

    #[test]
    fn test_unregister_drops_topic() {
        let counter = ThroughputCounter::new();
        let topic = Uuid::new_v4();

        counter.register(topic);
        counter.increment(topic);
        counter.unregister(topic);

        assert_eq!(counter.topic_count(topic), None);
        assert_eq!(counter.active_topics(), 0);
        // The global rate keeps the frames already counted
        assert_eq!(counter.global_count(), 1);
    }

    #[test]
    fn test_report_once_drains_and_skips_quiet_intervals() {
        let counter = ThroughputCounter::new();
        let topic = Uuid::new_v4();

        counter.register(topic);
        for _ in 0..3 {
            counter.increment(topic);
        }

        assert_eq!(counter.report_once(), 3);
        assert_eq!(counter.global_count(), 0);
        assert_eq!(counter.topic_count(topic), Some(0));
        assert_eq!(counter.report_once(), 0);
    }

    #[tokio::test]
    async fn test_reporter_stops_on_cancellation() {
        let counter = Arc::new(ThroughputCounter::new());
        let cancel = CancellationToken::new();
        let reporter = counter.spawn_reporter(cancel.clone());

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), reporter)
            .await
            .expect("reporter did not stop")
            .unwrap();
    }
}
