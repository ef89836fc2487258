//! Per-subscription message file logging
//!
//! When message logging is enabled, every raw frame for a topic is
//! appended to its own daily-rolling file named
//! `ws-subscription-{topic}.log`. Writes go through a non-blocking worker
//! that owns the file handle; dropping a sink flushes its buffered lines.

use std::io::Write;
use std::path::{Path, PathBuf};

use dashmap::DashMap;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use uuid::Uuid;

struct MessageSink {
    writer: NonBlocking,
    _guard: WorkerGuard,
}

/// Lazily created per-topic file sinks
pub struct MessageLogSinks {
    dir: PathBuf,
    sinks: DashMap<Uuid, MessageSink>,
}

impl MessageLogSinks {
    /// Root the sinks at `dir`; files appear on first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            sinks: DashMap::new(),
        }
    }

    /// Directory the log files are written under
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Append one message to the topic's log file
    pub fn write(&self, topic: Uuid, message: &str) {
        let mut writer = {
            let sink = self.sinks.entry(topic).or_insert_with(|| {
                let appender = tracing_appender::rolling::daily(
                    &self.dir,
                    format!("ws-subscription-{topic}.log"),
                );
                let (writer, guard) = tracing_appender::non_blocking(appender);
                MessageSink {
                    writer,
                    _guard: guard,
                }
            });
            sink.writer.clone()
        };
        let _ = writeln!(writer, "{message}");
    }

    /// Drop the topic's sink, flushing its buffered lines
    pub fn close(&self, topic: Uuid) {
        self.sinks.remove(&topic);
    }

    /// Number of topics with an open sink
    pub fn open_count(&self) -> usize {
        self.sinks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_topic_log(dir: &Path, topic: Uuid) -> String {
        let prefix = format!("ws-subscription-{topic}.log");
        let entry = std::fs::read_dir(dir)
            .unwrap()
            .filter_map(Result::ok)
            .find(|entry| entry.file_name().to_string_lossy().starts_with(&prefix))
            .expect("log file should exist");
        std::fs::read_to_string(entry.path()).unwrap()
    }

    #[test]
    fn test_write_appends_to_topic_file() {
        let dir = tempfile::tempdir().unwrap();
        let sinks = MessageLogSinks::new(dir.path());
        let topic = Uuid::new_v4();

        sinks.write(topic, r#"{"EventType":"Trade","Message":{"price":"101.5"}}"#);
        sinks.write(topic, r#"{"EventType":"Quote","Message":{"bid":"101.4"}}"#);
        assert_eq!(sinks.open_count(), 1);

        // Closing flushes the non-blocking writer
        sinks.close(topic);
        assert_eq!(sinks.open_count(), 0);

        let contents = read_topic_log(dir.path(), topic);
        assert!(contents.contains("Trade"));
        assert!(contents.contains("Quote"));
    }

    #[test]
    fn test_topics_write_to_separate_files() {
        let dir = tempfile::tempdir().unwrap();
        let sinks = MessageLogSinks::new(dir.path());
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        sinks.write(first, "frame-for-first");
        sinks.write(second, "frame-for-second");
        sinks.close(first);
        sinks.close(second);

        assert!(read_topic_log(dir.path(), first).contains("frame-for-first"));
        assert!(read_topic_log(dir.path(), second).contains("frame-for-second"));
    }

    #[test]
    fn test_close_unknown_topic_is_harmless() {
        let sinks = MessageLogSinks::new("logs");
        sinks.close(Uuid::new_v4());
        assert_eq!(sinks.open_count(), 0);
    }
}
