//! Robot telemetry ingestion.
//!
//! A background thread reads line-delimited JSON `RobotTelemetry` reports
//! and forwards valid ones to the engine's command channel. Malformed lines
//! are dropped and the most recent error is kept for inspection. Shutdown
//! is cooperative: the thread checks its running flag before every line.

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crossbeam_channel::{Sender, TrySendError};

use sentinel_core::commands::{Command, RobotTelemetry};
use sentinel_core::error::{SimError, SimResult};

/// Parse one report. Blank lines are not reports.
pub fn parse_line(line: &str) -> SimResult<RobotTelemetry> {
    let line = line.trim();
    if line.is_empty() {
        return Err(SimError::Telemetry("empty line".into()));
    }
    let report: RobotTelemetry =
        serde_json::from_str(line).map_err(|e| SimError::Telemetry(e.to_string()))?;
    if !report.position.is_finite() {
        return Err(SimError::Telemetry(format!(
            "non-finite position for {}",
            report.target_id
        )));
    }
    Ok(report)
}

#[derive(Default)]
struct Counters {
    accepted: AtomicU64,
    dropped: AtomicU64,
    last_error: Mutex<Option<String>>,
}

impl Counters {
    fn reject(&self, err: String) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut last) = self.last_error.lock() {
            *last = Some(err);
        }
    }
}

pub struct TelemetryIngestor {
    running: Arc<AtomicBool>,
    counters: Arc<Counters>,
    handle: Option<JoinHandle<()>>,
}

impl TelemetryIngestor {
    /// Start reading `reader` on a new thread, forwarding to `commands`.
    pub fn spawn<R>(reader: R, commands: Sender<Command>) -> std::io::Result<Self>
    where
        R: BufRead + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let counters = Arc::new(Counters::default());
        let handle = {
            let running = Arc::clone(&running);
            let counters = Arc::clone(&counters);
            std::thread::Builder::new()
                .name("sentinel-telemetry".into())
                .spawn(move || ingest(reader, &commands, &running, &counters))?
        };
        Ok(Self {
            running,
            counters,
            handle: Some(handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Ask the thread to stop before its next line.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Wait for the thread to finish. Blocks until its reader yields a
    /// line or reaches end of input.
    pub fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("telemetry thread panicked");
            }
        }
    }

    pub fn accepted(&self) -> u64 {
        self.counters.accepted.load(Ordering::Relaxed)
    }

    pub fn dropped(&self) -> u64 {
        self.counters.dropped.load(Ordering::Relaxed)
    }

    pub fn last_error(&self) -> Option<String> {
        self.counters.last_error.lock().ok().and_then(|e| e.clone())
    }
}

fn ingest<R: BufRead>(mut reader: R, commands: &Sender<Command>, running: &AtomicBool, counters: &Counters) {
    let mut line = String::new();
    while running.load(Ordering::Relaxed) {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) => {
                counters.reject(err.to_string());
                tracing::warn!(%err, "telemetry read failed");
                break;
            }
        }
        if line.trim().is_empty() {
            continue;
        }
        let report = match parse_line(&line) {
            Ok(report) => report,
            Err(err) => {
                tracing::debug!(%err, "telemetry line dropped");
                counters.reject(err.to_string());
                continue;
            }
        };
        match commands.try_send(Command::Telemetry(report)) {
            Ok(()) => {
                counters.accepted.fetch_add(1, Ordering::Relaxed);
            }
            Err(TrySendError::Full(_)) => counters.reject("command queue full".into()),
            Err(TrySendError::Disconnected(_)) => break,
        }
    }
    running.store(false, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use crossbeam_channel::bounded;
    use sentinel_core::types::Position;

    const GOOD: &str = r#"{"target_id":"rover-0001","position":{"x":3.0,"y":4.0},"heading":90.0}"#;

    #[test]
    fn test_parse_line() {
        let report = parse_line(GOOD).unwrap();
        assert_eq!(report.target_id, "rover-0001");
        assert_eq!(report.position, Position::new(3.0, 4.0));
        assert_eq!(report.heading, Some(90.0));
        assert!(report.battery.is_none());

        assert!(matches!(parse_line("{not json"), Err(SimError::Telemetry(_))));
        assert!(matches!(parse_line("   "), Err(SimError::Telemetry(_))));
    }

    #[test]
    fn test_malformed_lines_dropped_with_last_error() {
        let input = format!("{GOOD}\ngarbage\n\n{GOOD}\n{{\"target_id\":\"x\"}}\n");
        let (tx, rx) = bounded(16);
        let mut ingestor = TelemetryIngestor::spawn(Cursor::new(input), tx).unwrap();
        ingestor.join();

        assert_eq!(ingestor.accepted(), 2);
        assert_eq!(ingestor.dropped(), 2);
        assert!(ingestor.last_error().is_some());
        assert!(!ingestor.is_running());

        let forwarded: Vec<Command> = rx.try_iter().collect();
        assert_eq!(forwarded.len(), 2);
        assert!(matches!(&forwarded[0], Command::Telemetry(r) if r.target_id == "rover-0001"));
    }

    #[test]
    fn test_full_queue_drops_instead_of_blocking() {
        let input = format!("{GOOD}\n{GOOD}\n{GOOD}\n");
        let (tx, _rx) = bounded(1);
        let mut ingestor = TelemetryIngestor::spawn(Cursor::new(input), tx).unwrap();
        ingestor.join();
        assert_eq!(ingestor.accepted(), 1);
        assert_eq!(ingestor.dropped(), 2);
        assert_eq!(ingestor.last_error().as_deref(), Some("command queue full"));
    }

    #[test]
    fn test_stopped_ingestor_reads_nothing() {
        let (tx, rx) = bounded(16);
        let running = AtomicBool::new(false);
        let counters = Counters::default();
        ingest(Cursor::new(format!("{GOOD}\n")), &tx, &running, &counters);
        assert_eq!(rx.try_iter().count(), 0);
        assert_eq!(counters.accepted.load(Ordering::Relaxed), 0);
    }
}
