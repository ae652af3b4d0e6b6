//! End-to-end scenarios for the acquisition loop, driven over a scripted
//! channel: a full valid cycle, malformed replies, store outages and the
//! stop lifecycle.

use async_trait::async_trait;
use sensor_logger::{
    Acquisition, AppendLog, MockChannel, MockReply, RecordSink, Schedule, SensorReading, SinkError,
    TargetName,
};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Sink that remembers every reading it was handed.
#[derive(Default, Clone)]
struct RecordingSink {
    readings: Arc<Mutex<Vec<SensorReading>>>,
}

impl RecordingSink {
    fn readings(&self) -> Vec<SensorReading> {
        self.readings.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordSink for RecordingSink {
    fn kind(&self) -> &'static str {
        "recording"
    }

    async fn write(&self, reading: &SensorReading) -> Result<(), SinkError> {
        self.readings.lock().unwrap().push(reading.clone());
        Ok(())
    }
}

/// Sink that always fails, standing in for an unreachable database.
struct OutageSink;

#[async_trait]
impl RecordSink for OutageSink {
    fn kind(&self) -> &'static str {
        "outage"
    }

    async fn write(&self, _reading: &SensorReading) -> Result<(), SinkError> {
        Err(SinkError::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "store unreachable",
        )))
    }
}

fn quick_schedule() -> Schedule {
    Schedule {
        command: "A".to_string(),
        settle_delay: Duration::from_millis(1),
        poll_interval: Duration::from_millis(5),
    }
}

const VALID_REPLY: &str = "A +00.963 +031.28 -0.0057 -0.0053 +000031.3    Air";

#[tokio::test]
async fn valid_cycle_reaches_both_sinks() {
    let channel = MockChannel::new("MOCK0");
    channel.push_line(VALID_REPLY);

    let primary = RecordingSink::default();
    let backup = RecordingSink::default();
    let acquisition = Acquisition::new();
    acquisition
        .start_with_channel(
            Box::new(channel.clone()),
            vec![Arc::new(primary.clone()), Arc::new(backup.clone())],
            quick_schedule(),
        )
        .unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    acquisition.stop().await;

    let expected = SensorReading {
        command: "A".to_string(),
        pressure: 0.963,
        temperature: 31.28,
        x: -0.0057,
        y: -0.0053,
        air_value: 31.3,
        air_status: "Air".to_string(),
    };
    assert_eq!(primary.readings(), vec![expected.clone()]);
    assert_eq!(backup.readings(), vec![expected]);
    assert_eq!(channel.sent_commands().first().map(String::as_str), Some("A"));
}

#[tokio::test]
async fn malformed_reply_skips_sinks_and_loop_continues() {
    let channel = MockChannel::new("MOCK0");
    channel.push_line("A +00.963");

    let sink = RecordingSink::default();
    let acquisition = Acquisition::new();
    acquisition
        .start_with_channel(
            Box::new(channel.clone()),
            vec![Arc::new(sink.clone())],
            quick_schedule(),
        )
        .unwrap();

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(acquisition.is_running(), "rejection must not end the run");
    acquisition.stop().await;

    assert!(sink.readings().is_empty());
    // The loop kept polling past the rejected reply.
    assert!(channel.sent_commands().len() > 1);
}

#[tokio::test]
async fn silence_skips_the_iteration() {
    let channel = MockChannel::new("MOCK0");
    channel.push_reply(MockReply::Silence);
    channel.push_line(VALID_REPLY);

    let sink = RecordingSink::default();
    let acquisition = Acquisition::new();
    acquisition
        .start_with_channel(
            Box::new(channel.clone()),
            vec![Arc::new(sink.clone())],
            quick_schedule(),
        )
        .unwrap();

    tokio::time::sleep(Duration::from_millis(60)).await;
    acquisition.stop().await;

    // The timed-out first iteration wrote nothing; the second one did.
    assert_eq!(sink.readings().len(), 1);
}

#[tokio::test]
async fn store_outage_never_loses_the_reading() {
    let dir = tempfile::tempdir().unwrap();
    let target = TargetName::sanitize("r1_probe_sensor_data").unwrap();
    let append = AppendLog::new(dir.path(), &target);
    append.ensure_header().unwrap();

    let channel = MockChannel::new("MOCK0");
    channel.push_line(VALID_REPLY);

    let acquisition = Acquisition::new();
    acquisition
        .start_with_channel(
            Box::new(channel),
            vec![Arc::new(OutageSink), Arc::new(append.clone())],
            quick_schedule(),
        )
        .unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(
        acquisition.is_running(),
        "a store outage must not end the run"
    );
    acquisition.stop().await;

    let content = std::fs::read_to_string(append.path()).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2, "header plus exactly one data line");
    assert!(lines[1].contains(",A,0.963,31.28,-0.0057,-0.0053,31.3,Air"));
}

#[tokio::test]
async fn stop_mid_sleep_sends_no_further_command() {
    let channel = MockChannel::new("MOCK0");
    channel.push_line(VALID_REPLY);

    let sink = RecordingSink::default();
    let acquisition = Acquisition::new();
    acquisition
        .start_with_channel(
            Box::new(channel.clone()),
            vec![Arc::new(sink.clone())],
            Schedule {
                command: "A".to_string(),
                settle_delay: Duration::from_millis(1),
                poll_interval: Duration::from_secs(30),
            },
        )
        .unwrap();

    // Let the single iteration finish and park in the interval sleep.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let before = Instant::now();
    acquisition.stop().await;

    // The stop woke the sleep instead of waiting out 30 s.
    assert!(before.elapsed() < Duration::from_secs(5));
    assert!(!acquisition.is_running());
    // The completed iteration's write is retained; nothing was sent after.
    assert_eq!(sink.readings().len(), 1);
    assert_eq!(channel.sent_commands(), vec!["A"]);
}
