//! The acquisition loop and its lifecycle.
//!
//! One background worker per run drives the cycle: send command, settle,
//! bounded read, parse, fan out to both sinks, sleep, check for stop. The
//! state machine is `Idle -> Running -> Idle`; the stop signal travels over a
//! watch channel and is observed at iteration boundaries only, so in-flight
//! I/O always completes and at most one full cycle runs after a stop request.

use crate::config::RunConfiguration;
use crate::error::StartError;
use crate::parser;
use crate::sink::{AppendLog, DurableStore, RecordSink};
use crate::target::TargetName;
use crate::transport::{LineTransport, SerialChannel};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Command and pacing for one run.
#[derive(Debug, Clone)]
pub struct Schedule {
    /// Polling command, framed with a carriage return by the transport.
    pub command: String,
    /// Wait between command write and reply read, covering device latency.
    pub settle_delay: Duration,
    /// Wait between iterations.
    pub poll_interval: Duration,
}

enum RunState {
    Idle,
    Running {
        stop: watch::Sender<bool>,
        worker: JoinHandle<()>,
    },
}

/// Lifecycle controller for the acquisition worker.
///
/// `start` transitions `Idle -> Running`, `stop` transitions back and is
/// idempotent. The serial channel is owned exclusively by the worker for the
/// run's duration and closed on every exit path.
pub struct Acquisition {
    state: Mutex<RunState>,
}

impl Default for Acquisition {
    fn default() -> Self {
        Self::new()
    }
}

impl Acquisition {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RunState::Idle),
        }
    }

    /// Start a run against real hardware and the configured sinks.
    ///
    /// Validates identification fields, derives the target name, provisions
    /// both sinks and opens the channel. Any failure leaves the machine in
    /// `Idle` and is returned to the caller; nothing is spawned.
    pub async fn start(&self, run: &RunConfiguration) -> Result<TargetName, StartError> {
        if run.reactor_id.trim().is_empty() {
            return Err(StartError::Config(
                "device.reactor_id must not be empty".to_string(),
            ));
        }
        if run.sensor_name.trim().is_empty() {
            return Err(StartError::Config(
                "device.sensor_name must not be empty".to_string(),
            ));
        }
        let target = TargetName::for_device(&run.reactor_id, &run.sensor_name)
            .map_err(|e| StartError::Config(e.to_string()))?;

        let durable = DurableStore::new(&run.database, target.clone());
        let append = AppendLog::new(&run.data_dir, &target);
        durable.ensure_schema().await?;
        append.ensure_header()?;

        let channel = SerialChannel::open(&run.serial)?;
        let sinks: Vec<Arc<dyn RecordSink>> = vec![Arc::new(durable), Arc::new(append)];
        self.start_with_channel(
            Box::new(channel),
            sinks,
            Schedule {
                command: run.command.clone(),
                settle_delay: run.settle_delay,
                poll_interval: run.poll_interval,
            },
        )?;

        info!(%target, "acquisition started");
        Ok(target)
    }

    /// Start the worker against an already-open channel and sink set.
    ///
    /// This is the seam the integration tests drive with a mock channel;
    /// [`start`](Self::start) funnels through it after provisioning.
    pub fn start_with_channel(
        &self,
        channel: Box<dyn LineTransport>,
        sinks: Vec<Arc<dyn RecordSink>>,
        schedule: Schedule,
    ) -> Result<(), StartError> {
        let mut state = self.state.lock().unwrap();
        if let RunState::Running { worker, .. } = &*state {
            // A worker that ended on its own (fatal fault) is reaped here.
            if !worker.is_finished() {
                return Err(StartError::AlreadyRunning);
            }
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        let worker = tokio::spawn(run_loop(channel, sinks, schedule, stop_rx));
        *state = RunState::Running {
            stop: stop_tx,
            worker,
        };
        Ok(())
    }

    /// Request a stop and wait for the worker to exit.
    ///
    /// Idempotent: stopping an idle controller is a no-op acknowledgement.
    pub async fn stop(&self) {
        let previous = {
            let mut state = self.state.lock().unwrap();
            std::mem::replace(&mut *state, RunState::Idle)
        };

        if let RunState::Running { stop, worker } = previous {
            // The worker may already be gone after a fatal fault; both the
            // send and the join tolerate that.
            let _ = stop.send(true);
            if let Err(e) = worker.await {
                error!(error = %e, "acquisition worker did not exit cleanly");
            }
            info!("acquisition stopped");
        }
    }

    /// Whether a worker is currently running.
    pub fn is_running(&self) -> bool {
        match &*self.state.lock().unwrap() {
            RunState::Running { worker, .. } => !worker.is_finished(),
            RunState::Idle => false,
        }
    }
}

/// The worker body. Exits on a stop signal or a fatal channel fault; the
/// channel is dropped (and the port closed) on every path out.
async fn run_loop(
    mut channel: Box<dyn LineTransport>,
    sinks: Vec<Arc<dyn RecordSink>>,
    schedule: Schedule,
    mut stop: watch::Receiver<bool>,
) {
    info!(
        channel = channel.name(),
        command = %schedule.command,
        "acquisition loop running"
    );

    loop {
        if *stop.borrow() {
            break;
        }

        if let Err(e) = channel.send_command(&schedule.command) {
            error!(error = %e, "command write failed, terminating run");
            break;
        }

        tokio::time::sleep(schedule.settle_delay).await;

        let line = match channel.read_line() {
            Ok(line) => line,
            // A quiet line is not a fault; the empty read is rejected by the
            // parser below and the iteration is skipped.
            Err(e) if e.is_timeout() => String::new(),
            Err(e) => {
                error!(error = %e, "channel fault, terminating run");
                break;
            }
        };

        match parser::parse(&line) {
            Ok(reading) => {
                debug!(?reading, "reply parsed");
                // Sinks are independent: a failure in one is reported and the
                // remaining sinks still receive the reading.
                for sink in &sinks {
                    if let Err(e) = sink.write(&reading).await {
                        warn!(sink = sink.kind(), error = %e, "sink write failed");
                    }
                }
            }
            Err(rejected) => {
                if line.is_empty() {
                    debug!("no reply within bound, skipping iteration");
                } else {
                    warn!(raw = %line, reason = %rejected, "reply rejected, skipping iteration");
                }
            }
        }

        // Sleep out the polling interval, waking early if a stop arrives so
        // shutdown does not wait on long intervals. A closed channel means
        // the controller is gone; the worker must not keep polling unpaced.
        tokio::select! {
            _ = tokio::time::sleep(schedule.poll_interval) => {}
            changed = stop.changed() => {
                if changed.is_err() {
                    info!("controller dropped, terminating run");
                    break;
                }
            }
        }
    }

    info!("acquisition loop exited");
}
