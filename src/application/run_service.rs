// Run service - drives one auto run at a time against the health store
use crate::application::error::RunError;
use crate::application::measurement_store::MeasurementStore;
use crate::application::notification::NotificationSink;
use crate::domain::glucose::{GlucoseUnit, STORE_UNIT};
use crate::domain::run::{ConfigError, DeleteOutcome, RunConfig, RunState, RunSummary};
use crate::domain::waveform::TriangularWave;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, watch};

/// Write counters for the run in flight, readable from the status endpoint
/// while the emission loop is still going.
#[derive(Debug, Default)]
pub struct RunProgress {
    written: AtomicU64,
    failed: AtomicU64,
}

impl RunProgress {
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    fn reset(&self) {
        self.written.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
    }
}

#[derive(Clone)]
pub struct RunService {
    store: Arc<dyn MeasurementStore>,
    notifier: Arc<dyn NotificationSink>,
    state: Arc<watch::Sender<RunState>>,
    progress: Arc<RunProgress>,
    // Held by the emission loop for its whole lifetime, so a restart cannot
    // overlap a run that is still winding down.
    busy: Arc<Mutex<()>>,
}

impl RunService {
    pub fn new(store: Arc<dyn MeasurementStore>, notifier: Arc<dyn NotificationSink>) -> Self {
        let (state, _) = watch::channel(RunState::Idle);
        Self {
            store,
            notifier,
            state: Arc::new(state),
            progress: Arc::new(RunProgress::default()),
            busy: Arc::new(Mutex::new(())),
        }
    }

    pub fn state(&self) -> RunState {
        *self.state.borrow()
    }

    /// Observe state transitions as they happen.
    pub fn subscribe(&self) -> watch::Receiver<RunState> {
        self.state.subscribe()
    }

    /// Current state plus the in-flight run's write counters.
    pub fn status(&self) -> RunSummary {
        RunSummary {
            written: self.progress.written(),
            failed: self.progress.failed(),
            state: self.state(),
        }
    }

    /// Begin an auto run over the given config snapshot. Fails with
    /// `AlreadyRunning` while a previous run is still emitting.
    pub fn start(&self, config: RunConfig) -> Result<(), RunError> {
        config.validate()?;

        let guard = self
            .busy
            .clone()
            .try_lock_owned()
            .map_err(|_| RunError::AlreadyRunning)?;

        self.progress.reset();
        self.state.send_replace(RunState::Running);
        tracing::info!(
            "starting auto run: {} entries, {}..{} {}, step {}, one sample per {}s from {} to {}",
            TriangularWave::new(&config).remaining(),
            config.min_value,
            config.max_value,
            config.unit,
            config.step,
            config.interval_seconds,
            config.start_time,
            config.end_time
        );

        let service = self.clone();
        tokio::spawn(async move {
            let _guard = guard;
            service.emission_loop(config).await;
        });

        Ok(())
    }

    /// Request cancellation. No-op unless a run is in flight. The loop halts
    /// at its next check, so an in-flight store write is allowed to finish
    /// but no further samples are pulled.
    pub fn stop(&self) {
        self.state.send_if_modified(|state| {
            if *state == RunState::Running {
                *state = RunState::Stopped;
                true
            } else {
                false
            }
        });
    }

    async fn emission_loop(&self, config: RunConfig) {
        let mut state_rx = self.state.subscribe();
        let tick = Duration::from_secs_f64(config.interval_seconds);
        let mut wave = TriangularWave::new(&config).peekable();
        let mut written = 0u64;
        let mut failed = 0u64;

        while *state_rx.borrow() == RunState::Running {
            let Some(sample) = wave.next() else { break };

            match self.store.write(sample.store_value(), sample.timestamp).await {
                Ok(()) => {
                    written += 1;
                    self.progress.written.store(written, Ordering::Relaxed);
                }
                Err(e) => {
                    // Best-effort per sample: count it and keep going.
                    failed += 1;
                    self.progress.failed.store(failed, Ordering::Relaxed);
                    tracing::warn!("store write at {} failed: {:#}", sample.timestamp, e);
                }
            }

            if wave.peek().is_none() {
                break;
            }

            // Pace the next emission; wake early when stop() flips the state.
            tokio::select! {
                _ = tokio::time::sleep(tick) => {}
                _ = state_rx.changed() => {}
            }
        }

        let finished = self.state.send_if_modified(|state| {
            if *state == RunState::Running {
                *state = RunState::Completed;
                true
            } else {
                false
            }
        });

        let summary = RunSummary {
            written,
            failed,
            state: if finished {
                RunState::Completed
            } else {
                RunState::Stopped
            },
        };
        tracing::info!(
            "auto run {}: {} written, {} failed",
            summary.state,
            summary.written,
            summary.failed
        );
        self.notifier.notify(&format!(
            "Auto run {}: {} samples written, {} failed",
            summary.state, summary.written, summary.failed
        ));
    }

    /// Manual single-sample path. The value is validated against the unit's
    /// range and converted into the store's native unit before the write.
    pub async fn write_once(
        &self,
        value: f64,
        unit: GlucoseUnit,
        timestamp: DateTime<Utc>,
    ) -> Result<(), RunError> {
        if !unit.legal_range().contains(&value) {
            return Err(ConfigError::OutOfRange { value, unit }.into());
        }

        let store_value = unit.convert(value, STORE_UNIT);
        self.store
            .write(store_value, timestamp)
            .await
            .map_err(|e| RunError::StoreWrite(format!("{:#}", e)))?;

        self.notifier.notify(&format!(
            "Recorded {:.1} {} at {}",
            store_value, STORE_UNIT, timestamp
        ));
        Ok(())
    }

    /// Delete every record in [start, end]. An empty range reports the
    /// distinct nothing-to-delete outcome rather than an error.
    pub async fn delete_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<DeleteOutcome, RunError> {
        if end < start {
            return Err(ConfigError::InvertedWindow { start, end }.into());
        }

        let deleted = self
            .store
            .delete(start, end)
            .await
            .map_err(|e| RunError::StoreDelete(format!("{:#}", e)))?;

        if deleted == 0 {
            self.notifier.notify("No records to delete");
            Ok(DeleteOutcome::NothingToDelete)
        } else {
            self.notifier.notify(&format!("Deleted {} records", deleted));
            Ok(DeleteOutcome::Deleted(deleted))
        }
    }

    /// One-shot store authorization, called at startup. A denial is surfaced
    /// and never retried here; later writes simply fail per sample.
    pub async fn request_access(&self) -> Result<(), RunError> {
        let granted = self
            .store
            .request_access()
            .await
            .map_err(|e| RunError::AuthDenied(format!("{:#}", e)))?;

        if granted {
            Ok(())
        } else {
            Err(RunError::AuthDenied(
                "access to the health store was not granted".to_string(),
            ))
        }
    }
}
