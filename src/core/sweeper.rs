use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::core::service::ReservationService;
use crate::domain::model::AppState;
use crate::domain::ports::DocumentStore;
use crate::utils::error::BookingError;

pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(10);

/// `tokio::time::interval` panics on a zero period.
const MIN_SWEEP_PERIOD: Duration = Duration::from_millis(1);

pub type SharedState = Arc<Mutex<AppState>>;

/// 一次清除的結果
#[derive(Debug, Default)]
pub struct SweepReport {
    pub matched: usize,
    pub deleted: Vec<String>,
    pub failed: Vec<(String, BookingError)>,
}

impl SweepReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Handle to a running sweep task.
///
/// `shutdown` stops the task after any in-flight sweep finishes; dropping the
/// handle aborts it immediately.
pub struct SweeperHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
    sweeps: watch::Receiver<u64>,
}

impl SweeperHandle {
    /// 每次清除嘗試結束（不論成敗）計數加一
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.sweeps.clone()
    }

    pub fn completed_sweeps(&self) -> u64 {
        *self.sweeps.borrow()
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!("Sweeper task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

pub struct Sweeper;

impl Sweeper {
    /// Starts the periodic sweep. The first sweep runs one full `period`
    /// after start; the startup sweep belongs to `initialize`. A zero
    /// `period` is raised to one millisecond.
    pub fn spawn<S>(
        service: Arc<ReservationService<S>>,
        state: SharedState,
        period: Duration,
    ) -> SweeperHandle
    where
        S: DocumentStore + 'static,
    {
        let period = period.max(MIN_SWEEP_PERIOD);
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let (sweeps_tx, sweeps_rx) = watch::channel(0u64);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            tracing::debug!("Sweeper started, interval {:?}", period);
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        service.sweep_and_reload_shared(&state, Utc::now()).await;
                        sweeps_tx.send_modify(|count| *count += 1);
                    }
                }
            }
            tracing::debug!("Sweeper stopped");
        });

        SweeperHandle {
            shutdown: Some(shutdown_tx),
            task: Some(task),
            sweeps: sweeps_rx,
        }
    }
}
