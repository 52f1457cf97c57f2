//! Search session.
//!
//! A [`SearchManager`] owns the catalog snapshot and configuration and runs
//! at most one search at a time, each on its own worker thread. Starting a
//! search cancels the previous one and waits for its worker to exit. The
//! report is delivered through a oneshot channel that can be awaited or
//! waited on from synchronous code.
//!
//! The configured wall-clock limit is enforced here: a watchdog thread
//! cancels the search through the same handle callers use.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use armory_config::SearchConfig;
use armory_core::{ArmoryError, Catalog, Result};
use tokio::sync::oneshot;
use tracing::{debug, error, info};

use crate::cancel::CancellationHandle;
use crate::event::{ProgressSink, SearchEvent};
use crate::request::{SearchReport, SearchRequest};
use crate::solver::Solver;

struct RunningSearch {
    cancel: CancellationHandle,
    worker: JoinHandle<()>,
    watchdog: Option<JoinHandle<()>>,
}

impl RunningSearch {
    fn stop(self) {
        self.cancel.cancel();
        if self.worker.join().is_err() {
            error!(event = "worker_panicked");
        }
        if let Some(watchdog) = self.watchdog {
            let _ = watchdog.join();
        }
    }
}

/// Runs searches against one catalog, one at a time.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use armory_config::SearchConfig;
/// use armory_core::{Catalog, Category, DesiredAbilities, EquipmentPiece, Skill, SkillId};
/// use armory_search::{SearchManager, SearchRequest};
///
/// let catalog = Catalog::builder()
///     .skill(Skill::new(1, "Guard", 5))
///     .piece(EquipmentPiece::new(1, "Iron Helm", Category::Head).with_ability(SkillId(1), 1))
///     .build()
///     .unwrap();
/// let mut manager = SearchManager::new(Arc::new(catalog), SearchConfig::default());
///
/// let job = manager
///     .start(SearchRequest::new(DesiredAbilities::new().with(SkillId(1), 1)), None)
///     .unwrap();
/// let report = job.wait().unwrap();
/// assert_eq!(report.results.len(), 1);
/// ```
pub struct SearchManager {
    catalog: Arc<Catalog>,
    config: SearchConfig,
    current: Option<RunningSearch>,
}

impl std::fmt::Debug for SearchManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchManager")
            .field("config", &self.config)
            .field("searching", &self.is_searching())
            .finish()
    }
}

impl SearchManager {
    pub fn new(catalog: Arc<Catalog>, config: SearchConfig) -> Self {
        Self {
            catalog,
            config,
            current: None,
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Starts a search, superseding any search still running.
    ///
    /// The request and configuration are checked before anything is
    /// cancelled, so a rejected request leaves the running search alone.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for a rejected request or
    /// configuration, and `Internal` when the worker thread cannot start.
    pub fn start(
        &mut self,
        request: SearchRequest,
        sink: Option<Box<dyn ProgressSink>>,
    ) -> Result<SearchJob> {
        request.validate(&self.catalog)?;
        self.config.validate()?;

        if self.cancel_current() {
            debug!(event = "search_superseded");
        }

        let cancel = CancellationHandle::new();
        let (report_tx, report_rx) = oneshot::channel();
        let (done_tx, done_rx) = mpsc::channel::<()>();

        let catalog = Arc::clone(&self.catalog);
        let config = self.config.clone();
        let handle = cancel.clone();
        let worker = thread::Builder::new()
            .name("armory-search".into())
            .spawn(move || {
                let _done = done_tx;
                let outcome = Solver::new(&catalog, &request, &config).and_then(|solver| {
                    let mut solver = solver.with_cancellation(handle);
                    if let Some(mut sink) = sink {
                        solver = solver.with_progress(move |event: &SearchEvent| sink.on_event(event));
                    }
                    solver.run()
                });
                // The job may have been dropped; nobody is waiting then.
                let _ = report_tx.send(outcome);
            })
            .map_err(|e| ArmoryError::Internal(format!("cannot spawn search worker: {e}")))?;

        let watchdog = match self.config.time_limit() {
            Some(limit) => Some(spawn_watchdog(limit, done_rx, cancel.clone())?),
            None => None,
        };

        self.current = Some(RunningSearch {
            cancel: cancel.clone(),
            worker,
            watchdog,
        });

        Ok(SearchJob {
            cancel,
            report: report_rx,
        })
    }

    /// Cancels the running search and waits for its worker to exit.
    ///
    /// Returns false when no search was started since the last call.
    pub fn cancel_current(&mut self) -> bool {
        match self.current.take() {
            Some(running) => {
                running.stop();
                true
            }
            None => false,
        }
    }

    /// True while a worker is still running.
    pub fn is_searching(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|running| !running.worker.is_finished())
    }
}

impl Drop for SearchManager {
    fn drop(&mut self) {
        self.cancel_current();
    }
}

fn spawn_watchdog(
    limit: Duration,
    done: mpsc::Receiver<()>,
    cancel: CancellationHandle,
) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("armory-watchdog".into())
        .spawn(move || {
            if let Err(RecvTimeoutError::Timeout) = done.recv_timeout(limit) {
                info!(
                    event = "time_limit_reached",
                    limit_ms = limit.as_millis() as u64
                );
                cancel.cancel();
            }
        })
        .map_err(|e| ArmoryError::Internal(format!("cannot spawn watchdog: {e}")))
}

/// Handle to one started search.
#[derive(Debug)]
pub struct SearchJob {
    cancel: CancellationHandle,
    report: oneshot::Receiver<Result<SearchReport>>,
}

impl SearchJob {
    /// Requests cancellation. The report still arrives, marked cancelled.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_handle(&self) -> CancellationHandle {
        self.cancel.clone()
    }

    /// Blocks until the report arrives.
    ///
    /// Must not be called from within an async runtime; use
    /// [`join`](Self::join) there.
    ///
    /// # Errors
    ///
    /// Propagates the search error, or `Internal` if the worker died.
    pub fn wait(self) -> Result<SearchReport> {
        self.report.blocking_recv().map_err(lost_worker)?
    }

    /// Awaits the report.
    ///
    /// # Errors
    ///
    /// Propagates the search error, or `Internal` if the worker died.
    pub async fn join(self) -> Result<SearchReport> {
        self.report.await.map_err(lost_worker)?
    }
}

fn lost_worker(_: oneshot::error::RecvError) -> ArmoryError {
    ArmoryError::Internal("search worker exited without a report".into())
}
