//! Deferred build work and the daily flush cycle.
//!
//! Mutations to a pack enqueue their materialization work here instead
//! of rebuilding immediately; the daemon flushes the queue once per day
//! at a configured local time, then commits and pushes every
//! version-controlled pack. A flush can also be forced, which the CLI
//! uses for one-shot builds.
//!
//! Queued tasks run concurrently under a semaphore so a large queue
//! cannot saturate the blob store or the filesystem.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDateTime, NaiveTime};
use futures::future::join_all;
use parking_lot::Mutex;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::builder::BuildMaterializer;
use crate::publish::GitPublisher;
use crate::store::{BoxFuture, PackStore};

/// Default local time of the daily flush.
pub const DEFAULT_FLUSH_AT: NaiveTime = match NaiveTime::from_hms_opt(4, 0, 0) {
    Some(t) => t,
    None => unreachable!(),
};

/// Default number of tasks running at once during a flush.
pub const DEFAULT_MAX_CONCURRENCY: usize = 5;

/// A unit of deferred build work.
///
/// Tasks are consumed when they run and must absorb their own failures;
/// the scheduler retries nothing.
pub trait ScheduledTask: Send {
    /// Short task label for logging.
    fn name(&self) -> &str;

    /// Runs the task to completion.
    fn run(self: Box<Self>) -> BoxFuture<'static, ()>;
}

/// A [`ScheduledTask`] built from a closure.
pub struct TaskFn<F> {
    name: String,
    f: F,
}

impl<F, Fut> TaskFn<F>
where
    F: FnOnce() -> Fut + Send,
    Fut: Future<Output = ()> + Send + 'static,
{
    /// Wraps a closure as a named task.
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F, Fut> ScheduledTask for TaskFn<F>
where
    F: FnOnce() -> Fut + Send,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(self: Box<Self>) -> BoxFuture<'static, ()> {
        Box::pin((self.f)())
    }
}

/// Time until the next occurrence of `flush_at`, today or tomorrow.
pub fn delay_until_next(now: NaiveDateTime, flush_at: NaiveTime) -> Duration {
    let today = now.date().and_time(flush_at);
    let next = if today > now {
        today
    } else {
        today + chrono::Duration::days(1)
    };
    (next - now).to_std().unwrap_or(Duration::ZERO)
}

/// First-cycle wait: zero when today's flush time has already passed, so
/// a daemon started late still flushes on its start day.
pub fn initial_delay(now: NaiveDateTime, flush_at: NaiveTime) -> Duration {
    if now.time() >= flush_at {
        Duration::ZERO
    } else {
        delay_until_next(now, flush_at)
    }
}

/// Accumulates build tasks and flushes them on a daily cycle.
pub struct Scheduler {
    pending: Mutex<Vec<Box<dyn ScheduledTask>>>,
    publisher: Arc<GitPublisher>,
    packs: Arc<dyn PackStore>,
    materializer: Option<Arc<BuildMaterializer>>,
    flush_at: NaiveTime,
    max_concurrency: usize,
}

impl Scheduler {
    /// Create a scheduler flushing at [`DEFAULT_FLUSH_AT`].
    pub fn new(publisher: Arc<GitPublisher>, packs: Arc<dyn PackStore>) -> Self {
        Self {
            pending: Mutex::new(Vec::new()),
            publisher,
            packs,
            materializer: None,
            flush_at: DEFAULT_FLUSH_AT,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// Rebuild every known pack at the start of each daemon cycle.
    pub fn with_materializer(mut self, materializer: Arc<BuildMaterializer>) -> Self {
        self.materializer = Some(materializer);
        self
    }

    /// Override the daily flush time.
    pub fn with_flush_at(mut self, flush_at: NaiveTime) -> Self {
        self.flush_at = flush_at;
        self
    }

    /// Override the per-flush concurrency bound.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Queue a task for the next flush.
    pub fn enqueue(&self, task: Box<dyn ScheduledTask>) {
        debug!(task = %task.name(), "task queued");
        self.pending.lock().push(task);
    }

    /// Number of tasks waiting for the next flush.
    pub fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Runs every pending task, then commits and pushes all
    /// version-controlled packs.
    ///
    /// Tasks queued while a flush is running land in the next cycle.
    pub async fn flush(&self) {
        let tasks = std::mem::take(&mut *self.pending.lock());
        if !tasks.is_empty() {
            info!(tasks = tasks.len(), "flushing scheduled tasks");
            let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
            let runs = tasks.into_iter().map(|task| {
                let semaphore = Arc::clone(&semaphore);
                async move {
                    let _permit = semaphore.acquire_owned().await.ok();
                    let name = task.name().to_string();
                    debug!(task = %name, "task started");
                    task.run().await;
                    debug!(task = %name, "task finished");
                }
            });
            join_all(runs).await;
        }
        self.publish_all().await;
    }

    /// Queue one rebuild task per stored pack. No-op when the scheduler
    /// was built without a materializer.
    async fn seed_rebuilds(&self) {
        let Some(materializer) = self.materializer.as_ref() else {
            return;
        };
        let packs = match self.packs.packs().await {
            Ok(packs) => packs,
            Err(e) => {
                warn!(error = %e, "could not enumerate packs for rebuild");
                return;
            }
        };
        for pack in packs {
            let materializer = Arc::clone(materializer);
            let name = format!("build-{}", pack.name);
            self.enqueue(Box::new(TaskFn::new(name, move || async move {
                if let Err(e) = materializer.build_pack(&pack).await {
                    warn!(pack = %pack.name, error = %e, "scheduled build failed");
                }
            })));
        }
    }

    async fn publish_all(&self) {
        match self.packs.packs().await {
            Ok(packs) => {
                for pack in &packs {
                    self.publisher.commit_pack(pack).await;
                }
            }
            Err(e) => warn!(error = %e, "could not enumerate packs for publishing"),
        }
    }

    /// The daemon loop: sleeps until the next flush time, queues one
    /// rebuild per pack, flushes, repeats. A daemon started after
    /// today's flush time flushes immediately. Returns when the token
    /// is cancelled.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(flush_at = %self.flush_at, "scheduler started");
        let mut first = true;
        loop {
            let now = Local::now().naive_local();
            let delay = if first {
                initial_delay(now, self.flush_at)
            } else {
                delay_until_next(now, self.flush_at)
            };
            first = false;
            debug!(seconds = delay.as_secs(), "next flush scheduled");
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("scheduler stopping");
                    break;
                }
                _ = tokio::time::sleep(delay) => {
                    self.seed_rebuilds().await;
                    self.flush().await;
                }
            }
        }
    }
}
