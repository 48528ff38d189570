//! Job processing service for background tasks.
//!
//! A bounded in-memory queue drained by a small pool of workers. Push
//! delivery and the account purge sweep run here so request handlers never
//! wait on them.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::services::push_notification::{PushMessage, PushSender};
use crate::services::user::UserService;

/// Maximum number of concurrent job workers.
const MAX_WORKERS: usize = 4;

/// Channel buffer size for jobs.
const JOB_BUFFER_SIZE: usize = 1000;

/// Job types that can be processed.
#[derive(Debug, Clone)]
pub enum Job {
    /// Deliver a push notification.
    Push(PushMessage),
    /// Run a maintenance task.
    Cleanup { task: CleanupTask },
}

/// Cleanup task types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupTask {
    /// Hard-delete accounts past the deletion retention window.
    PurgeDeletedAccounts,
}

/// Job sender for enqueueing jobs.
#[derive(Clone)]
pub struct JobSender {
    sender: mpsc::Sender<Job>,
}

impl JobSender {
    /// Enqueue a job, waiting for queue capacity.
    pub async fn enqueue(&self, job: Job) -> Result<(), &'static str> {
        self.sender.send(job).await.map_err(|_| "Job queue is closed")
    }

    /// Enqueue a job without waiting. Fails when the queue is full.
    pub fn try_enqueue(&self, job: Job) -> Result<(), &'static str> {
        self.sender.try_send(job).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => "Job queue is full",
            mpsc::error::TrySendError::Closed(_) => "Job queue is closed",
        })
    }

    /// Enqueue a cleanup job.
    pub async fn cleanup(&self, task: CleanupTask) -> Result<(), &'static str> {
        self.enqueue(Job::Cleanup { task }).await
    }
}

/// Job worker context containing services needed for job processing.
#[derive(Clone)]
pub struct JobWorkerContext {
    pub push_sender: Arc<dyn PushSender>,
    pub user_service: Option<UserService>,
    /// Days a soft-deleted account is kept before purge.
    pub retention_days: i64,
}

/// Job processing service.
pub struct JobService {
    sender: mpsc::Sender<Job>,
    receiver: mpsc::Receiver<Job>,
}

impl JobService {
    /// Create a new job service.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(JOB_BUFFER_SIZE)
    }

    /// Create a job service with a custom queue size.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        Self { sender, receiver }
    }

    /// Get a job sender for enqueueing jobs.
    #[must_use]
    pub fn sender(&self) -> JobSender {
        JobSender {
            sender: self.sender.clone(),
        }
    }

    /// Start the job processor with the given context.
    /// This consumes the receiver and spawns worker tasks.
    pub fn start(self, context: JobWorkerContext) -> JoinHandle<()> {
        let Self { sender, receiver } = self;
        drop(sender);
        let context = Arc::new(context);

        tokio::spawn(async move {
            info!("Job worker starting with {} workers", MAX_WORKERS);
            run_job_processor(receiver, context).await;
            info!("Job worker stopped");
        })
    }
}

impl Default for JobService {
    fn default() -> Self {
        Self::new()
    }
}

/// Enqueue the purge sweep every `period`, starting after one period.
pub fn spawn_purge_scheduler(sender: JobSender, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let start = tokio::time::Instant::now() + period;
        let mut interval = tokio::time::interval_at(start, period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            if let Err(e) = sender.cleanup(CleanupTask::PurgeDeletedAccounts).await {
                warn!(error = %e, "Stopping purge scheduler");
                break;
            }
        }
    })
}

/// Run the job processor.
async fn run_job_processor(mut receiver: mpsc::Receiver<Job>, context: Arc<JobWorkerContext>) {
    // Use a semaphore to limit concurrent workers
    let semaphore = Arc::new(Semaphore::new(MAX_WORKERS));

    while let Some(job) = receiver.recv().await {
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };
        let ctx = context.clone();

        tokio::spawn(async move {
            let _permit = permit;
            process_job(job, &ctx).await;
        });
    }
}

/// Process a single job.
async fn process_job(job: Job, context: &JobWorkerContext) {
    match job {
        Job::Push(message) => process_push(context, &message).await,
        Job::Cleanup { task } => process_cleanup(context, task).await,
    }
}

/// Process a push notification job. Failures are logged and dropped.
async fn process_push(context: &JobWorkerContext, message: &PushMessage) {
    if let Err(e) = context.push_sender.send(message).await {
        warn!(title = %message.title, error = %e, "Failed to deliver push notification");
    }
}

/// Process a cleanup job.
async fn process_cleanup(context: &JobWorkerContext, task: CleanupTask) {
    match task {
        CleanupTask::PurgeDeletedAccounts => {
            let Some(ref user_service) = context.user_service else {
                debug!("User service not available, skipping account purge");
                return;
            };

            match user_service
                .purge_deleted_accounts(Utc::now(), context.retention_days)
                .await
            {
                Ok(count) => debug!(purged = count, "Account purge finished"),
                Err(e) => error!(error = %e, "Account purge failed"),
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sangam_common::AppResult;
    use std::collections::BTreeMap;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<PushMessage>>,
    }

    #[async_trait]
    impl PushSender for RecordingSender {
        async fn send(&self, message: &PushMessage) -> AppResult<()> {
            self.sent.lock().await.push(message.clone());
            Ok(())
        }
    }

    fn push_job(title: &str) -> Job {
        Job::Push(PushMessage {
            token: "tok".to_string(),
            title: title.to_string(),
            body: "body".to_string(),
            data: BTreeMap::new(),
        })
    }

    #[tokio::test]
    async fn test_push_job_reaches_sender() {
        let recorder = Arc::new(RecordingSender::default());
        let service = JobService::new();
        let sender = service.sender();

        service.start(JobWorkerContext {
            push_sender: recorder.clone(),
            user_service: None,
            retention_days: 30,
        });

        sender.enqueue(push_job("hello")).await.unwrap();

        for _ in 0..50 {
            if !recorder.sent.lock().await.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let sent = recorder.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].title, "hello");
    }

    #[tokio::test]
    async fn test_try_enqueue_reports_full_queue() {
        let service = JobService::with_capacity(1);
        let sender = service.sender();

        assert!(sender.try_enqueue(push_job("first")).is_ok());
        assert_eq!(sender.try_enqueue(push_job("second")), Err("Job queue is full"));
    }

    #[tokio::test]
    async fn test_cleanup_without_user_service_is_skipped() {
        let service = JobService::new();
        let sender = service.sender();

        service.start(JobWorkerContext {
            push_sender: Arc::new(RecordingSender::default()),
            user_service: None,
            retention_days: 30,
        });

        assert!(sender.cleanup(CleanupTask::PurgeDeletedAccounts).await.is_ok());
    }
}
