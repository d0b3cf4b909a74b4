//! Asynchronous classification jobs: submit now, poll for the result later.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::sync::{watch, Semaphore};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::error::Result;
use crate::extract::is_supported_extension;
use crate::service::ClassificationService;

/// Identifier handed out by [`JobQueue::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// State of a submitted job.
///
/// A classification that ended in an error message is still `Success`:
/// the message is the job's result. `Failed` means the worker itself died.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "result", rename_all = "snake_case")]
pub enum JobStatus {
    Processing,
    Success(String),
    Failed(String),
}

impl JobStatus {
    pub fn is_finished(&self) -> bool {
        !matches!(self, Self::Processing)
    }
}

/// Bounded pool of classification workers.
pub struct JobQueue {
    service: Arc<ClassificationService>,
    permits: Arc<Semaphore>,
    jobs: RwLock<HashMap<JobId, watch::Receiver<JobStatus>>>,
    runtime: Handle,
}

impl JobQueue {
    /// Queue running at most `workers` classifications at once on `runtime`.
    pub fn new(service: Arc<ClassificationService>, workers: usize, runtime: Handle) -> Self {
        let workers = workers.max(1);
        debug!("Job queue with {} workers", workers);
        Self {
            service,
            permits: Arc::new(Semaphore::new(workers)),
            jobs: RwLock::new(HashMap::new()),
            runtime,
        }
    }

    /// Queue a file for classification.
    pub fn submit(&self, bytes: Vec<u8>, filename: impl Into<String>) -> JobId {
        let id = JobId::new();
        let filename = filename.into();
        let (tx, rx) = watch::channel(JobStatus::Processing);
        self.jobs.write().insert(id, rx);

        let permits = Arc::clone(&self.permits);
        let service = Arc::clone(&self.service);
        self.runtime.spawn(async move {
            let status = match permits.acquire_owned().await {
                Ok(_permit) => {
                    debug!("Job {} started: {}", id, filename);
                    match tokio::task::spawn_blocking(move || service.classify(&bytes, &filename))
                        .await
                    {
                        Ok(result) => JobStatus::Success(result),
                        Err(e) => {
                            error!("Job {} worker failed: {}", id, e);
                            JobStatus::Failed(e.to_string())
                        }
                    }
                }
                Err(_) => JobStatus::Failed("job queue closed".to_string()),
            };
            debug!("Job {} finished: {:?}", id, status);
            tx.send_replace(status);
        });

        id
    }

    /// Queue every supported file directly inside `folder`, in name order.
    pub fn submit_folder(&self, folder: &Path) -> Result<Vec<(PathBuf, JobId)>> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(folder)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(is_supported_extension)
            })
            .collect();
        paths.sort();

        let mut submitted = Vec::with_capacity(paths.len());
        for path in paths {
            let bytes = std::fs::read(&path)?;
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let id = self.submit(bytes, filename);
            submitted.push((path, id));
        }

        info!("Submitted {} files from {}", submitted.len(), folder.display());
        Ok(submitted)
    }

    /// Current status, or `None` for an unknown id.
    pub fn poll(&self, id: JobId) -> Option<JobStatus> {
        self.jobs.read().get(&id).map(|rx| rx.borrow().clone())
    }

    /// Wait until the job finishes, or `None` for an unknown id.
    pub async fn wait(&self, id: JobId) -> Option<JobStatus> {
        let mut rx = self.jobs.read().get(&id)?.clone();
        let status = match rx.wait_for(JobStatus::is_finished).await {
            Ok(status) => status.clone(),
            Err(_) => JobStatus::Failed("job was dropped before completing".to_string()),
        };
        Some(status)
    }

    /// Remove a finished job and return its final status.
    ///
    /// A job still processing is left in place and reported as
    /// `Processing`; an unknown id gives `None`.
    pub fn take(&self, id: JobId) -> Option<JobStatus> {
        let mut jobs = self.jobs.write();
        let status = jobs.get(&id)?.borrow().clone();
        if status.is_finished() {
            jobs.remove(&id);
            debug!("Job {} removed", id);
        }
        Some(status)
    }

    /// Number of jobs tracked, finished ones included until taken.
    pub fn len(&self) -> usize {
        self.jobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.read().is_empty()
    }
}
