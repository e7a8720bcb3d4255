//! In-process render service.
//!
//! A stand-in renderer that fulfills the [`RenderService`] contract
//! without an external process: it writes the render description to
//! disk as the artifact and reports progress in fixed stages. Used by
//! the CLI's local render path and by orchestrator tests; the staged
//! answers mirror how a remote renderer trickles progress.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::info;

use crate::error::{RenderError, RenderResult};
use crate::job::JobId;
use crate::service::{RenderProgress, RenderRequest, RenderService};

/// Progress values reported by successive polls before `Done`.
const PROGRESS_STAGES: [f64; 3] = [0.2, 0.6, 1.0];

#[derive(Debug)]
struct LocalJob {
    artifact: PathBuf,
    size: u64,
    polls_answered: usize,
    /// Remaining polls to answer with a miss, emulating the eventual
    /// consistency of a renderer that lags its own submission ack.
    misses_left: u32,
    cancelled: bool,
}

pub struct LocalRenderService {
    out_dir: PathBuf,
    jobs: Mutex<HashMap<JobId, LocalJob>>,
    next_id: AtomicU64,
    ack_misses: u32,
    artifact_size: Option<u64>,
}

impl LocalRenderService {
    pub fn new(out_dir: impl AsRef<Path>) -> Self {
        Self {
            out_dir: out_dir.as_ref().to_path_buf(),
            jobs: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            ack_misses: 0,
            artifact_size: None,
        }
    }

    /// Answer the first `misses` polls of each job with a not-found.
    pub fn with_ack_misses(mut self, misses: u32) -> Self {
        self.ack_misses = misses;
        self
    }

    /// Pad or truncate the artifact to an exact byte size.
    pub fn with_artifact_size(mut self, size: u64) -> Self {
        self.artifact_size = Some(size);
        self
    }
}

#[async_trait]
impl RenderService for LocalRenderService {
    async fn submit(&self, request: RenderRequest) -> RenderResult<JobId> {
        let id = format!("local-{:04}", self.next_id.fetch_add(1, Ordering::Relaxed));

        std::fs::create_dir_all(&self.out_dir)?;
        let artifact = self.out_dir.join(format!("{id}.json"));
        let mut bytes = serde_json::to_vec_pretty(&request)?;
        if let Some(size) = self.artifact_size {
            bytes.resize(size as usize, b' ');
        }
        std::fs::write(&artifact, &bytes)?;

        info!(job = %id, artifact = %artifact.display(), "local render written");
        let mut jobs = self.jobs.lock().expect("local job table poisoned");
        jobs.insert(
            id.clone(),
            LocalJob {
                artifact,
                size: bytes.len() as u64,
                polls_answered: 0,
                misses_left: self.ack_misses,
                cancelled: false,
            },
        );
        Ok(id)
    }

    async fn poll(&self, job_id: &str) -> RenderResult<RenderProgress> {
        let mut jobs = self.jobs.lock().expect("local job table poisoned");
        let job = jobs
            .get_mut(job_id)
            .ok_or_else(|| RenderError::JobNotFound(job_id.to_string()))?;

        if job.misses_left > 0 {
            job.misses_left -= 1;
            return Err(RenderError::JobNotFound(job_id.to_string()));
        }
        if job.cancelled {
            return Err(RenderError::JobNotFound(job_id.to_string()));
        }

        let answer = match PROGRESS_STAGES.get(job.polls_answered) {
            Some(&progress) => RenderProgress::Progress { progress },
            None => RenderProgress::Done {
                url: job.artifact.to_string_lossy().into_owned(),
                size: job.size,
            },
        };
        job.polls_answered += 1;
        Ok(answer)
    }

    async fn cancel(&self, job_id: &str) -> RenderResult<()> {
        let mut jobs = self.jobs.lock().expect("local job table poisoned");
        if let Some(job) = jobs.get_mut(job_id) {
            job.cancelled = true;
        }
        // Unknown ids are fine: cancellation is idempotent.
        Ok(())
    }
}
