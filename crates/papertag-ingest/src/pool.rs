//! Bounded worker pool for processing batches of documents.
//!
//! `num_workers` tasks pull [`DocJob`]s from a shared queue and run each
//! document on the blocking thread pool, since extraction shells out and
//! reads files. Results come back on each job's oneshot channel.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use papertag_core::{ExtractionResult, ProgressEvent, display_name};

use crate::DocumentProcessor;

/// Progress callback shared by every job of a batch.
pub type ProgressFn = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// One document submitted to the pool.
pub struct DocJob {
    pub path: PathBuf,
    pub max_keywords: usize,
    pub result_tx: oneshot::Sender<ExtractionResult>,
    pub index: usize,
    pub total: usize,
    pub progress: ProgressFn,
}

/// A pool of worker tasks sharing one [`DocumentProcessor`].
///
/// Submit jobs via [`submit()`](BatchPool::submit), receive results via
/// the oneshot receiver carried by each job.
pub struct BatchPool {
    job_tx: async_channel::Sender<DocJob>,
    pool_handle: JoinHandle<()>,
}

impl BatchPool {
    /// Create a pool with `num_workers` worker tasks (at least one).
    pub fn new(
        processor: Arc<DocumentProcessor>,
        cancel: CancellationToken,
        num_workers: usize,
    ) -> Self {
        let (job_tx, job_rx) = async_channel::unbounded::<DocJob>();

        let pool_handle = tokio::spawn(async move {
            let mut handles = Vec::with_capacity(num_workers.max(1));
            for _ in 0..num_workers.max(1) {
                handles.push(tokio::spawn(worker_loop(
                    job_rx.clone(),
                    processor.clone(),
                    cancel.clone(),
                )));
            }

            // Workers hold the remaining receivers
            drop(job_rx);

            for h in handles {
                let _ = h.await;
            }
        });

        Self {
            job_tx,
            pool_handle,
        }
    }

    /// Submit a job to the pool.
    pub async fn submit(&self, job: DocJob) {
        let _ = self.job_tx.send(job).await;
    }

    /// Close the queue and wait for every worker to finish.
    pub async fn shutdown(self) {
        self.job_tx.close();
        let _ = self.pool_handle.await;
    }
}

async fn worker_loop(
    job_rx: async_channel::Receiver<DocJob>,
    processor: Arc<DocumentProcessor>,
    cancel: CancellationToken,
) {
    while let Ok(job) = job_rx.recv().await {
        // After cancellation queued jobs are dropped unprocessed, which
        // closes their result channels.
        if cancel.is_cancelled() {
            continue;
        }

        let DocJob {
            path,
            max_keywords,
            result_tx,
            index,
            total,
            progress,
        } = job;

        progress(ProgressEvent::Started {
            index,
            total,
            path: path.clone(),
        });

        let file_name = display_name(&path);
        let worker = processor.clone();
        let result = match tokio::task::spawn_blocking(move || {
            worker.process_document(&path, max_keywords)
        })
        .await
        {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(file = %file_name, error = %e, "worker task failed");
                ExtractionResult::failure(file_name, format!("Internal error: {}", e))
            }
        };

        progress(ProgressEvent::Finished {
            index,
            total,
            result: Box::new(result.clone()),
        });
        let _ = result_tx.send(result);
    }
}

/// Process every document in `paths` with a temporary pool.
///
/// Results are returned in input order. A job dropped by cancellation
/// comes back as a failed result.
pub async fn process_batch(
    processor: Arc<DocumentProcessor>,
    paths: &[PathBuf],
    max_keywords: usize,
    num_workers: usize,
    cancel: CancellationToken,
    progress: ProgressFn,
) -> Vec<ExtractionResult> {
    let total = paths.len();
    tracing::debug!(total, num_workers, "starting batch");
    let pool = BatchPool::new(processor, cancel, num_workers);

    let mut receivers = Vec::with_capacity(total);
    for (index, path) in paths.iter().enumerate() {
        let (tx, rx) = oneshot::channel();
        pool.submit(DocJob {
            path: path.clone(),
            max_keywords,
            result_tx: tx,
            index,
            total,
            progress: progress.clone(),
        })
        .await;
        receivers.push(rx);
    }

    let mut results = Vec::with_capacity(total);
    for (rx, path) in receivers.into_iter().zip(paths) {
        results.push(rx.await.unwrap_or_else(|_| cancelled(path)));
    }

    pool.shutdown().await;
    results
}

fn cancelled(path: &Path) -> ExtractionResult {
    ExtractionResult::failure(display_name(path), "Cancelled")
}
