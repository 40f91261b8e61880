//! Integration tests for [`BatchPool`] and [`process_batch`].
//!
//! Documents are served by an in-memory backend keyed on file name, so no
//! PDF tooling is involved.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use papertag_core::{BackendError, ERR_NO_TEXT, PdfBackend};
use papertag_ingest::pool::{BatchPool, DocJob, process_batch};
use papertag_ingest::{DocumentProcessor, ExtractionMethod, ProgressEvent, TextExtractor};
use papertag_parsing::KeywordExtractor;
use tokio_util::sync::CancellationToken;

struct InMemory(HashMap<String, String>);

impl PdfBackend for InMemory {
    fn name(&self) -> &'static str {
        "in-memory"
    }

    fn extract_text(&self, path: &Path, _max_pages: usize) -> Result<String, BackendError> {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        self.0
            .get(name)
            .cloned()
            .ok_or_else(|| BackendError::OpenError(format!("no such document: {name}")))
    }
}

fn paper(topic: &str) -> String {
    format!("A Paper About {topic} Systems\n\nKeywords: {topic}; distributed systems; consensus; replication\n")
}

/// Processor whose backend knows `doc0.pdf` .. `doc{n-1}.pdf`.
fn processor(n: usize) -> Arc<DocumentProcessor> {
    let docs = (0..n)
        .map(|i| (format!("doc{i}.pdf"), paper(&format!("topic{i}"))))
        .collect();
    let backend: Box<dyn PdfBackend> = Box::new(InMemory(docs));
    Arc::new(DocumentProcessor::new(
        TextExtractor::new(vec![backend]),
        KeywordExtractor::new(),
        2,
    ))
}

fn paths(n: usize) -> Vec<PathBuf> {
    (0..n).map(|i| PathBuf::from(format!("doc{i}.pdf"))).collect()
}

#[tokio::test]
async fn single_job_completes() {
    let pool = BatchPool::new(processor(1), CancellationToken::new(), 2);

    let (tx, rx) = tokio::sync::oneshot::channel();
    pool.submit(DocJob {
        path: PathBuf::from("doc0.pdf"),
        max_keywords: 5,
        result_tx: tx,
        index: 0,
        total: 1,
        progress: Arc::new(|_| {}),
    })
    .await;

    let result = rx.await.expect("should receive result");
    assert_eq!(result.file_name(), "doc0.pdf");
    assert_eq!(result.method(), ExtractionMethod::KeywordsSection);
    assert_eq!(result.keywords()[0], "topic0");

    pool.shutdown().await;
}

#[tokio::test]
async fn batch_results_keep_input_order() {
    let total = 12;
    let results = process_batch(
        processor(total),
        &paths(total),
        3,
        4,
        CancellationToken::new(),
        Arc::new(|_| {}),
    )
    .await;

    assert_eq!(results.len(), total);
    for (i, r) in results.iter().enumerate() {
        assert_eq!(r.file_name(), format!("doc{i}.pdf"));
        assert_eq!(r.keywords().len(), 3);
        assert_eq!(r.keywords()[0], format!("topic{i}"));
    }
}

#[tokio::test]
async fn failures_are_results() {
    let mut batch = paths(2);
    batch.insert(1, PathBuf::from("unknown.pdf"));

    let results = process_batch(
        processor(2),
        &batch,
        5,
        2,
        CancellationToken::new(),
        Arc::new(|_| {}),
    )
    .await;

    assert_eq!(results.len(), 3);
    assert!(results[0].is_success());
    assert_eq!(results[1].file_name(), "unknown.pdf");
    assert_eq!(results[1].error(), Some(ERR_NO_TEXT));
    assert!(results[2].is_success());
}

#[tokio::test]
async fn progress_events_bracket_each_document() {
    let total = 5;
    let events: Arc<Mutex<Vec<(bool, usize)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();

    process_batch(
        processor(total),
        &paths(total),
        5,
        2,
        CancellationToken::new(),
        Arc::new(move |event| {
            let entry = match event {
                ProgressEvent::Started { index, total: t, .. } => {
                    assert_eq!(t, 5);
                    (true, index)
                }
                ProgressEvent::Finished { index, result, .. } => {
                    assert!(result.is_success());
                    (false, index)
                }
            };
            sink.lock().unwrap().push(entry);
        }),
    )
    .await;

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 2 * total);
    for i in 0..total {
        let started = events.iter().position(|e| *e == (true, i)).unwrap();
        let finished = events.iter().position(|e| *e == (false, i)).unwrap();
        assert!(started < finished);
    }
}

#[tokio::test]
async fn cancelled_batch_still_returns_every_result() {
    let cancel = CancellationToken::new();
    cancel.cancel();

    let total = 4;
    let results = process_batch(
        processor(total),
        &paths(total),
        5,
        2,
        cancel,
        Arc::new(|_| {}),
    )
    .await;

    assert_eq!(results.len(), total);
    for (i, r) in results.iter().enumerate() {
        assert_eq!(r.file_name(), format!("doc{i}.pdf"));
        assert!(!r.is_success());
        assert_eq!(r.error(), Some("Cancelled"));
    }
}

#[tokio::test]
async fn zero_workers_still_processes() {
    let results = process_batch(
        processor(3),
        &paths(3),
        5,
        0,
        CancellationToken::new(),
        Arc::new(|_| {}),
    )
    .await;
    assert!(results.iter().all(|r| r.is_success()));
}

#[tokio::test]
async fn shutdown_with_no_jobs_returns() {
    let pool = BatchPool::new(processor(0), CancellationToken::new(), 3);
    pool.shutdown().await;
}
