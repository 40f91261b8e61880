//! Linguistic annotation used by the NLP keyword strategy.
//!
//! Annotation comes from an external long-lived process speaking a
//! line-delimited JSON protocol: one `{"text": ...}` request per line on
//! stdin, one [`Annotation`] response per line on stdout.

use std::process::Stdio;
use std::sync::Mutex;
use std::time::Duration;

use papertag_core::subprocess;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

#[derive(Error, Debug)]
pub enum AnnotatorError {
    #[error("failed to start annotator `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },
    #[error("annotator IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("annotator protocol error: {0}")]
    Protocol(String),
    #[error("annotator did not answer within {0:?}")]
    Timeout(Duration),
    #[error("annotator model error: {0}")]
    Model(String),
}

/// A single token with its part-of-speech tag and lemma.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub lemma: String,
    /// Universal POS tag (`NOUN`, `PROPN`, `VERB`, ...).
    pub pos: String,
    #[serde(default)]
    pub is_stop: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NounChunk {
    pub text: String,
    pub token_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    /// OntoNotes label (`ORG`, `PRODUCT`, `GPE`, ...).
    pub label: String,
}

/// Annotation of one text blob.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(default)]
    pub tokens: Vec<Token>,
    #[serde(default)]
    pub noun_chunks: Vec<NounChunk>,
    #[serde(default)]
    pub entities: Vec<Entity>,
}

/// Capability to annotate text linguistically.
pub trait Annotator: Send + Sync {
    fn name(&self) -> &str;

    fn annotate(&self, text: &str) -> Result<Annotation, AnnotatorError>;
}

#[derive(Serialize)]
struct Request<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct Response {
    #[serde(flatten)]
    annotation: Annotation,
    #[serde(default)]
    error: Option<String>,
}

/// Running annotator process, killed when dropped.
struct Worker {
    // Held for kill-on-drop.
    _child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

/// [`Annotator`] backed by a reusable subprocess (e.g. the spaCy helper in
/// `scripts/annotate.py`).
///
/// The process is spawned once and serves every request; calls are
/// serialized through a mutex. If it dies or stops answering it is dropped
/// and respawned on the next call.
pub struct CommandAnnotator {
    argv: Vec<String>,
    timeout: Duration,
    worker: Mutex<Option<Worker>>,
}

impl std::fmt::Debug for CommandAnnotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandAnnotator")
            .field("argv", &self.argv)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl CommandAnnotator {
    /// Spawn the annotator and check it answers an empty request.
    ///
    /// An error here means the NLP capability is unavailable.
    pub fn spawn(argv: Vec<String>, timeout: Duration) -> Result<Self, AnnotatorError> {
        if argv.is_empty() {
            return Err(AnnotatorError::Protocol("empty annotator command".into()));
        }
        let annotator = Self {
            argv,
            timeout,
            worker: Mutex::new(None),
        };
        annotator.annotate("")?;
        Ok(annotator)
    }

    fn command_line(&self) -> String {
        self.argv.join(" ")
    }

    /// Must run inside the subprocess runtime.
    fn start(&self) -> Result<Worker, AnnotatorError> {
        let mut child = Command::new(&self.argv[0])
            .args(&self.argv[1..])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| AnnotatorError::Spawn {
                command: self.command_line(),
                source,
            })?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            return Err(AnnotatorError::Protocol("annotator pipes unavailable".into()));
        };

        tracing::debug!(command = %self.command_line(), "annotator started");
        Ok(Worker {
            _child: child,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }

    async fn call(&self, slot: &mut Option<Worker>, text: &str) -> Result<Annotation, AnnotatorError> {
        if slot.is_none() {
            *slot = Some(self.start()?);
        }
        let Some(worker) = slot.as_mut() else {
            return Err(AnnotatorError::Protocol("annotator not running".into()));
        };
        self.request(worker, text).await
    }

    async fn request(&self, worker: &mut Worker, text: &str) -> Result<Annotation, AnnotatorError> {
        let mut payload = serde_json::to_string(&Request { text })
            .map_err(|e| AnnotatorError::Protocol(e.to_string()))?;
        payload.push('\n');
        worker.stdin.write_all(payload.as_bytes()).await?;
        worker.stdin.flush().await?;

        let mut line = String::new();
        let read = tokio::time::timeout(self.timeout, worker.stdout.read_line(&mut line))
            .await
            .map_err(|_| AnnotatorError::Timeout(self.timeout))??;
        if read == 0 {
            return Err(AnnotatorError::Protocol("annotator exited".into()));
        }

        let response: Response = serde_json::from_str(line.trim_end())
            .map_err(|e| AnnotatorError::Protocol(format!("invalid response: {}", e)))?;
        match response.error {
            Some(message) => Err(AnnotatorError::Model(message)),
            None => Ok(response.annotation),
        }
    }
}

impl Annotator for CommandAnnotator {
    fn name(&self) -> &str {
        &self.argv[0]
    }

    fn annotate(&self, text: &str) -> Result<Annotation, AnnotatorError> {
        let mut slot = self.worker.lock().unwrap_or_else(|p| p.into_inner());
        let result = subprocess::block_on(self.call(&mut slot, text))?;

        // A model error is a per-request answer; anything else leaves the
        // stream in an unknown state, so drop the process.
        if let Err(e) = &result
            && !matches!(e, AnnotatorError::Model(_))
        {
            tracing::warn!(command = %self.command_line(), error = %e, "annotator failed, restarting on next call");
            *slot = None;
        }
        result
    }
}
