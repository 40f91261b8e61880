use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

use papertag_core::{BackendError, PdfBackend, subprocess};

/// Primary text backend: the poppler `pdftotext` tool in layout mode.
///
/// One invocation per document, bounded by `timeout`. A child that runs
/// past the deadline is killed and reaped before returning.
#[derive(Debug, Clone)]
pub struct PdftotextBackend {
    program: PathBuf,
    timeout: Duration,
}

impl PdftotextBackend {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    async fn run(&self, path: &Path, max_pages: usize) -> Result<String, BackendError> {
        let last_page = max_pages.max(1).to_string();
        let mut child = Command::new(&self.program)
            .args(["-layout", "-f", "1", "-l", &last_page])
            .arg(path)
            .arg("-")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => BackendError::ToolMissing(self.program.display().to_string()),
                _ => BackendError::Io(e),
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let collect = async {
            tokio::try_join!(read_all(stdout), read_all(stderr), child.wait())
        };
        let outcome = tokio::time::timeout(self.timeout, collect).await;

        let (out, err, status) = match outcome {
            Ok(collected) => collected?,
            Err(_) => {
                // kill() also waits for the child
                let _ = child.kill().await;
                tracing::debug!(path = %path.display(), timeout = ?self.timeout, "pdftotext killed");
                return Err(BackendError::Timeout(self.timeout));
            }
        };

        if !status.success() {
            let detail = String::from_utf8_lossy(&err).trim().to_string();
            return Err(BackendError::ToolFailed(if detail.is_empty() {
                status.to_string()
            } else {
                format!("{}: {}", status, detail)
            }));
        }

        let text = String::from_utf8_lossy(&out).into_owned();
        if text.trim().is_empty() {
            return Err(BackendError::EmptyOutput);
        }
        Ok(text)
    }
}

async fn read_all<R: AsyncRead + Unpin>(pipe: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

impl PdfBackend for PdftotextBackend {
    fn name(&self) -> &'static str {
        "pdftotext"
    }

    fn extract_text(&self, path: &Path, max_pages: usize) -> Result<String, BackendError> {
        subprocess::block_on(self.run(path, max_pages))?
    }
}
