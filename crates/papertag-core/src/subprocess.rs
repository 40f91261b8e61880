//! Blocking bridge for the external tools (`pdftotext`, the annotator).
//!
//! Backends are synchronous and run on blocking threads, but child
//! processes are driven with `tokio::process` so that timeouts, pipe IO and
//! kill-on-drop come from the runtime. Every call goes through one lazily
//! built runtime that lives for the rest of the process, which keeps
//! long-lived children (the annotator) attached to a running reactor.

use std::future::Future;

use once_cell::sync::OnceCell;
use tokio::runtime::{Builder, Runtime};

static RUNTIME: OnceCell<Runtime> = OnceCell::new();

fn runtime() -> std::io::Result<&'static Runtime> {
    RUNTIME.get_or_try_init(|| {
        Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("papertag-subprocess")
            .enable_all()
            .build()
    })
}

/// Run `future` to completion on the subprocess runtime.
///
/// Must be called from synchronous code (a plain thread or a
/// `spawn_blocking` task), never from inside an async context.
pub fn block_on<F: Future>(future: F) -> std::io::Result<F::Output> {
    Ok(runtime()?.block_on(future))
}
