//! Query embeddings from an external service.
//!
//! Embedding retrieval is best-effort: any failure or timeout disables the
//! embedding signal for that request and the ranker falls back to lexical
//! matching.
//!
//! # Runtime behaviour
//!
//! [`QueryEmbedder`] is asynchronous so implementations can await network
//! calls. [`EmbeddingClient`] bridges it to the synchronous ranker by
//! blocking on a Tokio runtime it owns. A fetch that outlives its timeout is
//! dropped at its next await point, so no work continues in the background.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

/// Default upper bound on one embedding request.
pub const DEFAULT_EMBEDDING_TIMEOUT: Duration = Duration::from_secs(2);

/// Errors raised by a [`QueryEmbedder`] or while preparing an
/// [`EmbeddingClient`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmbeddingError {
    /// The embedding service could not be reached.
    #[error("embedding service unavailable: {0}")]
    Unavailable(String),
    /// The service returned an empty vector.
    #[error("embedding service returned an empty vector")]
    Empty,
    /// The service returned NaN or infinite components.
    #[error("embedding contains non-finite components")]
    NonFinite,
    /// The Tokio runtime driving requests could not be built.
    #[error("failed to build embedding runtime: {0}")]
    Runtime(String),
}

/// Turns request text into a fixed-dimension vector.
#[async_trait]
pub trait QueryEmbedder: Send + Sync {
    /// Embed `text`.
    ///
    /// # Errors
    /// Returns [`EmbeddingError`] when the vector cannot be produced.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// Embed `text`, giving up after `timeout`.
///
/// Returns `None` when the embedder fails, returns an unusable vector or does
/// not answer in time. On timeout the embedder's future is dropped, which
/// cancels it.
pub async fn fetch_query_embedding(
    embedder: &dyn QueryEmbedder,
    text: &str,
    timeout: Duration,
) -> Option<Vec<f32>> {
    match tokio::time::timeout(timeout, embedder.embed(text)).await {
        Ok(Ok(vector)) => match check_vector(vector) {
            Ok(checked) => Some(checked),
            Err(err) => {
                log::warn!("query embedding rejected: {err}");
                None
            }
        },
        Ok(Err(err)) => {
            log::warn!("query embedding failed: {err}");
            None
        }
        Err(_) => {
            log::warn!("query embedding timed out after {timeout:?}; using lexical matching");
            None
        }
    }
}

/// Synchronous handle on a [`QueryEmbedder`] with a fixed timeout.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use async_trait::async_trait;
/// use helgo_core::{EmbeddingClient, EmbeddingError, QueryEmbedder};
///
/// struct Constant;
///
/// #[async_trait]
/// impl QueryEmbedder for Constant {
///     async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
///         Ok(vec![1.0, 0.0])
///     }
/// }
///
/// let client = EmbeddingClient::new(Arc::new(Constant), Duration::from_secs(1))?;
/// assert_eq!(client.embed_blocking("cozy cafe"), Some(vec![1.0, 0.0]));
/// # Ok::<(), EmbeddingError>(())
/// ```
pub struct EmbeddingClient {
    embedder: Arc<dyn QueryEmbedder>,
    timeout: Duration,
    runtime: Runtime,
}

impl std::fmt::Debug for EmbeddingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingClient")
            .field("timeout", &self.timeout)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish_non_exhaustive()
    }
}

impl EmbeddingClient {
    /// Wrap `embedder`, bounding every request by `timeout`.
    ///
    /// # Errors
    /// Returns [`EmbeddingError::Runtime`] when the Tokio runtime fails to
    /// build.
    pub fn new(embedder: Arc<dyn QueryEmbedder>, timeout: Duration) -> Result<Self, EmbeddingError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| EmbeddingError::Runtime(err.to_string()))?;
        Ok(Self {
            embedder,
            timeout,
            runtime,
        })
    }

    /// Request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Embed `text`, blocking the caller until the vector arrives or the
    /// timeout elapses.
    ///
    /// Inside a multi-threaded Tokio runtime the caller's runtime drives the
    /// request; otherwise the client's own runtime does.
    #[must_use]
    pub fn embed_blocking(&self, text: &str) -> Option<Vec<f32>> {
        let future = fetch_query_embedding(self.embedder.as_ref(), text, self.timeout);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}

fn check_vector(vector: Vec<f32>) -> Result<Vec<f32>, EmbeddingError> {
    if vector.is_empty() {
        return Err(EmbeddingError::Empty);
    }
    if vector.iter().any(|component| !component.is_finite()) {
        return Err(EmbeddingError::NonFinite);
    }
    Ok(vector)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    use rstest::rstest;

    struct Scripted {
        delay: Duration,
        result: Result<Vec<f32>, EmbeddingError>,
        finished: Arc<AtomicBool>,
    }

    #[async_trait]
    impl QueryEmbedder for Scripted {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            tokio::time::sleep(self.delay).await;
            self.finished.store(true, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn client(
        delay_ms: u64,
        result: Result<Vec<f32>, EmbeddingError>,
    ) -> (EmbeddingClient, Arc<AtomicBool>) {
        let finished = Arc::new(AtomicBool::new(false));
        let embedder = Arc::new(Scripted {
            delay: Duration::from_millis(delay_ms),
            result,
            finished: Arc::clone(&finished),
        });
        let built = EmbeddingClient::new(embedder, Duration::from_millis(50))
            .expect("runtime should build");
        (built, finished)
    }

    #[rstest]
    fn returns_vector_within_timeout() {
        let (embedding, _) = client(0, Ok(vec![0.5, 0.5]));
        assert_eq!(embedding.embed_blocking("rainy afternoon"), Some(vec![0.5, 0.5]));
    }

    #[rstest]
    fn timed_out_requests_are_cancelled() {
        let (embedding, finished) = client(300, Ok(vec![0.5, 0.5]));
        assert_eq!(embedding.embed_blocking("rainy afternoon"), None);
        thread::sleep(Duration::from_millis(450));
        assert!(
            !finished.load(Ordering::SeqCst),
            "the embedder kept running after the timeout"
        );
    }

    #[rstest]
    #[case(Err(EmbeddingError::Unavailable("503".into())))]
    #[case(Ok(Vec::new()))]
    #[case(Ok(vec![f32::NAN, 1.0]))]
    fn failures_disable_the_signal(#[case] result: Result<Vec<f32>, EmbeddingError>) {
        let (embedding, _) = client(0, result);
        assert_eq!(embedding.embed_blocking("rainy afternoon"), None);
    }

    #[rstest]
    fn multi_threaded_callers_drive_the_request() {
        let (built, _) = client(0, Ok(vec![1.0]));
        // The client's own runtime must not be dropped inside the async task.
        let embedding = Arc::new(built);
        let shared = Arc::clone(&embedding);
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("runtime should build");
        let vector = runtime.block_on(async {
            tokio::task::spawn(async move { shared.embed_blocking("hello") })
                .await
                .expect("task should join")
        });
        drop(runtime);
        drop(embedding);
        assert_eq!(vector, Some(vec![1.0]));
    }
}
