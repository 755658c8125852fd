//! Async API for resolving on render events.
//!
//! Enable the `async` feature to use these APIs:
//!
//! ```toml
//! [dependencies]
//! citeanchor = { version = "0.1", features = ["async"] }
//! ```
//!
//! Fragment geometry is only trustworthy once layout has settled, so the
//! [`DebouncedResolver`] waits a short delay before reading it. Rapid
//! re-triggers (page navigation, zoom, citation changes) supersede each
//! other: only the newest submission produces a result.

use crate::error::{Error, Result};
use crate::model::{ResolutionRequest, ResolutionResult};
use crate::resolve::Resolver;
use crate::resolve_options::ResolveOptions;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Default settle delay before fragment geometry is read.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Resolves a request on a blocking worker.
pub async fn resolve(
    request: ResolutionRequest,
    options: ResolveOptions,
) -> Result<ResolutionResult> {
    let resolver = Resolver::new().with_options(options);
    tokio::task::spawn_blocking(move || resolver.resolve(&request))
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))
}

/// Debounced, superseding resolver.
///
/// Clones share the same submission counter, so a submission through any
/// clone supersedes pending ones on the others.
///
/// # Example
///
/// ```no_run
/// # async fn example(request: citeanchor::ResolutionRequest) -> citeanchor::Result<()> {
/// use citeanchor::async_api::DebouncedResolver;
///
/// let scheduler = DebouncedResolver::new();
/// if let Some(result) = scheduler.submit(request).await? {
///     println!("scroll to {:?}", result.scroll_target);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DebouncedResolver {
    resolver: Arc<Resolver>,
    settle: Duration,
    generation: Arc<AtomicU64>,
}

impl Default for DebouncedResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl DebouncedResolver {
    /// Creates a scheduler with default options and settle delay.
    pub fn new() -> Self {
        Self {
            resolver: Arc::new(Resolver::new()),
            settle: DEFAULT_SETTLE_DELAY,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Sets the settle delay.
    pub fn with_settle_delay(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Uses the given resolver.
    pub fn with_resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    /// Settle delay in use.
    pub fn settle_delay(&self) -> Duration {
        self.settle
    }

    /// Waits for layout to settle, then resolves `request`.
    ///
    /// Returns `Ok(None)` if a newer submission arrived in the meantime;
    /// the superseded result is discarded, never cancelled mid-run.
    pub async fn submit(&self, request: ResolutionRequest) -> Result<Option<ResolutionResult>> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.settle).await;
        if self.is_superseded(ticket) {
            tracing::debug!(ticket, "submission superseded before resolving");
            return Ok(None);
        }

        let resolver = Arc::clone(&self.resolver);
        let result = tokio::task::spawn_blocking(move || resolver.resolve(&request))
            .await
            .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))?;

        if self.is_superseded(ticket) {
            tracing::debug!(ticket, "result discarded, newer submission pending");
            return Ok(None);
        }
        Ok(Some(result))
    }

    fn is_superseded(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != ticket
    }
}
