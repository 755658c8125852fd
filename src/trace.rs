//! Optional observability hook.
//!
//! Every event is logged through `tracing`; a [`TraceHook`] additionally
//! forwards events to a caller-supplied callback, e.g. to surface candidate
//! counts in a debugging panel.

use crate::model::MatchStage;
use std::fmt;
use std::sync::Arc;

/// Something worth knowing about a resolution run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEvent {
    /// A matcher stage ran and produced `candidates` matches
    Stage { stage: MatchStage, candidates: usize },
    /// A matcher stage could not compile its pattern and was skipped
    StageSkipped { stage: MatchStage },
    /// Range anchors were paired
    RangePaired { distance: usize, relaxed: bool },
    /// Only one anchor resolved; a paragraph was highlighted instead
    ParagraphFallback { start_idx: usize, end_idx: usize },
    /// Token overlap highlighted `fragments` fragments
    TokenFallback { fragments: usize },
    /// Nothing could be located
    NoMatch,
}

type Callback = dyn Fn(&TraceEvent) + Send + Sync;

/// Cloneable, optional trace callback.
#[derive(Clone, Default)]
pub struct TraceHook {
    callback: Option<Arc<Callback>>,
}

impl TraceHook {
    /// A hook that only logs.
    pub fn none() -> Self {
        Self::default()
    }

    /// A hook that logs and forwards every event to `callback`.
    pub fn new(callback: impl Fn(&TraceEvent) + Send + Sync + 'static) -> Self {
        Self {
            callback: Some(Arc::new(callback)),
        }
    }

    /// Returns true if a callback is installed.
    pub fn is_active(&self) -> bool {
        self.callback.is_some()
    }

    /// Records an event.
    pub fn emit(&self, event: TraceEvent) {
        match event {
            TraceEvent::Stage { stage, candidates } => {
                tracing::debug!(stage = stage.name(), candidates, "matcher stage")
            }
            TraceEvent::StageSkipped { stage } => {
                tracing::warn!(stage = stage.name(), "matcher stage skipped")
            }
            TraceEvent::RangePaired { distance, relaxed } => {
                tracing::debug!(distance, relaxed, "range anchors paired")
            }
            TraceEvent::ParagraphFallback { start_idx, end_idx } => {
                tracing::debug!(start_idx, end_idx, "paragraph fallback")
            }
            TraceEvent::TokenFallback { fragments } => {
                tracing::debug!(fragments, "token fallback")
            }
            TraceEvent::NoMatch => tracing::info!("citation not located on page"),
        }

        if let Some(callback) = &self.callback {
            callback(&event);
        }
    }
}

impl fmt::Debug for TraceHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceHook")
            .field("active", &self.is_active())
            .finish()
    }
}
