//! FIFO decision queue with at-most-once async callbacks.
//!
//! A decision is consumed exactly once (accept xor reject). While a
//! callback is in flight the queue refuses further accept/reject calls for
//! the same decision; a failing accept leaves the decision current so the
//! failure stays visible and the user can retry.

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use blueprint_model::{
    DecisionId, DecisionKind, DecisionView, ScanKind, Severity,
};
use futures::future::BoxFuture;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{BlueprintError, Result};

pub type DecisionCallback =
    Box<dyn Fn() -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Wraps an async closure into the boxed callback shape decisions store.
pub fn callback<F, Fut>(f: F) -> DecisionCallback
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Box::new(move || Box::pin(f()))
}

/// A queued unit of user approval, with its follow-up actions attached.
pub struct Decision {
    view: DecisionView,
    on_accept: DecisionCallback,
    on_reject: Option<DecisionCallback>,
}

impl fmt::Debug for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decision")
            .field("view", &self.view)
            .field("has_on_reject", &self.on_reject.is_some())
            .finish()
    }
}

impl Decision {
    pub fn confirm(
        scan: ScanKind,
        title: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
        on_accept: DecisionCallback,
    ) -> Self {
        Decision {
            view: DecisionView {
                id: DecisionId::new(),
                kind: DecisionKind::Confirm,
                scan,
                title: title.into(),
                description: description.into(),
                severity,
                count: None,
                data: None,
            },
            on_accept,
            on_reject: None,
        }
    }

    /// Notification variant: a single dismiss action that maps to reject.
    pub fn notify(
        scan: ScanKind,
        title: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Decision {
            view: DecisionView {
                id: DecisionId::new(),
                kind: DecisionKind::Notify,
                scan,
                title: title.into(),
                description: description.into(),
                severity,
                count: None,
                data: None,
            },
            on_accept: callback(|| async { Ok(()) }),
            on_reject: None,
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.view.count = Some(count);
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.view.data = Some(data);
        self
    }

    pub fn with_on_reject(mut self, on_reject: DecisionCallback) -> Self {
        self.on_reject = Some(on_reject);
        self
    }

    pub fn view(&self) -> &DecisionView {
        &self.view
    }
}

#[derive(Debug, Default)]
struct QueueInner {
    queue: VecDeque<Arc<Decision>>,
    processing: bool,
}

/// Ordered, single-consumer-at-a-time queue of pending decisions.
#[derive(Debug, Default)]
pub struct DecisionQueue {
    inner: Mutex<QueueInner>,
}

impl DecisionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends; if the queue was empty the decision becomes current.
    pub async fn add(&self, decision: Decision) -> DecisionId {
        let id = decision.view.id;
        let mut inner = self.inner.lock().await;
        inner.queue.push_back(Arc::new(decision));
        debug!(%id, depth = inner.queue.len(), "decision queued");
        id
    }

    pub async fn current(&self) -> Option<DecisionView> {
        let inner = self.inner.lock().await;
        inner.queue.front().map(|decision| decision.view.clone())
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.queue.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.queue.is_empty()
    }

    /// Runs the current decision's accept callback; pops and promotes the
    /// next on success. `Ok(None)` means there was nothing to accept (empty
    /// queue, or a callback is already in flight).
    pub async fn accept(&self) -> Result<Option<DecisionView>> {
        let Some(decision) = self.begin().await else {
            return Ok(None);
        };

        let outcome = (decision.on_accept)().await;
        self.finish(&decision, outcome.is_ok()).await;

        match outcome {
            Ok(()) => Ok(Some(decision.view.clone())),
            Err(err) => {
                Err(BlueprintError::Callback(err.surface_message()))
            }
        }
    }

    /// Runs the current decision's reject callback (no-op when absent);
    /// pops and promotes identically to accept.
    pub async fn reject(&self) -> Result<Option<DecisionView>> {
        let Some(decision) = self.begin().await else {
            return Ok(None);
        };

        let outcome = match &decision.on_reject {
            Some(on_reject) => on_reject().await,
            None => Ok(()),
        };
        self.finish(&decision, outcome.is_ok()).await;

        match outcome {
            Ok(()) => Ok(Some(decision.view.clone())),
            Err(err) => {
                Err(BlueprintError::Callback(err.surface_message()))
            }
        }
    }

    async fn begin(&self) -> Option<Arc<Decision>> {
        let mut inner = self.inner.lock().await;
        if inner.processing {
            debug!("decision callback already in flight");
            return None;
        }
        let decision = inner.queue.front().cloned()?;
        inner.processing = true;
        Some(decision)
    }

    async fn finish(&self, decision: &Arc<Decision>, consumed: bool) {
        let mut inner = self.inner.lock().await;
        inner.processing = false;
        if consumed {
            let matches_front = inner
                .queue
                .front()
                .is_some_and(|front| front.view.id == decision.view.id);
            if matches_front {
                inner.queue.pop_front();
            }
        }
    }
}
