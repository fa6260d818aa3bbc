use std::future::Future;

use gkelog_model::{HttpRequest, Labels};

use crate::state::{SCOPE, ScopeState, with_current};

/// An owned snapshot of the logging context, used to open a new scope.
///
/// There is no implicit context inheritance across `tokio::spawn`: a child
/// task starts with whatever scope its future carries. Forking therefore
/// goes through an explicit snapshot, which keeps the isolation rules
/// visible at the spawn site:
///
/// ```no_run
/// use gkelog_context::{Context, get_labels, set_labels};
///
/// # async fn demo() {
/// set_labels([("request_id", "r-1")]);
///
/// // Child inherits a copy of the current labels; its own writes stay local.
/// tokio::spawn(Context::capture().scope(async {
///     set_labels([("worker", "w-7")]);
///     let labels = get_labels();
///     assert_eq!(labels.get("request_id"), Some("r-1"));
/// }));
/// # }
/// ```
///
/// A scope ends when the wrapped future (or closure) finishes; its frame is
/// discarded with it. Scopes nest, innermost wins.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub(crate) labels: Labels,
    pub(crate) user_id: Option<String>,
    pub(crate) span_id: Option<String>,
    pub(crate) http_request: Option<HttpRequest>,
}

impl Context {
    /// Create an empty context. Entering it gives the task a fresh frame,
    /// masking whatever the caller had set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the calling task's current context.
    ///
    /// The snapshot is a copy: later writes by the parent do not show up in
    /// a child that entered the snapshot, and vice versa.
    pub fn capture() -> Self {
        with_current(|state| state.snapshot())
    }

    /// Seed the context with the given labels.
    pub fn with_labels(mut self, labels: impl Into<Labels>) -> Self {
        self.labels = labels.into();
        self
    }

    /// Seed the context with a user id.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Seed the context with a span id.
    pub fn with_span_id(mut self, span_id: impl Into<String>) -> Self {
        self.span_id = Some(span_id.into());
        self
    }

    /// Seed the context with an HTTP request descriptor.
    pub fn with_http_request(mut self, request: HttpRequest) -> Self {
        self.http_request = Some(request);
        self
    }

    /// Labels currently held by this snapshot.
    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    /// Run a future with this context as its task's scope.
    ///
    /// The scope travels with the future across await points and worker
    /// threads, and is dropped when the future completes or is cancelled.
    pub async fn scope<F>(self, fut: F) -> F::Output
    where
        F: Future,
    {
        SCOPE.scope(ScopeState::from(self), fut).await
    }

    /// Closure variant of [`Context::scope`] for synchronous callers,
    /// e.g. handing a snapshot to a worker thread.
    pub fn sync_scope<R>(self, f: impl FnOnce() -> R) -> R {
        SCOPE.sync_scope(ScopeState::from(self), f)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::Barrier;

    use super::Context;
    use crate::{get_labels, get_span_id, get_user_id, set_labels, set_user_id};
    use gkelog_model::Labels;

    #[tokio::test]
    async fn child_inherits_parent_snapshot() {
        Context::new()
            .scope(async {
                set_labels([("a", "1")]);

                Context::capture()
                    .scope(async {
                        set_labels([("b", "2")]);

                        let labels = get_labels();
                        assert_eq!(labels.get("a"), Some("1"));
                        assert_eq!(labels.get("b"), Some("2"));
                    })
                    .await;

                // Child writes never propagate back.
                let labels = get_labels();
                assert_eq!(labels.get("a"), Some("1"));
                assert_eq!(labels.get("b"), None);
            })
            .await;
    }

    #[tokio::test]
    async fn parent_writes_after_capture_stay_invisible_to_child() {
        Context::new()
            .scope(async {
                set_labels([("seen", "yes")]);
                let child = Context::capture();
                set_labels([("late", "yes")]);

                child
                    .scope(async {
                        let labels = get_labels();
                        assert_eq!(labels.get("seen"), Some("yes"));
                        assert_eq!(labels.get("late"), None);
                    })
                    .await;
            })
            .await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_tasks_do_not_share_labels() {
        let barrier = Arc::new(Barrier::new(2));

        let task = |name: &'static str, barrier: Arc<Barrier>| {
            Context::new().scope(async move {
                set_labels([("task", name)]);
                barrier.wait().await;

                let labels = get_labels();
                assert_eq!(labels.get("task"), Some(name));
                assert_eq!(labels.len(), 1);
            })
        };

        let a = tokio::spawn(task("a", barrier.clone()));
        let b = tokio::spawn(task("b", barrier));
        a.await.unwrap();
        b.await.unwrap();
    }

    #[tokio::test]
    async fn fresh_scope_masks_caller_labels() {
        Context::new()
            .scope(async {
                set_labels([("leftover", "stale")]);

                Context::new()
                    .scope(async {
                        assert!(get_labels().is_empty());
                        set_labels([("fresh", "1")]);
                    })
                    .await;

                // Caller frame untouched once the inner scope is gone.
                let labels = get_labels();
                assert_eq!(labels.get("leftover"), Some("stale"));
                assert_eq!(labels.get("fresh"), None);
            })
            .await;
    }

    #[test]
    fn sync_scope_isolates_threads() {
        let ctx = Context::new().with_labels(Labels::from([("origin", "main")]));

        let handle = std::thread::spawn(move || {
            ctx.sync_scope(|| {
                set_labels([("thread", "worker")]);
                let labels = get_labels();
                assert_eq!(labels.get("origin"), Some("main"));
                assert_eq!(labels.get("thread"), Some("worker"));
            })
        });
        handle.join().unwrap();

        // The spawning thread never entered the scope.
        assert_eq!(get_labels().get("origin"), None);
    }

    #[tokio::test]
    async fn user_and_span_ids_follow_the_scope() {
        Context::new()
            .with_user_id("u-1")
            .with_span_id("s-1")
            .scope(async {
                assert_eq!(get_user_id().as_deref(), Some("u-1"));
                assert_eq!(get_span_id().as_deref(), Some("s-1"));

                Context::new()
                    .scope(async {
                        assert_eq!(get_user_id(), None);
                        set_user_id("u-2");
                        assert_eq!(get_user_id().as_deref(), Some("u-2"));
                    })
                    .await;

                assert_eq!(get_user_id().as_deref(), Some("u-1"));
            })
            .await;
    }

    #[tokio::test]
    async fn capture_carries_the_full_context() {
        Context::new()
            .scope(async {
                set_user_id("u-9");
                set_labels([("k", "v")]);

                let ctx = Context::capture();
                assert_eq!(ctx.labels().get("k"), Some("v"));

                ctx.scope(async {
                    assert_eq!(get_user_id().as_deref(), Some("u-9"));
                })
                .await;
            })
            .await;
    }
}
