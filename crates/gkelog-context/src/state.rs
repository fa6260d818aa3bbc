use std::cell::RefCell;

use gkelog_model::{HttpRequest, Labels};

use crate::Context;

/// Mutable per-task context storage.
///
/// Interior mutability is sound here: a `ScopeState` is only ever touched
/// by the task (or thread) that owns it, so no synchronization is needed.
pub(crate) struct ScopeState {
    pub(crate) labels: RefCell<Labels>,
    pub(crate) user_id: RefCell<Option<String>>,
    pub(crate) span_id: RefCell<Option<String>>,
    pub(crate) http_request: RefCell<Option<HttpRequest>>,
}

impl ScopeState {
    pub(crate) fn empty() -> Self {
        Self {
            labels: RefCell::new(Labels::new()),
            user_id: RefCell::new(None),
            span_id: RefCell::new(None),
            http_request: RefCell::new(None),
        }
    }

    /// Copy the full state out as an owned [`Context`].
    pub(crate) fn snapshot(&self) -> Context {
        Context {
            labels: self.labels.borrow().clone(),
            user_id: self.user_id.borrow().clone(),
            span_id: self.span_id.borrow().clone(),
            http_request: self.http_request.borrow().clone(),
        }
    }
}

impl From<Context> for ScopeState {
    fn from(ctx: Context) -> Self {
        Self {
            labels: RefCell::new(ctx.labels),
            user_id: RefCell::new(ctx.user_id),
            span_id: RefCell::new(ctx.span_id),
            http_request: RefCell::new(ctx.http_request),
        }
    }
}

tokio::task_local! {
    /// The active scope for the current logical task. Entered via
    /// [`Context::scope`] / [`Context::sync_scope`]; the value lives in the
    /// future itself and migrates with it across worker threads.
    pub(crate) static SCOPE: ScopeState;
}

thread_local! {
    /// Fallback storage for code running outside any scope, so the
    /// accessors stay total. Shared by everything unscoped on one thread;
    /// units of work that need isolation enter a [`Context`] scope.
    pub(crate) static ROOT: ScopeState = ScopeState::empty();
}

/// Runs `f` against the innermost active scope, falling back to the
/// calling thread's root state when no scope is entered.
pub(crate) fn with_current<R>(f: impl FnOnce(&ScopeState) -> R) -> R {
    let mut f = Some(f);
    let mut run = |state: &ScopeState| {
        let f = f.take().expect("context closure runs at most once");
        f(state)
    };
    match SCOPE.try_with(&mut run) {
        Ok(out) => out,
        Err(_) => ROOT.with(run),
    }
}
