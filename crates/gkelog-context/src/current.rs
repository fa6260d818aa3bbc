//! Accessors for the calling task's context.
//!
//! All operations are total: they never fail, never block, and never yield.
//! Outside any [`crate::Context`] scope they act on the calling thread's
//! root state, so plain `main` + logger setups work without ceremony.

use gkelog_model::{HttpRequest, Labels};

use crate::state::with_current;

/// Merge the given key/value pairs into the current task's labels.
///
/// Duplicate keys overwrite, last writer wins. Concurrent unrelated tasks
/// are unaffected.
pub fn set_labels<I, K, V>(pairs: I)
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    with_current(|state| {
        state.labels.borrow_mut().extend(pairs);
    });
}

/// Add a single label to the current context.
pub fn add_label(key: impl Into<String>, value: impl Into<String>) {
    with_current(|state| {
        state.labels.borrow_mut().insert(key, value);
    });
}

/// Snapshot of the current task's merged labels.
///
/// The returned value is a copy; mutating it has no effect on the context.
pub fn get_labels() -> Labels {
    with_current(|state| state.labels.borrow().clone())
}

/// Reset the current task's label frame.
///
/// Scope-exit hook for schedulers that recycle one scope across units of
/// work; scoped callers get a fresh frame anyway and never need this.
pub fn clear_labels() {
    with_current(|state| state.labels.borrow_mut().clear());
}

/// Set the user id for the current logging context.
pub fn set_user_id(user_id: impl Into<String>) {
    with_current(|state| *state.user_id.borrow_mut() = Some(user_id.into()));
}

/// Current user id, if one was set.
pub fn get_user_id() -> Option<String> {
    with_current(|state| state.user_id.borrow().clone())
}

/// Set the span id for the current logging context.
pub fn set_span_id(span_id: impl Into<String>) {
    with_current(|state| *state.span_id.borrow_mut() = Some(span_id.into()));
}

/// Current span id, if one was set.
pub fn get_span_id() -> Option<String> {
    with_current(|state| state.span_id.borrow().clone())
}

/// Store the HTTP request descriptor for the current context.
pub fn set_http_request(request: HttpRequest) {
    with_current(|state| *state.http_request.borrow_mut() = Some(request));
}

/// Current HTTP request descriptor, if one was stored.
pub fn get_http_request() -> Option<HttpRequest> {
    with_current(|state| state.http_request.borrow().clone())
}

/// Apply `f` to the stored HTTP request descriptor, if present.
///
/// Lets the access-log middleware fill in response-side fields (status,
/// response size, latency) without replacing the whole descriptor.
pub fn update_http_request(f: impl FnOnce(&mut HttpRequest)) {
    with_current(|state| {
        if let Some(request) = state.http_request.borrow_mut().as_mut() {
            f(request);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Context;

    #[tokio::test]
    async fn set_then_get_returns_exactly_the_pairs() {
        Context::new()
            .scope(async {
                set_labels([("app", "api"), ("env", "prod")]);

                let labels = get_labels();
                assert_eq!(labels.len(), 2);
                assert_eq!(labels.get("app"), Some("api"));
                assert_eq!(labels.get("env"), Some("prod"));
            })
            .await;
    }

    #[tokio::test]
    async fn last_writer_wins_on_key_collision() {
        Context::new()
            .scope(async {
                set_labels([("job_id", "1")]);
                set_labels([("job_id", "2")]);

                let labels = get_labels();
                assert_eq!(labels.get("job_id"), Some("2"));
                assert_eq!(labels.len(), 1);
            })
            .await;
    }

    #[tokio::test]
    async fn set_labels_merges_instead_of_replacing() {
        Context::new()
            .scope(async {
                set_labels([("a", "1")]);
                set_labels([("b", "2")]);

                let labels = get_labels();
                assert_eq!(labels.get("a"), Some("1"));
                assert_eq!(labels.get("b"), Some("2"));
            })
            .await;
    }

    #[tokio::test]
    async fn get_labels_returns_a_detached_copy() {
        Context::new()
            .scope(async {
                set_labels([("k", "v")]);

                let mut copy = get_labels();
                copy.insert("sneaky", "write");
                copy.remove("k");

                let labels = get_labels();
                assert_eq!(labels.get("k"), Some("v"));
                assert_eq!(labels.get("sneaky"), None);
            })
            .await;
    }

    #[tokio::test]
    async fn clear_labels_resets_the_frame() {
        Context::new()
            .scope(async {
                set_labels([("stale", "1")]);
                clear_labels();

                assert!(get_labels().is_empty());

                // Frame is still writable afterwards.
                add_label("fresh", "2");
                assert_eq!(get_labels().get("fresh"), Some("2"));
            })
            .await;
    }

    #[tokio::test]
    async fn add_label_sets_one_pair() {
        Context::new()
            .scope(async {
                add_label("job_id", "17");
                assert_eq!(get_labels().get("job_id"), Some("17"));
            })
            .await;
    }

    #[test]
    fn accessors_work_outside_any_scope() {
        // No runtime, no scope: falls back to the thread's root state.
        set_labels([("root", "1")]);
        assert_eq!(get_labels().get("root"), Some("1"));

        clear_labels();
        assert!(get_labels().is_empty());
    }

    #[tokio::test]
    async fn http_request_can_be_completed_in_place() {
        use gkelog_model::HttpRequest;

        Context::new()
            .scope(async {
                set_http_request(HttpRequest {
                    protocol: "HTTP/1.1".to_string(),
                    method: "GET".to_string(),
                    url: "http://svc.local/".to_string(),
                    ..Default::default()
                });

                update_http_request(|req| {
                    req.status = Some(204);
                    req.latency = Some("0.00042s".to_string());
                });

                let req = get_http_request().expect("request descriptor was set");
                assert_eq!(req.status, Some(204));
                assert_eq!(req.latency.as_deref(), Some("0.00042s"));
            })
            .await;
    }

    #[tokio::test]
    async fn update_without_request_is_a_no_op() {
        Context::new()
            .scope(async {
                update_http_request(|req| req.status = Some(500));
                assert_eq!(get_http_request(), None);
            })
            .await;
    }
}
