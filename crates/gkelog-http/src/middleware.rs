use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use time::OffsetDateTime;

use gkelog_context::{
    Context, get_http_request, get_user_id, set_http_request, update_http_request,
};

use crate::request::{combined_log_line, describe_request};

/// Access logging middleware.
///
/// Every request runs in a fresh context scope, so labels, user id and
/// request descriptor set while handling cannot leak into the next request
/// served by the same worker. The handler (and everything it calls) sees
/// the descriptor via `gkelog_context::get_http_request`; once the inner
/// service produced a response the descriptor is completed with status,
/// response size and latency, and one access line is emitted.
///
/// ```no_run
/// use axum::{Router, middleware, routing::get};
///
/// let app: Router = Router::new()
///     .route("/", get(|| async { "OK" }))
///     .layer(middleware::from_fn(gkelog_http::access_log));
/// ```
pub async fn access_log(req: Request, next: Next) -> Response {
    let request_time = OffsetDateTime::now_utc();
    let described = describe_request(&req);

    Context::new()
        .scope(async move {
            set_http_request(described);

            let started = Instant::now();
            let response = next.run(req).await;
            let elapsed = started.elapsed();

            update_http_request(|r| {
                r.status = Some(response.status().as_u16());
                r.response_size = response
                    .headers()
                    .get(axum::http::header::CONTENT_LENGTH)
                    .and_then(|v| v.to_str().ok())
                    .map(|v| v.to_string());
                r.latency = Some(format!("{:.5}s", elapsed.as_secs_f64()));
            });

            emit_access_line(request_time);
            response
        })
        .await
}

/// Logs the completed request, severity reflecting the status code class.
fn emit_access_line(request_time: OffsetDateTime) {
    let Some(request) = get_http_request() else {
        return;
    };
    let user_id = get_user_id();
    let line = combined_log_line(request_time, &request, user_id.as_deref());

    match request.status {
        Some(status) if status >= 500 => tracing::error!(target: "access_log", "{line}"),
        Some(status) if status >= 400 => tracing::warn!(target: "access_log", "{line}"),
        _ => tracing::info!(target: "access_log", "{line}"),
    }
}
