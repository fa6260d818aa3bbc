use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request};
use axum::http::{HeaderMap, header, header::HeaderName};
use time::{OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};

use gkelog_model::HttpRequest;

/// Converts an incoming request into a partially-complete [`HttpRequest`]
/// descriptor. Response-side fields stay `None` until the middleware
/// completes them.
///
/// The remote address comes from axum's `ConnectInfo` extension and is
/// absent when the router was not served `into_make_service_with_connect_info`.
pub fn describe_request(req: &Request) -> HttpRequest {
    let headers = req.headers();

    let url = if req.uri().authority().is_some() {
        req.uri().to_string()
    } else {
        match headers.get(header::HOST).and_then(|v| v.to_str().ok()) {
            Some(host) => format!("http://{}{}", host, req.uri()),
            None => req.uri().to_string(),
        }
    };

    HttpRequest {
        protocol: format!("{:?}", req.version()),
        method: req.method().to_string(),
        url,
        request_size: header_str(headers, header::CONTENT_LENGTH),
        user_agent: header_str(headers, header::USER_AGENT),
        referer: header_str(headers, header::REFERER),
        remote_ip: req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0.ip().to_string()),
        ..Default::default()
    }
}

fn header_str(headers: &HeaderMap, name: HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

/// Request timestamp format of the combined log format, e.g.
/// `02/Jan/2006:15:04:05 +0000`.
const CLF_TIMESTAMP: &[BorrowedFormatItem<'static>] = format_description!(
    "[day]/[month repr:short]/[year]:[hour]:[minute]:[second] [offset_hour sign:mandatory][offset_minute]"
);

/// Renders one access-log line in the Apache "combined" log format.
///
/// Atoms: remote address, RFC-1413 identity (never known here), user id,
/// request timestamp, request line, status, response length, referer,
/// user agent. A dash stands in for any missing atom.
pub(crate) fn combined_log_line(
    request_time: OffsetDateTime,
    request: &HttpRequest,
    user_id: Option<&str>,
) -> String {
    let timestamp = request_time
        .format(CLF_TIMESTAMP)
        .unwrap_or_else(|_| "-".to_string());
    let request_line = format!(
        "{} {} {}",
        request.method,
        path_and_query(&request.url),
        request.protocol
    );
    let status = match request.status {
        Some(status) => status.to_string(),
        None => "-".to_string(),
    };

    format!(
        "{} - {} [{}] {} {} {} \"{}\" \"{}\"",
        request.remote_ip.as_deref().unwrap_or("-"),
        user_id.unwrap_or("-"),
        timestamp,
        request_line,
        status,
        request.response_size.as_deref().unwrap_or("-"),
        request.referer.as_deref().unwrap_or("-"),
        request.user_agent.as_deref().unwrap_or("-"),
    )
}

/// Path plus query of a request URL, `/` when the URL has no path.
fn path_and_query(url: &str) -> &str {
    let rest = match url.find("://") {
        Some(scheme_end) => &url[scheme_end + 3..],
        None => return if url.is_empty() { "/" } else { url },
    };
    match rest.find('/') {
        Some(path_start) => &rest[path_start..],
        None => "/",
    }
}
