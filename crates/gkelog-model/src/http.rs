use serde::{Deserialize, Serialize};

/// Request descriptor matching Cloud Logging's `HttpRequest`.
///
/// Built incrementally by the access-log middleware: the request-side
/// fields are known at arrival, the response-side fields (`status`,
/// `response_size`, `latency`) are filled in once the response is ready.
///
/// See <https://cloud.google.com/logging/docs/reference/v2/rest/v2/LogEntry#httprequest>
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRequest {
    /// Protocol of the request, e.g. `"HTTP/1.1"`.
    pub protocol: String,
    /// HTTP method, e.g. `"GET"`.
    #[serde(rename = "requestMethod")]
    pub method: String,
    /// Full request URL.
    #[serde(rename = "requestUrl")]
    pub url: String,
    /// Request body size in bytes, when the client declared one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referer: Option<String>,
    /// Response status code; `None` until a response was produced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_size: Option<String>,
    /// Total request latency, e.g. `"0.00231s"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::HttpRequest;

    fn request() -> HttpRequest {
        HttpRequest {
            protocol: "HTTP/1.1".to_string(),
            method: "GET".to_string(),
            url: "http://svc.local/health?deep=1".to_string(),
            user_agent: Some("curl/8.5.0".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn serializes_with_cloud_logging_field_names() {
        let json = serde_json::to_value(request()).unwrap();

        assert_eq!(json["requestMethod"], "GET");
        assert_eq!(json["requestUrl"], "http://svc.local/health?deep=1");
        assert_eq!(json["protocol"], "HTTP/1.1");
        assert_eq!(json["userAgent"], "curl/8.5.0");
    }

    #[test]
    fn absent_fields_are_omitted() {
        let json = serde_json::to_value(request()).unwrap();
        let obj = json.as_object().unwrap();

        assert!(!obj.contains_key("status"));
        assert!(!obj.contains_key("responseSize"));
        assert!(!obj.contains_key("latency"));
        assert!(!obj.contains_key("remoteIp"));
    }

    #[test]
    fn response_fields_appear_once_set() {
        let mut req = request();
        req.status = Some(502);
        req.response_size = Some("11".to_string());
        req.latency = Some("0.00231s".to_string());

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["status"], 502);
        assert_eq!(json["responseSize"], "11");
        assert_eq!(json["latency"], "0.00231s");
    }

    #[test]
    fn serde_roundtrip() {
        let mut req = request();
        req.status = Some(200);

        let json = serde_json::to_string(&req).unwrap();
        let back: HttpRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, req);
    }
}
