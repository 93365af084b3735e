use crate::config::ModmapConfig;
use crate::core::Error;
use crate::pipeline::analyze_source;
use crate::report::AnalysisReport;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const CODE_FIELD: &str = "code";
pub const EMPTY_CODE_MESSAGE: &str = "Empty code submitted.";
pub const TIMEOUT_MESSAGE: &str = "Analysis exceeded its time budget.";

#[derive(Debug, Default, Deserialize)]
struct CodeForm {
    #[serde(default)]
    code: String,
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn analyze(State(config): State<Arc<ModmapConfig>>, request: Request) -> Response {
    let code = match extract_code(request).await {
        Ok(code) => code,
        Err(rejection) => return rejection,
    };
    if code.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, EMPTY_CODE_MESSAGE).into_response();
    }

    let budget = Duration::from_secs(config.server.timeout_secs);
    let task = tokio::task::spawn_blocking(move || analyze_source(&code, &config));
    match tokio::time::timeout(budget, task).await {
        Ok(Ok(result)) => analysis_response(result),
        Ok(Err(join_error)) => {
            log::error!("Analysis task failed: {join_error}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "InternalError", "analysis failed")
        }
        Err(_) => {
            log::warn!("Analysis exceeded {}s", budget.as_secs());
            (StatusCode::SERVICE_UNAVAILABLE, TIMEOUT_MESSAGE).into_response()
        }
    }
}

/// Reads the `code` field from a multipart or urlencoded form, or takes a
/// plain-text body verbatim.
async fn extract_code(request: Request) -> Result<String, Response> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("multipart/form-data") {
        let mut multipart = Multipart::from_request(request, &())
            .await
            .map_err(IntoResponse::into_response)?;
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(IntoResponse::into_response)?
        {
            if field.name() == Some(CODE_FIELD) {
                return field.text().await.map_err(IntoResponse::into_response);
            }
        }
        return Ok(String::new());
    }

    if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(form) = Form::<CodeForm>::from_request(request, &())
            .await
            .map_err(IntoResponse::into_response)?;
        return Ok(form.code);
    }

    String::from_request(request, &())
        .await
        .map_err(IntoResponse::into_response)
}

pub fn analysis_response(result: crate::core::Result<AnalysisReport>) -> Response {
    match result {
        Ok(report) => Json(report).into_response(),
        Err(Error::Syntax {
            line,
            column,
            message,
        }) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "SyntaxError",
                "detail": message,
                "line": line,
                "column": column,
            })),
        )
            .into_response(),
        Err(error) => {
            log::error!("{error}");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                error.kind(),
                &error.to_string(),
            )
        }
    }
}

fn error_response(status: StatusCode, kind: &str, detail: &str) -> Response {
    (status, Json(json!({ "error": kind, "detail": detail }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use serde_json::Value;

    async fn post(content_type: &str, body: impl Into<Body>) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method("POST")
            .uri("/analyze")
            .header(CONTENT_TYPE, content_type)
            .body(body.into())
            .unwrap();
        let response = analyze(State(Arc::new(ModmapConfig::default())), request).await;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn plain_text_body_is_analyzed() {
        let (status, body) = post("text/plain", "def f():\n    return 1\n").await;
        assert_eq!(status, StatusCode::OK);
        let report: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(report["total_functions"], 1);
    }

    #[tokio::test]
    async fn urlencoded_code_field_is_analyzed() {
        let (status, body) = post(
            "application/x-www-form-urlencoded",
            "code=class+A%3A%0A++++pass%0A",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let report: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(report["total_classes"], 1);
    }

    #[tokio::test]
    async fn multipart_code_field_is_analyzed() {
        let body = "--XBOUNDARY\r\n\
                    Content-Disposition: form-data; name=\"code\"\r\n\r\n\
                    def g(x):\n    return x\n\r\n\
                    --XBOUNDARY--\r\n";
        let (status, body) = post("multipart/form-data; boundary=XBOUNDARY", body).await;
        assert_eq!(status, StatusCode::OK);
        let report: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(report["functions"][0]["name"], "g");
    }

    #[tokio::test]
    async fn blank_code_is_rejected() {
        let (status, body) = post("text/plain", "   \n").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, EMPTY_CODE_MESSAGE.as_bytes());
    }

    #[tokio::test]
    async fn syntax_error_reports_location() {
        let (status, body) = post("text/plain", "def broken(:\n    pass\n").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(error["error"], "SyntaxError");
        assert_eq!(error["line"], 1);
        assert!(error["detail"].is_string());
    }

    #[test]
    fn other_errors_are_server_errors() {
        let response = analysis_response(Err(Error::Parser("grammar".into())));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn health_answers_ok() {
        assert_eq!(health().await, "ok");
    }
}
