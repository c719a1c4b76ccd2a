//! # API 响应结构
//!
//! 成功响应统一包一层命名字段，例如 `{ "submission": {...} }`；
//! 失败响应统一为 `{ "error": <message> }`。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::{AppError, ErrorCategory};
use crate::lerror;
use crate::logging::{LogComponent, LogStage};

/// 带命名字段的成功响应
#[derive(Debug)]
pub struct Envelope<T: Serialize> {
    status: StatusCode,
    key: &'static str,
    data: T,
}

impl<T: Serialize> Envelope<T> {
    pub const fn ok(key: &'static str, data: T) -> Self {
        Self {
            status: StatusCode::OK,
            key,
            data,
        }
    }

    pub const fn created(key: &'static str, data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            key,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        match serde_json::to_value(self.data) {
            Ok(value) => {
                let mut body = serde_json::Map::new();
                body.insert(self.key.to_string(), value);
                (self.status, Json(serde_json::Value::Object(body))).into_response()
            }
            Err(e) => AppError::from(e).into_response(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if self.category() == ErrorCategory::Server {
            // 在 http_request span 内记录，日志带有 method 与 path
            lerror!(
                "http",
                LogStage::Error,
                LogComponent::Http,
                "server_error",
                &self.error_chain()
            );
        }
        (status, Json(self.client_payload())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_envelope_wraps_data() {
        let response = Envelope::created("submission", serde_json::json!({ "id": 1 })).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(response).await, serde_json::json!({ "submission": { "id": 1 } }));
    }

    #[tokio::test]
    async fn test_internal_error_is_opaque() {
        let response = AppError::internal("sqlite file locked at /var/data").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": "internal server error" })
        );
    }

    #[tokio::test]
    async fn test_not_accepted_message() {
        let response = AppError::NotAccepted.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": "submission did not pass the tests" })
        );
    }
}
