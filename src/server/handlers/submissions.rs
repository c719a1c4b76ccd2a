//! # 提交记录处理器

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::server::AppState;
use crate::server::middleware::AuthContext;
use crate::server::response::Envelope;
use crate::submissions::SubmissionView;

/// 提交请求体
#[derive(Debug, Default, Deserialize)]
pub struct CreateSubmissionRequest {
    pub challenge_id: Option<i32>,
    pub code: Option<String>,
    pub passed: Option<bool>,
}

impl CreateSubmissionRequest {
    /// 字段校验，返回 (challenge_id, code, passed)
    fn validate(self) -> Result<(i32, String, bool)> {
        let mut errors = Vec::new();

        let challenge_id = self.challenge_id.filter(|id| *id != 0);
        if challenge_id.is_none() {
            errors.push(("challenge_id", "is required"));
        }
        let code = self.code.filter(|code| !code.trim().is_empty());
        if code.is_none() {
            errors.push(("code", "is required"));
        }

        match (challenge_id, code) {
            (Some(challenge_id), Some(code)) => {
                Ok((challenge_id, code, self.passed.unwrap_or(false)))
            }
            _ => Err(AppError::validation_fields(errors)),
        }
    }
}

/// 超过请求体上限时保留 413，其余解析失败一律 400
fn json_rejection(rejection: JsonRejection) -> AppError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::validation(rejection.body_text())
    }
}

/// `POST /api/submissions`
pub async fn create(
    State(state): State<AppState>,
    auth: AuthContext,
    payload: std::result::Result<Json<CreateSubmissionRequest>, JsonRejection>,
) -> Result<Envelope<SubmissionView>> {
    let Json(request) = payload.map_err(json_rejection)?;
    let (challenge_id, code, passed) = request.validate()?;

    let saved = state
        .submissions
        .record(auth.account_id, challenge_id, &code, passed)
        .await?;
    Ok(Envelope::created("submission", SubmissionView::from(saved)))
}

/// `GET /api/submissions`
pub async fn list(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Envelope<Vec<SubmissionView>>> {
    let submissions = state
        .submissions
        .list_for_account(auth.account_id)
        .await?
        .into_iter()
        .map(SubmissionView::from)
        .collect::<Vec<_>>();
    Ok(Envelope::ok("submissions", submissions))
}

/// `GET /api/submissions/{challenge_id}`
pub async fn get(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(challenge_id): Path<String>,
) -> Result<Envelope<SubmissionView>> {
    let challenge_id: i32 = challenge_id
        .parse()
        .map_err(|_| AppError::validation("invalid challenge_id"))?;
    let submission = state
        .submissions
        .get_for_account_and_exercise(auth.account_id, challenge_id)
        .await?;
    Ok(Envelope::ok("submission", SubmissionView::from(submission)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_reports_every_missing_field() {
        let err = CreateSubmissionRequest::default().validate().unwrap_err();
        assert_eq!(
            err.client_payload(),
            serde_json::json!({ "error": { "challenge_id": "is required", "code": "is required" } })
        );
    }

    #[test]
    fn test_validate_zero_id_and_blank_code() {
        let request = CreateSubmissionRequest {
            challenge_id: Some(0),
            code: Some("   ".to_string()),
            passed: Some(true),
        };
        assert!(matches!(
            request.validate(),
            Err(AppError::ValidationFields { .. })
        ));
    }

    #[test]
    fn test_validate_passed_defaults_false() {
        let request = CreateSubmissionRequest {
            challenge_id: Some(5),
            code: Some("print()".to_string()),
            passed: None,
        };
        assert_eq!(request.validate().unwrap(), (5, "print()".to_string(), false));
    }
}
