use chrono::Utc;
use entity::{exercises, submissions};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Set, SqlErr,
    sea_query::OnConflict,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::logging::{LogComponent, LogStage};
use crate::ldebug;

/// 提交记录
pub type Submission = submissions::Model;

/// 对外展示的提交记录，不包含账户 ID 与时间戳
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionView {
    pub id: i32,
    pub challenge_id: i32,
    pub code: String,
    pub passed: bool,
}

impl From<Submission> for SubmissionView {
    fn from(model: Submission) -> Self {
        Self {
            id: model.id,
            challenge_id: model.exercise_id,
            code: model.code,
            passed: model.passed,
        }
    }
}

/// 提交记录服务
#[derive(Debug, Clone)]
pub struct SubmissionRecorder {
    db: DatabaseConnection,
}

impl SubmissionRecorder {
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// 记录一次提交
    ///
    /// 只保存通过的提交；`passed = false` 返回 `NotAccepted` 且不写入。
    /// 以单条 `INSERT .. ON CONFLICT DO UPDATE .. RETURNING` 完成插入或覆盖，
    /// 覆盖时保留 `id` 与 `created_at`。
    pub async fn record(
        &self,
        account_id: i32,
        exercise_id: i32,
        code: &str,
        passed: bool,
    ) -> Result<Submission> {
        if !passed {
            return Err(AppError::NotAccepted);
        }

        let now = Utc::now().naive_utc();
        let row = submissions::ActiveModel {
            account_id: Set(account_id),
            exercise_id: Set(exercise_id),
            code: Set(code.to_string()),
            passed: Set(passed),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let saved = submissions::Entity::insert(row)
            .on_conflict(
                OnConflict::columns([
                    submissions::Column::AccountId,
                    submissions::Column::ExerciseId,
                ])
                .update_columns([
                    submissions::Column::Code,
                    submissions::Column::Passed,
                    submissions::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec_with_returning(&self.db)
            .await;

        let saved = match saved {
            Ok(saved) => saved,
            Err(err) if is_foreign_key_violation(&err) => {
                return Err(self.missing_reference(exercise_id).await);
            }
            Err(err) => return Err(err.into()),
        };

        ldebug!(
            format!("account-{account_id}"),
            LogStage::Db,
            LogComponent::Submissions,
            "record",
            &format!("提交已保存: id={} exercise={}", saved.id, exercise_id)
        );
        Ok(saved)
    }

    /// 账户的全部提交，按练习题 ID 升序
    pub async fn list_for_account(&self, account_id: i32) -> Result<Vec<Submission>> {
        Ok(submissions::Entity::find()
            .filter(submissions::Column::AccountId.eq(account_id))
            .order_by_asc(submissions::Column::ExerciseId)
            .all(&self.db)
            .await?)
    }

    /// 账户在某练习题上的提交，不存在时返回 `NotFound`
    pub async fn get_for_account_and_exercise(
        &self,
        account_id: i32,
        exercise_id: i32,
    ) -> Result<Submission> {
        submissions::Entity::find()
            .filter(submissions::Column::AccountId.eq(account_id))
            .filter(submissions::Column::ExerciseId.eq(exercise_id))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("submission not found"))
    }
}

fn is_foreign_key_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_)))
}

impl SubmissionRecorder {
    /// 外键失败时区分是练习题还是账户不存在
    ///
    /// SQLite 的外键错误不带约束名，只能回查练习题表。
    async fn missing_reference(&self, exercise_id: i32) -> AppError {
        match exercises::Entity::find_by_id(exercise_id).one(&self.db).await {
            Ok(Some(_)) => AppError::not_found("user not found"),
            Ok(None) => AppError::not_found("challenge not found"),
            Err(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::{AccountFixture, ExerciseFixture};
    use crate::testing::helpers::create_test_db;

    async fn setup() -> (SubmissionRecorder, i32, i32) {
        let db = create_test_db().await.unwrap();
        let account = AccountFixture::new("coder").insert(&db).await.unwrap();
        let exercise = ExerciseFixture::new("hello-world").insert(&db).await.unwrap();
        (SubmissionRecorder::new(db), account.id, exercise.id)
    }

    #[tokio::test]
    async fn test_failed_submission_not_accepted() {
        let (recorder, account, exercise) = setup().await;
        let err = recorder.record(account, exercise, "print()", false).await.unwrap_err();
        assert!(matches!(err, AppError::NotAccepted));
        assert!(recorder.list_for_account(account).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_then_get() {
        let (recorder, account, exercise) = setup().await;
        let saved = recorder.record(account, exercise, "print('hi')", true).await.unwrap();
        let fetched = recorder
            .get_for_account_and_exercise(account, exercise)
            .await
            .unwrap();
        assert_eq!(saved, fetched);
        assert!(fetched.passed);
    }

    #[tokio::test]
    async fn test_missing_submission_is_not_found() {
        let (recorder, account, exercise) = setup().await;
        assert!(matches!(
            recorder.get_for_account_and_exercise(account, exercise).await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_exercise_is_not_found() {
        let (recorder, account, _) = setup().await;
        assert!(matches!(
            recorder.record(account, 4242, "x", true).await,
            Err(AppError::NotFound { message }) if message == "challenge not found"
        ));
    }

    #[tokio::test]
    async fn test_deleted_account_is_reported_as_missing_user() {
        let (recorder, _, exercise) = setup().await;
        let err = recorder.record(9999, exercise, "x", true).await.unwrap_err();
        assert!(matches!(&err, AppError::NotFound { message } if message == "user not found"));
    }

    #[test]
    fn test_view_renames_exercise_id() {
        let now = Utc::now().naive_utc();
        let view = SubmissionView::from(Submission {
            id: 3,
            account_id: 1,
            exercise_id: 5,
            code: "b".into(),
            passed: true,
            created_at: now,
            updated_at: now,
        });
        assert_eq!(
            serde_json::to_value(view).unwrap(),
            serde_json::json!({ "id": 3, "challenge_id": 5, "code": "b", "passed": true })
        );
    }
}
