//! # 实体定义测试
//!
//! 测试所有 Sea-ORM 实体定义的正确性

#[cfg(test)]
mod tests {
    use crate::{accounts, exercises, external_identity_links, submissions};
    use sea_orm::{EntityName, Iterable, Set};

    #[tokio::test]
    async fn test_account_creation() {
        let account = accounts::ActiveModel {
            username: Set("octocat".to_string()),
            email: Set("octocat@example.com".to_string()),
            avatar_url: Set("https://avatars.example.com/u/1".to_string()),
            ..Default::default()
        };

        assert_eq!(account.username.as_ref(), "octocat");
        assert_eq!(account.email.as_ref(), "octocat@example.com");
        assert!(account.id.is_not_set());
    }

    #[tokio::test]
    async fn test_external_identity_link_creation() {
        let link = external_identity_links::ActiveModel {
            account_id: Set(7),
            external_id: Set(583_231),
            ..Default::default()
        };

        assert_eq!(link.account_id.as_ref(), &7);
        assert_eq!(link.external_id.as_ref(), &583_231);
    }

    #[tokio::test]
    async fn test_submission_creation() {
        let submission = submissions::ActiveModel {
            account_id: Set(1),
            exercise_id: Set(5),
            code: Set("print('Hello, World!')".to_string()),
            passed: Set(true),
            ..Default::default()
        };

        assert_eq!(submission.exercise_id.as_ref(), &5);
        assert_eq!(submission.passed.as_ref(), &true);
    }

    #[test]
    fn test_table_names() {
        assert_eq!(accounts::Entity.table_name(), "accounts");
        assert_eq!(
            external_identity_links::Entity.table_name(),
            "external_identity_links"
        );
        assert_eq!(exercises::Entity.table_name(), "exercises");
        assert_eq!(submissions::Entity.table_name(), "submissions");
    }

    #[test]
    fn test_submission_columns() {
        let columns: Vec<String> = submissions::Column::iter()
            .map(|c| format!("{c:?}"))
            .collect();
        assert_eq!(
            columns,
            vec!["Id", "AccountId", "ExerciseId", "Code", "Passed", "CreatedAt", "UpdatedAt"]
        );
    }
}
