use entity::exercises;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// 对外展示的练习题，不包含启用状态与时间戳
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseView {
    pub id: i32,
    pub slug: String,
    pub category: String,
    pub title: String,
    pub description: String,
    pub template: String,
    pub test_code: String,
    pub hints: String,
}

impl From<exercises::Model> for ExerciseView {
    fn from(model: exercises::Model) -> Self {
        Self {
            id: model.id,
            slug: model.slug,
            category: model.category,
            title: model.title,
            description: model.description,
            template: model.template,
            test_code: model.test_code,
            hints: model.hints,
        }
    }
}

/// 练习题目录
#[derive(Debug, Clone)]
pub struct ExerciseCatalog {
    db: DatabaseConnection,
}

impl ExerciseCatalog {
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// 按分类列出启用的练习题，按 ID 升序
    pub async fn list_by_category(&self, category: &str) -> Result<Vec<ExerciseView>> {
        let rows = exercises::Entity::find()
            .filter(exercises::Column::Category.eq(category))
            .filter(exercises::Column::IsActive.eq(true))
            .order_by_asc(exercises::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(ExerciseView::from).collect())
    }

    /// 获取启用的练习题，不存在或已停用时返回 `NotFound`
    pub async fn get_active(&self, id: i32) -> Result<ExerciseView> {
        exercises::Entity::find_by_id(id)
            .filter(exercises::Column::IsActive.eq(true))
            .one(&self.db)
            .await?
            .map(ExerciseView::from)
            .ok_or_else(|| AppError::not_found("challenge not found"))
    }
}
