//! # 练习题处理器

use axum::extract::{Path, Query, State, rejection::QueryRejection};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::exercises::ExerciseView;
use crate::server::AppState;
use crate::server::response::Envelope;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub category: Option<String>,
}

/// `GET /api/exercises?category=...`
pub async fn list(
    State(state): State<AppState>,
    params: std::result::Result<Query<ListParams>, QueryRejection>,
) -> Result<Envelope<Vec<ExerciseView>>> {
    let category = params
        .ok()
        .and_then(|Query(params)| params.category)
        .filter(|category| !category.is_empty())
        .ok_or_else(|| AppError::validation("category is required"))?;

    let exercises = state.exercises.list_by_category(&category).await?;
    Ok(Envelope::ok("challenges", exercises))
}

/// `GET /api/exercises/{id}`
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Envelope<ExerciseView>> {
    let id: i32 = id.parse().map_err(|_| AppError::validation("invalid id"))?;
    let exercise = state.exercises.get_active(id).await?;
    Ok(Envelope::ok("challenge", exercise))
}
