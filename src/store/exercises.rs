use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use serde::{Deserialize, Serialize};

use super::{Page, WorkoutStore};
use crate::entity::exercise::{self, Entity as Exercise};
use crate::error::StoreError;

/// Narrows [`WorkoutStore::list_exercises`]. Empty fields match everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExerciseFilter {
    pub category: Option<String>,
    pub difficulty: Option<String>,
    /// Case-insensitive substring of the title or description.
    pub search: Option<String>,
}

/// One page of exercises plus the number of rows matching the filter.
#[derive(Debug, Clone, Serialize)]
pub struct ExercisePage {
    pub exercises: Vec<exercise::Model>,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

impl WorkoutStore {
    /// Lists exercises ordered by title, filtered and paginated.
    pub async fn list_exercises(
        &self,
        filter: &ExerciseFilter,
        page: Page,
    ) -> Result<ExercisePage, StoreError> {
        let mut query = Exercise::find();

        if let Some(category) = &filter.category {
            query = query.filter(exercise::Column::Category.eq(category.as_str()));
        }
        if let Some(difficulty) = &filter.difficulty {
            query = query.filter(exercise::Column::Difficulty.eq(difficulty.as_str()));
        }
        if let Some(search) = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            let pattern = format!("%{}%", search.to_lowercase());
            query = query.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col((
                            Exercise,
                            exercise::Column::Title,
                        ))))
                        .like(pattern.clone()),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col((
                            Exercise,
                            exercise::Column::Description,
                        ))))
                        .like(pattern),
                    ),
            );
        }

        let total = query.clone().count(&self.conn).await?;
        let exercises = query
            .order_by_asc(exercise::Column::Title)
            .order_by_asc(exercise::Column::Id)
            .offset(page.skip)
            .limit(page.limit)
            .all(&self.conn)
            .await?;

        Ok(ExercisePage { exercises, total })
    }

    /// Distinct categories with the number of exercises in each.
    pub async fn exercise_categories(&self) -> Result<Vec<CategoryCount>, StoreError> {
        let categories = Exercise::find()
            .select_only()
            .column(exercise::Column::Category)
            .column_as(exercise::Column::Id.count(), "count")
            .group_by(exercise::Column::Category)
            .order_by_asc(exercise::Column::Category)
            .into_model::<CategoryCount>()
            .all(&self.conn)
            .await?;
        Ok(categories)
    }

    pub async fn get_exercise(&self, id: i32) -> Result<exercise::Model, StoreError> {
        Exercise::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or(StoreError::NotFound {
                entity: "exercise",
                id,
            })
    }

    /// Number of exercises in the library.
    pub async fn exercise_count(&self) -> Result<u64, StoreError> {
        Ok(Exercise::find().count(&self.conn).await?)
    }
}
