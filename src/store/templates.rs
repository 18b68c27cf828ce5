use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, LoaderTrait,
    ModelTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};

use super::{Page, WorkoutStore};
use crate::entity::{workout_exercise, workout_template, Exercise, WorkoutExercise, WorkoutTemplate};
use crate::error::StoreError;

/// One prescribed exercise of a [`NewTemplate`]. Entries keep the order in
/// which they are given.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTemplateExercise {
    pub exercise_id: i32,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub weight: Option<f64>,
    /// Seconds.
    pub duration: Option<i32>,
    pub distance: Option<f64>,
    pub notes: Option<String>,
}

/// Fields of a template plus its full entry list.
///
/// Used both to create a template and to replace one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTemplate {
    pub user_id: Option<i32>,
    pub title: String,
    pub description: Option<String>,
    pub difficulty: Option<String>,
    /// Minutes.
    pub estimated_duration: Option<i32>,
    #[serde(default)]
    pub exercises: Vec<NewTemplateExercise>,
}

/// A template with its entries ordered by position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateWithExercises {
    #[serde(flatten)]
    pub template: workout_template::Model,
    pub exercises: Vec<workout_exercise::Model>,
}

impl WorkoutStore {
    /// Creates a template and its entries in one transaction.
    ///
    /// # Errors
    ///
    /// * `StoreError::NotFound` if an entry names an unknown exercise.
    /// * `StoreError::Conflict` if `user_id` names an unknown user.
    pub async fn create_template(
        &self,
        new: NewTemplate,
    ) -> Result<TemplateWithExercises, StoreError> {
        let txn = self.conn.begin().await?;

        let template = workout_template::ActiveModel {
            user_id: Set(new.user_id),
            title: Set(new.title),
            description: Set(new.description),
            difficulty: Set(new.difficulty),
            estimated_duration: Set(new.estimated_duration),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        let exercises = insert_entries(&txn, template.id, new.exercises).await?;

        txn.commit().await?;
        Ok(TemplateWithExercises {
            template,
            exercises,
        })
    }

    pub async fn get_template(&self, id: i32) -> Result<TemplateWithExercises, StoreError> {
        let template = WorkoutTemplate::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or(StoreError::NotFound {
                entity: "template",
                id,
            })?;
        let exercises = template
            .find_related(WorkoutExercise)
            .order_by_asc(workout_exercise::Column::Position)
            .order_by_asc(workout_exercise::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(TemplateWithExercises {
            template,
            exercises,
        })
    }

    /// Lists templates, newest first, each with its entries.
    pub async fn list_templates(
        &self,
        page: Page,
    ) -> Result<Vec<TemplateWithExercises>, StoreError> {
        let templates = WorkoutTemplate::find()
            .order_by_desc(workout_template::Column::CreatedAt)
            .order_by_desc(workout_template::Column::Id)
            .offset(page.skip)
            .limit(page.limit)
            .all(&self.conn)
            .await?;
        if templates.is_empty() {
            return Ok(Vec::new());
        }
        let entries = templates.load_many(WorkoutExercise, &self.conn).await?;

        Ok(templates
            .into_iter()
            .zip(entries)
            .map(|(template, mut exercises)| {
                exercises.sort_by_key(|e| (e.position, e.id));
                TemplateWithExercises {
                    template,
                    exercises,
                }
            })
            .collect())
    }

    /// Replaces a template's fields and entries. The owner is kept and
    /// `updated_at` is refreshed.
    pub async fn update_template(
        &self,
        id: i32,
        update: NewTemplate,
    ) -> Result<TemplateWithExercises, StoreError> {
        let txn = self.conn.begin().await?;

        let existing = WorkoutTemplate::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(StoreError::NotFound {
                entity: "template",
                id,
            })?;

        let mut row = existing.into_active_model();
        row.title = Set(update.title);
        row.description = Set(update.description);
        row.difficulty = Set(update.difficulty);
        row.estimated_duration = Set(update.estimated_duration);
        let template = row.update(&txn).await?;

        WorkoutExercise::delete_many()
            .filter(workout_exercise::Column::TemplateId.eq(id))
            .exec(&txn)
            .await?;
        let exercises = insert_entries(&txn, id, update.exercises).await?;

        txn.commit().await?;
        Ok(TemplateWithExercises {
            template,
            exercises,
        })
    }

    /// Deletes a template and its entries. Sessions started from it are
    /// kept with their template reference cleared.
    pub async fn delete_template(&self, id: i32) -> Result<(), StoreError> {
        let result = WorkoutTemplate::delete_by_id(id).exec(&self.conn).await?;
        if result.rows_affected == 0 {
            return Err(StoreError::NotFound {
                entity: "template",
                id,
            });
        }
        Ok(())
    }
}

async fn insert_entries<C>(
    db: &C,
    template_id: i32,
    entries: Vec<NewTemplateExercise>,
) -> Result<Vec<workout_exercise::Model>, StoreError>
where
    C: ConnectionTrait,
{
    let mut inserted = Vec::with_capacity(entries.len());
    for (position, entry) in entries.into_iter().enumerate() {
        if Exercise::find_by_id(entry.exercise_id).one(db).await?.is_none() {
            return Err(StoreError::NotFound {
                entity: "exercise",
                id: entry.exercise_id,
            });
        }

        let row = workout_exercise::ActiveModel {
            template_id: Set(template_id),
            exercise_id: Set(entry.exercise_id),
            position: Set(position as i32),
            sets: Set(entry.sets),
            reps: Set(entry.reps),
            weight: Set(entry.weight),
            duration: Set(entry.duration),
            distance: Set(entry.distance),
            notes: Set(entry.notes),
            ..Default::default()
        }
        .insert(db)
        .await?;
        inserted.push(row);
    }
    Ok(inserted)
}
