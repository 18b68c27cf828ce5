use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};

use super::{Page, WorkoutStore};
use crate::entity::{workout_session, workout_set, Exercise, WorkoutSession, WorkoutSet, WorkoutTemplate};
use crate::error::StoreError;

/// A session with its recorded sets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionWithSets {
    #[serde(flatten)]
    pub session: workout_session::Model,
    pub sets: Vec<workout_set::Model>,
}

/// Values performed for one set.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSet {
    pub exercise_id: i32,
    /// Defaults to the next number for this exercise within the session.
    pub set_number: Option<i32>,
    pub reps: Option<i32>,
    pub weight: Option<f64>,
    pub duration: Option<i32>,
    pub distance: Option<f64>,
    #[serde(default = "default_completed")]
    pub completed: bool,
    pub notes: Option<String>,
}

fn default_completed() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionStats {
    pub total: u64,
    pub completed: u64,
    /// `completed / total`, or 0 when there are no sessions.
    pub completion_rate: f64,
}

impl WorkoutStore {
    /// Starts a session from a template. The session belongs to the
    /// template's owner.
    pub async fn start_session(
        &self,
        template_id: i32,
    ) -> Result<workout_session::Model, StoreError> {
        let template = WorkoutTemplate::find_by_id(template_id)
            .one(&self.conn)
            .await?
            .ok_or(StoreError::NotFound {
                entity: "template",
                id: template_id,
            })?;

        let session = workout_session::ActiveModel {
            template_id: Set(Some(template.id)),
            user_id: Set(template.user_id),
            start_time: Set(Utc::now()),
            completed: Set(false),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?;
        Ok(session)
    }

    /// Marks a session completed and stamps its end time.
    ///
    /// Completing a session twice is a `StoreError::Conflict`.
    pub async fn complete_session(
        &self,
        id: i32,
        notes: Option<String>,
    ) -> Result<workout_session::Model, StoreError> {
        let session = self.find_session(id).await?;
        if session.completed {
            return Err(StoreError::Conflict(format!(
                "session {id} is already completed"
            )));
        }

        let mut row = session.into_active_model();
        row.completed = Set(true);
        row.end_time = Set(Some(Utc::now()));
        if notes.is_some() {
            row.notes = Set(notes);
        }
        Ok(row.update(&self.conn).await?)
    }

    pub async fn get_session(&self, id: i32) -> Result<SessionWithSets, StoreError> {
        let session = self.find_session(id).await?;
        let sets = session
            .find_related(WorkoutSet)
            .order_by_asc(workout_set::Column::ExerciseId)
            .order_by_asc(workout_set::Column::SetNumber)
            .order_by_asc(workout_set::Column::Id)
            .all(&self.conn)
            .await?;
        Ok(SessionWithSets { session, sets })
    }

    /// Sessions ordered by start time, most recent first, optionally only
    /// completed or only open ones.
    pub async fn session_history(
        &self,
        completed: Option<bool>,
        page: Page,
    ) -> Result<Vec<workout_session::Model>, StoreError> {
        let mut query = WorkoutSession::find();
        if let Some(completed) = completed {
            query = query.filter(workout_session::Column::Completed.eq(completed));
        }
        Ok(query
            .order_by_desc(workout_session::Column::StartTime)
            .order_by_desc(workout_session::Column::Id)
            .offset(page.skip)
            .limit(page.limit)
            .all(&self.conn)
            .await?)
    }

    pub async fn session_stats(&self) -> Result<SessionStats, StoreError> {
        let total = WorkoutSession::find().count(&self.conn).await?;
        let completed = WorkoutSession::find()
            .filter(workout_session::Column::Completed.eq(true))
            .count(&self.conn)
            .await?;
        let completion_rate = if total == 0 {
            0.0
        } else {
            completed as f64 / total as f64
        };

        Ok(SessionStats {
            total,
            completed,
            completion_rate,
        })
    }

    /// Deletes a session together with its sets.
    pub async fn delete_session(&self, id: i32) -> Result<(), StoreError> {
        let result = WorkoutSession::delete_by_id(id).exec(&self.conn).await?;
        if result.rows_affected == 0 {
            return Err(StoreError::NotFound {
                entity: "session",
                id,
            });
        }
        Ok(())
    }

    /// Records one performed set against a session.
    pub async fn record_set(
        &self,
        session_id: i32,
        set: NewSet,
    ) -> Result<workout_set::Model, StoreError> {
        let txn = self.conn.begin().await?;

        if WorkoutSession::find_by_id(session_id).one(&txn).await?.is_none() {
            return Err(StoreError::NotFound {
                entity: "session",
                id: session_id,
            });
        }
        if Exercise::find_by_id(set.exercise_id).one(&txn).await?.is_none() {
            return Err(StoreError::NotFound {
                entity: "exercise",
                id: set.exercise_id,
            });
        }

        let set_number = match set.set_number {
            Some(number) => number,
            None => {
                let recorded = WorkoutSet::find()
                    .filter(workout_set::Column::SessionId.eq(session_id))
                    .filter(workout_set::Column::ExerciseId.eq(set.exercise_id))
                    .count(&txn)
                    .await?;
                recorded as i32 + 1
            }
        };

        let row = workout_set::ActiveModel {
            session_id: Set(session_id),
            exercise_id: Set(set.exercise_id),
            set_number: Set(set_number),
            reps: Set(set.reps),
            weight: Set(set.weight),
            duration: Set(set.duration),
            distance: Set(set.distance),
            completed: Set(set.completed),
            notes: Set(set.notes),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(row)
    }

    pub async fn delete_set(&self, id: i32) -> Result<(), StoreError> {
        let result = WorkoutSet::delete_by_id(id).exec(&self.conn).await?;
        if result.rows_affected == 0 {
            return Err(StoreError::NotFound { entity: "set", id });
        }
        Ok(())
    }

    async fn find_session(&self, id: i32) -> Result<workout_session::Model, StoreError> {
        WorkoutSession::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or(StoreError::NotFound {
                entity: "session",
                id,
            })
    }
}
