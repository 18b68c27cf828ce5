use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;

use super::WorkoutStore;
use crate::entity::{accountability_partner, user, AccountabilityPartner, User};
use crate::error::StoreError;

/// Registration data. Hashing the password is the caller's job.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub hashed_password: String,
}

impl WorkoutStore {
    /// Registers a user. A taken email or username is a `StoreError::Conflict`.
    pub async fn create_user(&self, new: NewUser) -> Result<user::Model, StoreError> {
        let user = user::ActiveModel {
            email: Set(new.email),
            username: Set(new.username),
            hashed_password: Set(new.hashed_password),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?;
        Ok(user)
    }

    pub async fn get_user(&self, id: i32) -> Result<user::Model, StoreError> {
        find_user(&self.conn, id).await
    }

    /// Makes two users accountability partners.
    ///
    /// The relation is symmetric: pairing `a` with `b` also pairs `b` with
    /// `a`. Partnering a user with themselves, or pairing an existing pair
    /// again in either order, is a `StoreError::Conflict`.
    pub async fn add_partner(&self, user_id: i32, partner_id: i32) -> Result<(), StoreError> {
        if user_id == partner_id {
            return Err(StoreError::Conflict(
                "a user cannot be their own accountability partner".to_string(),
            ));
        }

        let txn = self.conn.begin().await?;
        find_user(&txn, user_id).await?;
        find_user(&txn, partner_id).await?;

        let existing = AccountabilityPartner::find()
            .filter(pair(user_id, partner_id))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(StoreError::Conflict(format!(
                "users {user_id} and {partner_id} are already partners"
            )));
        }

        accountability_partner::ActiveModel {
            user_id: Set(user_id),
            partner_id: Set(partner_id),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(())
    }

    /// Dissolves a partnership, whichever order it was created in.
    pub async fn remove_partner(&self, user_id: i32, partner_id: i32) -> Result<(), StoreError> {
        let result = AccountabilityPartner::delete_many()
            .filter(pair(user_id, partner_id))
            .exec(&self.conn)
            .await?;
        if result.rows_affected == 0 {
            return Err(StoreError::NotFound {
                entity: "partner",
                id: partner_id,
            });
        }
        Ok(())
    }

    /// Everyone `user_id` is partnered with, ordered by id.
    pub async fn partners_of(&self, user_id: i32) -> Result<Vec<user::Model>, StoreError> {
        find_user(&self.conn, user_id).await?;

        let partner_ids: Vec<i32> = AccountabilityPartner::find()
            .filter(
                Condition::any()
                    .add(accountability_partner::Column::UserId.eq(user_id))
                    .add(accountability_partner::Column::PartnerId.eq(user_id)),
            )
            .all(&self.conn)
            .await?
            .into_iter()
            .map(|row| {
                if row.user_id == user_id {
                    row.partner_id
                } else {
                    row.user_id
                }
            })
            .collect();

        if partner_ids.is_empty() {
            return Ok(Vec::new());
        }

        Ok(User::find()
            .filter(user::Column::Id.is_in(partner_ids))
            .order_by_asc(user::Column::Id)
            .all(&self.conn)
            .await?)
    }
}

async fn find_user<C>(db: &C, id: i32) -> Result<user::Model, StoreError>
where
    C: ConnectionTrait,
{
    User::find_by_id(id)
        .one(db)
        .await?
        .ok_or(StoreError::NotFound { entity: "user", id })
}

/// Matches the join row for `a` and `b` in either order.
fn pair(a: i32, b: i32) -> Condition {
    Condition::any()
        .add(
            Condition::all()
                .add(accountability_partner::Column::UserId.eq(a))
                .add(accountability_partner::Column::PartnerId.eq(b)),
        )
        .add(
            Condition::all()
                .add(accountability_partner::Column::UserId.eq(b))
                .add(accountability_partner::Column::PartnerId.eq(a)),
        )
}
