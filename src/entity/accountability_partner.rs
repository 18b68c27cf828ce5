//! Accountability partner join entity.
//!
//! A row `(user_id, partner_id)` records that two users keep each other
//! accountable. The relation carries no direction: a row in either order
//! makes the two users partners, and at most one row exists per pair.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accountability_partners")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub partner_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::PartnerId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Partner,
}

impl ActiveModelBehavior for ActiveModel {}
