//! Item selections: a user's claim on a fractional share of one item.

use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

/// One user's claim on one item.
///
/// A user has at most one selection per item; repeated claims merge into an
/// update of `split_ratio`. Ratios on the same item are not required to sum
/// to 1 (the share calculator normalizes by the sum actually present).
#[derive(Clone, Debug, PartialEq)]
pub struct ItemSelection {
    pub id: String,
    pub item_id: String,
    pub user_id: String,
    pub split_ratio: f64,
}

impl ItemSelection {
    pub fn new(item_id: String, user_id: String, split_ratio: f64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            item_id,
            user_id,
            split_ratio,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "item_selections")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub item_id: String,
    pub user_id: String,
    pub split_ratio: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::items::Entity",
        from = "Column::ItemId",
        to = "super::items::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Items,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,
}

impl Related<super::items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ItemSelection> for ActiveModel {
    fn from(value: &ItemSelection) -> Self {
        Self {
            id: ActiveValue::Set(value.id.clone()),
            item_id: ActiveValue::Set(value.item_id.clone()),
            user_id: ActiveValue::Set(value.user_id.clone()),
            split_ratio: ActiveValue::Set(value.split_ratio),
        }
    }
}

impl From<Model> for ItemSelection {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            item_id: model.item_id,
            user_id: model.user_id,
            split_ratio: model.split_ratio,
        }
    }
}
