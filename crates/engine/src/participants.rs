//! Bill participants: per-bill membership plus the owed/paid amounts used
//! for settlement.

use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

/// A user's standing on one bill.
///
/// `amount_owed` is derived from the share calculator and refreshed by the
/// engine after every settlement-affecting mutation; `amount_paid` is
/// externally recorded and never derived.
#[derive(Clone, Debug, PartialEq)]
pub struct BillParticipant {
    pub id: String,
    pub bill_id: String,
    pub user_id: String,
    pub amount_owed: f64,
    pub amount_paid: f64,
}

impl BillParticipant {
    pub fn new(bill_id: String, user_id: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            bill_id,
            user_id,
            amount_owed: 0.0,
            amount_paid: 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bill_participants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub bill_id: String,
    pub user_id: String,
    pub amount_owed: f64,
    pub amount_paid: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bills::Entity",
        from = "Column::BillId",
        to = "super::bills::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Bills,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,
}

impl Related<super::bills::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bills.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&BillParticipant> for ActiveModel {
    fn from(value: &BillParticipant) -> Self {
        Self {
            id: ActiveValue::Set(value.id.clone()),
            bill_id: ActiveValue::Set(value.bill_id.clone()),
            user_id: ActiveValue::Set(value.user_id.clone()),
            amount_owed: ActiveValue::Set(value.amount_owed),
            amount_paid: ActiveValue::Set(value.amount_paid),
        }
    }
}

impl From<Model> for BillParticipant {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            bill_id: model.bill_id,
            user_id: model.user_id,
            amount_owed: model.amount_owed,
            amount_paid: model.amount_paid,
        }
    }
}
