//! Bill items: the purchasable lines on a bill.

use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::EngineError;

/// A line item on a bill.
///
/// Invariants (`quantity >= 1`, `price >= 0`) are enforced at the engine
/// boundary before construction.
#[derive(Clone, Debug, PartialEq)]
pub struct BillItem {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub price: f64,
}

impl BillItem {
    pub fn new(name: String, quantity: u32, price: f64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            quantity,
            price,
        }
    }

    /// Full monetary value of the line (unit price times quantity).
    pub fn value(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bill_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub bill_id: String,
    pub name: String,
    pub quantity: i32,
    pub price: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::selections::Entity")]
    Selections,
    #[sea_orm(
        belongs_to = "super::bills::Entity",
        from = "Column::BillId",
        to = "super::bills::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Bills,
}

impl Related<super::selections::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Selections.def()
    }
}

impl Related<super::bills::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bills.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&BillItem> for ActiveModel {
    fn from(value: &BillItem) -> Self {
        Self {
            id: ActiveValue::Set(value.id.clone()),
            bill_id: ActiveValue::NotSet,
            name: ActiveValue::Set(value.name.clone()),
            quantity: ActiveValue::Set(value.quantity as i32),
            price: ActiveValue::Set(value.price),
        }
    }
}

impl TryFrom<Model> for BillItem {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(model.quantity)
            .map_err(|_| EngineError::InvalidAmount("negative item quantity".to_string()))?;
        Ok(Self {
            id: model.id,
            name: model.name,
            quantity,
            price: model.price,
        })
    }
}
