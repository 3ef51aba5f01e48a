//! Bills: the shared receipt being split, addressed by a short group code.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::split::BillTotals;

/// Alphabet for group codes: uppercase letters and digits minus the
/// ambiguous ones (I, O, 0, 1).
const GROUP_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const GROUP_CODE_LEN: usize = 6;

/// Generates a 6-character group code. Uniqueness is enforced by the caller
/// (retry on collision against the stored bills).
pub(crate) fn generate_group_code() -> String {
    Uuid::new_v4()
        .as_bytes()
        .iter()
        .take(GROUP_CODE_LEN)
        .map(|b| GROUP_CODE_ALPHABET[(b % GROUP_CODE_ALPHABET.len() as u8) as usize] as char)
        .collect()
}

/// A bill with its aggregate monetary figures.
///
/// `subtotal` and `total` are kept consistent with the item list by the
/// engine whenever items change; `tax` and `service_charge` are entered by
/// the bill owner.
#[derive(Clone, Debug, PartialEq)]
pub struct Bill {
    pub id: String,
    pub group_code: String,
    pub name: String,
    pub subtotal: f64,
    pub tax: f64,
    pub service_charge: f64,
    pub total: f64,
    pub created_at: DateTime<Utc>,
}

impl Bill {
    pub fn new(name: String, subtotal: f64, tax: f64, service_charge: f64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            group_code: generate_group_code(),
            name,
            subtotal,
            tax,
            service_charge,
            total: subtotal + tax + service_charge,
            created_at: Utc::now(),
        }
    }

    /// The totals view consumed by the share calculator.
    pub fn totals(&self) -> BillTotals {
        BillTotals {
            subtotal: self.subtotal,
            tax: self.tax,
            service_charge: self.service_charge,
            total: self.total,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bills")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub group_code: String,
    pub name: String,
    pub subtotal: f64,
    pub tax: f64,
    pub service_charge: f64,
    pub total: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::items::Entity")]
    Items,
    #[sea_orm(has_many = "super::participants::Entity")]
    Participants,
}

impl Related<super::items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Related<super::participants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Bill> for ActiveModel {
    fn from(value: &Bill) -> Self {
        Self {
            id: ActiveValue::Set(value.id.clone()),
            group_code: ActiveValue::Set(value.group_code.clone()),
            name: ActiveValue::Set(value.name.clone()),
            subtotal: ActiveValue::Set(value.subtotal),
            tax: ActiveValue::Set(value.tax),
            service_charge: ActiveValue::Set(value.service_charge),
            total: ActiveValue::Set(value.total),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl From<Model> for Bill {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            group_code: model.group_code,
            name: model.name,
            subtotal: model.subtotal,
            tax: model.tax,
            service_charge: model.service_charge,
            total: model.total,
            created_at: model.created_at,
        }
    }
}
