//! Bill splitting engine.
//!
//! The calculation core lives in [`split`] (per-user share breakdowns) and
//! [`settle`] (peer-to-peer settlement matching); both are pure functions
//! over plain records. The [`Engine`] wraps them with the storage layer:
//! it owns bills, items, users, selections and participants, serializes
//! mutations per bill, and refreshes each participant's owed amount after
//! every settlement-affecting change.

use std::collections::HashMap;
use std::sync::Arc;

pub use bills::Bill;
pub use error::EngineError;
pub use items::BillItem;
pub use participants::BillParticipant;
pub use rounding::round_to_two;
use sea_orm::{
    ActiveValue, DatabaseTransaction, JoinType, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*,
};
pub use selections::ItemSelection;
pub use settle::{ParticipantBalance, Settlement, SettlementParty, compute_settlements};
pub use split::{
    BillTotals, ItemContribution, UserBreakdown, compute_shares, totals_from_items,
    unassigned_items, user_share,
};
use tokio::sync::Mutex;
pub use users::User;

mod bills;
mod error;
mod items;
mod participants;
mod rounding;
mod selections;
pub mod settle;
pub mod split;
mod users;

pub(crate) type ResultEngine<T> = Result<T, EngineError>;

/// A consistent read of one bill: the bill row plus its items, selections
/// and participants (with user display names).
#[derive(Clone, Debug)]
pub struct BillSnapshot {
    pub bill: Bill,
    pub items: Vec<BillItem>,
    pub selections: Vec<ItemSelection>,
    pub participants: Vec<ParticipantBalance>,
}

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    /// Per-bill write locks: mutations and snapshot reads of the same bill
    /// are serialized so the calculator never observes a torn state.
    bill_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    async fn bill_lock(&self, bill_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.bill_locks.lock().await;
        locks.entry(bill_id.to_string()).or_default().clone()
    }

    // ── Users ────────────────────────────────────────────────────────────

    /// Create a user. Email addresses are unique.
    pub async fn new_user(
        &self,
        name: &str,
        email: &str,
        phone: Option<&str>,
    ) -> ResultEngine<User> {
        if name.trim().is_empty() {
            return Err(EngineError::InvalidInput("name must not be empty".to_string()));
        }

        let existing = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.database)
            .await?;
        if existing.is_some() {
            return Err(EngineError::ExistingKey(email.to_string()));
        }

        let user = User::new(
            name.to_string(),
            email.to_string(),
            phone.map(|s| s.to_string()),
        );
        users::ActiveModel::from(&user).insert(&self.database).await?;
        Ok(user)
    }

    /// Return a user by id.
    pub async fn user(&self, user_id: &str) -> ResultEngine<User> {
        let model = users::Entity::find_by_id(user_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
        Ok(User::from(model))
    }

    /// Return a user by email address.
    pub async fn user_by_email(&self, email: &str) -> ResultEngine<User> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
        Ok(User::from(model))
    }

    // ── Bills ────────────────────────────────────────────────────────────

    /// Create a bill with a unique group code.
    pub async fn new_bill(
        &self,
        name: Option<&str>,
        subtotal: f64,
        tax: f64,
        service_charge: f64,
    ) -> ResultEngine<Bill> {
        for amount in [subtotal, tax, service_charge] {
            if amount < 0.0 {
                return Err(EngineError::InvalidAmount(
                    "bill amounts must be >= 0".to_string(),
                ));
            }
        }

        let mut bill = Bill::new(
            name.unwrap_or("Untitled Bill").to_string(),
            subtotal,
            tax,
            service_charge,
        );

        // Regenerate on the (unlikely) group code collision.
        let mut attempts = 0;
        while attempts < 10 {
            let existing = bills::Entity::find()
                .filter(bills::Column::GroupCode.eq(bill.group_code.clone()))
                .one(&self.database)
                .await?;
            if existing.is_none() {
                break;
            }
            bill.group_code = bills::generate_group_code();
            attempts += 1;
        }

        bills::ActiveModel::from(&bill).insert(&self.database).await?;
        Ok(bill)
    }

    /// Update a bill's name and aggregate figures; the total is re-derived
    /// and participant owed amounts are refreshed.
    pub async fn update_bill(
        &self,
        bill_id: &str,
        name: Option<&str>,
        subtotal: Option<f64>,
        tax: Option<f64>,
        service_charge: Option<f64>,
    ) -> ResultEngine<Bill> {
        for amount in [subtotal, tax, service_charge].into_iter().flatten() {
            if amount < 0.0 {
                return Err(EngineError::InvalidAmount(
                    "bill amounts must be >= 0".to_string(),
                ));
            }
        }

        let lock = self.bill_lock(bill_id).await;
        let _guard = lock.lock().await;

        let db_tx = self.database.begin().await?;
        let model = Self::find_bill(&db_tx, bill_id).await?;

        let new_subtotal = subtotal.unwrap_or(model.subtotal);
        let new_tax = tax.unwrap_or(model.tax);
        let new_service_charge = service_charge.unwrap_or(model.service_charge);

        let updated = bills::ActiveModel {
            id: ActiveValue::Set(model.id.clone()),
            name: ActiveValue::Set(name.unwrap_or(&model.name).to_string()),
            subtotal: ActiveValue::Set(new_subtotal),
            tax: ActiveValue::Set(new_tax),
            service_charge: ActiveValue::Set(new_service_charge),
            total: ActiveValue::Set(new_subtotal + new_tax + new_service_charge),
            ..Default::default()
        };
        let updated = updated.update(&db_tx).await?;

        self.refresh_owed_amounts(&db_tx, &updated).await?;
        db_tx.commit().await?;

        Ok(Bill::from(updated))
    }

    /// Return a full bill snapshot by id.
    pub async fn bill(&self, bill_id: &str) -> ResultEngine<BillSnapshot> {
        let lock = self.bill_lock(bill_id).await;
        let _guard = lock.lock().await;
        self.snapshot(bill_id).await
    }

    /// Return a full bill snapshot by group code.
    pub async fn bill_by_code(&self, group_code: &str) -> ResultEngine<BillSnapshot> {
        let model = bills::Entity::find()
            .filter(bills::Column::GroupCode.eq(group_code))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("bill not exists".to_string()))?;

        let lock = self.bill_lock(&model.id).await;
        let _guard = lock.lock().await;
        self.snapshot(&model.id).await
    }

    /// Return the bills the user participates in, newest first.
    pub async fn bills_for_user(&self, user_id: &str) -> ResultEngine<Vec<Bill>> {
        self.user(user_id).await?;

        let rows = participants::Entity::find()
            .filter(participants::Column::UserId.eq(user_id))
            .find_also_related(bills::Entity)
            .order_by_desc(bills::Column::CreatedAt)
            .all(&self.database)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(_, bill)| bill.map(Bill::from))
            .collect())
    }

    /// Add the user as a participant of the bill addressed by `group_code`.
    ///
    /// Joining a bill twice is a no-op.
    pub async fn join_bill(&self, group_code: &str, user_id: &str) -> ResultEngine<Bill> {
        self.user(user_id).await?;
        let model = bills::Entity::find()
            .filter(bills::Column::GroupCode.eq(group_code))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("bill not exists".to_string()))?;

        let lock = self.bill_lock(&model.id).await;
        let _guard = lock.lock().await;

        let db_tx = self.database.begin().await?;
        Self::ensure_participant(&db_tx, &model.id, user_id).await?;
        db_tx.commit().await?;

        Ok(Bill::from(model))
    }

    // ── Items ────────────────────────────────────────────────────────────

    /// Add an item to a bill and bring the bill totals and participant owed
    /// amounts up to date.
    pub async fn add_item(
        &self,
        bill_id: &str,
        name: &str,
        quantity: u32,
        price: f64,
    ) -> ResultEngine<BillItem> {
        Self::validate_item(Some(name), Some(quantity), Some(price))?;

        let lock = self.bill_lock(bill_id).await;
        let _guard = lock.lock().await;

        let db_tx = self.database.begin().await?;
        let bill = Self::find_bill(&db_tx, bill_id).await?;

        let item = BillItem::new(name.to_string(), quantity, price);
        let mut item_model = items::ActiveModel::from(&item);
        item_model.bill_id = ActiveValue::Set(bill.id.clone());
        item_model.insert(&db_tx).await?;

        let bill = self.recompute_bill_totals(&db_tx, bill).await?;
        self.refresh_owed_amounts(&db_tx, &bill).await?;
        db_tx.commit().await?;

        Ok(item)
    }

    /// Update an item's name, quantity or price.
    pub async fn update_item(
        &self,
        bill_id: &str,
        item_id: &str,
        name: Option<&str>,
        quantity: Option<u32>,
        price: Option<f64>,
    ) -> ResultEngine<BillItem> {
        Self::validate_item(name, quantity, price)?;

        let lock = self.bill_lock(bill_id).await;
        let _guard = lock.lock().await;

        let db_tx = self.database.begin().await?;
        let bill = Self::find_bill(&db_tx, bill_id).await?;
        let model = Self::find_item(&db_tx, bill_id, item_id).await?;

        let updated = items::ActiveModel {
            id: ActiveValue::Set(model.id.clone()),
            name: ActiveValue::Set(name.unwrap_or(&model.name).to_string()),
            quantity: ActiveValue::Set(quantity.map_or(model.quantity, |q| q as i32)),
            price: ActiveValue::Set(price.unwrap_or(model.price)),
            ..Default::default()
        };
        let updated = updated.update(&db_tx).await?;

        let bill = self.recompute_bill_totals(&db_tx, bill).await?;
        self.refresh_owed_amounts(&db_tx, &bill).await?;
        db_tx.commit().await?;

        BillItem::try_from(updated)
    }

    /// Remove an item and all selections referencing it.
    pub async fn remove_item(&self, bill_id: &str, item_id: &str) -> ResultEngine<()> {
        let lock = self.bill_lock(bill_id).await;
        let _guard = lock.lock().await;

        let db_tx = self.database.begin().await?;
        let bill = Self::find_bill(&db_tx, bill_id).await?;
        let model = Self::find_item(&db_tx, bill_id, item_id).await?;

        selections::Entity::delete_many()
            .filter(selections::Column::ItemId.eq(model.id.clone()))
            .exec(&db_tx)
            .await?;
        items::Entity::delete_by_id(model.id).exec(&db_tx).await?;

        let bill = self.recompute_bill_totals(&db_tx, bill).await?;
        self.refresh_owed_amounts(&db_tx, &bill).await?;
        db_tx.commit().await?;

        Ok(())
    }

    // ── Selections ───────────────────────────────────────────────────────

    /// Create or update the user's claim on an item.
    ///
    /// A (item, user) pair has at most one selection; repeated calls merge
    /// into a ratio update.
    pub async fn set_selection(
        &self,
        bill_id: &str,
        item_id: &str,
        user_id: &str,
        split_ratio: f64,
    ) -> ResultEngine<ItemSelection> {
        if !(0.0..=1.0).contains(&split_ratio) {
            return Err(EngineError::InvalidAmount(
                "split_ratio must be within [0, 1]".to_string(),
            ));
        }
        self.user(user_id).await?;

        let lock = self.bill_lock(bill_id).await;
        let _guard = lock.lock().await;

        let db_tx = self.database.begin().await?;
        let bill = Self::find_bill(&db_tx, bill_id).await?;
        Self::find_item(&db_tx, bill_id, item_id).await?;

        let existing = Self::find_selection(&db_tx, item_id, user_id).await?;
        let selection = match existing {
            Some(model) => {
                let updated = selections::ActiveModel {
                    id: ActiveValue::Set(model.id.clone()),
                    split_ratio: ActiveValue::Set(split_ratio),
                    ..Default::default()
                };
                ItemSelection::from(updated.update(&db_tx).await?)
            }
            None => {
                let selection =
                    ItemSelection::new(item_id.to_string(), user_id.to_string(), split_ratio);
                selections::ActiveModel::from(&selection).insert(&db_tx).await?;
                selection
            }
        };

        Self::ensure_participant(&db_tx, bill_id, user_id).await?;
        self.refresh_owed_amounts(&db_tx, &bill).await?;
        db_tx.commit().await?;

        Ok(selection)
    }

    /// Toggle the user's claim on an item: select with ratio 1 when absent,
    /// unselect when present. Returns whether the item is now selected.
    pub async fn toggle_selection(
        &self,
        bill_id: &str,
        item_id: &str,
        user_id: &str,
    ) -> ResultEngine<bool> {
        self.user(user_id).await?;

        let lock = self.bill_lock(bill_id).await;
        let _guard = lock.lock().await;

        let db_tx = self.database.begin().await?;
        let bill = Self::find_bill(&db_tx, bill_id).await?;
        Self::find_item(&db_tx, bill_id, item_id).await?;

        let selected = match Self::find_selection(&db_tx, item_id, user_id).await? {
            Some(model) => {
                selections::Entity::delete_by_id(model.id).exec(&db_tx).await?;
                false
            }
            None => {
                let selection =
                    ItemSelection::new(item_id.to_string(), user_id.to_string(), 1.0);
                selections::ActiveModel::from(&selection).insert(&db_tx).await?;
                Self::ensure_participant(&db_tx, bill_id, user_id).await?;
                true
            }
        };

        self.refresh_owed_amounts(&db_tx, &bill).await?;
        db_tx.commit().await?;

        Ok(selected)
    }

    /// Remove the user's claim on an item entirely.
    pub async fn remove_selection(
        &self,
        bill_id: &str,
        item_id: &str,
        user_id: &str,
    ) -> ResultEngine<()> {
        let lock = self.bill_lock(bill_id).await;
        let _guard = lock.lock().await;

        let db_tx = self.database.begin().await?;
        let bill = Self::find_bill(&db_tx, bill_id).await?;
        Self::find_item(&db_tx, bill_id, item_id).await?;

        let model = Self::find_selection(&db_tx, item_id, user_id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("selection not exists".to_string()))?;
        selections::Entity::delete_by_id(model.id).exec(&db_tx).await?;

        self.refresh_owed_amounts(&db_tx, &bill).await?;
        db_tx.commit().await?;

        Ok(())
    }

    // ── Payments & settlement ────────────────────────────────────────────

    /// Record what a participant has paid toward the bill. The engine never
    /// derives payments; this is the payment-recording collaborator surface.
    pub async fn record_payment(
        &self,
        bill_id: &str,
        user_id: &str,
        amount_paid: f64,
    ) -> ResultEngine<BillParticipant> {
        if amount_paid < 0.0 {
            return Err(EngineError::InvalidAmount(
                "amount_paid must be >= 0".to_string(),
            ));
        }

        let lock = self.bill_lock(bill_id).await;
        let _guard = lock.lock().await;

        let model = participants::Entity::find()
            .filter(participants::Column::BillId.eq(bill_id))
            .filter(participants::Column::UserId.eq(user_id))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("participant not exists".to_string()))?;

        let updated = participants::ActiveModel {
            id: ActiveValue::Set(model.id.clone()),
            amount_paid: ActiveValue::Set(amount_paid),
            ..Default::default()
        };
        let updated = updated.update(&self.database).await?;

        Ok(BillParticipant::from(updated))
    }

    /// Per-user breakdowns for a bill, keyed by user id.
    pub async fn breakdowns(
        &self,
        bill_id: &str,
    ) -> ResultEngine<HashMap<String, UserBreakdown>> {
        let snapshot = self.bill(bill_id).await?;
        Ok(compute_shares(
            &snapshot.items,
            &snapshot.selections,
            &snapshot.bill.totals(),
        ))
    }

    /// Items nobody has claimed yet.
    pub async fn unclaimed_items(&self, bill_id: &str) -> ResultEngine<Vec<BillItem>> {
        let snapshot = self.bill(bill_id).await?;
        Ok(unassigned_items(&snapshot.items, &snapshot.selections)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Settlement transactions that zero out the stored participant balances.
    pub async fn settlements(&self, bill_id: &str) -> ResultEngine<Vec<Settlement>> {
        let snapshot = self.bill(bill_id).await?;
        Ok(compute_settlements(&snapshot.participants))
    }

    // ── Internals ────────────────────────────────────────────────────────

    fn validate_item(
        name: Option<&str>,
        quantity: Option<u32>,
        price: Option<f64>,
    ) -> ResultEngine<()> {
        if let Some(name) = name
            && name.trim().is_empty()
        {
            return Err(EngineError::InvalidInput(
                "item name must not be empty".to_string(),
            ));
        }
        if let Some(quantity) = quantity
            && quantity < 1
        {
            return Err(EngineError::InvalidAmount(
                "quantity must be >= 1".to_string(),
            ));
        }
        if let Some(price) = price
            && price < 0.0
        {
            return Err(EngineError::InvalidAmount("price must be >= 0".to_string()));
        }
        Ok(())
    }

    async fn find_bill<C: ConnectionTrait>(conn: &C, bill_id: &str) -> ResultEngine<bills::Model> {
        bills::Entity::find_by_id(bill_id)
            .one(conn)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("bill not exists".to_string()))
    }

    async fn find_item<C: ConnectionTrait>(
        conn: &C,
        bill_id: &str,
        item_id: &str,
    ) -> ResultEngine<items::Model> {
        let model = items::Entity::find_by_id(item_id)
            .one(conn)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("item not exists".to_string()))?;
        if model.bill_id != bill_id {
            return Err(EngineError::KeyNotFound("item not exists".to_string()));
        }
        Ok(model)
    }

    async fn find_selection<C: ConnectionTrait>(
        conn: &C,
        item_id: &str,
        user_id: &str,
    ) -> ResultEngine<Option<selections::Model>> {
        Ok(selections::Entity::find()
            .filter(selections::Column::ItemId.eq(item_id))
            .filter(selections::Column::UserId.eq(user_id))
            .one(conn)
            .await?)
    }

    async fn ensure_participant(
        db_tx: &DatabaseTransaction,
        bill_id: &str,
        user_id: &str,
    ) -> ResultEngine<()> {
        let existing = participants::Entity::find()
            .filter(participants::Column::BillId.eq(bill_id))
            .filter(participants::Column::UserId.eq(user_id))
            .one(db_tx)
            .await?;
        if existing.is_none() {
            let participant = BillParticipant::new(bill_id.to_string(), user_id.to_string());
            participants::ActiveModel::from(&participant).insert(db_tx).await?;
        }
        Ok(())
    }

    async fn load_items<C: ConnectionTrait>(
        &self,
        conn: &C,
        bill_id: &str,
    ) -> ResultEngine<Vec<BillItem>> {
        let models = items::Entity::find()
            .filter(items::Column::BillId.eq(bill_id))
            .all(conn)
            .await?;
        models.into_iter().map(BillItem::try_from).collect()
    }

    async fn load_selections<C: ConnectionTrait>(
        &self,
        conn: &C,
        bill_id: &str,
    ) -> ResultEngine<Vec<ItemSelection>> {
        let models = selections::Entity::find()
            .join(JoinType::InnerJoin, selections::Relation::Items.def())
            .filter(items::Column::BillId.eq(bill_id))
            .all(conn)
            .await?;
        Ok(models.into_iter().map(ItemSelection::from).collect())
    }

    async fn load_participants<C: ConnectionTrait>(
        &self,
        conn: &C,
        bill_id: &str,
    ) -> ResultEngine<Vec<ParticipantBalance>> {
        let rows: Vec<(participants::Model, Option<users::Model>)> = participants::Entity::find()
            .filter(participants::Column::BillId.eq(bill_id))
            .find_also_related(users::Entity)
            .all(conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(participant, user)| ParticipantBalance {
                user_id: participant.user_id,
                name: user.map(|u| u.name).unwrap_or_default(),
                amount_owed: participant.amount_owed,
                amount_paid: participant.amount_paid,
            })
            .collect())
    }

    async fn snapshot(&self, bill_id: &str) -> ResultEngine<BillSnapshot> {
        let db_tx = self.database.begin().await?;
        let bill = Self::find_bill(&db_tx, bill_id).await?;
        let items = self.load_items(&db_tx, bill_id).await?;
        let selections = self.load_selections(&db_tx, bill_id).await?;
        let participants = self.load_participants(&db_tx, bill_id).await?;
        db_tx.commit().await?;

        Ok(BillSnapshot {
            bill: Bill::from(bill),
            items,
            selections,
            participants,
        })
    }

    /// Re-derives the bill subtotal/total from the item list and persists
    /// the result. Returns the updated bill row.
    async fn recompute_bill_totals(
        &self,
        db_tx: &DatabaseTransaction,
        bill: bills::Model,
    ) -> ResultEngine<bills::Model> {
        let items = self.load_items(db_tx, &bill.id).await?;
        let totals = totals_from_items(&items, bill.tax, bill.service_charge);

        let updated = bills::ActiveModel {
            id: ActiveValue::Set(bill.id.clone()),
            subtotal: ActiveValue::Set(totals.subtotal),
            total: ActiveValue::Set(totals.total),
            ..Default::default()
        };
        Ok(updated.update(db_tx).await?)
    }

    /// Persists each participant's `amount_owed` from the share calculator
    /// output, 0 when the user has no selections.
    async fn refresh_owed_amounts(
        &self,
        db_tx: &DatabaseTransaction,
        bill: &bills::Model,
    ) -> ResultEngine<()> {
        let items = self.load_items(db_tx, &bill.id).await?;
        let selections = self.load_selections(db_tx, &bill.id).await?;
        let totals = Bill::from(bill.clone()).totals();
        let breakdowns = compute_shares(&items, &selections, &totals);

        let participant_models = participants::Entity::find()
            .filter(participants::Column::BillId.eq(bill.id.clone()))
            .all(db_tx)
            .await?;

        for participant in participant_models {
            let owed = breakdowns
                .get(&participant.user_id)
                .map_or(0.0, |b| b.total);
            let updated = participants::ActiveModel {
                id: ActiveValue::Set(participant.id),
                amount_owed: ActiveValue::Set(owed),
                ..Default::default()
            };
            updated.update(db_tx).await?;
        }

        Ok(())
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> Engine {
        Engine {
            database: self.database,
            bill_locks: Mutex::new(HashMap::new()),
        }
    }
}
