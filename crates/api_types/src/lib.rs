//! Shared request/response types for the tabsplit HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserNew {
        pub name: String,
        pub email: String,
        pub phone: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: String,
        pub name: String,
        pub email: String,
        pub phone: Option<String>,
    }
}

pub mod bill {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BillNew {
        pub name: Option<String>,
        pub subtotal: Option<f64>,
        pub tax: Option<f64>,
        pub service_charge: Option<f64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BillUpdate {
        pub bill_id: String,
        pub name: Option<String>,
        pub subtotal: Option<f64>,
        pub tax: Option<f64>,
        pub service_charge: Option<f64>,
    }

    /// Query for listing the bills a user participates in.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BillListQuery {
        pub user_id: String,
    }

    /// Join an existing bill by its share code.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BillJoin {
        pub group_code: String,
        pub user_id: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BillView {
        pub id: String,
        pub group_code: String,
        pub name: String,
        pub subtotal: f64,
        pub tax: f64,
        pub service_charge: f64,
        pub total: f64,
        pub created_at: DateTime<Utc>,
    }

    /// A bill with everything a client needs to render it.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BillSnapshotResponse {
        pub bill: BillView,
        pub items: Vec<super::item::ItemView>,
        pub selections: Vec<super::selection::SelectionView>,
        pub participants: Vec<super::payment::ParticipantView>,
    }
}

pub mod item {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemNew {
        pub bill_id: String,
        pub name: String,
        /// Defaults to 1.
        pub quantity: Option<u32>,
        pub price: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemUpdate {
        pub bill_id: String,
        pub name: Option<String>,
        pub quantity: Option<u32>,
        pub price: Option<f64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemDelete {
        pub bill_id: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemView {
        pub id: String,
        pub name: String,
        pub quantity: u32,
        pub price: f64,
    }
}

pub mod selection {
    use super::*;

    /// Upsert a claim; with `toggle` set, flips the claim on/off instead.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SelectionSet {
        pub bill_id: String,
        pub item_id: String,
        pub user_id: String,
        /// Defaults to 1.
        pub split_ratio: Option<f64>,
        /// Defaults to false.
        pub toggle: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SelectionRemove {
        pub bill_id: String,
        pub item_id: String,
        pub user_id: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SelectionView {
        pub id: String,
        pub item_id: String,
        pub user_id: String,
        pub split_ratio: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SelectionToggled {
        pub selected: bool,
    }
}

pub mod payment {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentUpdate {
        pub bill_id: String,
        pub user_id: String,
        pub amount_paid: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ParticipantView {
        pub user_id: String,
        pub name: String,
        pub amount_owed: f64,
        pub amount_paid: f64,
    }
}

pub mod breakdown {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemContributionView {
        pub item_id: String,
        pub name: String,
        pub amount: f64,
        pub split_ratio: f64,
        pub is_shared: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserBreakdownView {
        pub user_id: String,
        pub items_subtotal: f64,
        pub tax_share: f64,
        pub service_charge_share: f64,
        pub total: f64,
        pub percentage: f64,
        pub items: Vec<ItemContributionView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BreakdownResponse {
        pub breakdowns: Vec<UserBreakdownView>,
        /// Items nobody has claimed yet.
        pub unclaimed_items: Vec<super::item::ItemView>,
    }
}

pub mod settlement {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PartyView {
        pub user_id: String,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettlementView {
        pub from: PartyView,
        pub to: PartyView,
        pub amount: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettlementsResponse {
        pub settlements: Vec<SettlementView>,
    }
}

pub mod receipt {
    use super::*;

    /// A receipt image to run through the extraction service.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReceiptScan {
        /// Base64-encoded image, with or without a `data:image/...` prefix.
        pub image: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ExtractedItem {
        pub name: String,
        pub quantity: u32,
        pub price: f64,
    }

    /// Best-effort structured data pulled from a receipt image.
    ///
    /// This is ordinary user-entered data as far as the rest of the system
    /// is concerned; clients submit it through the normal item endpoints.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ExtractedBill {
        pub restaurant_name: Option<String>,
        pub items: Vec<ExtractedItem>,
        pub subtotal: f64,
        pub tax: f64,
        pub service_charge: f64,
        pub discount: f64,
        pub total: f64,
    }
}
