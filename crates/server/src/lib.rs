use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};

mod bills;
mod breakdowns;
mod items;
mod payments;
pub mod receipt;
mod selections;
mod server;
mod settlements;
mod users;

pub mod types {
    pub mod bill {
        pub use api_types::bill::{
            BillJoin, BillListQuery, BillNew, BillSnapshotResponse, BillUpdate, BillView,
        };
    }

    pub mod item {
        pub use api_types::item::{ItemDelete, ItemNew, ItemUpdate, ItemView};
    }

    pub mod selection {
        pub use api_types::selection::{
            SelectionRemove, SelectionSet, SelectionToggled, SelectionView,
        };
    }

    pub mod user {
        pub use api_types::user::{UserNew, UserView};
    }

    pub mod payment {
        pub use api_types::payment::{ParticipantView, PaymentUpdate};
    }

    pub mod breakdown {
        pub use api_types::breakdown::{
            BreakdownResponse, ItemContributionView, UserBreakdownView,
        };
    }

    pub mod settlement {
        pub use api_types::settlement::{PartyView, SettlementView, SettlementsResponse};
    }

    pub mod receipt {
        pub use api_types::receipt::{ExtractedBill, ExtractedItem, ReceiptScan};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
    /// The receipt-extraction collaborator failed or returned garbage.
    Upstream(String),
    /// A collaborator this deployment was not configured with.
    Unavailable(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidAmount(_) | EngineError::InvalidInput(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
            ServerError::Upstream(err) => {
                tracing::error!("upstream error: {err}");
                (
                    StatusCode::BAD_GATEWAY,
                    "receipt extraction failed".to_string(),
                )
            }
            ServerError::Unavailable(err) => (StatusCode::SERVICE_UNAVAILABLE, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
