use axum::{
    Router,
    routing::{get, post},
};

use std::sync::Arc;

use crate::{bills, breakdowns, items, payments, receipt, selections, settlements, users};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    /// Absent when no extraction service is configured; the receipt route
    /// then answers 503.
    pub receipt: Option<Arc<receipt::ReceiptService>>,
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/users", post(users::create))
        .route("/users/{email}", get(users::get_by_email))
        .route(
            "/bills",
            post(bills::create).patch(bills::update).get(bills::list),
        )
        .route("/bills/join", post(bills::join))
        .route("/bills/{group_code}", get(bills::get_by_code))
        .route("/bills/{bill_id}/payments", get(payments::list))
        .route("/bills/{bill_id}/breakdowns", get(breakdowns::get_breakdowns))
        .route("/bills/{bill_id}/settlements", get(settlements::get_settlements))
        .route("/items", post(items::create))
        .route(
            "/items/{item_id}",
            axum::routing::patch(items::update).delete(items::remove),
        )
        .route(
            "/selections",
            post(selections::set).delete(selections::remove),
        )
        .route("/payments", axum::routing::patch(payments::update))
        .route("/receipt", post(receipt::scan))
        .with_state(state)
}

pub async fn run(engine: Engine, receipt: Option<receipt::ReceiptService>) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, receipt, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    receipt: Option<receipt::ReceiptService>,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        receipt: receipt.map(Arc::new),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    receipt: Option<receipt::ReceiptService>,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, receipt, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
