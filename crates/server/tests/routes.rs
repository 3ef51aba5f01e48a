use migration::MigratorTrait;
use sea_orm::Database;
use serde_json::json;

use server::types::bill::{BillSnapshotResponse, BillView};
use server::types::breakdown::BreakdownResponse;
use server::types::item::ItemView;
use server::types::payment::ParticipantView;
use server::types::settlement::SettlementsResponse;
use server::types::user::UserView;

async fn spawn_server() -> String {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = engine::Engine::builder().database(db).build();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap();
    let addr = server::spawn_with_listener(engine, None, listener).unwrap();
    format!("http://{addr}")
}

async fn create_user(client: &reqwest::Client, base: &str, name: &str, email: &str) -> UserView {
    let res = client
        .post(format!("{base}/users"))
        .json(&json!({ "name": name, "email": email, "phone": null }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);
    res.json().await.unwrap()
}

async fn create_bill(client: &reqwest::Client, base: &str) -> BillView {
    let res = client
        .post(format!("{base}/bills"))
        .json(&json!({ "name": "Dinner", "subtotal": null, "tax": 10.0, "service_charge": null }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);
    res.json().await.unwrap()
}

async fn add_item(
    client: &reqwest::Client,
    base: &str,
    bill_id: &str,
    name: &str,
    price: f64,
) -> ItemView {
    let res = client
        .post(format!("{base}/items"))
        .json(&json!({ "bill_id": bill_id, "name": name, "quantity": 1, "price": price }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);
    res.json().await.unwrap()
}

#[tokio::test]
async fn user_creation_and_email_conflict() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let user = create_user(&client, &base, "Alice", "alice@example.com").await;
    assert_eq!(user.name, "Alice");

    let res = client
        .post(format!("{base}/users"))
        .json(&json!({ "name": "Alice", "email": "alice@example.com", "phone": null }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 409);
}

#[tokio::test]
async fn user_lookup_by_email() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let alice = create_user(&client, &base, "Alice", "alice@example.com").await;

    let res = client
        .get(format!("{base}/users/alice@example.com"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let found: UserView = res.json().await.unwrap();
    assert_eq!(found.id, alice.id);

    let res = client
        .get(format!("{base}/users/nobody@example.com"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn bills_are_listed_per_user() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let alice = create_user(&client, &base, "Alice", "alice@example.com").await;
    let bill = create_bill(&client, &base).await;

    let res = client
        .post(format!("{base}/bills/join"))
        .json(&json!({ "group_code": bill.group_code, "user_id": alice.id }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let res = client
        .get(format!("{base}/bills"))
        .query(&[("user_id", alice.id.as_str())])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let bills: Vec<BillView> = res.json().await.unwrap();
    assert_eq!(bills.len(), 1);
    assert_eq!(bills[0].id, bill.id);
}

#[tokio::test]
async fn bill_lookup_by_group_code() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let bill = create_bill(&client, &base).await;

    let res = client
        .get(format!("{base}/bills/{}", bill.group_code))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let snapshot: BillSnapshotResponse = res.json().await.unwrap();
    assert_eq!(snapshot.bill.id, bill.id);
    assert!(snapshot.items.is_empty());

    let res = client
        .get(format!("{base}/bills/NOCODE"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn bill_update_rederives_total() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let bill = create_bill(&client, &base).await;

    let res = client
        .patch(format!("{base}/bills"))
        .json(&json!({ "bill_id": bill.id, "name": "Brunch", "subtotal": 80.0, "tax": null, "service_charge": 4.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let updated: BillView = res.json().await.unwrap();
    assert_eq!(updated.name, "Brunch");
    assert_eq!(updated.total, 94.0);
}

#[tokio::test]
async fn claims_feed_breakdowns_and_unclaimed_items() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let alice = create_user(&client, &base, "Alice", "alice@example.com").await;
    let bill = create_bill(&client, &base).await;
    let pasta = add_item(&client, &base, &bill.id, "Pasta", 60.0).await;
    add_item(&client, &base, &bill.id, "Wine", 40.0).await;

    let res = client
        .post(format!("{base}/selections"))
        .json(&json!({
            "bill_id": bill.id,
            "item_id": pasta.id,
            "user_id": alice.id,
            "split_ratio": 1.0,
            "toggle": null,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);

    let res = client
        .get(format!("{base}/bills/{}/breakdowns", bill.id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let body: BreakdownResponse = res.json().await.unwrap();
    assert_eq!(body.breakdowns.len(), 1);
    assert_eq!(body.breakdowns[0].user_id, alice.id);
    // Alice claims the whole subtotal, so the full 10.0 tax is hers.
    assert_eq!(body.breakdowns[0].total, 70.0);
    assert_eq!(body.unclaimed_items.len(), 1);
    assert_eq!(body.unclaimed_items[0].name, "Wine");
}

#[tokio::test]
async fn payments_round_trip() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let alice = create_user(&client, &base, "Alice", "alice@example.com").await;
    let bill = create_bill(&client, &base).await;

    let res = client
        .post(format!("{base}/bills/join"))
        .json(&json!({ "group_code": bill.group_code, "user_id": alice.id }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let res = client
        .patch(format!("{base}/payments"))
        .json(&json!({ "bill_id": bill.id, "user_id": alice.id, "amount_paid": 25.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let res = client
        .get(format!("{base}/bills/{}/payments", bill.id))
        .send()
        .await
        .unwrap();
    let participants: Vec<ParticipantView> = res.json().await.unwrap();
    assert_eq!(participants.len(), 1);
    assert_eq!(participants[0].amount_paid, 25.0);
    assert_eq!(participants[0].name, "Alice");
}

#[tokio::test]
async fn settlements_pay_back_the_fronter() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let alice = create_user(&client, &base, "Alice", "alice@example.com").await;
    let bob = create_user(&client, &base, "Bob", "bob@example.com").await;
    let bill = create_bill(&client, &base).await;
    let pasta = add_item(&client, &base, &bill.id, "Pasta", 60.0).await;
    let wine = add_item(&client, &base, &bill.id, "Wine", 40.0).await;

    for (item_id, user_id) in [(&pasta.id, &alice.id), (&wine.id, &bob.id)] {
        let res = client
            .post(format!("{base}/selections"))
            .json(&json!({
                "bill_id": bill.id,
                "item_id": item_id,
                "user_id": user_id,
                "split_ratio": 1.0,
                "toggle": null,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 201);
    }

    let res = client
        .patch(format!("{base}/payments"))
        .json(&json!({ "bill_id": bill.id, "user_id": alice.id, "amount_paid": 110.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let res = client
        .get(format!("{base}/bills/{}/settlements", bill.id))
        .send()
        .await
        .unwrap();
    let body: SettlementsResponse = res.json().await.unwrap();
    assert_eq!(body.settlements.len(), 1);
    assert_eq!(body.settlements[0].from.user_id, bob.id);
    assert_eq!(body.settlements[0].to.user_id, alice.id);
    // Bob owes 40 plus his share of the tax.
    assert_eq!(body.settlements[0].amount, 44.0);
}

#[tokio::test]
async fn item_validation_is_rejected_with_422() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let bill = create_bill(&client, &base).await;

    let res = client
        .post(format!("{base}/items"))
        .json(&json!({ "bill_id": bill.id, "name": "Pasta", "quantity": 1, "price": -3.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 422);
}

#[tokio::test]
async fn receipt_scan_without_service_is_unavailable() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{base}/receipt"))
        .json(&json!({ "image": "aGVsbG8=" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 503);
}
