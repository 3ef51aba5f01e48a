use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::prelude::*;

const DEFAULT_DB_URL: &str = "sqlite:./tabsplit.db?mode=rwc";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cmd = std::env::args().nth(1).unwrap_or_else(|| "up".to_string());
    let db_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DB_URL.to_string());

    let db = Database::connect(&db_url).await?;
    run(&cmd, &db).await
}

async fn run(
    cmd: &str,
    db: &DatabaseConnection,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    match cmd {
        "up" => migration::Migrator::up(db, None).await?,
        "down" => migration::Migrator::down(db, None).await?,
        "fresh" => migration::Migrator::fresh(db).await?,
        "status" => migration::Migrator::status(db).await?,
        other => {
            eprintln!("unknown command {other:?}; expected up, down, fresh or status");
            std::process::exit(2);
        }
    }

    Ok(())
}
