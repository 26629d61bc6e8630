use std::sync::Arc;

use axum::Router;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::SqliteConnection;
use tokio::net::TcpListener;

use lexirep::api::{self, AppState};
use lexirep::store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://lexirep.db".into());
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = Pool::builder()
        .build(manager)
        .map_err(|e| anyhow::anyhow!("failed to create DB pool: {e}"))?;

    {
        let mut conn = pool.get()?;
        store::initialize_schema(&mut conn)?;
    }

    let state = Arc::new(AppState::new(pool));
    let app = Router::new().nest("/api", api::api_router(state));

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:5000".into());
    let listener = TcpListener::bind(&bind_addr).await?;
    log::info!("scheduler API listening on http://{bind_addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
