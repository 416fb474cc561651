use std::{error::Error, sync::Arc};

use dotenvy::dotenv;
use log::{info, warn};

use budget_tracker::{
    config::AppConfig,
    create_router,
    database::{create_database_pool, run_migrations},
    handlers::vision::VisionClient,
    scheduler::{RolloverJob, RolloverScheduler},
    store::PgStore,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    env_logger::init();

    let config = AppConfig::from_env()?;

    // Initialize database
    let db = create_database_pool(&config.database_url).await?;
    run_migrations(&db).await?;
    let store = Arc::new(PgStore::new(db));

    // Monthly budget rollover
    let job = Arc::new(RolloverJob::new(store.clone()));
    RolloverScheduler::new(config.rollover_schedule.clone(), job).spawn();
    info!("Budget rollover scheduled with '{}'", config.rollover_schedule);

    let vision = match config.vision.clone() {
        Some(vision_config) => Some(VisionClient::new(vision_config)?),
        None => {
            warn!("OPENAI_API_KEY not set, receipt scanning disabled");
            None
        }
    };

    let addr = format!("0.0.0.0:{}", config.port);
    let mut state = AppState::new(store, config);
    if let Some(client) = vision {
        state = state.with_vision(client);
    }

    // Build the application router
    let app = create_router(state);

    info!("Budget tracker listening on http://{}", addr);

    // Start the server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
