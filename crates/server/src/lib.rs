//! vecgate HTTP server
//!
//! actix-web REST API in front of the vector, cache and workflow crates

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use std::sync::Arc;
use tracing::info;
use tracing_actix_web::TracingLogger;
use vecgate_common::{AppConfig, Result};

pub mod error;
pub mod routes;
pub mod state;
pub mod types;

pub use error::ApiError;
pub use state::AppState;

/// Build shared state and serve until the process is stopped
pub async fn start_server(config: AppConfig) -> Result<()> {
    let bind_addr = config.server_bind_address();
    let state = Arc::new(AppState::new(config)?);

    info!("Starting HTTP server on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(routes::configure)
    })
    .bind(&bind_addr)?
    .run()
    .await?;

    info!("HTTP server stopped");
    Ok(())
}
