#![warn(clippy::all, clippy::pedantic)]

use actix_web::{App, HttpServer, middleware::Logger, web};
use clap::Parser;
use tracing::{debug, info};

mod config;
mod error;
mod routes;
mod shutdown;
mod state;

use config::{Args, Config};
use error::AppError;
use logger::init_tracing;
use state::AppState;

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?.with_args(&args);
    debug!("{config}");

    let state = AppState::from_config(&config)?;
    run_server(&config, state).await
}

async fn run_server(config: &Config, state: AppState) -> Result<(), AppError> {
    let addr = config.server.bind_address;
    let registry = state.registry.clone();
    let data = web::Data::new(state);

    let server = HttpServer::new(move || {
        App::new().app_data(data.clone()).wrap(Logger::default()).configure(routes::routes)
    })
    .bind(addr)?
    .disable_signals()
    .run();

    info!("running @ {addr}");

    let handle = server.handle();
    let grace = config.monitor.shutdown_grace();
    actix_web::rt::spawn(async move {
        let signal = shutdown::wait_for_signal().await;
        info!("{signal} received, shutting down gracefully");

        // No new monitors may slip in behind the drain
        handle.pause().await;
        let reports = registry.shutdown(grace).await;
        info!("Collected {} monitor report(s)", reports.len());

        info!("Shutting down uptimed");
        handle.stop(true).await;
    });

    server.await?;
    Ok(())
}
