use std::{env, net::SocketAddr, path::Path, sync::Arc};

use axum::Router;
use common::utils::logging::init_logging_default;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes::{self, ServerState};
use service::{
    beer::{repository::JsonBeerRepository, service::BeerService},
    runtime,
};

/// Initialize logging via shared common utils
fn init_logging() {
    init_logging_default();
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Load host/port from configs or env vars, with sensible fallbacks
fn load_bind_addr() -> anyhow::Result<SocketAddr> {
    let (host, port) = match configs::load_default() {
        Ok(cfg) => {
            let s = cfg.server;
            (s.host, s.port)
        }
        Err(_) => {
            let host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
            let port = env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(8081);
            (host, port)
        }
    };
    Ok(format!("{}:{}", host, port).parse()?)
}

fn load_data_file() -> String {
    match configs::load_default() {
        Ok(cfg) => cfg.store.data_file,
        Err(_) => env::var("BEERSTOCK_DATA_FILE").unwrap_or_else(|_| "data/beers.json".to_string()),
    }
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    // Beer stock store (file persistence, e.g. data/beers.json)
    let data_file = load_data_file();
    if let Some(dir) = Path::new(&data_file).parent().and_then(|p| p.to_str()) {
        if !dir.is_empty() {
            runtime::ensure_env(dir).await?;
        }
    }
    let repo = JsonBeerRepository::new(&data_file)
        .await
        .map_err(|e| anyhow::anyhow!("cannot open beer store at {data_file}: {e}"))?;
    let state = ServerState {
        beers: Arc::new(BeerService::new(repo)),
    };

    // Build router
    let cors = build_cors();
    let app: Router = routes::build_router(cors, state);

    // Bind and serve
    let addr = load_bind_addr()?;
    info!(%addr, %data_file, "starting server crate");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
