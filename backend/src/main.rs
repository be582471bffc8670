mod config;
mod error;
mod job_controller;
mod llm;
mod media;
mod outline;
mod pipeline;
mod prompts;
mod render;
mod services;
mod session;
mod storage;

use crate::config::AppConfig;
use crate::job_controller::state::{start_job_updater, JobsState};
use crate::llm::{CompletionApi, OpenAiClient};
use crate::services::state::AppState;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use env_logger::Env;
use include_dir::{include_dir, Dir};
use log::{error, info};
use mime_guess::from_path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

static STATIC_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/static");

async fn serve_embedded(req: HttpRequest) -> HttpResponse {
    let path = req.path().trim_start_matches('/');
    let file_path = if path.is_empty() { "index.html" } else { path };

    match STATIC_DIR.get_file(file_path) {
        Some(file) => {
            let mime = from_path(file_path).first_or_octet_stream();
            HttpResponse::Ok()
                .content_type(mime.as_ref())
                .body(file.contents().to_vec())
        }
        None => match STATIC_DIR.get_file("index.html") {
            Some(index) => HttpResponse::Ok()
                .content_type("text/html; charset=utf-8")
                .body(index.contents().to_vec()),
            None => HttpResponse::NotFound().body("Not Found"),
        },
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let client = match OpenAiClient::new(&config.llm) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Could not create the provider client: {}", e);
            std::process::exit(1);
        }
    };
    if config.llm.verify_on_startup {
        match client.list_models().await {
            Ok(models) => info!("Provider reachable, {} models available", models.len()),
            Err(e) => {
                error!("Provider rejected the configured credentials: {}", e);
                std::process::exit(1);
            }
        }
    }

    let state = AppState::new(config, client.clone(), client.clone(), client);
    if let Err(e) = state.store.init() {
        error!("Could not open {}: {}", state.store.db_path().display(), e);
        std::process::exit(1);
    }
    state.media.ensure_dir()?;

    // Initialize job controller state
    let (jobs_state, rx) = JobsState::new(100);
    tokio::spawn(start_job_updater(jobs_state.clone(), rx));

    let host = state.config.server.host.clone();
    let port = state.config.server.port;
    let json_limit = state.config.server.json_limit_bytes;
    let url = format!("http://{}:{}", host, port);

    if state.config.server.open_browser {
        let url = url.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(500));
            let _ = webbrowser::open(&url);
        });
    }

    info!("Server running at {}", url);

    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(json_limit))
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(jobs_state.clone()))
            .configure(services::configure)
            .default_service(web::route().to(serve_embedded))
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
