mod auth;
mod config;
mod error;
mod mock;
mod sse;
mod upstream;
mod web;

use actix_web::middleware::{from_fn, Logger};
use actix_web::{web::Data, web::PayloadConfig, App, HttpServer};
use actix_files as fs;
use anyhow::Context as _;
use dotenv::dotenv;
use log::{info, warn, error};
use std::path::Path;
use std::sync::Arc;
use tera::Tera;

use auth::Gate;
use config::Config;
use upstream::UpstreamClient;
use web::routes;

// App state structure
pub struct AppState {
    config: Config,
    gate: Gate,
    tera: Tera,
    upstream: Option<Arc<UpstreamClient>>,
}

impl AppState {
    fn new(config: Config, tera: Tera) -> anyhow::Result<Self> {
        let gate = Gate::new(config.site_password.clone(), config.production);
        let upstream = UpstreamClient::from_config(&config)
            .context("failed to build upstream HTTP client")?
            .map(Arc::new);
        Ok(Self {
            config,
            gate,
            tera,
            upstream,
        })
    }
}

fn load_templates() -> anyhow::Result<Tera> {
    let mut tera = Tera::new("templates/**/*").context("template parsing error")?;
    tera.autoescape_on(vec![".html"]);
    Ok(tera)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting Biomed Chat relay");

    let state = match Config::from_env().and_then(|config| AppState::new(config, load_templates()?)) {
        Ok(state) => state,
        Err(e) => {
            error!("Startup failed: {:#}", e);
            std::process::exit(1);
        }
    };

    if state.gate.enabled() {
        info!("Password protection enabled for all routes");
    } else {
        warn!("SITE_PASSWORD not set. Site is NOT password protected.");
    }
    if state.upstream.is_some() {
        info!("XAI_API_KEY loaded, upstream model: {}", state.config.model);
    } else {
        warn!("XAI_API_KEY is not set. Chat responses will be served from the mock stream.");
    }

    let bind = (state.config.host.clone(), state.config.port);
    let max_body_bytes = state.config.max_body_bytes;
    let serve_public = Path::new("./public").is_dir();
    let app_state = Data::new(state);

    info!("Listening on http://{}:{}", bind.0, bind.1);

    // Start web server
    HttpServer::new(move || {
        let app = App::new()
            .app_data(app_state.clone())
            .app_data(PayloadConfig::new(max_body_bytes))
            .wrap(from_fn(auth::require_site_password))
            .wrap(Logger::default())
            .configure(routes::configure);
        if serve_public {
            app.service(fs::Files::new("/", "./public").index_file("index.html"))
        } else {
            app
        }
    })
    .bind(bind)?
    .run()
    .await
}
