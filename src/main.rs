use actix_web::{middleware::Logger, web, App, HttpServer};
use clap::Parser;
use std::io::{Error, ErrorKind};
use std::path::Path;

pub mod app_cfg;
pub mod artifacts;
pub mod classifier;
pub mod encoder;
pub mod error;
pub mod models;
pub mod predictor;
mod req_handler;
use app_cfg::AppCfg;
use predictor::Predictor;
use req_handler::{configure, BodyLimit};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    app_cfg::load_env_file(Path::new(".env"))?;
    let app_cfg = AppCfg::parse();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(app_cfg.log_filter()));

    // artifacts must load before we bind
    let artifacts = artifacts::load(&app_cfg.model, &app_cfg.encoder).map_err(|e| {
        log::error!("{e}");
        Error::new(ErrorKind::Other, e)
    })?;
    log::info!("Model and encoder loaded successfully");
    let predictor = web::Data::new(Predictor::new(artifacts.model, artifacts.encoder));
    let body_limit = BodyLimit(app_cfg.max_body_bytes);

    log::info!("Listening on {}:{}", app_cfg.host, app_cfg.port);
    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(predictor.clone())
            .app_data(body_limit)
            .configure(configure)
    });
    if let Some(workers) = app_cfg.workers {
        server = server.workers(workers);
    }
    server
        .bind((app_cfg.host.as_str(), app_cfg.port))?
        .run()
        .await
}
