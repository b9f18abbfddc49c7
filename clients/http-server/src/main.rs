use actix_cors::Cors;
use actix_web::{
    http::header,
    middleware::{self, Condition},
    web, App, HttpServer,
};
use clap::Parser;
use database::{
    database::{database::Database, options::DatabaseOptions, request_manager::RequestManager},
    persistence::transaction::TransactionWriteMode,
};
use std::io;

use crate::service::RegistrationService;

mod dto;
mod errors;
mod routes;
mod service;

/// 🎲 Raffle participants server, registers participants over a small REST API
#[derive(Parser, Debug)]
struct Cli {
    /// Location of the database. Reads / writes to this directory. Note: Does not support shell paths, e.g. ~
    #[clap(short, long, env = "DATA_DIR", default_value = "data")]
    data: std::path::PathBuf,

    /// Port the server will run on
    #[clap(short, long, env = "PORT", default_value = "9000")]
    port: u16,

    /// Address the server will run on
    #[clap(short, long, env = "ADDRESS", default_value = "0.0.0.0")]
    address: String,

    /// Path segment every route is mounted under, empty mounts at the root
    #[clap(long, env = "API_PREFIX", default_value = "api")]
    api_prefix: String,

    /// Origins allowed to call the API from a browser
    #[clap(
        long,
        env = "CORS_ORIGINS",
        value_delimiter = ',',
        default_values_t = ["http://localhost:3000".to_string(), "http://localhost:8000".to_string()]
    )]
    cors_origins: Vec<String>,

    /// Logs every HTTP request
    #[clap(long, env = "LOG_HTTP")]
    log_http: bool,

    #[clap(long, env = "HTTP_WORKERS", default_value_t = 2)]
    http_workers: usize,

    /// Transaction log durability: sync (fsync per commit), buffered or off
    #[clap(long, env = "WRITE_MODE", default_value = "sync")]
    write_mode: TransactionWriteMode,
}

fn scope_path(api_prefix: &str) -> String {
    match api_prefix.trim_matches('/') {
        "" => String::new(),
        prefix => format!("/{}", prefix),
    }
}

fn build_cors(origins: &[String]) -> Cors {
    origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let args = Cli::parse();

    let database_options = DatabaseOptions::default()
        .set_data_directory(args.data.clone())
        .set_sync_file_write(args.write_mode.clone());

    let request_manager = Database::new(database_options)
        .and_then(Database::run)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let service = web::Data::new(RegistrationService::new(request_manager.clone()));
    let scope = scope_path(&args.api_prefix);

    log::info!("🚀 Starting HTTP server on http://{}:{}{}", args.address, args.port, scope);
    log::info!("🎲 Raffle API ready at {}/participants", scope);

    let cors_origins = args.cors_origins.clone();
    let log_http = args.log_http;

    // Actix handles Ctrl-C, the database is shut down once the server stops
    HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .service(web::scope(&scope).configure(routes::configure::<RequestManager>))
            .wrap(build_cors(&cors_origins))
            .wrap(Condition::new(log_http, middleware::Logger::default()))
    })
    .workers(args.http_workers)
    .bind((args.address, args.port))?
    .run()
    .await?;

    match request_manager.send_shutdown_request() {
        Ok(shutdown_response) => log::info!("Shutting down server: {}", shutdown_response),
        Err(err) => log::error!("Database did not shut down cleanly: {}", err),
    }

    Ok(())
}
