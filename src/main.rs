use clap::Parser;
use finflow::cli::{
    Args, build_config, init_logging, load_secrets, open_database, validate_frontend_origin,
};
use finflow::run_server;
use std::process::exit;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(&args.log_format);

    let Some((access_secret, refresh_secret)) = load_secrets(&args) else {
        exit(1);
    };

    let Some(frontend_origin) = validate_frontend_origin(args.frontend_origin.as_deref()) else {
        exit(1);
    };

    let Some(db) = open_database(&args.database).await else {
        exit(1);
    };

    let config = build_config(&args, db, access_secret, refresh_secret, frontend_origin);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(address = %addr, error = %e, "Failed to bind");
            exit(1);
        }
    };

    info!(address = %addr, "Server listening");
    if let Err(e) = run_server(config, listener).await {
        error!(error = %e, "Server error");
        exit(1);
    }
}
