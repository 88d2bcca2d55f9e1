use log::{error, info, LevelFilter};
use rocket::Error as RocketError;
use thiserror::Error;

/// Logging config used unless `LOG4RS_CONFIG` names another file.
const DEFAULT_LOG_CONFIG: &str = "log4rs.yaml";

/// Errors that are critical to the entire server.
#[derive(Debug, Error)]
enum Error {
    #[error("Failed to configure the server: {0}")]
    Ignite(#[source] RocketError),
    #[error("Server stopped unexpectedly: {0}")]
    Launch(#[source] RocketError),
}

async fn run() -> Result<(), Error> {
    info!("Configuring server...");
    let rocket = survey_backend::build()
        .ignite()
        .await
        .map_err(Error::Ignite)?;
    let config = rocket.config();
    let protocol = if config.tls_enabled() { "https" } else { "http" };
    info!(
        "...server configured, listening on {protocol}://{}:{}",
        config.address, config.port
    );

    // Rocket's own logging is too noisy once requests start arriving.
    log4rs_dynamic_filters::DynamicLevelFilter::set("rocket", LevelFilter::Off);
    rocket.launch().await.map_err(Error::Launch)?;
    Ok(())
}

#[rocket::main]
async fn main() {
    let log_config =
        std::env::var("LOG4RS_CONFIG").unwrap_or_else(|_| DEFAULT_LOG_CONFIG.to_string());
    log4rs::init_file(&log_config, log4rs_dynamic_filters::default_deserializers())
        .expect("Failed to initialise logging");
    info!("Initialised logging from {log_config}");

    if let Err(err) = run().await {
        error!("{err}");
        error!("Critical failure, shutting down");
        std::process::exit(1)
    }
}
