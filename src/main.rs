use tracing::info;

use filevault::file::{FileService, FileStorage};
use filevault::{Config, Database, WebServer};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    // Initialize logging
    if let Err(e) = filevault::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        filevault::logging::init_console_only(&config.logging.level);
    }

    if config.auth.jwt_secret.is_empty() {
        tracing::error!("auth.jwt_secret must be set in config.toml");
        std::process::exit(1);
    }

    info!("filevault - user-scoped file storage service");

    let db = match Database::open(&config.database.path).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to open database: {}", e);
            std::process::exit(1);
        }
    };

    let storage = match FileStorage::new(&config.storage.path) {
        Ok(storage) => storage,
        Err(e) => {
            tracing::error!("Failed to initialize file storage: {}", e);
            std::process::exit(1);
        }
    };
    info!("File storage initialized at: {}", config.storage.path);

    let service =
        FileService::new(db, storage).with_max_file_size(config.storage.max_upload_size_bytes());

    let server = WebServer::new(&config.server, &config.auth, service);

    if let Err(e) = server.run().await {
        tracing::error!("Web server error: {}", e);
        std::process::exit(1);
    }
}
