//! Web server for filevault.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::{AuthConfig, ServerConfig};
use crate::file::FileService;

use super::handlers::AppState;
use super::middleware::JwtState;
use super::router::{create_health_router, create_router};

/// Web server for the API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// JWT state.
    jwt_state: Arc<JwtState>,
    /// CORS allowed origins.
    cors_origins: Vec<String>,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(config: &ServerConfig, auth: &AuthConfig, files: FileService) -> Self {
        let addr = format!("{}:{}", config.host, config.port)
            .parse()
            .expect("Invalid web server address");

        let app_state = Arc::new(AppState::new(files));
        let jwt_state = Arc::new(JwtState::new(&auth.jwt_secret));

        Self {
            addr,
            app_state,
            jwt_state,
            cors_origins: config.cors_origins.clone(),
        }
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    fn build_router(&self) -> axum::Router {
        create_router(
            self.app_state.clone(),
            self.jwt_state.clone(),
            &self.cors_origins,
        )
        .merge(create_health_router())
    }

    /// Run the web server.
    pub async fn run(self) -> Result<(), std::io::Error> {
        let router = self.build_router();

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Web server listening on http://{}", local_addr);

        axum::serve(listener, router).await
    }

    /// Run the server in the background and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> Result<SocketAddr, std::io::Error> {
        let router = self.build_router();

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::FileStorage;
    use crate::Database;
    use tempfile::TempDir;

    async fn create_test_service(temp_dir: &TempDir) -> FileService {
        let db = Database::open_in_memory().await.unwrap();
        let storage = FileStorage::new(temp_dir.path()).unwrap();
        FileService::new(db, storage)
    }

    #[tokio::test]
    async fn test_web_server_new() {
        let temp_dir = TempDir::new().unwrap();
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec![],
        };
        let auth = AuthConfig {
            jwt_secret: "test-secret-key".to_string(),
        };

        let server = WebServer::new(&config, &auth, create_test_service(&temp_dir).await);
        assert_eq!(server.addr().ip().to_string(), "127.0.0.1");
    }

    #[tokio::test]
    async fn test_web_server_binds() {
        let temp_dir = TempDir::new().unwrap();
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec![],
        };
        let auth = AuthConfig {
            jwt_secret: "test-secret-key".to_string(),
        };

        let server = WebServer::new(&config, &auth, create_test_service(&temp_dir).await);
        let addr = server.run_with_addr().await.unwrap();

        assert_ne!(addr.port(), 0);
    }
}
