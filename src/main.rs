use css_tutor_mcp_server::config::ServerConfig;
use css_tutor_mcp_server::context::ServerContext;
use css_tutor_mcp_server::server::McpServer;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Logs go to stderr; stdout carries protocol traffic only.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("css_tutor_mcp_server=info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = match ServerConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    let ctx = match ServerContext::new(&config) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("startup error: {e}");
            std::process::exit(1);
        }
    };

    let mut server = McpServer::new(ctx);
    if let Err(e) = server.run().await {
        error!("fatal error: {e}");
        std::process::exit(1);
    }
}
