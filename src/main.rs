use std::{io, sync::Arc};

use log::{error, info};
use tokio::net::TcpListener;

use tinywiki::{build_router, AppState, Config, FileStore, Logger, Templates, WikiError};

#[tokio::main]
async fn main() -> Result<(), WikiError> {
    if let Err(e) = Logger::init() {
        eprintln!("Failed to install logger: {}", e);
    }

    let config = Config::from_env();
    if !config.data_dir.is_dir() {
        error!("Page directory {:?} does not exist", config.data_dir);
        return Err(WikiError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("page directory {:?} does not exist", config.data_dir),
        )));
    }

    // Serving never starts with a missing or broken template
    let templates = Templates::load(&config.template_dir).inspect_err(|e| {
        error!("{}", e);
    })?;

    let store = Arc::new(FileStore::new(config.data_dir.clone()));
    let app = build_router(AppState::new(store, templates));

    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr).await?;
    info!("Wiki listening on http://{}", addr);
    axum::serve(listener, app).await.map_err(WikiError::from)
}
