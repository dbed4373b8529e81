use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::http;
use crate::store::open_store;
use tracing::info;

pub async fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Serve {
        host,
        port,
        backend,
        static_dir,
    } = cmd
    {
        let mut cfg = cfg.clone();
        if let Some(h) = host {
            cfg.host = h.clone();
        }
        if let Some(p) = port {
            cfg.port = *p;
        }
        if let Some(b) = backend {
            cfg.backend = *b;
        }
        if let Some(dir) = static_dir {
            cfg.static_dir = Some(dir.clone());
        }
        cfg.validate()?;

        info!(backend = cfg.backend.as_str(), "Starting points tracker");
        let store = open_store(&cfg)?;
        http::serve(&cfg, store).await?;
    }
    Ok(())
}
