use crate::cli::parser::Cli;
use crate::config::{Backend, Config};
use crate::core::auth::{Credentials, HashCost};
use crate::errors::AppResult;
use crate::store::open_store;
use crate::ui::messages::{info, success, warning};

/// Handle the `init` command
///
/// This initializes:
///  - the config directory and file (skipped in test mode)
///  - the SQLite database and its schema, when that backend is selected
///  - the admin account, when no credentials are stored yet
pub async fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let cfg = Config::init_all(cfg, cli.test)?;

    info("Initializing pointstracker…");
    if !cli.test {
        info(format!("Config file : {}", Config::config_file().display()));
    }
    match cfg.backend {
        Backend::Sqlite => info(format!("Database    : {}", cfg.database)),
        Backend::Supabase => info(format!(
            "Database    : supabase ({})",
            cfg.supabase_url.as_deref().unwrap_or_default()
        )),
    }

    cfg.validate()?;
    let store = open_store(&cfg)?;

    let credentials = Credentials::new(store, HashCost::from_config(&cfg));
    if credentials
        .ensure_bootstrap(&cfg.admin_username, &cfg.admin_password)
        .await?
    {
        warning(format!(
            "Default admin account '{}' created. Change its password after the first login.",
            cfg.admin_username
        ));
    } else {
        info("Admin credentials already configured");
    }

    success("pointstracker initialization completed!");
    Ok(())
}
