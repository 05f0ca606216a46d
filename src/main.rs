use crate::api::{CrmApi, RestClient};
use crate::config::{Backend, Config};
use crate::db::{init_db, Database, SqliteCrm};
use crate::domain::{Role, User};
use crate::router::handle;
use crate::state::AppState;
use anyhow::Context;
use astra::Server;

mod api;
mod auth;
mod callmode;
mod config;
mod db;
mod domain;
mod errors;
mod handlers;
mod reports;
mod responses;
mod router;
mod state;
mod templates;

#[cfg(test)]
mod tests;

fn main() {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{e:#}");
        std::process::exit(1);
    }

    log::info!("Server shut down cleanly.");
}

fn run() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    let db = Database::new(config.database_path.clone());
    init_db(&db, &config.schema_path).context("database initialization failed")?;

    let api: Box<dyn CrmApi> = match &config.backend {
        Backend::Rest { base_url, token } => {
            log::info!("Using CRM service at {base_url}");
            Box::new(RestClient::new(base_url.clone(), token.clone()))
        }
        Backend::Sqlite => {
            log::info!("Using local CRM store in {}", config.database_path);
            let store = SqliteCrm::new(db.clone()).with_password_cost(config.password_cost);
            bootstrap_admin(&store, &config)?;
            Box::new(store)
        }
    };

    let addr = config.bind_addr;
    let workers = config.max_workers;
    let state = AppState::new(config, db, api);

    log::info!("Starting server at http://{addr}");
    Server::bind(&addr)
        .max_workers(workers)
        .serve(move |req, _info| match handle(req, &state) {
            Ok(resp) => resp,
            Err(err) => templates::html_error_response(err),
        })
        .context("server ended with error")
}

/// Creates the configured admin when the local store has no users yet.
fn bootstrap_admin(store: &SqliteCrm, config: &Config) -> anyhow::Result<()> {
    let Some((email, password)) = &config.bootstrap_admin else {
        return Ok(());
    };
    if store.count_users()? > 0 {
        return Ok(());
    }

    let admin = User {
        id: uuid::Uuid::new_v4().to_string(),
        name: "Administrator".to_string(),
        email: email.clone(),
        role: Role::Admin,
        active: true,
        team_id: None,
    };
    store.add_user(&admin, password)?;
    log::info!("Created admin account {email}");
    Ok(())
}
