use std::net::TcpListener;

use anyhow::Context;
use env_logger::Env;
use scout::{configuration::get_configuration, services::ProfileSearch, startup::run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration().context("Failed to read configuration.")?;
    log::info!("Loaded configuration: {:?}", configuration);

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener =
        TcpListener::bind(&address).with_context(|| format!("Failed to bind {}", address))?;
    let profile_search = ProfileSearch::from_settings(&configuration.phantombuster)
        .context("Failed to build the PhantomBuster client.")?;

    log::info!("Server is running on port {}", listener.local_addr()?.port());
    run(listener, profile_search)?.await?;

    Ok(())
}
