use hangout_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize the application (store, dispatcher, processors, routes)
    let (state, router) = hangout_api::setup::initialize_app(config.clone()).await?;

    // Serve until a shutdown signal, then drain the pipelines
    hangout_api::setup::server::start_server(&config, router, state).await?;

    Ok(())
}
