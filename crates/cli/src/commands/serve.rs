//! `studybuddy serve`: start the HTTP API server.

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config()?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    if !config.has_api_key() {
        tracing::warn!("No API key configured; chat requests will fail until one is set");
    }

    println!("StudyBuddy API");
    println!("  Listening: http://{}:{}", config.gateway.host, config.gateway.port);
    println!("  Storage:   {} ({})", config.storage.backend, config.storage.path);
    println!("  Model:     {}", config.default_model);
    println!();

    studybuddy_gateway::start(config).await
}
