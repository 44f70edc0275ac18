use server::config;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env();
    let addr = format!("{}:{}", config.host, config.port);

    tracing::info!("Loading puzzles from {}...", config.corpus_path);
    let state = server::load_state(config)?;
    if state.index.is_empty() {
        tracing::warn!("Corpus has no usable puzzles; every selection will fail");
    }

    tracing::info!("Starting server on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    server::serve(listener, state).await?;
    Ok(())
}
