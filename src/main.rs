use pair_chat::{
    connect_store, init_tracing,
    routes::create_router,
    state::{AppState, Config},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    init_tracing();

    let config = Config::from_env()?;
    let store = connect_store(&config).await?;

    let state = AppState::new(store);
    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server running on port {}", config.port);
    tracing::info!("API docs: http://localhost:{}/api-docs", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
