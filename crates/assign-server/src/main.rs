use assign_server::{Server, config::ServerConfig, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env()?;
    Server::run(config).await
}
