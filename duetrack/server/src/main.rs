#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();
    let config = duetrack_server::config::Config::from_env()?;
    duetrack_server::web::start_web_server(config).await
}
