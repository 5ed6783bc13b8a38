#[tokio::main]
async fn main() -> anyhow::Result<()> {
    reqrouter::cli::run_cli().await
}
