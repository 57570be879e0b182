#[tokio::main]
async fn main() {
    if let Err(e) = dis_engine::run_with_config().await {
        tracing::error!(error = %e, "dis engine stopped");
        std::process::exit(1);
    }
}
