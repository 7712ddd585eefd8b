#[tokio::main]
async fn main() {
    if let Err(e) = tubegrab::run().await {
        tracing::error!("[Main] {}", e);
        std::process::exit(1);
    }
}
