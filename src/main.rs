use std::net::SocketAddr;

use recipebox::{make_router, run_app};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    let addr = std::env::var("BIND_ADDRESS")
        .ok()
        .and_then(|addr| addr.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 3001)));

    let router = make_router();
    if let Err(error) = run_app(router, addr).await {
        tracing::error!("server error: {error}");
        std::process::exit(1);
    }
}
