use std::net::SocketAddr;

use axum::{Router, middleware, routing::get};
use tracing::info;

use gkelog_model::Labels;
use gkelog_observe::{LoggerConfig, LoggerLevel, init_logger};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    // 1) logger
    let cfg = LoggerConfig {
        level: LoggerLevel::new("info")?,
        default_labels: Labels::from([("app", "demo-server")]),
        ..Default::default()
    };
    init_logger(&cfg)?;

    // 2) router with access logging
    let app = Router::new()
        .route("/", get(get_it))
        .layer(middleware::from_fn(gkelog_http::access_log));

    // 3) serve; connect-info makes the client address show up in logs
    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

async fn get_it() -> &'static str {
    gkelog_context::set_user_id("demo-user");
    info!("got a request");
    tracing::warn!("oh no");
    "OK"
}
