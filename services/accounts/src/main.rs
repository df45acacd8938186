use std::time::Duration;

use sea_orm::{ConnectOptions, Database};
use tracing::info;

use levelthumbs_core::config::Config;
use levelthumbs_core::tracing::init_tracing;
use levelthumbs_proto::account::account_service_server::AccountServiceServer;

use levelthumbs_accounts::config::AccountsConfig;
use levelthumbs_accounts::grpc_server::AccountsGrpcServer;
use levelthumbs_accounts::router::build_router;
use levelthumbs_accounts::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = AccountsConfig::from_env();

    let mut options = ConnectOptions::new(config.database_url.clone());
    options
        .max_connections(config.database_max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("failed to connect to database");

    let state = AppState { db };

    // Spawn gRPC server
    let grpc_state = state.clone();
    let grpc_addr = format!("0.0.0.0:{}", config.accounts_grpc_port);
    tokio::spawn(async move {
        let server = AccountsGrpcServer { state: grpc_state };
        info!("accounts gRPC server listening on {grpc_addr}");
        tonic::transport::Server::builder()
            .add_service(AccountServiceServer::new(server))
            .serve(grpc_addr.parse().expect("invalid gRPC address"))
            .await
            .expect("gRPC server error");
    });

    // HTTP server
    let router = build_router(state);
    let http_addr = format!("0.0.0.0:{}", config.accounts_port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .expect("failed to bind");

    info!("accounts service listening on {http_addr}");
    axum::serve(listener, router).await.expect("server error");
}
