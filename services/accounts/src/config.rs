use serde::Deserialize;

use levelthumbs_core::config::Config;

/// Accounts service configuration loaded from environment variables.
#[derive(Debug, Deserialize)]
pub struct AccountsConfig {
    /// PostgreSQL connection URL. Env var: `DATABASE_URL`.
    pub database_url: String,
    /// TCP port for the HTTP server (default 3115). Env var: `ACCOUNTS_PORT`.
    #[serde(default = "default_accounts_port")]
    pub accounts_port: u16,
    /// TCP port for the gRPC server (default 50061). Env var: `ACCOUNTS_GRPC_PORT`.
    #[serde(default = "default_accounts_grpc_port")]
    pub accounts_grpc_port: u16,
    /// Upper bound of the database connection pool. Env var: `DATABASE_MAX_CONNECTIONS`.
    #[serde(default = "default_database_max_connections")]
    pub database_max_connections: u32,
}

fn default_accounts_port() -> u16 {
    3115
}

fn default_accounts_grpc_port() -> u16 {
    50061
}

fn default_database_max_connections() -> u32 {
    5
}

impl Config for AccountsConfig {}
