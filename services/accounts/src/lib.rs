pub mod config;
pub mod domain;
pub mod error;
pub mod grpc_server;
pub mod handlers;
pub mod infra;
pub mod router;
pub mod state;
pub mod usecase;
