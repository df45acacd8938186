//! Generated gRPC contracts.

pub mod account {
    tonic::include_proto!("levelthumbs.account");
}
