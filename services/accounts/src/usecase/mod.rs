pub mod merge;
pub mod upload;
pub mod user;
