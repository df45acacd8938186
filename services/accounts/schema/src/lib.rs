//! sea-orm entities for the accounts database.

pub mod uploads;
pub mod users;
