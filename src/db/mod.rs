//! Persistence module split across logical submodules.

mod connection;
mod payload;
mod reports;

pub use connection::{ensure_schema, open_database};
pub use payload::{decode_payload, encode_payload, PAYLOAD_SCHEMA_VERSION};
pub use reports::{Clock, ReportStore, SAVED_AT_FORMAT};
