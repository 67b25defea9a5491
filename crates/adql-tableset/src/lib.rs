//! Streaming ingester from VODataService `tableset` XML into the catalog
//! metadata model (§3 C6).

mod builders;
pub mod ingest;

pub use ingest::ingest_tableset;
