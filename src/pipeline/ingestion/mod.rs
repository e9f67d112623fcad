// Pipeline ingestion: reading the incident and event exports

pub mod events;
pub mod incidents;
