//! Durable panel metadata and coalesced content-state writes.

mod coalescer;
mod record;

pub use coalescer::StateCoalescer;
pub use record::PersistedPanelRecord;
