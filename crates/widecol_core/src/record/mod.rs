//! Record instances and their attribute storage.

mod attributes;
mod identity;
mod instance;

pub use attributes::AttributeStore;
pub use instance::{Record, RecordState};
