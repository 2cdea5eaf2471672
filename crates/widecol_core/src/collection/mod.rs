//! Collection proxies with delta tracking.
//!
//! A proxy wraps one list, set or map attribute of a record. Mutations go
//! to the in-memory collection and are also recorded as [`Delta`]s so the
//! persistence layer can write minimal atomic updates instead of the whole
//! collection. Proxies borrow the record mutably, so one instance can't be
//! mutated from two places at once.

mod delta;
mod list;
mod map;
mod set;

pub use delta::{Delta, DeltaLog, DeltaOp};
pub use list::ListProxy;
pub use map::MapProxy;
pub use set::SetProxy;
