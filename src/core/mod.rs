//! In-memory vehicle record: history log, periodic catalogue, and the record owning both.

/// Periodic operation catalogue and snapshot derivation.
pub mod catalogue;
/// Distance-ordered history of completed operations.
pub mod log;
/// Vehicle record and its consistency-keeping mutators.
pub mod record;
