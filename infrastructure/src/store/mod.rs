//! [`ValidationStore`](citeguard_application::ValidationStore) adapters and
//! run snapshots.

mod memory;
mod snapshot;

pub use memory::InMemoryValidationStore;
pub use snapshot::{RunSnapshot, SNAPSHOT_VERSION, SnapshotError};
