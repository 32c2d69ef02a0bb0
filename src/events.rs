//! Change notifications queued by record mutators.

use crate::types::Km;

/// Events emitted by [`crate::core::record::VehicleRecord`] mutators.
///
/// Adapters drain them to refresh whatever view they keep of the record.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordEvent {
    /// A completed operation entered the log.
    LogAdded {
        /// Operation label.
        label: String,
        /// Completion distance.
        km: Km,
    },
    /// A completed operation left the log.
    LogRemoved {
        /// Operation label.
        label: String,
        /// Completion distance.
        km: Km,
    },
    /// A periodic definition was registered.
    CatalogueAdded {
        /// Catalogue key.
        label: String,
    },
    /// The completion snapshot of a catalogue entry changed.
    CatalogueUpdated {
        /// Catalogue key.
        label: String,
    },
    /// A periodic definition and its history were deleted.
    CatalogueRemoved {
        /// Catalogue key.
        label: String,
    },
    /// An operation type was relabeled.
    Renamed {
        /// Previous label.
        from: String,
        /// New label.
        to: String,
    },
    /// History was cleared; definitions survive.
    LogCleared,
    /// History and definitions were cleared.
    AllCleared,
    /// Vehicle label, production date or haul changed.
    PropertiesChanged,
}
