// Reference Tables - read-only lookup data for event planning
//
// Each table is static data plus small accessors:
// - find-by-id returning Option
// - default-value-if-absent helpers for screens that always need a value

pub mod decorations;
pub mod event_images;
pub mod staff;

pub use decorations::{DecorationPackage, DecorationProvider};
pub use event_images::{image_for_event, EventImage};
pub use staff::{RateType, StaffRole};
