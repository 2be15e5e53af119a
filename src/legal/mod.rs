//! Domain rules for the case tracker: selection lists, file-number policy,
//! origin-based tag defaulting, and localized vocabulary.

pub mod constants;
pub mod filenumber;
pub mod tags;
pub mod terminology;

pub use constants::{CaseType, EntityType, Language, PartyStatus, Sex};
pub use tags::CaseOrigin;
