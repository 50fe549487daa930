//! Test checklist: the static item catalog and overall-status derivation.

pub mod catalog;
pub mod status;
