//! Segmentation rules (SRX) document loading and structural validation.

pub mod document;
pub mod provider;

pub use document::{validate, RulesDocument};
pub use provider::RulesProvider;
