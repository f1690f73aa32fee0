//! Substance and prototype catalogs.
#![forbid(unsafe_code)]

pub mod catalog;
pub mod config;
pub mod prototype;
pub mod types;

pub use catalog::{Substance, SubstanceCatalog};
pub use prototype::{Prototype, PrototypeCatalog};
pub use types::{DepositKind, Phase, PrototypeId, SubstanceId, Visibility};
