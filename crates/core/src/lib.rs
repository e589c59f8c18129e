//! `agencyops-core`: typed identifiers and the domain error shared by all crates.

pub mod error;
pub mod id;

pub use error::DomainError;
pub use id::{ClientId, PageId, UserId};
