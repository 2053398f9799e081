//! Data models for the Axiom Trade API.
//!
//! - [`primitives`] - Address newtypes and [`Endpoints`]
//! - [`enums`] - Enumeration types such as [`TimePeriod`]
//! - [`balance`] - Wallet balance models

pub mod primitives;
pub mod enums;
pub mod balance;

// Re-export commonly used types
pub use primitives::*;
pub use enums::*;
pub use balance::*;
