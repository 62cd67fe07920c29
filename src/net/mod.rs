//! Network helpers.

pub mod outbound;

pub use outbound::outbound_address;
