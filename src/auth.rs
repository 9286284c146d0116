//! Token pairs, store slots, the derived authorization state of the handshake, and basic
//! credentials.

pub mod basic;
pub mod pair;
pub mod secret;
pub mod state;

pub use basic::*;
pub use pair::*;
pub use secret::*;
pub use state::*;
