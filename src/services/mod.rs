//! Service implementations.

pub mod activation;
pub mod keyed_lock;

pub use activation::{ActivationError, ActivationService};
pub use keyed_lock::KeyedLocks;
