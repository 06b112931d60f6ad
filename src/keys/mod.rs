// Per-entity encryption key derivation

pub mod derivation;

pub use derivation::{derive, GroupStore, KeyDerivationService, KeyScope};
