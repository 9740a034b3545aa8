//! Entropy sources for allocation batches and delayed reveal.
//!
//! Strata draws randomness from the host environment: chain height, clock,
//! previous block hash, caller and gas price. That mix is **not
//! cryptographically secure**. A party that controls block production can
//! bias outcomes, and Strata accepts this as a trust assumption of the host.
//!
//! The environment is a trait so hosts can plug in their own source and
//! tests can pin every input with [`FixedEnvironment`].

pub mod environment;
pub mod mixer;

pub use environment::{Environment, EnvironmentSnapshot, FixedEnvironment, HostEnvironment};
pub use mixer::EntropyMixer;
