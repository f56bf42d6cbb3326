//! # Fleetctl Testing Utils
//!
//! Shared testing utilities for the control-plane crates: forwarding graph
//! fixtures and recording test doubles for the outbound ports.
//!
//! ```rust
//! use fleetctl_testing_utils::{GraphFixture, RecordingTransport};
//! ```

pub mod builders;
pub mod mocks;

pub use builders::*;
pub use mocks::*;
