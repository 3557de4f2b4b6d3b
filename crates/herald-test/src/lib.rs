//! Herald Test - shared test utilities for herald crates.
//!
//! Observer doubles, fixtures and logging helpers used as a dev-dependency
//! by the integration tests and the harness.
//!
//! ```rust
//! use herald_test::{recording_subscribers, subscribe_all, test_publisher};
//!
//! let publisher = test_publisher::<u32>();
//! let recorders = recording_subscribers::<u32>(2);
//! let _handles = subscribe_all(&publisher, &recorders);
//!
//! publisher.publish(&7);
//! assert!(recorders.iter().all(|r| r.received() == vec![7]));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod fixtures;
pub mod harness;
pub mod mocks;

pub use fixtures::*;
pub use harness::*;
pub use mocks::*;
