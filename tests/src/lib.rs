//! # Event Bus Test Suite
//!
//! Unified test crate exercising the public API across crates.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── support.rs        # Shared fixtures (logging, recording doubles)
//! └── integration/      # Delivery properties end to end
//!     ├── fan_out.rs    # Subscribe / unsubscribe / concurrent fan-out
//!     └── backoff.rs    # Logging and retry strategies against a live bus
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p bus-tests
//!
//! # By category
//! cargo test -p bus-tests integration::fan_out
//! cargo test -p bus-tests integration::backoff
//!
//! # Benchmarks
//! cargo bench -p bus-tests
//! ```

pub mod integration;
