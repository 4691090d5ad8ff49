//! # Unit Components
//!
//! Central hub for the unit tests of the harness components: the backing
//! store, the bus emulators, image loading, tracing, configuration, and
//! the cycle-stepped driver.






/// Unit tests for the trace streams.
pub mod trace;
