//! Integration tests for taskpool.
//!
//! Run with: cargo test --test integration
//!
//! These tests exercise real worker threads. Sequencing is done with
//! explicit gates instead of sleeps wherever the pool's behavior allows
//! it; the remaining timing-dependent checks poll with a deadline.

mod helpers;

mod shutdown;
mod sizing;
