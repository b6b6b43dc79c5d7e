//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against simulated pins and a recording sink.  All tests run on the host
//! (x86_64) with no real hardware required.

mod link_tests;
mod mock_hw;
mod output_tests;
mod service_tests;
