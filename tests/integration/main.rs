//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that drives whole engine cycles
//! against mock adapters and a manual clock.

mod emergency_tests;
mod engine_tests;
mod mock_hw;
