#![allow(dead_code)]
#![allow(unused_imports)]
//! Shared integration test utilities.
//!
//! Import with:
//! ```
//! #[macro_use]
//! mod common;
//! use common::*;
//! ```

pub use spindle::test_utils::{init_test_logging, init_test_logging_with_level};
pub use spindle::{assert_with_log, test_complete, test_phase, test_section};

/// Initialize logging and announce the test phase in one call.
pub fn init_test(test_name: &str) {
    init_test_logging();
    spindle::test_phase!(test_name);
}
