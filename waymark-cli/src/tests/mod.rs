//! Shared test harness modules for the Waymark CLI.
#![expect(
    clippy::panic,
    clippy::expect_used,
    reason = "Tests use expect and panic branches to surface unexpected CLI outcomes"
)]

use super::*;
