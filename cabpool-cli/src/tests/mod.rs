//! Shared test harness modules for the cabpool CLI.

use super::*;

mod allocate_unit;
mod helpers;
