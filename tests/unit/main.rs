//! Unit test harness for the alignment engine.
//!
//! Tests are organized by area:
//! - `engine` - DP engine properties and concrete alignment scenarios
//! - `guides` - guide validation and the anchor finder
//! - `scheduler` - partitioned execution, admission and cancellation

mod helpers;

mod engine;
mod guides;
mod scheduler;
