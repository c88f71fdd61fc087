//! Testing utilities and harness for Trellis.

mod testing;

pub use testing::{
    collect_summaries, find_by_kind, find_nodes, run_test_composition, ComposeTestRule,
};
