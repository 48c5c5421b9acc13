//! Property-based tests for tabula-core
//!
//! - Engine outcomes on random standard-form problems
//! - Tableau invariants across the step log
//! - Selection purity

mod engine_properties;
mod selection_properties;
