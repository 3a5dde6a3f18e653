//! BDD-backed random solution generator for AND-inverter-graph constraints.
//!
//! Pipeline: [`aag::load`] parses an AAG file and folds it into a BDD via
//! [`bdd::Manager`]; [`count::PathCounts`] computes odd/even path counts
//! over that BDD; [`sample::sample`] draws weighted-random satisfying
//! assignments; [`reshape::reshape`] groups and renders them as the JSON
//! schema the CLI driver writes out.

pub mod aag;
pub mod bdd;
pub mod count;
pub mod error;
pub mod reshape;
pub mod sample;
