//! The Model Builder (spec.md §4.1): turns a [`crate::normalizer::NormalizedInstance`]
//! into a solver-agnostic [`ir::Problem`] plus an [`index::ModelIndex`] the
//! Solver Driver and Result Projector use to recover variables by name.

pub mod builder;
pub mod constraints;
pub mod index;
pub mod ir;

pub use builder::{build, ModelOptions};
pub use index::ModelIndex;
pub use ir::Problem;
