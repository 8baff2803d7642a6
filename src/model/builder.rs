//! Assembles the four constraint families into one [`Problem`] (spec.md §4.1
//! "Model Builder").

use super::constraints::{aggregation, battery, deferrable, shapeable};
use super::index::ModelIndex;
use super::ir::{LinExpr, Problem};
use crate::normalizer::NormalizedInstance;

/// Knobs the Model Builder exposes beyond the source's fixed behavior
/// (spec.md §9, REDESIGN FLAGS).
#[derive(Debug, Clone, Copy)]
pub struct ModelOptions {
    pub tighten_deferrable_window: bool,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self { tighten_deferrable_window: true }
    }
}

/// Builds the MILP for one normalized instance, returning the raw
/// [`Problem`] and a [`ModelIndex`] the Solver Driver and Result Projector
/// use to find variables back by asset family.
pub fn build(instance: &NormalizedInstance, options: ModelOptions) -> (Problem, ModelIndex) {
    let mut problem = Problem::new();

    let demandshape = shapeable::add(&mut problem, instance);
    let batt = battery::add(&mut problem, instance);
    let defr_options = deferrable::DeferrableOptions { tighten_start_window: options.tighten_deferrable_window };
    let defr = deferrable::add(&mut problem, instance, defr_options);
    let agg = aggregation::add(&mut problem, instance, &demandshape, &batt, &defr);

    problem.objective = LinExpr::sum([LinExpr::term(agg.peakhigh, 1.0), LinExpr::term(agg.peaklow, -1.0)]);

    let mut deferrschedule = super::index::AssetVars::default();
    deferrschedule.ids = defr.schedule.ids.clone();
    deferrschedule.vars = defr.schedule.vars.clone();

    let index = ModelIndex {
        horizon: instance.horizon,
        demand_controllable: agg.demand_controllable,
        peakhigh: agg.peakhigh,
        peaklow: agg.peaklow,
        demandshape,
        batteryin: batt.input,
        batteryout: batt.output,
        batteryenergy: batt.energy,
        demanddeferr: defr.demand,
        deferrschedule,
    };

    (problem, index)
}
