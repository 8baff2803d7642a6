//! Shapeable-load constraints (spec.md §4.2 "Shapeable").

use crate::model::index::AssetVars;
use crate::model::ir::{LinExpr, Problem, Sense, VarKind};
use crate::normalizer::NormalizedInstance;

pub fn add(problem: &mut Problem, instance: &NormalizedInstance) -> AssetVars {
    let h = instance.horizon;
    let mut asset = AssetVars::default();

    for order in &instance.shapeables {
        let mut row_vars = Vec::with_capacity(h);
        for t in 0..h {
            let var = problem.add_var(format!("demandshape[{t},{}]", order.id), 0.0, order.max_kw, VarKind::Continuous);
            if t < order.s || t > order.e {
                problem.pin(var, 0.0);
            }
            row_vars.push(var);
        }

        // Energy delivery: sum_t demandshape[t,s] * timestep == end_kwh
        let mut energy = LinExpr::default();
        for &var in &row_vars {
            energy.push(var, instance.timestep_hours);
        }
        problem.add_row(format!("shape_energy[{}]", order.id), energy, Sense::Eq, order.end_kwh);

        asset.ids.push(order.id.clone());
        asset.vars.push(row_vars);
    }

    asset
}
