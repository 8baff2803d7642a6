//! Battery constraints (spec.md §4.2 "Battery").
//!
//! `min_kw` is, despite its name, the discharge power cap — see
//! `domain::orders::BatteryOrder` and spec.md §9.

use crate::model::index::AssetVars;
use crate::model::ir::{LinExpr, Problem, Sense, VarKind};
use crate::normalizer::NormalizedInstance;

pub struct BatteryVars {
    pub input: AssetVars,
    pub output: AssetVars,
    pub energy: AssetVars,
}

pub fn add(problem: &mut Problem, instance: &NormalizedInstance) -> BatteryVars {
    let h = instance.horizon;
    let last = h - 1;

    let mut input = AssetVars::default();
    let mut output = AssetVars::default();
    let mut energy = AssetVars::default();

    for order in &instance.batteries {
        let dt = instance.timestep_hours;

        let mut in_vars = Vec::with_capacity(h);
        let mut out_vars = Vec::with_capacity(h);
        let mut energy_vars = Vec::with_capacity(h);

        for t in 0..h {
            let v_in = problem.add_var(format!("batteryin[{t},{}]", order.id), 0.0, order.max_kw, VarKind::Continuous);
            let v_out = problem.add_var(format!("batteryout[{t},{}]", order.id), 0.0, order.min_kw, VarKind::Continuous);
            if t < order.s || t > order.e {
                problem.pin(v_in, 0.0);
                problem.pin(v_out, 0.0);
            }
            let v_energy = problem.add_var(format!("batteryenergy[{t},{}]", order.id), 0.0, order.max_kwh, VarKind::Continuous);

            in_vars.push(v_in);
            out_vars.push(v_out);
            energy_vars.push(v_energy);
        }

        // State-of-energy recursion.
        problem.add_row(
            format!("battery_initial_energy[{}]", order.id),
            LinExpr::term(energy_vars[0], 1.0),
            Sense::Eq,
            order.initial_kwh,
        );
        for t in 1..h {
            let mut expr = LinExpr::default();
            expr.push(energy_vars[t], 1.0);
            expr.push(energy_vars[t - 1], -1.0);
            expr.push(in_vars[t], -dt * order.eta);
            expr.push(out_vars[t], dt / order.eta);
            problem.add_row(format!("battery_energy[{t},{}]", order.id), expr, Sense::Eq, 0.0);
        }

        // Terminal energy requirement.
        problem.add_row(
            format!("battery_end_energy[{}]", order.id),
            LinExpr::term(energy_vars[last], 1.0),
            Sense::Ge,
            order.end_kwh,
        );

        input.ids.push(order.id.clone());
        input.vars.push(in_vars);
        output.ids.push(order.id.clone());
        output.vars.push(out_vars);
        energy.ids.push(order.id.clone());
        energy.vars.push(energy_vars);
    }

    BatteryVars { input, output, energy }
}
