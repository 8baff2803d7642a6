//! In-process CBC solve via `good_lp`.
//!
//! Grounded in `optimizer/strategies/milp.rs`'s `solve_lp`: the same
//! `ProblemVariables`/`.minimise(..).using(default_solver)` shape, but
//! generalized to walk an arbitrary [`Problem`] instead of one fixed
//! battery formulation.

use good_lp::{variable, Expression, ProblemVariables, Solution as GoodLpSolution, SolverModel, Variable};

use crate::domain::result::Optimality;
use crate::error::{CoreError, CoreResult};
use crate::model::ir::{LinExpr, Problem, Sense, VarKind};

use super::{SolveOptions, Solution};

pub fn solve(problem: &Problem, options: &SolveOptions) -> CoreResult<Solution> {
    let mut vars = ProblemVariables::new();
    let handles: Vec<Variable> = problem
        .vars
        .iter()
        .map(|def| {
            let mut v = variable().min(def.lb).max(def.ub);
            if def.kind == VarKind::Integer {
                v = v.integer();
            }
            vars.add(v)
        })
        .collect();

    let objective = to_expression(&problem.objective, &handles);
    let mut model = vars.minimise(objective).using(good_lp::default_solver);

    for row in &problem.rows {
        let lhs = to_expression(&row.expr, &handles);
        let constraint = match row.sense {
            Sense::Le => lhs.leq(row.rhs),
            Sense::Ge => lhs.geq(row.rhs),
            Sense::Eq => lhs.eq(row.rhs),
        };
        model = model.with(constraint);
    }

    // coin_cbc accepts raw CBC command-line parameters this way; "sec" is
    // CBC's own wall-clock time limit flag (same one the subprocess path
    // passes to a standalone `cbc` binary, spec.md §4.3).
    model.set_parameter("sec", &options.timelimit_secs.to_string());
    model.set_parameter("logLevel", if options.verbose { "1" } else { "0" });

    let solution = model.solve().map_err(|e| match e {
        good_lp::ResolutionError::Infeasible => {
            CoreError::Infeasible("coin_cbc found no feasible assignment".to_string())
        }
        good_lp::ResolutionError::Unbounded => {
            CoreError::SolverError("coin_cbc reported an unbounded problem".to_string())
        }
        other => CoreError::SolverError(format!("coin_cbc failed: {other}")),
    })?;

    let values = handles.iter().map(|&v| solution.value(v)).collect();
    Ok(Solution { values, optimality: Optimality::Optimal })
}

fn to_expression(expr: &LinExpr, handles: &[Variable]) -> Expression {
    let mut out = Expression::from(expr.constant);
    for &(var, coeff) in &expr.terms {
        out += coeff * handles[var];
    }
    out
}
