//! Serializes a [`crate::model::ir::Problem`] to CPLEX-LP text.
//!
//! This is the wire format the external-subprocess path of the Solver
//! Driver hands to `glpsol`/`gurobi_cl`/a standalone `cbc` binary, all of
//! which read CPLEX-LP natively (spec.md §4.3).

use std::fmt::Write as _;

use crate::model::ir::{Problem, Sense, VarKind};

pub fn write(problem: &Problem) -> String {
    let mut out = String::new();

    writeln!(out, "\\ Generated by self-consumption-core").unwrap();
    write_objective(&mut out, problem);
    write_rows(&mut out, problem);
    write_bounds(&mut out, problem);
    write_integers(&mut out, problem);
    writeln!(out, "End").unwrap();
    out
}

fn write_objective(out: &mut String, problem: &Problem) {
    writeln!(out, "Minimize").unwrap();
    write!(out, " obj: ").unwrap();
    write_expr_terms(out, &problem.objective.terms, problem);
    if problem.objective.terms.is_empty() {
        write!(out, "0").unwrap();
    }
    writeln!(out).unwrap();
}

fn write_rows(out: &mut String, problem: &Problem) {
    writeln!(out, "Subject To").unwrap();
    for row in &problem.rows {
        let op = match row.sense {
            Sense::Le => "<=",
            Sense::Ge => ">=",
            Sense::Eq => "=",
        };
        write!(out, " {}: ", sanitize(&row.name)).unwrap();
        write_expr_terms(out, &row.expr.terms, problem);
        if row.expr.terms.is_empty() {
            write!(out, "0").unwrap();
        }
        writeln!(out, " {op} {}", fmt_num(row.rhs - row.expr.constant)).unwrap();
    }
}

fn write_bounds(out: &mut String, problem: &Problem) {
    writeln!(out, "Bounds").unwrap();
    for (idx, def) in problem.vars.iter().enumerate() {
        let name = var_name(idx, problem);
        if def.lb == def.ub {
            writeln!(out, " {name} = {}", fmt_num(def.lb)).unwrap();
            continue;
        }
        if def.lb.is_infinite() && def.lb < 0.0 {
            write!(out, " -inf <= {name}").unwrap();
        } else {
            write!(out, " {} <= {name}", fmt_num(def.lb)).unwrap();
        }
        if def.ub.is_infinite() {
            writeln!(out, " <= +inf").unwrap();
        } else {
            writeln!(out, " <= {}", fmt_num(def.ub)).unwrap();
        }
    }
}

fn write_integers(out: &mut String, problem: &Problem) {
    let integer_vars: Vec<_> = problem
        .vars
        .iter()
        .enumerate()
        .filter(|(_, def)| def.kind == VarKind::Integer)
        .map(|(idx, _)| var_name(idx, problem))
        .collect();
    if integer_vars.is_empty() {
        return;
    }
    writeln!(out, "General").unwrap();
    for name in integer_vars {
        writeln!(out, " {name}").unwrap();
    }
}

fn write_expr_terms(out: &mut String, terms: &[(usize, f64)], problem: &Problem) {
    for (i, &(var, coeff)) in terms.iter().enumerate() {
        let sign = if coeff < 0.0 { "-" } else if i == 0 { "" } else { "+" };
        let magnitude = coeff.abs();
        write!(out, " {sign} {} {}", fmt_num(magnitude), var_name(var, problem)).unwrap();
    }
}

/// LP format identifies variables by name; row/var names can't contain
/// whitespace or the reserved characters the grammar uses as operators.
/// Also used by [`super::process`] to map a solved-back variable name in
/// the solution file to the [`Problem`]'s own `VarDef::name`.
pub(crate) fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

fn var_name(idx: usize, problem: &Problem) -> String {
    sanitize(&problem.vars[idx].name)
}

fn fmt_num(v: f64) -> String {
    if v == v.trunc() && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v:.10}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ir::{LinExpr, Sense};

    #[test]
    fn round_trips_a_tiny_problem_into_lp_sections() {
        let mut problem = Problem::new();
        let x = problem.add_var("x[0]", 0.0, 5.0, VarKind::Continuous);
        let y = problem.add_var("y[0]", 0.0, 1.0, VarKind::Integer);
        problem.objective = LinExpr::sum([LinExpr::term(x, 1.0), LinExpr::term(y, -2.0)]);
        problem.add_row("cap", LinExpr::term(x, 1.0), Sense::Le, 5.0);

        let text = write(&problem);
        assert!(text.contains("Minimize"));
        assert!(text.contains("Subject To"));
        assert!(text.contains("Bounds"));
        assert!(text.contains("General"));
        assert!(text.contains("y_0_"));
        assert!(text.ends_with("End\n"));
    }

    #[test]
    fn sanitizes_bracket_and_comma_characters() {
        assert_eq!(sanitize("demandshape[3,s1]"), "demandshape_3_s1_");
    }

    #[test]
    fn negative_leading_coefficient_does_not_double_up_the_sign() {
        let mut problem = Problem::new();
        let x = problem.add_var("x[0]", 0.0, 5.0, VarKind::Continuous);
        let y = problem.add_var("y[0]", 0.0, 5.0, VarKind::Continuous);
        problem.objective = LinExpr::sum([LinExpr::term(x, -2.0), LinExpr::term(y, 1.0)]);

        let text = write(&problem);
        assert!(text.contains(" - 2 x_0_"));
        assert!(!text.contains("- -2"));
    }
}
