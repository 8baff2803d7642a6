//! External-subprocess path of the Solver Driver (spec.md §4.3, §5).
//!
//! Writes the model to a CPLEX-LP file, invokes the chosen solver binary
//! with its own time-limit flag, and enforces a wall-clock backstop with
//! [`wait_timeout`] in case the solver ignores (or has no) native limit.
//! The child is started in its own process group (`setsid`, via `nix`) so
//! that a SIGINT/SIGTERM aimed at the host process — typically a request
//! handler — does not also reach the solver mid-search (spec.md §4.3
//! "Isolation").

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use wait_timeout::ChildExt;

use crate::domain::result::Optimality;
use crate::error::{CoreError, CoreResult};
use crate::model::ir::Problem;

use super::{lp_format, SolveOptions, SolverKind, Solution};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Extra wall-clock grace granted on top of `timelimit_secs` before the
/// driver itself kills a solver that ignored its native flag.
const TIMEOUT_GRACE: Duration = Duration::from_secs(5);

pub fn solve(problem: &Problem, options: &SolveOptions, binary: &Path) -> CoreResult<Solution> {
    let workdir = std::env::temp_dir();
    let stamp = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let tag = format!("scheduling-core-{}-{stamp}", std::process::id());
    let lp_path = workdir.join(format!("{tag}.lp"));
    let sol_path = workdir.join(format!("{tag}.sol"));

    fs::File::create(&lp_path)?.write_all(lp_format::write(problem).as_bytes())?;

    let mut command = build_command(binary, options, &lp_path, &sol_path);
    command.stdin(Stdio::null());
    if options.verbose {
        command.stdout(Stdio::inherit()).stderr(Stdio::inherit());
    } else {
        command.stdout(Stdio::piped()).stderr(Stdio::piped());
    }

    detach_process_group(&mut command);

    let mut child = command.spawn().map_err(|e| {
        CoreError::SolverError(format!("failed to start solver binary {}: {e}", binary.display()))
    })?;

    let budget = Duration::from_secs(options.timelimit_secs) + TIMEOUT_GRACE;
    let outcome = child.wait_timeout(budget).map_err(CoreError::from)?;

    let timed_out = match outcome {
        Some(_status) => false,
        None => {
            let _ = child.kill();
            let _ = child.wait();
            true
        }
    };

    let values = read_solution(&sol_path, problem, options.kind);

    let _ = fs::remove_file(&lp_path);
    let _ = fs::remove_file(&sol_path);

    match values {
        Ok(values) => Ok(Solution {
            values,
            optimality: if timed_out { Optimality::SubOptimal } else { Optimality::Optimal },
        }),
        Err(ParseOutcome::Infeasible) => {
            Err(CoreError::Infeasible(format!("{:?} reported no feasible assignment", options.kind)))
        }
        Err(ParseOutcome::Missing) if timed_out => Err(CoreError::SolverTimeout),
        Err(ParseOutcome::Missing) => {
            Err(CoreError::SolverError(format!("{:?} exited without writing a solution file", options.kind)))
        }
    }
}

#[cfg(unix)]
fn detach_process_group(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    unsafe {
        command.pre_exec(|| {
            nix::unistd::setsid().map_err(|e| std::io::Error::from_raw_os_error(e as i32))?;
            Ok(())
        });
    }
}

#[cfg(not(unix))]
fn detach_process_group(_command: &mut Command) {}

fn build_command(binary: &Path, options: &SolveOptions, lp_path: &Path, sol_path: &Path) -> Command {
    let mut command = Command::new(binary);
    match options.kind {
        SolverKind::Glpk => {
            command
                .arg("--lp")
                .arg(lp_path)
                .arg("--tmlim")
                .arg(options.timelimit_secs.to_string())
                .arg("-o")
                .arg(sol_path);
        }
        SolverKind::Gurobi => {
            command
                .arg(format!("TimeLimit={}", options.timelimit_secs))
                .arg(format!("ResultFile={}", sol_path.display()))
                .arg(lp_path);
        }
        SolverKind::Cbc => {
            command
                .arg(lp_path)
                .arg("sec")
                .arg(options.timelimit_secs.to_string())
                .arg("solve")
                .arg("solu")
                .arg(sol_path);
        }
    }
    command
}

enum ParseOutcome {
    Missing,
    Infeasible,
}

/// Reads back whatever solution file the solver wrote and aligns the
/// values to `problem.vars`'s order by name. Each solver's report format
/// differs but all three boil down to "name value" pairs once stripped of
/// headers, so a single tolerant line scanner covers them.
fn read_solution(path: &Path, problem: &Problem, kind: SolverKind) -> Result<Vec<f64>, ParseOutcome> {
    let text = fs::read_to_string(path).map_err(|_| ParseOutcome::Missing)?;

    let lowered = text.to_ascii_lowercase();
    if lowered.contains("infeasible") {
        return Err(ParseOutcome::Infeasible);
    }
    if lowered.contains("unbounded") {
        return Err(ParseOutcome::Infeasible);
    }

    let mut by_name: HashMap<String, f64> = HashMap::new();
    for line in text.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 2 {
            continue;
        }
        // CBC's `solu` report prefixes each data row with a numeric index:
        // "   12 demandshape_0_s1_   1.5   0". Skip that column if present.
        let (name, value_token) = match kind {
            SolverKind::Cbc if tokens[0].parse::<u64>().is_ok() && tokens.len() >= 3 => (tokens[1], tokens[2]),
            _ => (tokens[0], tokens[1]),
        };
        if let Ok(value) = value_token.parse::<f64>() {
            by_name.insert(name.to_string(), value);
        }
    }

    if by_name.is_empty() {
        return Err(ParseOutcome::Missing);
    }

    Ok(problem
        .vars
        .iter()
        .map(|def| by_name.get(&lp_format::sanitize(&def.name)).copied().unwrap_or(0.0))
        .collect())
}
