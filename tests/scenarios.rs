//! End-to-end scenarios S1-S6 (spec.md §8), driving the crate's one
//! public entry point against a real in-process CBC solve.

use chrono::{DateTime, Duration, Utc};

use self_consumption_core::domain::{BatteryOrder, DeferrableOrder, ForecastSample, ProfileKw, ShapeableOrder};
use self_consumption_core::{maximize_self_consumption, CoreError, DemandForecast, Parameters};

const EPS: f64 = 1e-4;

fn t0() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z").unwrap().with_timezone(&Utc)
}

fn forecast(power_kw: &[f64], timestep_hours: f64) -> DemandForecast {
    let origin = t0();
    let step_ms = (timestep_hours * 3_600_000.0) as i64;
    DemandForecast::new(
        power_kw
            .iter()
            .enumerate()
            .map(|(i, &p)| ForecastSample { timestamp: origin + Duration::milliseconds(step_ms * i as i64), power_kw: p })
            .collect(),
    )
}

fn params(timestep_hours: f64) -> Parameters {
    Parameters {
        timestep_hours,
        solver: "cbc".into(),
        timelimit_secs: 30,
        verbose: false,
        solver_path: None,
    }
}

/// S1 — no controllables: the whole forecast passes straight through as
/// the import peak, with no low (export) peak at all.
#[test]
fn s1_no_controllables() {
    let fc = forecast(&[5.0; 12], 1.0 / 12.0);
    let result = maximize_self_consumption(&fc, &[], &[], &[], &params(1.0 / 12.0)).unwrap();

    assert_eq!(result.demand_controllable, vec![0.0; 12]);
    assert!((result.peakhigh - 5.0).abs() < EPS);
    assert!(result.peaklow.abs() < EPS);
}

/// S2 — a single shapeable spreads its required energy across its full
/// window; the power-cap-constrained objective is strictly positive.
#[test]
fn s2_shapeable_spreads_energy() {
    let dt = 1.0 / 12.0;
    let fc = forecast(&[0.0; 12], dt);
    let origin = fc.t0().unwrap();
    let order = ShapeableOrder {
        id: "s1".into(),
        startby: origin,
        endby: origin + Duration::milliseconds((11.0 * dt * 3_600_000.0) as i64),
        max_kw: 2.0,
        end_kwh: 2.0,
    };
    let result = maximize_self_consumption(&fc, &[], &[order], &[], &params(dt)).unwrap();

    let matrix = result.demandshape.expect("shapeable matrix present");
    let delivered: f64 = matrix.column("s1").unwrap().iter().sum::<f64>() * dt;
    assert!((delivered - 2.0).abs() < EPS);
    assert!(result.peakhigh > 0.0);
}

/// S3 — a large, efficient battery flattens an alternating forecast down
/// to near-zero peak spread.
#[test]
fn s3_battery_flattens_alternating_forecast() {
    let powers: Vec<f64> = (0..24).map(|t| if t % 2 == 0 { 10.0 } else { -10.0 }).collect();
    let fc = forecast(&powers, 1.0);
    let origin = fc.t0().unwrap();
    let battery = BatteryOrder {
        id: "b1".into(),
        startby: origin,
        endby: origin + Duration::hours(23),
        min_kw: 50.0,
        max_kw: 50.0,
        max_kwh: 1000.0,
        initial_kwh: 500.0,
        end_kwh: 500.0,
        eta: 1.0,
    };
    let result = maximize_self_consumption(&fc, &[battery], &[], &[], &params(1.0)).unwrap();

    assert!((result.peakhigh - result.peaklow).abs() < 1e-3);
}

/// S4 — a deferrable avoids overlapping the forecast's peak timesteps.
#[test]
fn s4_deferrable_avoids_forecast_peak() {
    let fc = forecast(&[0.0, 0.0, 0.0, 10.0, 10.0, 0.0, 0.0, 0.0, 0.0, 0.0], 1.0);
    let origin = fc.t0().unwrap();
    let order = DeferrableOrder {
        id: "d1".into(),
        startby: origin,
        endby: origin + Duration::hours(9),
        duration: 2,
        profile_kw: ProfileKw(vec![5.0, 5.0]),
    };
    let result = maximize_self_consumption(&fc, &[], &[], &[order], &params(1.0)).unwrap();

    let schedule = result.deferrschedule.expect("schedule matrix present");
    let col = schedule.column("d1").unwrap();
    let total: f64 = col.iter().sum();
    assert!((total - 1.0).abs() < EPS);

    let start = col.iter().position(|&v| v > 0.5).unwrap();
    assert!(start == 0 || start == 1 || start == 2, "expected a placement clear of the t=3,4 peak, got {start}");
}

/// S5 — a shapeable whose required energy cannot fit its window at its
/// power cap is infeasible.
#[test]
fn s5_infeasible_shapeable() {
    let fc = forecast(&[0.0; 2], 1.0);
    let origin = fc.t0().unwrap();
    let order = ShapeableOrder {
        id: "s1".into(),
        startby: origin,
        endby: origin,
        max_kw: 1.0,
        end_kwh: 100.0,
    };
    let err = maximize_self_consumption(&fc, &[], &[order], &[], &params(1.0)).unwrap_err();
    assert!(matches!(err, CoreError::Infeasible(_)));
}

/// S6 — battery efficiency loss means retaining 5 kWh net from a 50%
/// round-trip battery requires charging roughly twice that gross.
#[test]
fn s6_battery_efficiency_loss() {
    let fc = forecast(&[0.0; 6], 1.0);
    let origin = fc.t0().unwrap();
    let battery = BatteryOrder {
        id: "b1".into(),
        startby: origin,
        endby: origin + Duration::hours(5),
        min_kw: 20.0,
        max_kw: 20.0,
        max_kwh: 50.0,
        initial_kwh: 0.0,
        end_kwh: 5.0,
        eta: 0.5,
    };
    let result = maximize_self_consumption(&fc, &[battery], &[], &[], &params(1.0)).unwrap();

    let energy = result.batteryenergy.expect("battery energy matrix present");
    let last = *energy.column("b1").unwrap().last().unwrap();
    assert!(last >= 5.0 - EPS);

    let charge_in: f64 = result.batteryin.unwrap().column("b1").unwrap().iter().sum();
    assert!(charge_in >= 10.0 - EPS, "expected gross charge >= 10 kWh to retain 5 kWh net, got {charge_in}");
}
