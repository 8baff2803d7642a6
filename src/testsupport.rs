//! Synthetic order-book generators for property tests, supplementing
//! spec.md from `original_source/app/randomorders.py`: the original test
//! harness randomizes order books within realistic kW/kWh ranges and
//! random start/end windows inside a 20-hour horizon. Exposed behind
//! `testsupport` for downstream fuzzing, and always available to this
//! crate's own `#[cfg(test)]` code.

use chrono::{DateTime, Duration, Utc};
use proptest::prelude::*;
use rand::Rng;

use crate::domain::{BatteryOrder, DeferrableOrder, ForecastSample, ProfileKw, ShapeableOrder};

/// A single-draw random battery order, a direct port of
/// `random_battery_orderbook` for callers that want one concrete fuzz
/// instance from an existing `rand::Rng` rather than a shrinkable
/// `proptest` strategy.
pub fn random_battery_order(rng: &mut impl Rng, t0: DateTime<Utc>, horizon_hours: i64, id: impl Into<String>) -> BatteryOrder {
    let startby = t0 + Duration::hours(rng.gen_range(0..horizon_hours));
    let endby = startby + Duration::hours(rng.gen_range(1..horizon_hours.max(2)));
    let max_kwh = rng.gen_range(10..100) as f64;
    let initial_kwh = (rng.gen_range(30..100) as f64).min(max_kwh);
    BatteryOrder {
        id: id.into(),
        startby,
        endby,
        min_kw: rng.gen_range(2..10) as f64,
        max_kw: rng.gen_range(2..10) as f64,
        max_kwh,
        initial_kwh,
        end_kwh: initial_kwh,
        eta: rng.gen_range(85..100) as f64 / 100.0,
    }
}

/// A single-draw random shapeable order, a direct port of
/// `random_shapeable_orderbook`.
pub fn random_shapeable_order(rng: &mut impl Rng, t0: DateTime<Utc>, horizon_hours: i64, id: impl Into<String>) -> ShapeableOrder {
    let startby = t0 + Duration::hours(rng.gen_range(0..horizon_hours));
    let span = rng.gen_range(1..horizon_hours.max(2));
    let endby = startby + Duration::hours(span);
    let max_kw = rng.gen_range(2..10) as f64;
    let requested = rng.gen_range(10..100) as f64;
    ShapeableOrder { id: id.into(), startby, endby, max_kw, end_kwh: requested.min(span as f64 * max_kw) }
}

/// A single-draw random deferrable order, a direct port of
/// `random_deferrable_orderbook`.
pub fn random_deferrable_order(rng: &mut impl Rng, t0: DateTime<Utc>, horizon_hours: i64, id: impl Into<String>) -> DeferrableOrder {
    let startby = t0 + Duration::hours(rng.gen_range(0..horizon_hours));
    let span = rng.gen_range(1..horizon_hours.max(2));
    let endby = startby + Duration::hours(span);
    let duration = rng.gen_range(1..6usize).min(span as usize).max(1);
    let profile = (0..duration).map(|_| rng.gen_range(1..10) as f64).collect();
    DeferrableOrder { id: id.into(), startby, endby, duration, profile_kw: ProfileKw(profile) }
}

/// A `proptest` strategy for a random battery order anchored at `t0`,
/// mirroring `random_battery_orderbook`'s ranges: power caps 2-10 kW,
/// capacity 10-100 kWh, initial energy 30-100 kWh clamped under capacity,
/// the terminal requirement equal to the initial charge, and efficiency
/// 85-100%.
pub fn arbitrary_battery_order(t0: DateTime<Utc>, horizon_hours: i64) -> impl Strategy<Value = BatteryOrder> {
    (
        0..horizon_hours,
        0..horizon_hours,
        2u32..10,
        2u32..10,
        10u32..100,
        30u32..100,
        85u32..100,
    )
        .prop_map(move |(start_offset, span, min_kw, max_kw, max_kwh, initial_pct, eta_pct)| {
            let startby = t0 + Duration::hours(start_offset);
            let endby = startby + Duration::hours(span.max(1));
            let max_kwh = max_kwh as f64;
            let initial_kwh = (initial_pct as f64).min(max_kwh);
            BatteryOrder {
                id: format!("battery-{start_offset}-{span}"),
                startby,
                endby,
                min_kw: min_kw as f64,
                max_kw: max_kw as f64,
                max_kwh,
                initial_kwh,
                end_kwh: initial_kwh,
                eta: eta_pct as f64 / 100.0,
            }
        })
}

/// Mirrors `random_shapeable_orderbook`: power cap 2-10 kW, an energy
/// requirement capped so it's always deliverable within the window at
/// that power cap.
pub fn arbitrary_shapeable_order(t0: DateTime<Utc>, horizon_hours: i64) -> impl Strategy<Value = ShapeableOrder> {
    (0..horizon_hours, 1..horizon_hours, 2u32..10, 10u32..100).prop_map(
        move |(start_offset, span, max_kw, requested_kwh)| {
            let startby = t0 + Duration::hours(start_offset);
            let endby = startby + Duration::hours(span);
            let reachable = span as f64 * max_kw as f64;
            ShapeableOrder {
                id: format!("shapeable-{start_offset}-{span}"),
                startby,
                endby,
                max_kw: max_kw as f64,
                end_kwh: (requested_kwh as f64).min(reachable),
            }
        },
    )
}

/// Mirrors `random_deferrable_orderbook`: duration 1-5 timesteps (or the
/// window length if shorter), profile entries 1-10 kW each.
pub fn arbitrary_deferrable_order(t0: DateTime<Utc>, horizon_hours: i64) -> impl Strategy<Value = DeferrableOrder> {
    (0..horizon_hours, 2..horizon_hours, 1usize..6).prop_flat_map(move |(start_offset, span, raw_duration)| {
        let duration = raw_duration.min(span as usize);
        let startby = t0 + Duration::hours(start_offset);
        let endby = startby + Duration::hours(span);
        prop::collection::vec(1u32..10, duration).prop_map(move |profile| DeferrableOrder {
            id: format!("deferrable-{start_offset}-{span}"),
            startby,
            endby,
            duration,
            profile_kw: ProfileKw(profile.into_iter().map(f64::from).collect()),
        })
    })
}

/// An hourly, flat-demand forecast of `horizon` samples starting at `t0`
/// — the plain backdrop the order-book strategies above are windowed
/// against in property tests.
pub fn flat_forecast_samples(t0: DateTime<Utc>, horizon: usize, power_kw: f64) -> Vec<ForecastSample> {
    (0..horizon)
        .map(|i| ForecastSample { timestamp: t0 + Duration::hours(i as i64), power_kw })
        .collect()
}
