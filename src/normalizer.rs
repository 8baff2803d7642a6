//! Converts wall-clock inputs into an integer-indexed problem instance
//! (spec.md §4.1).

use chrono::{DateTime, Utc};

use crate::domain::{BatteryOrder, DeferrableOrder, DemandForecast, ShapeableOrder};
use crate::error::{CoreError, CoreResult};

const SPACING_EPSILON_HOURS: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct NormalizedBatteryOrder {
    pub id: String,
    pub s: usize,
    pub e: usize,
    pub min_kw: f64,
    pub max_kw: f64,
    pub max_kwh: f64,
    pub initial_kwh: f64,
    pub end_kwh: f64,
    pub eta: f64,
}

#[derive(Debug, Clone)]
pub struct NormalizedShapeableOrder {
    pub id: String,
    pub s: usize,
    pub e: usize,
    pub max_kw: f64,
    pub end_kwh: f64,
}

#[derive(Debug, Clone)]
pub struct NormalizedDeferrableOrder {
    pub id: String,
    pub s: usize,
    pub e: usize,
    pub duration: usize,
    pub profile_kw: Vec<f64>,
}

/// The horizon and the three normalized order sets, ready for the Model
/// Builder (spec.md §4.1 "Normalizer").
#[derive(Debug, Clone)]
pub struct NormalizedInstance {
    pub horizon: usize,
    pub timestep_hours: f64,
    pub timestamps: Vec<DateTime<Utc>>,
    pub demand_uncontrollable: Vec<f64>,
    pub batteries: Vec<NormalizedBatteryOrder>,
    pub shapeables: Vec<NormalizedShapeableOrder>,
    pub deferrables: Vec<NormalizedDeferrableOrder>,
}

pub fn normalize(
    forecast: &DemandForecast,
    batteries: &[BatteryOrder],
    shapeables: &[ShapeableOrder],
    deferrables: &[DeferrableOrder],
    timestep_hours: f64,
) -> CoreResult<NormalizedInstance> {
    let horizon = forecast.len();
    if horizon < 2 {
        return Err(CoreError::InvalidHorizon(format!(
            "forecast has {horizon} samples, need at least 2"
        )));
    }

    for window in forecast.samples.windows(2) {
        let gap_hours = hours_between(window[0].timestamp, window[1].timestamp);
        if (gap_hours - timestep_hours).abs() > SPACING_EPSILON_HOURS {
            return Err(CoreError::InvalidHorizon(format!(
                "non-uniform spacing: expected {timestep_hours}h steps, found a {gap_hours}h gap between {} and {}",
                window[0].timestamp, window[1].timestamp
            )));
        }
    }

    let t0 = forecast.t0().expect("checked horizon >= 2 above");
    let last = horizon - 1;

    let batteries = batteries
        .iter()
        .map(|b| {
            if b.initial_kwh < 0.0 || b.initial_kwh > b.max_kwh {
                return Err(CoreError::InvalidOrder(format!(
                    "battery {}: initial_kwh {} must be within [0, max_kwh={}]",
                    b.id, b.initial_kwh, b.max_kwh
                )));
            }
            if !(0.0 < b.eta && b.eta <= 1.0) {
                return Err(CoreError::InvalidOrder(format!(
                    "battery {}: eta {} must be in (0, 1]",
                    b.id, b.eta
                )));
            }
            let (s, e) = index_window(&b.id, t0, b.startby, b.endby, timestep_hours, last)?;
            Ok(NormalizedBatteryOrder {
                id: b.id.clone(),
                s,
                e,
                min_kw: b.min_kw,
                max_kw: b.max_kw,
                max_kwh: b.max_kwh,
                initial_kwh: b.initial_kwh,
                end_kwh: b.end_kwh,
                eta: b.eta,
            })
        })
        .collect::<CoreResult<Vec<_>>>()?;

    let shapeables = shapeables
        .iter()
        .map(|s_order| {
            let (s, e) = index_window(&s_order.id, t0, s_order.startby, s_order.endby, timestep_hours, last)?;
            Ok(NormalizedShapeableOrder {
                id: s_order.id.clone(),
                s,
                e,
                max_kw: s_order.max_kw,
                end_kwh: s_order.end_kwh,
            })
        })
        .collect::<CoreResult<Vec<_>>>()?;

    let deferrables = deferrables
        .iter()
        .map(|d| {
            if d.profile_kw.len() != d.duration {
                return Err(CoreError::InvalidOrder(format!(
                    "deferrable {}: profile_kw has {} entries, duration is {}",
                    d.id,
                    d.profile_kw.len(),
                    d.duration
                )));
            }
            let (s, e) = index_window(&d.id, t0, d.startby, d.endby, timestep_hours, last)?;
            Ok(NormalizedDeferrableOrder {
                id: d.id.clone(),
                s,
                e,
                duration: d.duration,
                profile_kw: d.profile_kw.as_slice().to_vec(),
            })
        })
        .collect::<CoreResult<Vec<_>>>()?;

    Ok(NormalizedInstance {
        horizon,
        timestep_hours,
        timestamps: forecast.samples.iter().map(|s| s.timestamp).collect(),
        demand_uncontrollable: forecast.power_kw(),
        batteries,
        shapeables,
        deferrables,
    })
}

fn hours_between(a: DateTime<Utc>, b: DateTime<Utc>) -> f64 {
    (b - a).num_milliseconds() as f64 / 3_600_000.0
}

fn index_window(
    id: &str,
    t0: DateTime<Utc>,
    startby: DateTime<Utc>,
    endby: DateTime<Utc>,
    timestep_hours: f64,
    last: usize,
) -> CoreResult<(usize, usize)> {
    if startby > endby {
        return Err(CoreError::InvalidOrder(format!(
            "order {id}: startby {startby} is after endby {endby}"
        )));
    }
    let s = (hours_between(t0, startby) / timestep_hours).floor();
    let e = (hours_between(t0, endby) / timestep_hours).floor();

    if s < 0.0 || e < 0.0 || s as usize > last || e as usize > last {
        return Err(CoreError::InvalidOrder(format!(
            "order {id}: window [{startby}, {endby}] falls outside the forecast horizon"
        )));
    }
    Ok((s as usize, e as usize))
}
