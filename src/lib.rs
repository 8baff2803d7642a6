//! Behind-the-meter peak-spread scheduling core.
//!
//! A mixed-integer linear optimizer that, over a rolling 24-hour horizon
//! discretized into uniform timesteps, jointly schedules batteries,
//! shapeable loads, and deferrable loads against an uncontrollable-demand
//! forecast to minimize the spread between the community's highest
//! instantaneous import peak and its lowest (export) peak — a proxy for
//! maximizing collective self-consumption.
//!
//! The crate is a pure, synchronous library: one entry point,
//! [`optimize::maximize_self_consumption`], taking a normalized demand
//! forecast and three order books and returning a result bundle. It
//! performs no I/O beyond invoking an external MILP solver process (or,
//! for CBC, an in-process solve), persists no state between calls, and
//! owns no HTTP/database/scheduling layer — those are external
//! collaborators.
//!
//! Pipeline, leaves first: [`normalizer`] turns wall-clock inputs into an
//! integer-indexed instance; [`model`] builds the MILP from that
//! instance; [`solver`] drives an external or in-process MILP solver;
//! [`projector`] reshapes the solver's flat variable assignment back into
//! per-asset time series keyed by the original timestamps.

pub mod config;
pub mod domain;
pub mod error;
pub mod model;
pub mod normalizer;
pub mod optimize;
pub mod projector;
pub mod solver;
pub mod telemetry;

#[cfg(any(test, feature = "testsupport"))]
pub mod testsupport;

pub use domain::{
    BatteryOrder, DemandForecast, DeferrableOrder, ForecastSample, OptimizationResult, Optimality, ProfileKw,
    ShapeableOrder,
};
pub use error::{CoreError, CoreResult};
pub use optimize::{maximize_self_consumption, Parameters};
