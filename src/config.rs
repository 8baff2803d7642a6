use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

/// Default layer for the solve-time parameters of spec.md §3 ("Parameters").
///
/// A caller always passes `solver`/`timelimit`/`verbose`/`solver_path` to
/// [`crate::optimize::maximize_self_consumption`] explicitly; this config
/// only supplies the defaults a deployment falls back to, plus the binary
/// discovery paths for the external solvers, the same way the teacher's
/// `AppConfig` supplies a `ServerConfig` default behind explicit per-request
/// overrides.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct SolverConfig {
    #[serde(default = "default_solver_kind")]
    pub default_solver: String,

    #[validate(range(min = 1, max = 3600))]
    #[serde(default = "default_timelimit_secs")]
    pub default_timelimit_secs: u64,

    #[serde(default)]
    pub verbose: bool,

    #[validate(nested)]
    #[serde(default)]
    pub binaries: SolverBinaries,
}

/// Overrides for locating the external solver executables (spec.md §6,
/// `solver_path`). Any field left `None` falls back to `PATH` lookup.
#[derive(Debug, Clone, Deserialize, Serialize, Validate, Default)]
pub struct SolverBinaries {
    #[serde(default)]
    pub glpsol_path: Option<PathBuf>,

    #[serde(default)]
    pub gurobi_cl_path: Option<PathBuf>,

    #[serde(default)]
    pub cbc_path: Option<PathBuf>,
}

fn default_solver_kind() -> String {
    "cbc".to_string()
}

fn default_timelimit_secs() -> u64 {
    300
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            default_solver: default_solver_kind(),
            default_timelimit_secs: default_timelimit_secs(),
            verbose: false,
            binaries: SolverBinaries::default(),
        }
    }
}

impl SolverConfig {
    /// Load configuration from TOML files and environment variables.
    ///
    /// Layering (later overrides earlier), mirroring the teacher's
    /// `AppConfig::load_with_env`:
    /// 1. `config/default.toml`
    /// 2. `config/<environment>.toml`, if given
    /// 3. environment variables prefixed `SCHEDCORE__`, `__`-delimited
    pub fn load() -> Result<Self> {
        Self::load_with_env(None)
    }

    pub fn load_with_env(environment: Option<&str>) -> Result<Self> {
        let mut figment = Figment::from(Self::default()).merge(Toml::file("config/default.toml"));

        if let Some(env) = environment {
            figment = figment.merge(Toml::file(format!("config/{env}.toml")));
        }

        figment = figment.merge(Env::prefixed("SCHEDCORE__").split("__"));

        let config: SolverConfig = figment.extract().context("failed to parse solver configuration")?;
        config.validate().context("solver configuration validation failed")?;
        Ok(config)
    }
}
