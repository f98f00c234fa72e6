//! Scheduler configuration resource.
//!
//! Holds scheduler timing options and the default dynamics tuning, loaded
//! from an INI file. Defaults are safe to run with when the file is missing.
//!
//! # Configuration File Format
//!
//! ```ini
//! [scheduler]
//! delta_multiplier = 1.0
//! ignore_time_scale = false
//! time_scale = 1.0
//! fixed_timestep = 0.016666
//!
//! [dynamics]
//! frequency = 2.0
//! damping = 0.5
//! response = 2.0
//! accurate = true
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::actionlist::ActionList;
use crate::dynamics::DynamicsParams;

/// Default safe values for startup
const DEFAULT_DELTA_MULTIPLIER: f64 = 1.0;
const DEFAULT_IGNORE_TIME_SCALE: bool = false;
const DEFAULT_TIME_SCALE: f64 = 1.0;
const DEFAULT_FIXED_TIMESTEP: f64 = 1.0 / 60.0;
const DEFAULT_CONFIG_PATH: &str = "./cadence.ini";

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Multiplier applied to every list built from this config.
    pub delta_multiplier: f64,
    /// Lists built from this config ignore the global time scale.
    pub ignore_time_scale: bool,
    /// Global time scale written into [`WorldTime`](crate::resources::worldtime::WorldTime).
    pub time_scale: f64,
    /// Seconds per fixed-phase step.
    pub fixed_timestep: f64,
    /// Default tuning for second-order followers.
    pub dynamics: DynamicsParams,
    /// Path to the configuration file.
    #[serde(skip)]
    pub config_path: PathBuf,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SchedulerConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            delta_multiplier: DEFAULT_DELTA_MULTIPLIER,
            ignore_time_scale: DEFAULT_IGNORE_TIME_SCALE,
            time_scale: DEFAULT_TIME_SCALE,
            fixed_timestep: DEFAULT_FIXED_TIMESTEP,
            dynamics: DynamicsParams::default(),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values. Values that
    /// would break the scheduler (negative multiplier, non-positive timestep
    /// or frequency, negative damping) are ignored.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;

        // [scheduler] section
        if let Some(m) = config
            .getfloat("scheduler", "delta_multiplier")
            .ok()
            .flatten()
            .filter(|m| *m >= 0.0)
        {
            self.delta_multiplier = m;
        }
        if let Some(ignore) = config
            .getbool("scheduler", "ignore_time_scale")
            .ok()
            .flatten()
        {
            self.ignore_time_scale = ignore;
        }
        if let Some(scale) = config
            .getfloat("scheduler", "time_scale")
            .ok()
            .flatten()
            .filter(|scale| *scale >= 0.0)
        {
            self.time_scale = scale;
        }
        if let Some(step) = config
            .getfloat("scheduler", "fixed_timestep")
            .ok()
            .flatten()
            .filter(|step| *step > 0.0)
        {
            self.fixed_timestep = step;
        }

        // [dynamics] section
        if let Some(f) = config
            .getfloat("dynamics", "frequency")
            .ok()
            .flatten()
            .filter(|f| *f > 0.0)
        {
            self.dynamics.frequency = f;
        }
        if let Some(z) = config
            .getfloat("dynamics", "damping")
            .ok()
            .flatten()
            .filter(|z| *z >= 0.0)
        {
            self.dynamics.damping = z;
        }
        if let Some(r) = config.getfloat("dynamics", "response").ok().flatten() {
            self.dynamics.response = r;
        }
        if let Some(accurate) = config.getbool("dynamics", "accurate").ok().flatten() {
            self.dynamics.accurate = accurate;
        }

        info!(
            "Loaded config: delta_multiplier={}, ignore_time_scale={}, time_scale={}, fixed_timestep={}, dynamics=({}, {}, {}, accurate={})",
            self.delta_multiplier,
            self.ignore_time_scale,
            self.time_scale,
            self.fixed_timestep,
            self.dynamics.frequency,
            self.dynamics.damping,
            self.dynamics.response,
            self.dynamics.accurate
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        // [scheduler] section
        config.set(
            "scheduler",
            "delta_multiplier",
            Some(self.delta_multiplier.to_string()),
        );
        config.set(
            "scheduler",
            "ignore_time_scale",
            Some(self.ignore_time_scale.to_string()),
        );
        config.set("scheduler", "time_scale", Some(self.time_scale.to_string()));
        config.set(
            "scheduler",
            "fixed_timestep",
            Some(self.fixed_timestep.to_string()),
        );

        // [dynamics] section
        config.set(
            "dynamics",
            "frequency",
            Some(self.dynamics.frequency.to_string()),
        );
        config.set("dynamics", "damping", Some(self.dynamics.damping.to_string()));
        config.set(
            "dynamics",
            "response",
            Some(self.dynamics.response.to_string()),
        );
        config.set(
            "dynamics",
            "accurate",
            Some(self.dynamics.accurate.to_string()),
        );

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }

    /// An empty list carrying this config's timing options.
    pub fn new_list(&self) -> ActionList {
        ActionList::new()
            .with_delta_multiplier(self.delta_multiplier)
            .ignoring_time_scale(self.ignore_time_scale)
    }
}
