//! TOML-overridable engine constants.
//!
//! Every fixed coefficient of the offer calculation lives here as a named
//! field with a documented default, so a deployment can override individual
//! values without touching the algorithms. The defaults reproduce the
//! established offer figures; their provenance is undocumented upstream, so
//! overriding is preferred to editing.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

/// Top-level constant set parsed from TOML.
///
/// All fields have defaults matching the production calibration. Load from
/// TOML with [`EngineConstants::from_toml_file`] or use
/// [`EngineConstants::default`] for the built-in values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConstants {
    /// Specific-yield model coefficients.
    pub yield_model: YieldConstants,
    /// Energy-balance allocation coefficients.
    pub balance: BalanceConstants,
    /// Financial-projection parameters.
    pub finance: FinanceConstants,
    /// Emission factors.
    pub environment: EnvironmentConstants,
    /// Monte-Carlo risk-stage parameters.
    pub risk: RiskConstants,
}

/// Specific-yield model coefficients.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct YieldConstants {
    /// Base specific yield for an optimally placed system (kWh/kWp/year).
    pub base_specific_yield_kwh_per_kwp: f64,
    /// Tilt angle with no yield penalty (degrees from horizontal).
    pub optimal_tilt_deg: f64,
    /// Yield penalty per degree of deviation from the optimal tilt.
    pub tilt_penalty_per_deg: f64,
    /// Lower bound for the tilt factor (must stay positive).
    pub min_tilt_factor: f64,
    /// Specific yield assumed when system size must be derived from an
    /// annual-production figure alone (kWh/kWp/year).
    pub fallback_specific_yield_kwh_per_kwp: f64,
}

impl Default for YieldConstants {
    fn default() -> Self {
        Self {
            base_specific_yield_kwh_per_kwp: 1000.0,
            optimal_tilt_deg: 30.0,
            tilt_penalty_per_deg: 0.01,
            min_tilt_factor: 0.05,
            fallback_specific_yield_kwh_per_kwp: 950.0,
        }
    }
}

/// Energy-balance allocation coefficients.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BalanceConstants {
    /// Share of annual production coincident with consumption hours (0.0-1.0).
    /// Stands in for a full load/production time-series match.
    pub day_production_share: f64,
    /// Share of the post-direct-consumption surplus a battery can capture (0.0-1.0).
    pub surplus_capture_share: f64,
    /// Battery round-trip efficiency (0.0-1.0).
    pub battery_round_trip_efficiency: f64,
    /// Annual equivalent full cycles assumed when the project gives none.
    pub default_cycles_per_year: f64,
}

impl Default for BalanceConstants {
    fn default() -> Self {
        Self {
            day_production_share: 0.3,
            surplus_capture_share: 0.7,
            battery_round_trip_efficiency: 0.9,
            default_cycles_per_year: 250.0,
        }
    }
}

/// Financial-projection parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FinanceConstants {
    /// System lifespan for NPV/IRR/lifetime-ROI figures (years).
    pub lifespan_years: u32,
    /// Discount rate for the NPV figure (fraction per year).
    pub discount_rate: f64,
}

impl Default for FinanceConstants {
    fn default() -> Self {
        Self {
            lifespan_years: 25,
            discount_rate: 0.04,
        }
    }
}

/// Emission factors.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvironmentConstants {
    /// Grid-mix emissions avoided per self-consumed kWh (kg CO2/kWh).
    pub grid_emission_factor_kg_per_kwh: f64,
    /// Embodied manufacturing emissions per installed kWp (kg CO2/kWp).
    pub embodied_co2_kg_per_kwp: f64,
    /// Tree-year equivalents per tonne of avoided CO2.
    pub tree_equivalent_per_tonne: f64,
    /// Passenger-car emissions per kilometre (kg CO2/km).
    pub car_emission_kg_per_km: f64,
}

impl Default for EnvironmentConstants {
    fn default() -> Self {
        Self {
            grid_emission_factor_kg_per_kwh: 0.4,
            embodied_co2_kg_per_kwp: 50.0,
            tree_equivalent_per_tonne: 47.0,
            car_emission_kg_per_km: 0.12,
        }
    }
}

/// Monte-Carlo risk-stage parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RiskConstants {
    /// Number of NPV draws.
    pub simulations: usize,
    /// RNG seed; a fixed seed keeps the whole pipeline deterministic.
    pub seed: u64,
    /// Investment perturbation, as a fraction of the base investment.
    pub investment_std_share: f64,
    /// Savings perturbation, as a fraction of the base annual savings.
    pub savings_std_share: f64,
    /// Absolute perturbation of the discount rate.
    pub discount_rate_std: f64,
    /// Width of the reported NPV band (percent, e.g. 95.0).
    pub confidence_level_pct: f64,
}

impl Default for RiskConstants {
    fn default() -> Self {
        Self {
            simulations: 1000,
            seed: 42,
            investment_std_share: 0.10,
            savings_std_share: 0.15,
            discount_rate_std: 0.01,
            confidence_level_pct: 95.0,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"balance.day_production_share"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "constants error: {} — {}", self.field, self.message)
    }
}

fn share_error(field: &str, value: f64) -> Option<ConfigError> {
    if (0.0..=1.0).contains(&value) {
        None
    } else {
        Some(ConfigError {
            field: field.into(),
            message: format!("must be in [0.0, 1.0], got {value}"),
        })
    }
}

impl EngineConstants {
    /// Parses constants from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "constants".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses constants from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the constant set is usable.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let y = &self.yield_model;
        if y.base_specific_yield_kwh_per_kwp <= 0.0 {
            errors.push(ConfigError {
                field: "yield_model.base_specific_yield_kwh_per_kwp".into(),
                message: "must be > 0".into(),
            });
        }
        if y.fallback_specific_yield_kwh_per_kwp <= 0.0 {
            errors.push(ConfigError {
                field: "yield_model.fallback_specific_yield_kwh_per_kwp".into(),
                message: "must be > 0".into(),
            });
        }
        if y.tilt_penalty_per_deg < 0.0 {
            errors.push(ConfigError {
                field: "yield_model.tilt_penalty_per_deg".into(),
                message: "must be >= 0".into(),
            });
        }
        if !(y.min_tilt_factor > 0.0 && y.min_tilt_factor <= 1.0) {
            errors.push(ConfigError {
                field: "yield_model.min_tilt_factor".into(),
                message: "must be in (0.0, 1.0]".into(),
            });
        }

        let b = &self.balance;
        errors.extend(share_error(
            "balance.day_production_share",
            b.day_production_share,
        ));
        errors.extend(share_error(
            "balance.surplus_capture_share",
            b.surplus_capture_share,
        ));
        if !(b.battery_round_trip_efficiency > 0.0 && b.battery_round_trip_efficiency <= 1.0) {
            errors.push(ConfigError {
                field: "balance.battery_round_trip_efficiency".into(),
                message: "must be in (0.0, 1.0]".into(),
            });
        }
        if b.default_cycles_per_year < 0.0 {
            errors.push(ConfigError {
                field: "balance.default_cycles_per_year".into(),
                message: "must be >= 0".into(),
            });
        }

        let fin = &self.finance;
        if fin.lifespan_years == 0 {
            errors.push(ConfigError {
                field: "finance.lifespan_years".into(),
                message: "must be > 0".into(),
            });
        }
        if fin.discount_rate < 0.0 {
            errors.push(ConfigError {
                field: "finance.discount_rate".into(),
                message: "must be >= 0".into(),
            });
        }

        let e = &self.environment;
        if e.grid_emission_factor_kg_per_kwh < 0.0 {
            errors.push(ConfigError {
                field: "environment.grid_emission_factor_kg_per_kwh".into(),
                message: "must be >= 0".into(),
            });
        }
        if e.embodied_co2_kg_per_kwp < 0.0 {
            errors.push(ConfigError {
                field: "environment.embodied_co2_kg_per_kwp".into(),
                message: "must be >= 0".into(),
            });
        }

        let r = &self.risk;
        if r.simulations == 0 {
            errors.push(ConfigError {
                field: "risk.simulations".into(),
                message: "must be > 0".into(),
            });
        }
        if !(50.0 < r.confidence_level_pct && r.confidence_level_pct < 100.0) {
            errors.push(ConfigError {
                field: "risk.confidence_level_pct".into(),
                message: "must be in (50.0, 100.0)".into(),
            });
        }

        errors
    }
}
