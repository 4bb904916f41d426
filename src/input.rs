//! Wizard-state adapter.
//!
//! The surrounding application keeps one loosely-typed, partially-filled
//! project state that evolves across wizard steps. [`ProjectState`] models
//! that shape: every field optional, numbers tolerated as JSON numbers or
//! numeric strings, unknown keys ignored. [`derive_input`] is the single
//! translation boundary into the engine's strict [`EngineInput`]; all
//! default substitution lives here so the math never sees a missing value
//! or a NaN.

use std::fmt;

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::EngineConstants;
use crate::engine::types::{
    ConsumptionProfile, FinancingRequest, RoofOrientation, StorageSpec, SystemSpec, TariffSpec,
};

/// Default annual consumption (kWh).
pub const DEFAULT_ANNUAL_CONSUMPTION_KWH: f64 = 4000.0;
/// Default share of consumption during production hours.
pub const DEFAULT_DAYTIME_CONSUMPTION_SHARE: f64 = 0.4;
/// Default household electricity price (EUR/kWh).
pub const DEFAULT_ELECTRICITY_PRICE_EUR_PER_KWH: f64 = 0.35;
/// Default feed-in remuneration (EUR/kWh).
pub const DEFAULT_FEED_IN_TARIFF_EUR_PER_KWH: f64 = 0.08;
/// Default installed cost rate (EUR/kWp).
pub const DEFAULT_SYSTEM_COST_EUR_PER_KWP: f64 = 1200.0;
/// Default annual operating cost as a fraction of the system cost.
pub const DEFAULT_OPERATING_COST_RATE: f64 = 0.02;
/// Default module nameplate power (Wp).
pub const DEFAULT_MODULE_POWER_WP: f64 = 440.0;
/// Default system size when the wizard supplies no sizing data (kWp).
pub const DEFAULT_SYSTEM_SIZE_KWP: f64 = 10.0;
/// Default roof tilt (degrees).
pub const DEFAULT_TILT_DEG: f64 = 30.0;
/// Default battery capacity when storage is requested without a size (kWh).
pub const DEFAULT_BATTERY_CAPACITY_KWH: f64 = 5.0;
/// Default usable fraction of the battery capacity.
pub const DEFAULT_BATTERY_USABLE_FRACTION: f64 = 0.8;
/// Default battery cycle life.
pub const DEFAULT_BATTERY_MAX_CYCLES: f64 = 6000.0;
/// Default loan interest rate (percent).
pub const DEFAULT_LOAN_INTEREST_RATE_PCT: f64 = 3.5;
/// Default loan term (years).
pub const DEFAULT_LOAN_TERM_YEARS: u32 = 15;
/// Default projection horizon (years).
pub const DEFAULT_HORIZON_YEARS: u32 = 20;

/// Raw wizard project state.
///
/// Deserialized leniently: numeric fields accept numbers and numeric
/// strings, anything else (including non-finite values) reads as absent.
/// Unknown keys are ignored; the wizard carries plenty of fields the
/// engine never looks at.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ProjectState {
    #[serde(deserialize_with = "lenient_f64")]
    pub system_size_kwp: Option<f64>,
    #[serde(deserialize_with = "lenient_u32")]
    pub module_count: Option<u32>,
    #[serde(deserialize_with = "lenient_f64")]
    pub module_power_wp: Option<f64>,
    #[serde(deserialize_with = "lenient_string")]
    pub roof_orientation: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub roof_tilt_deg: Option<f64>,
    #[serde(deserialize_with = "lenient_string")]
    pub location: Option<String>,
    /// Explicit annual-production figure; overrides the irradiance estimate.
    #[serde(deserialize_with = "lenient_f64")]
    pub annual_yield_kwh: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub annual_consumption_kwh: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub daytime_consumption_share: Option<f64>,
    #[serde(deserialize_with = "lenient_bool")]
    pub include_storage: Option<bool>,
    #[serde(deserialize_with = "lenient_f64")]
    pub battery_capacity_kwh: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub battery_usable_fraction: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub battery_max_cycles: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub battery_cycles_per_year: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub electricity_price_eur_per_kwh: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub feed_in_tariff_eur_per_kwh: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub system_cost_eur_per_kwp: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub subsidy_eur: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub operating_cost_rate: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub price_increase_rate: Option<f64>,
    #[serde(deserialize_with = "lenient_bool")]
    pub include_financing: Option<bool>,
    #[serde(deserialize_with = "lenient_f64")]
    pub down_payment_eur: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub loan_amount_eur: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub interest_rate_pct: Option<f64>,
    #[serde(deserialize_with = "lenient_u32")]
    pub loan_term_years: Option<u32>,
    #[serde(deserialize_with = "lenient_u32")]
    pub horizon_years: Option<u32>,
}

/// Error constructing a [`ProjectState`] from its serialized form.
///
/// Raised only for structurally invalid input: a malformed document or a
/// non-object top level. Incomplete wizard data is not an error.
#[derive(Debug)]
pub struct InputError {
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "project state error: {}", self.message)
    }
}

impl ProjectState {
    /// Parses a wizard state from JSON.
    ///
    /// # Errors
    ///
    /// Returns an `InputError` when the document is not valid JSON or its
    /// top level is not an object. Missing and malformed individual fields
    /// are not errors; they read as absent.
    pub fn from_json_str(s: &str) -> Result<Self, InputError> {
        serde_json::from_str(s).map_err(|e| InputError {
            message: e.to_string(),
        })
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["family-home", "battery-home", "east-west-roof"];

    /// Loads a built-in sample project.
    ///
    /// # Errors
    ///
    /// Returns an `InputError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, InputError> {
        match name {
            "family-home" => Ok(Self {
                system_size_kwp: Some(10.0),
                roof_orientation: Some("south".to_string()),
                roof_tilt_deg: Some(30.0),
                annual_consumption_kwh: Some(4000.0),
                ..Self::default()
            }),
            "battery-home" => Ok(Self {
                module_count: Some(20),
                module_power_wp: Some(440.0),
                roof_orientation: Some("south".to_string()),
                roof_tilt_deg: Some(35.0),
                location: Some("Bayern".to_string()),
                annual_consumption_kwh: Some(5500.0),
                include_storage: Some(true),
                battery_capacity_kwh: Some(8.0),
                include_financing: Some(true),
                down_payment_eur: Some(2000.0),
                ..Self::default()
            }),
            "east-west-roof" => Ok(Self {
                module_count: Some(28),
                module_power_wp: Some(400.0),
                roof_orientation: Some("east".to_string()),
                roof_tilt_deg: Some(15.0),
                annual_consumption_kwh: Some(3200.0),
                ..Self::default()
            }),
            _ => Err(InputError {
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }
}

/// Fully-populated engine input, produced only by [`derive_input`].
#[derive(Debug, Clone, Serialize)]
pub struct EngineInput {
    /// System placement and sizing.
    pub system: SystemSpec,
    /// Consumption profile.
    pub consumption: ConsumptionProfile,
    /// Storage, when the project carries battery interest.
    pub storage: Option<StorageSpec>,
    /// Cost and tariff parameters.
    pub tariff: TariffSpec,
    /// Financing, when the project requests it.
    pub financing: Option<FinancingRequest>,
    /// Projection horizon (years).
    pub horizon_years: u32,
}

/// Derives the strict engine input from a raw wizard state.
///
/// Never fails: every missing or out-of-domain value is replaced by its
/// documented default, shares are clamped into `[0, 1]`, magnitudes to be
/// non-negative. System size, module count, and specific yield are
/// cross-derived when only part of the sizing data is present.
pub fn derive_input(state: &ProjectState, constants: &EngineConstants) -> EngineInput {
    let module_power = positive_or(state.module_power_wp, DEFAULT_MODULE_POWER_WP);
    let explicit_yield = state.annual_yield_kwh.filter(|v| v.is_finite() && *v > 0.0);

    // sizing: explicit size > module data > annual-yield back-derivation > default
    let system_size_kwp = match state.system_size_kwp.filter(|v| v.is_finite() && *v > 0.0) {
        Some(size) => size,
        None => match state.module_count.filter(|c| *c > 0) {
            Some(count) => f64::from(count) * module_power / 1000.0,
            None => match explicit_yield {
                Some(annual_yield) => {
                    annual_yield / constants.yield_model.fallback_specific_yield_kwh_per_kwp
                }
                None => DEFAULT_SYSTEM_SIZE_KWP,
            },
        },
    };
    let module_count = state.module_count.filter(|c| *c > 0).unwrap_or_else(|| {
        (system_size_kwp * 1000.0 / module_power).ceil().max(0.0) as u32
    });

    let specific_yield_override = explicit_yield.and_then(|annual_yield| {
        (system_size_kwp > 0.0).then(|| annual_yield / system_size_kwp)
    });

    let orientation = state
        .roof_orientation
        .as_deref()
        .and_then(RoofOrientation::parse_loose)
        .unwrap_or(RoofOrientation::South);

    let system = SystemSpec {
        system_size_kwp,
        module_count,
        module_power_wp: module_power,
        orientation,
        tilt_deg: finite_or(state.roof_tilt_deg, DEFAULT_TILT_DEG),
        location: state.location.clone().unwrap_or_default(),
        specific_yield_override,
    };

    let consumption = ConsumptionProfile {
        annual_consumption_kwh: non_negative_or(
            state.annual_consumption_kwh,
            DEFAULT_ANNUAL_CONSUMPTION_KWH,
        ),
        daytime_consumption_share: share_or(
            state.daytime_consumption_share,
            DEFAULT_DAYTIME_CONSUMPTION_SHARE,
        ),
    };

    let storage_requested = state.include_storage.unwrap_or(false)
        || state
            .battery_capacity_kwh
            .is_some_and(|c| c.is_finite() && c > 0.0);
    let storage = storage_requested.then(|| StorageSpec {
        capacity_kwh: positive_or(state.battery_capacity_kwh, DEFAULT_BATTERY_CAPACITY_KWH),
        usable_fraction: share_or(state.battery_usable_fraction, DEFAULT_BATTERY_USABLE_FRACTION),
        max_cycles: positive_or(state.battery_max_cycles, DEFAULT_BATTERY_MAX_CYCLES),
        cycles_per_year: positive_or(
            state.battery_cycles_per_year,
            constants.balance.default_cycles_per_year,
        ),
    });

    let tariff = TariffSpec {
        electricity_price_eur_per_kwh: non_negative_or(
            state.electricity_price_eur_per_kwh,
            DEFAULT_ELECTRICITY_PRICE_EUR_PER_KWH,
        ),
        feed_in_tariff_eur_per_kwh: non_negative_or(
            state.feed_in_tariff_eur_per_kwh,
            DEFAULT_FEED_IN_TARIFF_EUR_PER_KWH,
        ),
        system_cost_eur_per_kwp: non_negative_or(
            state.system_cost_eur_per_kwp,
            DEFAULT_SYSTEM_COST_EUR_PER_KWP,
        ),
        subsidy_eur: non_negative_or(state.subsidy_eur, 0.0),
        operating_cost_rate: share_or(state.operating_cost_rate, DEFAULT_OPERATING_COST_RATE),
        price_increase_rate: non_negative_or(state.price_increase_rate, 0.0),
    };

    let financing_requested = state.include_financing.unwrap_or(false)
        || state.down_payment_eur.is_some()
        || state.loan_amount_eur.is_some()
        || state.interest_rate_pct.is_some()
        || state.loan_term_years.is_some();
    let financing = financing_requested.then(|| FinancingRequest {
        down_payment_eur: non_negative_or(state.down_payment_eur, 0.0),
        loan_amount_eur: state.loan_amount_eur.filter(|v| v.is_finite() && *v > 0.0),
        interest_rate_pct: non_negative_or(
            state.interest_rate_pct,
            DEFAULT_LOAN_INTEREST_RATE_PCT,
        ),
        term_years: state
            .loan_term_years
            .filter(|t| *t > 0)
            .unwrap_or(DEFAULT_LOAN_TERM_YEARS),
    });

    EngineInput {
        system,
        consumption,
        storage,
        tariff,
        financing,
        horizon_years: state
            .horizon_years
            .filter(|h| *h > 0)
            .unwrap_or(DEFAULT_HORIZON_YEARS),
    }
}

fn finite_or(value: Option<f64>, default: f64) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(default)
}

fn non_negative_or(value: Option<f64>, default: f64) -> f64 {
    value.filter(|v| v.is_finite() && *v >= 0.0).unwrap_or(default)
}

fn positive_or(value: Option<f64>, default: f64) -> f64 {
    value.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(default)
}

fn share_or(value: Option<f64>, default: f64) -> f64 {
    value
        .filter(|v| v.is_finite())
        .map_or(default, |v| v.clamp(0.0, 1.0))
}

/// Accepts a JSON number or a numeric string; anything else reads as absent.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n.as_f64().filter(|x| x.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|x| x.is_finite()),
        _ => None,
    }))
}

/// Accepts a JSON integer or a numeric string; fractional parts truncate.
fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| {
        let number = match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        number
            .filter(|x| x.is_finite() && *x >= 0.0 && *x <= f64::from(u32::MAX))
            .map(|x| x as u32)
    }))
}

/// Accepts a JSON string or a bare number (postal codes show up as both);
/// anything else reads as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}

/// Accepts a JSON bool, the usual string spellings, or a number (non-zero is
/// true); anything else reads as absent.
fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Bool(b) => Some(b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "ja" | "1" => Some(true),
            "false" | "no" | "nein" | "0" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_f64().map(|x| x != 0.0),
        _ => None,
    }))
}
