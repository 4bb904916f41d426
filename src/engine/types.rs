//! Core engine input records.
//!
//! Every record here is an immutable value object: the adapter produces them
//! fully populated, the pipeline stages only read them. None of the fields is
//! optional; all default substitution happens upstream in [`crate::input`].

use serde::{Deserialize, Serialize};

/// Compass orientation of the roof face carrying the modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoofOrientation {
    South,
    Southeast,
    Southwest,
    East,
    West,
    North,
}

impl RoofOrientation {
    /// Yield multiplier relative to an ideal south-facing roof.
    pub fn yield_factor(self) -> f64 {
        match self {
            RoofOrientation::South => 1.0,
            RoofOrientation::Southeast | RoofOrientation::Southwest => 0.95,
            RoofOrientation::East | RoofOrientation::West => 0.85,
            RoofOrientation::North => 0.6,
        }
    }

    /// Parses a free-text orientation label from the wizard.
    ///
    /// Accepts English and German labels, case-insensitively. Returns `None`
    /// for anything unrecognized; the adapter substitutes [`Self::South`].
    pub fn parse_loose(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "south" | "süd" | "sued" | "s" => Some(RoofOrientation::South),
            "southeast" | "south-east" | "südost" | "suedost" | "so" | "se" => {
                Some(RoofOrientation::Southeast)
            }
            "southwest" | "south-west" | "südwest" | "suedwest" | "sw" => {
                Some(RoofOrientation::Southwest)
            }
            "east" | "ost" | "o" | "e" => Some(RoofOrientation::East),
            "west" | "w" => Some(RoofOrientation::West),
            "north" | "nord" | "n" => Some(RoofOrientation::North),
            _ => None,
        }
    }
}

/// PV system placement and sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemSpec {
    /// Installed DC capacity (kWp).
    pub system_size_kwp: f64,
    /// Number of modules.
    pub module_count: u32,
    /// Nameplate power of one module (Wp).
    pub module_power_wp: f64,
    /// Roof orientation.
    pub orientation: RoofOrientation,
    /// Roof tilt from horizontal (degrees).
    pub tilt_deg: f64,
    /// Free-text location used for the coarse regional multiplier.
    pub location: String,
    /// Specific yield carried over from an explicit annual-production figure
    /// (kWh/kWp/year). When set it bypasses the irradiance estimate.
    pub specific_yield_override: Option<f64>,
}

/// Annual household consumption profile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConsumptionProfile {
    /// Total annual consumption (kWh).
    pub annual_consumption_kwh: f64,
    /// Fraction of consumption falling into production hours (0.0-1.0).
    pub daytime_consumption_share: f64,
}

/// Battery storage parameters. Absent entirely when the project carries no
/// storage interest; then all self-consumption is direct.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StorageSpec {
    /// Nominal capacity (kWh).
    pub capacity_kwh: f64,
    /// Usable fraction of the nominal capacity (0.0-1.0).
    pub usable_fraction: f64,
    /// Cycle life of the cell chemistry.
    pub max_cycles: f64,
    /// Equivalent full cycles per year.
    pub cycles_per_year: f64,
}

/// Cost and tariff parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TariffSpec {
    /// Household electricity price (EUR/kWh).
    pub electricity_price_eur_per_kwh: f64,
    /// Feed-in remuneration (EUR/kWh).
    pub feed_in_tariff_eur_per_kwh: f64,
    /// Installed cost rate (EUR/kWp).
    pub system_cost_eur_per_kwp: f64,
    /// Lump-sum subsidy deducted from the gross cost (EUR).
    pub subsidy_eur: f64,
    /// Annual operating cost as a fraction of the net system cost.
    pub operating_cost_rate: f64,
    /// Annual electricity-price escalation used by the cash-flow projection.
    pub price_increase_rate: f64,
}

/// Loan parameters, present only when the project requests financing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FinancingRequest {
    /// Up-front payment (EUR).
    pub down_payment_eur: f64,
    /// Principal; defaults to system cost minus down payment when absent.
    pub loan_amount_eur: Option<f64>,
    /// Nominal annual interest rate (percent).
    pub interest_rate_pct: f64,
    /// Loan term (years).
    pub term_years: u32,
}
