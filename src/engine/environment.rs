//! Avoided-emission estimate from the energy balance.
//!
//! Static grid-mix factor, linear over the horizon, with no
//! decarbonization trend and no discounting.

use std::fmt;

use serde::Serialize;

use crate::config::EngineConstants;
use crate::engine::balance::EnergyBalance;

/// Avoided grid emissions attributed to self-consumed PV energy.
#[derive(Debug, Clone, Serialize)]
pub struct Co2Estimate {
    /// Avoided emissions per year (kg).
    pub annual_kg: f64,
    /// Avoided emissions over the projection horizon (kg).
    pub horizon_kg: f64,
    /// Years until the avoided emissions offset the panels' embodied
    /// manufacturing emissions; `None` when nothing is avoided.
    pub payback_years: Option<f64>,
    /// Tree-years absorbing the same amount over the horizon.
    pub tree_equivalent: f64,
    /// Passenger-car kilometres emitting the same amount over the horizon.
    pub car_km_equivalent: f64,
}

/// Estimates avoided emissions for the balance over `horizon_years`.
pub fn estimate_co2(
    balance: &EnergyBalance,
    horizon_years: u32,
    constants: &EngineConstants,
) -> Co2Estimate {
    let env = &constants.environment;

    let annual_kg = balance.self_consumption_kwh * env.grid_emission_factor_kg_per_kwh;
    let horizon_kg = annual_kg * f64::from(horizon_years);

    // embodied emissions amortize against the full annual production,
    // not only the self-consumed share
    let embodied_kg = balance.system_size_kwp * env.embodied_co2_kg_per_kwp;
    let annual_offset_kg = balance.annual_yield_kwh * env.grid_emission_factor_kg_per_kwh;
    let payback_years = if annual_offset_kg > 0.0 {
        Some(embodied_kg / annual_offset_kg)
    } else {
        None
    };

    let car_km_equivalent = if env.car_emission_kg_per_km > 0.0 {
        horizon_kg / env.car_emission_kg_per_km
    } else {
        0.0
    };

    Co2Estimate {
        annual_kg,
        horizon_kg,
        payback_years,
        tree_equivalent: horizon_kg / 1000.0 * env.tree_equivalent_per_tonne,
        car_km_equivalent,
    }
}

impl fmt::Display for Co2Estimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Environmental estimate ---")?;
        writeln!(f, "CO2 avoided:         {:>8.0} kg/year", self.annual_kg)?;
        writeln!(f, "Over horizon:        {:>8.0} kg", self.horizon_kg)?;
        match self.payback_years {
            Some(years) => writeln!(f, "CO2 payback:         {years:>8.1} years")?,
            None => writeln!(f, "CO2 payback:         n/a")?,
        }
        write!(
            f,
            "Equivalent to {:.0} tree-years or {:.0} car-km",
            self.tree_equivalent, self.car_km_equivalent
        )
    }
}
