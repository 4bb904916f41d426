//! Specific-yield estimate from roof placement.
//!
//! A deliberately coarse closed-form model: base yield scaled by orientation,
//! tilt deviation, and a substring-matched regional factor. It stands in for
//! a geocoded irradiance lookup and must never error or go negative.

use crate::config::EngineConstants;
use crate::engine::types::RoofOrientation;

/// Estimates the expected annual specific yield (kWh/kWp/year).
///
/// # Arguments
///
/// * `location` - Free-text region; matched by substring, empty is fine
/// * `orientation` - Roof orientation
/// * `tilt_deg` - Roof tilt from horizontal in degrees
/// * `constants` - Engine constant set
///
/// The result is clamped to be non-negative for any input combination.
pub fn estimate_specific_yield(
    location: &str,
    orientation: RoofOrientation,
    tilt_deg: f64,
    constants: &EngineConstants,
) -> f64 {
    let y = &constants.yield_model;

    let tilt_factor = (1.0 - (tilt_deg - y.optimal_tilt_deg).abs() * y.tilt_penalty_per_deg)
        .max(y.min_tilt_factor);

    let estimate = y.base_specific_yield_kwh_per_kwp
        * orientation.yield_factor()
        * tilt_factor
        * regional_factor(location);

    estimate.max(0.0)
}

/// Coarse regional multiplier from substring matches on the location text.
///
/// Not a geocoded lookup: southern federal states get a bonus, the north a
/// malus, everything else is neutral. Checked in that order, so a location
/// matching both resolves to the southern bonus.
fn regional_factor(location: &str) -> f64 {
    let location = location.to_lowercase();
    if location.contains("bayern") || location.contains("baden") {
        1.1
    } else if location.contains("nord") {
        0.9
    } else {
        1.0
    }
}
