//! Annual energy balance: production split into direct self-consumption,
//! battery-mediated self-consumption, feed-in, and residual grid import.

use std::fmt;

use serde::Serialize;

use crate::config::EngineConstants;
use crate::engine::irradiance::estimate_specific_yield;
use crate::engine::types::{ConsumptionProfile, StorageSpec, SystemSpec};

/// Seasonal distribution of the annual yield, January to December.
/// Shares sum to 1.0.
pub const MONTHLY_YIELD_SHARE: [f64; 12] = [
    0.03, 0.05, 0.08, 0.11, 0.12, 0.13, 0.12, 0.11, 0.09, 0.07, 0.05, 0.04,
];

/// Complete annual energy balance of a PV system.
///
/// Invariants upheld by [`simulate_energy_balance`]:
/// - `self_consumption_kwh + feed_in_kwh == annual_yield_kwh` (fp tolerance)
/// - `self_consumption_kwh <= annual_consumption_kwh`
/// - every rate lies in `[0, 100]`
#[derive(Debug, Clone, Serialize)]
pub struct EnergyBalance {
    /// Installed capacity the balance was computed for (kWp).
    pub system_size_kwp: f64,
    /// Specific yield used (kWh/kWp/year).
    pub specific_yield_kwh_per_kwp: f64,
    /// Total annual production (kWh).
    pub annual_yield_kwh: f64,
    /// Annual consumption the balance was computed against (kWh).
    pub annual_consumption_kwh: f64,
    /// Production consumed on-site at generation time (kWh).
    pub direct_consumption_kwh: f64,
    /// Production consumed on-site via the battery (kWh).
    pub battery_mediated_kwh: f64,
    /// Total on-site consumption of PV energy (kWh).
    pub self_consumption_kwh: f64,
    /// Self-consumption as a share of production (percent).
    pub self_consumption_rate_pct: f64,
    /// Production exported to the grid (kWh).
    pub feed_in_kwh: f64,
    /// Feed-in as a share of production (percent).
    pub feed_in_rate_pct: f64,
    /// Residual consumption imported from the grid (kWh).
    pub grid_import_kwh: f64,
    /// Consumption covered without grid import (percent).
    pub autarky_rate_pct: f64,
    /// Share of self-consumption routed through the battery (percent).
    pub storage_coverage_pct: f64,
    /// Seasonal split of the annual yield, January to December (kWh).
    pub monthly_yield_kwh: [f64; 12],
}

/// Computes the annual energy balance.
///
/// The production side comes from the irradiance estimate unless the system
/// carries an explicit specific-yield override. Every division is guarded:
/// a zero-production or zero-consumption system yields zeroed rates, never
/// NaN or infinity.
pub fn simulate_energy_balance(
    system: &SystemSpec,
    consumption: &ConsumptionProfile,
    storage: Option<&StorageSpec>,
    constants: &EngineConstants,
) -> EnergyBalance {
    let b = &constants.balance;

    let specific_yield = system.specific_yield_override.unwrap_or_else(|| {
        estimate_specific_yield(&system.location, system.orientation, system.tilt_deg, constants)
    });
    let annual_yield = (system.system_size_kwp * specific_yield).max(0.0);
    let annual_consumption = consumption.annual_consumption_kwh.max(0.0);

    let direct = (annual_yield * b.day_production_share)
        .min(annual_consumption * consumption.daytime_consumption_share);

    let battery_mediated = match storage {
        Some(spec) if spec.capacity_kwh > 0.0 => {
            let surplus = annual_yield - direct;
            let throughput = (surplus * b.surplus_capture_share)
                .min(spec.capacity_kwh * spec.cycles_per_year);
            // clamp: total self-consumption may exceed neither production
            // (throughput <= surplus by construction) nor remaining demand
            (throughput * b.battery_round_trip_efficiency)
                .min((annual_consumption - direct).max(0.0))
        }
        _ => 0.0,
    };

    let self_consumption = direct + battery_mediated;
    let feed_in = annual_yield - self_consumption;
    let grid_import = (annual_consumption - self_consumption).max(0.0);

    let mut monthly_yield_kwh = [0.0; 12];
    for (month, share) in MONTHLY_YIELD_SHARE.iter().enumerate() {
        monthly_yield_kwh[month] = annual_yield * share;
    }

    EnergyBalance {
        system_size_kwp: system.system_size_kwp,
        specific_yield_kwh_per_kwp: specific_yield,
        annual_yield_kwh: annual_yield,
        annual_consumption_kwh: annual_consumption,
        direct_consumption_kwh: direct,
        battery_mediated_kwh: battery_mediated,
        self_consumption_kwh: self_consumption,
        self_consumption_rate_pct: ratio_pct(self_consumption, annual_yield),
        feed_in_kwh: feed_in,
        feed_in_rate_pct: ratio_pct(feed_in, annual_yield),
        grid_import_kwh: grid_import,
        autarky_rate_pct: ratio_pct(self_consumption, annual_consumption).min(100.0),
        storage_coverage_pct: ratio_pct(battery_mediated, self_consumption),
        monthly_yield_kwh,
    }
}

/// Percentage ratio with a zero-denominator guard.
fn ratio_pct(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator * 100.0
    }
}

/// Recommended battery capacity from the daily consumption, after losses.
///
/// Losses are clamped to 0-50 percent.
pub fn optimal_storage_size_kwh(daily_consumption_kwh: f64, loss_pct: f64) -> f64 {
    let losses = loss_pct.clamp(0.0, 50.0);
    daily_consumption_kwh.max(0.0) * (1.0 - losses / 100.0)
}

/// Backup energy available per day from the battery's usable fraction.
pub fn emergency_power_capacity_kwh(storage: &StorageSpec) -> f64 {
    storage.capacity_kwh.max(0.0) * storage.usable_fraction.clamp(0.0, 1.0)
}

impl fmt::Display for EnergyBalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Energy balance ---")?;
        writeln!(
            f,
            "Annual yield:        {:>8.0} kWh ({:.0} kWh/kWp)",
            self.annual_yield_kwh, self.specific_yield_kwh_per_kwp
        )?;
        writeln!(
            f,
            "Self-consumption:    {:>8.0} kWh ({:.1}%)",
            self.self_consumption_kwh, self.self_consumption_rate_pct
        )?;
        writeln!(
            f,
            "  direct / battery:  {:>8.0} / {:.0} kWh",
            self.direct_consumption_kwh, self.battery_mediated_kwh
        )?;
        writeln!(
            f,
            "Feed-in:             {:>8.0} kWh ({:.1}%)",
            self.feed_in_kwh, self.feed_in_rate_pct
        )?;
        writeln!(
            f,
            "Grid import:         {:>8.0} kWh",
            self.grid_import_kwh
        )?;
        write!(f, "Autarky:             {:>8.1} %", self.autarky_rate_pct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::RoofOrientation;

    fn system(size_kwp: f64) -> SystemSpec {
        SystemSpec {
            system_size_kwp: size_kwp,
            module_count: 23,
            module_power_wp: 440.0,
            orientation: RoofOrientation::South,
            tilt_deg: 30.0,
            location: String::new(),
            specific_yield_override: None,
        }
    }

    fn consumption(annual_kwh: f64) -> ConsumptionProfile {
        ConsumptionProfile {
            annual_consumption_kwh: annual_kwh,
            daytime_consumption_share: 0.4,
        }
    }

    fn storage(capacity_kwh: f64) -> StorageSpec {
        StorageSpec {
            capacity_kwh,
            usable_fraction: 0.8,
            max_cycles: 6000.0,
            cycles_per_year: 250.0,
        }
    }

    #[test]
    fn south_optimal_ten_kwp_yields_ten_thousand() {
        let balance = simulate_energy_balance(
            &system(10.0),
            &consumption(4000.0),
            None,
            &EngineConstants::default(),
        );
        assert_eq!(balance.annual_yield_kwh, 10000.0);
        assert_eq!(balance.specific_yield_kwh_per_kwp, 1000.0);
    }

    #[test]
    fn production_splits_into_self_consumption_and_feed_in() {
        let balance = simulate_energy_balance(
            &system(10.0),
            &consumption(4000.0),
            None,
            &EngineConstants::default(),
        );
        // direct = min(10000 * 0.3, 4000 * 0.4) = 1600
        assert!((balance.direct_consumption_kwh - 1600.0).abs() < 1e-9);
        assert_eq!(balance.battery_mediated_kwh, 0.0);
        assert!((balance.feed_in_kwh - 8400.0).abs() < 1e-9);
        assert!(
            (balance.self_consumption_kwh + balance.feed_in_kwh - balance.annual_yield_kwh).abs()
                < 1e-9
        );
        assert!((balance.grid_import_kwh - 2400.0).abs() < 1e-9);
        assert!((balance.autarky_rate_pct - 40.0).abs() < 1e-9);
    }

    #[test]
    fn battery_raises_self_consumption() {
        let constants = EngineConstants::default();
        let without = simulate_energy_balance(&system(10.0), &consumption(4000.0), None, &constants);
        let with = simulate_energy_balance(
            &system(10.0),
            &consumption(4000.0),
            Some(&storage(8.0)),
            &constants,
        );
        assert!(with.self_consumption_kwh > without.self_consumption_kwh);
        assert!(with.battery_mediated_kwh > 0.0);
        assert!(with.storage_coverage_pct > 0.0);
        // the split identity holds in both configurations
        assert!((with.self_consumption_kwh + with.feed_in_kwh - with.annual_yield_kwh).abs() < 1e-9);
    }

    #[test]
    fn battery_throughput_capped_by_capacity_and_cycles() {
        let constants = EngineConstants::default();
        let balance = simulate_energy_balance(
            &system(10.0),
            &consumption(20000.0),
            Some(&storage(2.0)),
            &constants,
        );
        // direct = min(3000, 8000) = 3000; cap = 2 kWh * 250 = 500 kWh throughput
        assert!((balance.battery_mediated_kwh - 500.0 * 0.9).abs() < 1e-9);
    }

    #[test]
    fn oversized_battery_cannot_exceed_demand() {
        let constants = EngineConstants::default();
        let balance = simulate_energy_balance(
            &system(10.0),
            &consumption(2000.0),
            Some(&storage(50.0)),
            &constants,
        );
        assert!(balance.self_consumption_kwh <= 2000.0 + 1e-9);
        assert!(balance.autarky_rate_pct <= 100.0);
        assert!((balance.self_consumption_kwh + balance.feed_in_kwh - balance.annual_yield_kwh)
            .abs()
            < 1e-9);
    }

    #[test]
    fn zero_system_size_zeroes_everything_but_import() {
        let balance = simulate_energy_balance(
            &system(0.0),
            &consumption(4000.0),
            Some(&storage(10.0)),
            &EngineConstants::default(),
        );
        assert_eq!(balance.annual_yield_kwh, 0.0);
        assert_eq!(balance.self_consumption_kwh, 0.0);
        assert_eq!(balance.feed_in_kwh, 0.0);
        assert_eq!(balance.grid_import_kwh, 4000.0);
        assert_eq!(balance.self_consumption_rate_pct, 0.0);
        assert_eq!(balance.feed_in_rate_pct, 0.0);
        assert_eq!(balance.autarky_rate_pct, 0.0);
        assert_eq!(balance.storage_coverage_pct, 0.0);
    }

    #[test]
    fn zero_consumption_keeps_rates_finite() {
        let balance = simulate_energy_balance(
            &system(10.0),
            &consumption(0.0),
            Some(&storage(10.0)),
            &EngineConstants::default(),
        );
        assert_eq!(balance.self_consumption_kwh, 0.0);
        assert_eq!(balance.autarky_rate_pct, 0.0);
        assert_eq!(balance.feed_in_kwh, balance.annual_yield_kwh);
        assert!(balance.feed_in_rate_pct.is_finite());
    }

    #[test]
    fn yield_is_monotonic_in_system_size() {
        let constants = EngineConstants::default();
        let mut previous = -1.0;
        for size in [0.0, 2.0, 5.0, 7.5, 10.0, 25.0] {
            let balance =
                simulate_energy_balance(&system(size), &consumption(4000.0), None, &constants);
            assert!(balance.annual_yield_kwh >= previous);
            previous = balance.annual_yield_kwh;
        }
    }

    #[test]
    fn rates_stay_in_percent_range() {
        let constants = EngineConstants::default();
        for size in [0.0, 1.0, 10.0, 100.0] {
            for consumption_kwh in [0.0, 500.0, 4000.0, 50000.0] {
                for battery in [None, Some(storage(12.0))] {
                    let balance = simulate_energy_balance(
                        &system(size),
                        &consumption(consumption_kwh),
                        battery.as_ref(),
                        &constants,
                    );
                    for rate in [
                        balance.self_consumption_rate_pct,
                        balance.feed_in_rate_pct,
                        balance.autarky_rate_pct,
                        balance.storage_coverage_pct,
                    ] {
                        assert!((0.0..=100.0).contains(&rate), "rate out of range: {rate}");
                    }
                    assert!(balance.self_consumption_kwh <= consumption_kwh + 1e-9);
                }
            }
        }
    }

    #[test]
    fn specific_yield_override_bypasses_estimate() {
        let mut spec = system(10.0);
        spec.specific_yield_override = Some(950.0);
        let balance = simulate_energy_balance(
            &spec,
            &consumption(4000.0),
            None,
            &EngineConstants::default(),
        );
        assert_eq!(balance.annual_yield_kwh, 9500.0);
    }

    #[test]
    fn monthly_shares_sum_to_annual_yield() {
        let share_sum: f64 = MONTHLY_YIELD_SHARE.iter().sum();
        assert!((share_sum - 1.0).abs() < 1e-12);

        let balance = simulate_energy_balance(
            &system(10.0),
            &consumption(4000.0),
            None,
            &EngineConstants::default(),
        );
        let monthly_sum: f64 = balance.monthly_yield_kwh.iter().sum();
        assert!((monthly_sum - balance.annual_yield_kwh).abs() < 1e-6);
        // June outproduces December
        assert!(balance.monthly_yield_kwh[5] > balance.monthly_yield_kwh[11]);
    }

    #[test]
    fn optimal_storage_size_applies_clamped_losses() {
        assert!((optimal_storage_size_kwh(10.0, 10.0) - 9.0).abs() < 1e-9);
        // losses clamped to 50%
        assert!((optimal_storage_size_kwh(10.0, 90.0) - 5.0).abs() < 1e-9);
        assert!((optimal_storage_size_kwh(10.0, -5.0) - 10.0).abs() < 1e-9);
        assert_eq!(optimal_storage_size_kwh(-3.0, 10.0), 0.0);
    }

    #[test]
    fn emergency_capacity_uses_usable_fraction() {
        let spec = storage(10.0);
        assert!((emergency_power_capacity_kwh(&spec) - 8.0).abs() < 1e-9);
    }

    #[test]
    fn display_does_not_panic() {
        let balance = simulate_energy_balance(
            &system(10.0),
            &consumption(4000.0),
            None,
            &EngineConstants::default(),
        );
        assert!(!format!("{balance}").is_empty());
    }
}
