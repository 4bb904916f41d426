//! Shared test fixtures for integration tests.

use pv_offer_engine::config::EngineConstants;
use pv_offer_engine::engine::types::{
    ConsumptionProfile, RoofOrientation, StorageSpec, SystemSpec, TariffSpec,
};
use pv_offer_engine::input::EngineInput;

/// Default constant set.
pub fn default_constants() -> EngineConstants {
    EngineConstants::default()
}

/// Reference system: 10 kWp, south-facing, optimal tilt, neutral region.
pub fn default_system() -> SystemSpec {
    SystemSpec {
        system_size_kwp: 10.0,
        module_count: 23,
        module_power_wp: 440.0,
        orientation: RoofOrientation::South,
        tilt_deg: 30.0,
        location: String::new(),
        specific_yield_override: None,
    }
}

/// Reference household: 4000 kWh/year, 40% daytime share.
pub fn default_consumption() -> ConsumptionProfile {
    ConsumptionProfile {
        annual_consumption_kwh: 4000.0,
        daytime_consumption_share: 0.4,
    }
}

/// Reference battery (8 kWh, 80% usable, 250 cycles/year).
pub fn default_storage() -> StorageSpec {
    StorageSpec {
        capacity_kwh: 8.0,
        usable_fraction: 0.8,
        max_cycles: 6000.0,
        cycles_per_year: 250.0,
    }
}

/// Reference tariff (0.35 EUR/kWh, 0.08 EUR/kWh feed-in, 1200 EUR/kWp).
pub fn default_tariff() -> TariffSpec {
    TariffSpec {
        electricity_price_eur_per_kwh: 0.35,
        feed_in_tariff_eur_per_kwh: 0.08,
        system_cost_eur_per_kwp: 1200.0,
        subsidy_eur: 0.0,
        operating_cost_rate: 0.02,
        price_increase_rate: 0.0,
    }
}

/// Full engine input for the reference configuration, no storage, no loan.
pub fn default_input() -> EngineInput {
    EngineInput {
        system: default_system(),
        consumption: default_consumption(),
        storage: None,
        tariff: default_tariff(),
        financing: None,
        horizon_years: 20,
    }
}

/// A wizard state resembling what the data-entry steps actually persist:
/// partially filled, loosely typed, with keys the engine ignores.
pub fn wizardish_json() -> &'static str {
    r#"{
        "customer_name": "Example Customer",
        "wizard_step": 4,
        "module_count": "20",
        "module_power_wp": 440,
        "roof_orientation": "Südost",
        "roof_tilt_deg": "35",
        "location": "Bayern",
        "annual_consumption_kwh": 4500,
        "include_storage": true,
        "battery_capacity_kwh": "8",
        "notes": null
    }"#
}
