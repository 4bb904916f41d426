//! Annual-resolution photovoltaic offer engine: energy balance, financial
//! projection, and environmental estimate for a rooftop PV quote.

pub mod config;
pub mod engine;
pub mod input;
pub mod io;
pub mod report;

#[cfg(feature = "api")]
pub mod api;

pub use config::EngineConstants;
pub use engine::balance::simulate_energy_balance;
pub use engine::environment::estimate_co2;
pub use engine::finance::{amortize_loan, project_financials};
pub use engine::irradiance::estimate_specific_yield;
pub use engine::{OfferResult, run_offer_pipeline};
pub use input::{EngineInput, ProjectState, derive_input};
