//! Offer calculation pipeline.
//!
//! Each stage is a pure function over immutable inputs; [`run_offer_pipeline`]
//! chains them and aggregates one serializable result record. Callers
//! recompute on demand; identical inputs produce bit-identical output, so
//! memoizing on the input is safe.

pub mod balance;
pub mod environment;
pub mod finance;
pub mod irradiance;
pub mod risk;
pub mod types;

use serde::Serialize;

use crate::config::EngineConstants;
use crate::input::EngineInput;

use crate::engine::balance::{EnergyBalance, simulate_energy_balance};
use crate::engine::environment::{Co2Estimate, estimate_co2};
use crate::engine::finance::{
    FinancialProjection, LoanAmortization, amortize_loan, project_financials,
};
use crate::engine::risk::RiskAnalysis;

/// Aggregated offer calculation result.
///
/// This record is also the persisted display snapshot: the surrounding
/// application serializes the last computed instance for display continuity.
#[derive(Debug, Clone, Serialize)]
pub struct OfferResult {
    /// Installed capacity (kWp).
    pub system_size_kwp: f64,
    /// Number of modules.
    pub module_count: u32,
    /// Projection horizon used for CO2 and cash-flow figures (years).
    pub horizon_years: u32,
    /// Annual energy balance.
    pub balance: EnergyBalance,
    /// Financial projection.
    pub financial: FinancialProjection,
    /// Environmental estimate.
    pub environment: Co2Estimate,
    /// Loan schedule, when financing was requested.
    pub loan: Option<LoanAmortization>,
    /// NPV risk distribution, when the base case is economically meaningful.
    pub risk: Option<RiskAnalysis>,
}

/// Runs the full pipeline: energy balance, financial projection,
/// environmental estimate, optional loan schedule, and risk distribution.
pub fn run_offer_pipeline(input: &EngineInput, constants: &EngineConstants) -> OfferResult {
    let balance = simulate_energy_balance(
        &input.system,
        &input.consumption,
        input.storage.as_ref(),
        constants,
    );
    let financial = project_financials(&balance, &input.tariff, input.horizon_years, constants);
    let environment = estimate_co2(&balance, input.horizon_years, constants);

    let loan = input.financing.as_ref().map(|request| {
        let principal = request
            .loan_amount_eur
            .unwrap_or((financial.system_cost_eur - request.down_payment_eur).max(0.0));
        amortize_loan(
            principal,
            request.interest_rate_pct,
            request.term_years,
            request.down_payment_eur,
        )
    });

    let risk = risk::analyze(
        financial.system_cost_eur,
        financial.annual_savings_eur,
        constants,
    );

    OfferResult {
        system_size_kwp: input.system.system_size_kwp,
        module_count: input.system.module_count,
        horizon_years: input.horizon_years,
        balance,
        financial,
        environment,
        loan,
        risk,
    }
}
