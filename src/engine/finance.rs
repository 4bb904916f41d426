//! Financial projection: investment cost, savings, payback, return figures,
//! and the loan annuity schedule.

use std::fmt;

use serde::Serialize;

use crate::config::EngineConstants;
use crate::engine::balance::EnergyBalance;
use crate::engine::types::TariffSpec;

/// Horizon of the headline return figure (years).
const ROI_HORIZON_YEARS: f64 = 20.0;

/// Financial projection for one offer.
#[derive(Debug, Clone, Serialize)]
pub struct FinancialProjection {
    /// Net investment after subsidy (EUR).
    pub system_cost_eur: f64,
    /// First-year savings: avoided grid purchases plus feed-in revenue minus
    /// operating cost (EUR).
    pub annual_savings_eur: f64,
    /// Static payback time (years); `None` when savings are not positive:
    /// the investment never amortizes and the offer must say so rather than
    /// report infinity.
    pub payback_years: Option<f64>,
    /// Cumulative return after 20 years (EUR).
    pub roi_20_years_eur: f64,
    /// Net present value over the system lifespan (EUR).
    pub npv_eur: f64,
    /// Internal rate of return (percent); `None` when no rate amortizes the
    /// investment within the lifespan.
    pub irr_pct: Option<f64>,
    /// Simple total return over the lifespan relative to the investment (percent).
    pub lifetime_roi_pct: f64,
    /// Cumulative cash position at the end of each projection year (EUR),
    /// savings escalated by the tariff's price-increase rate.
    pub cumulative_cashflow_eur: Vec<f64>,
}

/// Projects the financial outcome of an energy balance under a tariff.
///
/// `horizon_years` bounds the cash-flow series; the NPV/IRR/lifetime figures
/// use the lifespan from `constants`.
pub fn project_financials(
    balance: &EnergyBalance,
    tariff: &TariffSpec,
    horizon_years: u32,
    constants: &EngineConstants,
) -> FinancialProjection {
    let fin = &constants.finance;

    let system_cost =
        (balance.system_size_kwp * tariff.system_cost_eur_per_kwp - tariff.subsidy_eur).max(0.0);
    let annual_savings = balance.self_consumption_kwh * tariff.electricity_price_eur_per_kwh
        + balance.feed_in_kwh * tariff.feed_in_tariff_eur_per_kwh
        - system_cost * tariff.operating_cost_rate;

    let payback_years = if annual_savings > 0.0 {
        Some(system_cost / annual_savings)
    } else {
        None
    };

    FinancialProjection {
        system_cost_eur: system_cost,
        annual_savings_eur: annual_savings,
        payback_years,
        roi_20_years_eur: annual_savings * ROI_HORIZON_YEARS - system_cost,
        npv_eur: npv(
            system_cost,
            annual_savings,
            fin.lifespan_years,
            fin.discount_rate,
        ),
        irr_pct: irr(system_cost, annual_savings, fin.lifespan_years),
        lifetime_roi_pct: lifetime_roi_pct(system_cost, annual_savings, fin.lifespan_years),
        cumulative_cashflow_eur: cumulative_cashflow(
            system_cost,
            annual_savings,
            horizon_years,
            tariff.price_increase_rate,
        ),
    }
}

/// Net present value of a constant annual saving against an up-front investment.
pub fn npv(investment: f64, annual_savings: f64, years: u32, discount_rate: f64) -> f64 {
    let discounted: f64 = (1..=years)
        .map(|year| annual_savings / (1.0 + discount_rate).powi(year as i32))
        .sum();
    discounted - investment
}

/// Internal rate of return (percent) via bisection on the NPV.
///
/// Returns `None` for degenerate inputs (non-positive investment or savings)
/// and when no root lies in the searched bracket.
pub fn irr(investment: f64, annual_savings: f64, years: u32) -> Option<f64> {
    if investment <= 0.0 || annual_savings <= 0.0 || years == 0 {
        return None;
    }

    let f = |rate: f64| npv(investment, annual_savings, years, rate);

    let mut low = -0.9;
    let mut high = 10.0;
    if f(low) * f(high) > 0.0 {
        return None;
    }

    // NPV is monotonically decreasing in the rate, so plain bisection converges
    for _ in 0..200 {
        let mid = (low + high) / 2.0;
        let value = f(mid);
        if value.abs() < 1e-9 {
            return Some(mid * 100.0);
        }
        if f(low) * value < 0.0 {
            high = mid;
        } else {
            low = mid;
        }
        if (high - low) < 1e-10 {
            break;
        }
    }
    Some((low + high) / 2.0 * 100.0)
}

/// Simple total return over the lifespan relative to the investment (percent).
///
/// Returns 0 when the investment is not positive.
pub fn lifetime_roi_pct(investment: f64, annual_savings: f64, years: u32) -> f64 {
    if investment <= 0.0 {
        return 0.0;
    }
    (annual_savings * f64::from(years) - investment) / investment * 100.0
}

/// Cumulative cash position at the end of each year, with savings escalated
/// by the annual price-increase rate.
pub fn cumulative_cashflow(
    system_cost: f64,
    annual_savings: f64,
    horizon_years: u32,
    price_increase_rate: f64,
) -> Vec<f64> {
    let mut series = Vec::with_capacity(horizon_years as usize);
    let mut position = -system_cost;
    for year in 0..horizon_years {
        position += annual_savings * (1.0 + price_increase_rate).powi(year as i32);
        series.push(position);
    }
    series
}

/// Loan annuity schedule for financing the system.
#[derive(Debug, Clone, Serialize)]
pub struct LoanAmortization {
    /// Up-front payment (EUR).
    pub down_payment_eur: f64,
    /// Financed principal (EUR).
    pub loan_amount_eur: f64,
    /// Nominal annual interest rate (percent).
    pub interest_rate_pct: f64,
    /// Loan term (years).
    pub term_years: u32,
    /// Constant monthly annuity (EUR).
    pub monthly_payment_eur: f64,
    /// Sum of all annuities (EUR).
    pub total_payment_eur: f64,
    /// Interest share of the total payment (EUR).
    pub total_interest_eur: f64,
    /// Down payment plus total loan payments (EUR).
    pub effective_system_cost_eur: f64,
}

/// Computes the standard annuity schedule for a loan.
///
/// The term is floored at one year and negative rates are treated as
/// interest-free. A non-positive principal produces a zeroed schedule rather
/// than an error. In the zero-interest case the payment is the plain
/// principal split, `P / n`.
pub fn amortize_loan(
    loan_amount_eur: f64,
    interest_rate_pct: f64,
    term_years: u32,
    down_payment_eur: f64,
) -> LoanAmortization {
    let term_years = term_years.max(1);
    let down_payment = down_payment_eur.max(0.0);
    let months = f64::from(term_years * 12);
    let rate_pct = interest_rate_pct.max(0.0);

    if loan_amount_eur <= 0.0 {
        return LoanAmortization {
            down_payment_eur: down_payment,
            loan_amount_eur: 0.0,
            interest_rate_pct: rate_pct,
            term_years,
            monthly_payment_eur: 0.0,
            total_payment_eur: 0.0,
            total_interest_eur: 0.0,
            effective_system_cost_eur: down_payment,
        };
    }

    let monthly_rate = rate_pct / 100.0 / 12.0;
    let monthly_payment = if monthly_rate == 0.0 {
        loan_amount_eur / months
    } else {
        let growth = (1.0 + monthly_rate).powf(months);
        loan_amount_eur * monthly_rate * growth / (growth - 1.0)
    };
    let total_payment = monthly_payment * months;

    LoanAmortization {
        down_payment_eur: down_payment,
        loan_amount_eur,
        interest_rate_pct: rate_pct,
        term_years,
        monthly_payment_eur: monthly_payment,
        total_payment_eur: total_payment,
        total_interest_eur: total_payment - loan_amount_eur,
        effective_system_cost_eur: down_payment + total_payment,
    }
}

impl fmt::Display for FinancialProjection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Financial projection ---")?;
        writeln!(f, "Investment:          {:>9.2} EUR", self.system_cost_eur)?;
        writeln!(
            f,
            "Annual savings:      {:>9.2} EUR",
            self.annual_savings_eur
        )?;
        match self.payback_years {
            Some(years) => writeln!(f, "Payback:             {years:>9.1} years")?,
            None => writeln!(f, "Payback:             not reached (no positive savings)")?,
        }
        writeln!(f, "Return over 20y:     {:>9.2} EUR", self.roi_20_years_eur)?;
        writeln!(f, "NPV:                 {:>9.2} EUR", self.npv_eur)?;
        match self.irr_pct {
            Some(pct) => writeln!(f, "IRR:                 {pct:>9.2} %")?,
            None => writeln!(f, "IRR:                 n/a")?,
        }
        write!(f, "Lifetime ROI:        {:>9.1} %", self.lifetime_roi_pct)
    }
}

impl fmt::Display for LoanAmortization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Financing ---")?;
        writeln!(
            f,
            "Loan:                {:>9.2} EUR over {} years at {:.2}%",
            self.loan_amount_eur, self.term_years, self.interest_rate_pct
        )?;
        writeln!(
            f,
            "Monthly payment:     {:>9.2} EUR",
            self.monthly_payment_eur
        )?;
        writeln!(
            f,
            "Total interest:      {:>9.2} EUR",
            self.total_interest_eur
        )?;
        write!(
            f,
            "Effective cost:      {:>9.2} EUR",
            self.effective_system_cost_eur
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::balance::simulate_energy_balance;
    use crate::engine::types::{ConsumptionProfile, RoofOrientation, SystemSpec};

    fn tariff() -> TariffSpec {
        TariffSpec {
            electricity_price_eur_per_kwh: 0.35,
            feed_in_tariff_eur_per_kwh: 0.08,
            system_cost_eur_per_kwp: 1200.0,
            subsidy_eur: 0.0,
            operating_cost_rate: 0.02,
            price_increase_rate: 0.0,
        }
    }

    fn balance_10kwp_4000kwh() -> EnergyBalance {
        let system = SystemSpec {
            system_size_kwp: 10.0,
            module_count: 23,
            module_power_wp: 440.0,
            orientation: RoofOrientation::South,
            tilt_deg: 30.0,
            location: String::new(),
            specific_yield_override: None,
        };
        let consumption = ConsumptionProfile {
            annual_consumption_kwh: 4000.0,
            daytime_consumption_share: 0.4,
        };
        simulate_energy_balance(&system, &consumption, None, &EngineConstants::default())
    }

    #[test]
    fn reference_configuration_lands_in_plausible_payback_range() {
        let balance = balance_10kwp_4000kwh();
        let projection =
            project_financials(&balance, &tariff(), 20, &EngineConstants::default());

        assert_eq!(projection.system_cost_eur, 12000.0);
        // self 1600 kWh * 0.35 + feed-in 8400 kWh * 0.08 - 12000 * 0.02 = 992
        assert!((projection.annual_savings_eur - 992.0).abs() < 1e-9);
        assert!(projection.annual_savings_eur > 0.0);

        let payback = projection.payback_years.unwrap();
        assert!((payback - 12000.0 / 992.0).abs() < 1e-9);
        assert!((5.0..=15.0).contains(&payback));

        assert!((projection.roi_20_years_eur - (992.0 * 20.0 - 12000.0)).abs() < 1e-9);
    }

    #[test]
    fn subsidy_reduces_cost_and_is_floored_at_zero() {
        let balance = balance_10kwp_4000kwh();
        let mut subsidized = tariff();
        subsidized.subsidy_eur = 2000.0;
        let projection =
            project_financials(&balance, &subsidized, 20, &EngineConstants::default());
        assert_eq!(projection.system_cost_eur, 10000.0);

        subsidized.subsidy_eur = 50000.0;
        let projection =
            project_financials(&balance, &subsidized, 20, &EngineConstants::default());
        assert_eq!(projection.system_cost_eur, 0.0);
    }

    #[test]
    fn non_positive_savings_report_no_payback() {
        let balance = balance_10kwp_4000kwh();
        let mut worthless = tariff();
        worthless.electricity_price_eur_per_kwh = 0.0;
        worthless.feed_in_tariff_eur_per_kwh = 0.0;
        let projection =
            project_financials(&balance, &worthless, 20, &EngineConstants::default());
        assert!(projection.annual_savings_eur <= 0.0);
        assert!(projection.payback_years.is_none());
        assert!(projection.irr_pct.is_none());
    }

    #[test]
    fn npv_without_discount_equals_undiscounted_total() {
        let value = npv(12000.0, 1000.0, 20, 0.0);
        assert!((value - (1000.0 * 20.0 - 12000.0)).abs() < 1e-9);
    }

    #[test]
    fn npv_discounting_reduces_value() {
        let undiscounted = npv(12000.0, 1000.0, 20, 0.0);
        let discounted = npv(12000.0, 1000.0, 20, 0.04);
        assert!(discounted < undiscounted);
    }

    #[test]
    fn irr_brackets_known_case() {
        // 12000 invested, 1200/year over 25 years amortizes at roughly 9%
        let rate = irr(12000.0, 1200.0, 25).unwrap();
        assert!((7.0..9.5).contains(&rate), "unexpected IRR: {rate}");
        // NPV at the reported rate should be near zero
        let residual = npv(12000.0, 1200.0, 25, rate / 100.0);
        assert!(residual.abs() < 1.0, "NPV residual too large: {residual}");
    }

    #[test]
    fn irr_degenerate_inputs_are_none() {
        assert!(irr(0.0, 1000.0, 20).is_none());
        assert!(irr(12000.0, 0.0, 20).is_none());
        assert!(irr(12000.0, -50.0, 20).is_none());
    }

    #[test]
    fn lifetime_roi_handles_zero_investment() {
        assert_eq!(lifetime_roi_pct(0.0, 1000.0, 25), 0.0);
        let roi = lifetime_roi_pct(12000.0, 1200.0, 25);
        assert!((roi - 150.0).abs() < 1e-9);
    }

    #[test]
    fn cashflow_series_crosses_zero_at_payback() {
        let series = cumulative_cashflow(12000.0, 1000.0, 20, 0.0);
        assert_eq!(series.len(), 20);
        assert!((series[0] - -11000.0).abs() < 1e-9);
        // payback at 12 years: year 11 still negative, year 12 break-even
        assert!(series[10] < 0.0);
        assert!(series[11].abs() < 1e-9);
        assert!(series[19] > 0.0);
    }

    #[test]
    fn cashflow_escalation_grows_late_years() {
        let flat = cumulative_cashflow(12000.0, 1000.0, 20, 0.0);
        let escalated = cumulative_cashflow(12000.0, 1000.0, 20, 0.02);
        assert!((flat[0] - escalated[0]).abs() < 1e-9);
        assert!(escalated[19] > flat[19]);
    }

    #[test]
    fn loan_zero_interest_pays_principal_evenly() {
        let loan = amortize_loan(12000.0, 0.0, 10, 0.0);
        assert!((loan.monthly_payment_eur - 100.0).abs() < 1e-9);
        assert!((loan.monthly_payment_eur * 120.0 - 12000.0).abs() < 1e-6);
        assert!(loan.total_interest_eur.abs() < 1e-6);
        assert_eq!(loan.effective_system_cost_eur, loan.total_payment_eur);
    }

    #[test]
    fn loan_with_interest_costs_more_than_principal() {
        let loan = amortize_loan(12000.0, 3.5, 15, 2000.0);
        assert!(loan.monthly_payment_eur > 12000.0 / 180.0);
        assert!(loan.total_interest_eur > 0.0);
        assert!(
            (loan.effective_system_cost_eur - (2000.0 + loan.total_payment_eur)).abs() < 1e-9
        );
    }

    #[test]
    fn loan_annuity_matches_closed_form() {
        // 10000 at 6% over 1 year: r = 0.005, n = 12
        let loan = amortize_loan(10000.0, 6.0, 1, 0.0);
        let r = 0.005_f64;
        let growth = (1.0 + r).powi(12);
        let expected = 10000.0 * r * growth / (growth - 1.0);
        assert!((loan.monthly_payment_eur - expected).abs() < 1e-9);
    }

    #[test]
    fn loan_non_positive_principal_yields_zero_schedule() {
        let loan = amortize_loan(0.0, 3.5, 15, 500.0);
        assert_eq!(loan.monthly_payment_eur, 0.0);
        assert_eq!(loan.total_payment_eur, 0.0);
        assert_eq!(loan.effective_system_cost_eur, 500.0);
    }

    #[test]
    fn loan_term_floored_at_one_year() {
        let loan = amortize_loan(1200.0, 0.0, 0, 0.0);
        assert_eq!(loan.term_years, 1);
        assert!((loan.monthly_payment_eur - 100.0).abs() < 1e-9);
    }

    #[test]
    fn display_does_not_panic() {
        let balance = balance_10kwp_4000kwh();
        let projection =
            project_financials(&balance, &tariff(), 20, &EngineConstants::default());
        assert!(!format!("{projection}").is_empty());
        let loan = amortize_loan(12000.0, 3.5, 15, 0.0);
        assert!(!format!("{loan}").is_empty());
    }
}
