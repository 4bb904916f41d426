//! Monte-Carlo NPV distribution for the offer's headline economics.
//!
//! Perturbs investment, savings, and discount rate around their point
//! estimates and reports the resulting NPV spread. The RNG is seeded from
//! the constant set, so the whole pipeline stays deterministic.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::config::EngineConstants;
use crate::engine::finance::npv;

/// NPV distribution statistics from the Monte-Carlo draw.
#[derive(Debug, Clone, Serialize)]
pub struct RiskAnalysis {
    /// Mean NPV across all draws (EUR).
    pub npv_mean_eur: f64,
    /// Standard deviation of the NPV (EUR).
    pub npv_std_eur: f64,
    /// Lower bound of the confidence band (EUR).
    pub npv_lower_eur: f64,
    /// Upper bound of the confidence band (EUR).
    pub npv_upper_eur: f64,
    /// 5th-percentile NPV (EUR).
    pub value_at_risk_eur: f64,
    /// Share of draws with positive NPV (percent).
    pub success_probability_pct: f64,
    /// Number of draws.
    pub simulations: usize,
}

/// Runs the Monte-Carlo draw for an investment/savings point estimate.
///
/// Returns `None` unless both the investment and the savings are positive.
pub fn analyze(
    investment_eur: f64,
    annual_savings_eur: f64,
    constants: &EngineConstants,
) -> Option<RiskAnalysis> {
    if investment_eur <= 0.0 || annual_savings_eur <= 0.0 {
        return None;
    }

    let r = &constants.risk;
    let years = constants.finance.lifespan_years;
    let base_rate = constants.finance.discount_rate;
    let mut rng = StdRng::seed_from_u64(r.seed);

    let mut draws = Vec::with_capacity(r.simulations);
    for _ in 0..r.simulations {
        let investment = (investment_eur
            + gaussian_noise(&mut rng, investment_eur * r.investment_std_share))
        .max(0.0);
        let savings = (annual_savings_eur
            + gaussian_noise(&mut rng, annual_savings_eur * r.savings_std_share))
        .max(0.0);
        let rate = (base_rate + gaussian_noise(&mut rng, r.discount_rate_std)).max(0.0);
        draws.push(npv(investment, savings, years, rate));
    }
    draws.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = draws.len() as f64;
    let mean = draws.iter().sum::<f64>() / n;
    let variance = draws.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let alpha = (100.0 - r.confidence_level_pct) / 2.0;
    let successes = draws.iter().filter(|v| **v > 0.0).count();

    Some(RiskAnalysis {
        npv_mean_eur: mean,
        npv_std_eur: variance.sqrt(),
        npv_lower_eur: percentile(&draws, alpha),
        npv_upper_eur: percentile(&draws, 100.0 - alpha),
        value_at_risk_eur: percentile(&draws, 5.0),
        success_probability_pct: successes as f64 / n * 100.0,
        simulations: draws.len(),
    })
}

/// Linear-interpolated percentile of an already sorted slice.
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let clamped = pct.clamp(0.0, 100.0);
    let position = clamped / 100.0 * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let weight = position - lower as f64;
        sorted[lower] * (1.0 - weight) + sorted[upper] * weight
    }
}

/// Gaussian noise via the Box-Muller transform.
fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f64 = rng.random::<f64>().clamp(1e-12, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    z0 * std_dev
}

impl fmt::Display for RiskAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Risk analysis ({} draws) ---", self.simulations)?;
        writeln!(
            f,
            "NPV:                 {:>9.0} EUR ± {:.0}",
            self.npv_mean_eur, self.npv_std_eur
        )?;
        writeln!(
            f,
            "Confidence band:     {:>9.0} .. {:.0} EUR",
            self.npv_lower_eur, self.npv_upper_eur
        )?;
        writeln!(
            f,
            "Value at risk (5%):  {:>9.0} EUR",
            self.value_at_risk_eur
        )?;
        write!(
            f,
            "Success probability: {:>9.1} %",
            self.success_probability_pct
        )
    }
}
