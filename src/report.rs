//! Plain-text offer report for the CLI.

use crate::engine::OfferResult;

pub fn print_offer_report(result: &OfferResult) {
    println!(
        "PV offer — {:.2} kWp ({} modules), {}-year horizon",
        result.system_size_kwp, result.module_count, result.horizon_years
    );
    println!();
    println!("{}", result.balance);
    println!();
    println!("{}", result.financial);
    if let Some(loan) = &result.loan {
        println!();
        println!("{loan}");
    }
    println!();
    println!("{}", result.environment);
    if let Some(risk) = &result.risk {
        println!();
        println!("{risk}");
    }
}
