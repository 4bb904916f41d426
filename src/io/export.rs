//! CSV export for the offer's chart tables.
//!
//! Two tables back the offer charts: the seasonal yield split and the
//! cumulative cash-flow projection. Both exports are deterministic for
//! identical inputs.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::engine::OfferResult;

/// Column header for the monthly yield table.
const MONTHLY_HEADER: &str = "month,yield_kwh";

/// Column header for the cash-flow table.
const CASHFLOW_HEADER: &str = "year,cumulative_cashflow_eur";

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Exports the monthly yield table to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_monthly_csv(result: &OfferResult, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_monthly_csv(result, buf)
}

/// Writes the monthly yield table as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_monthly_csv(result: &OfferResult, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(MONTHLY_HEADER.split(','))?;
    for (name, yield_kwh) in MONTH_NAMES.iter().zip(result.balance.monthly_yield_kwh) {
        wtr.write_record(&[(*name).to_string(), format!("{yield_kwh:.2}")])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports the cumulative cash-flow table to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_cashflow_csv(result: &OfferResult, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_cashflow_csv(result, buf)
}

/// Writes the cumulative cash-flow table as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_cashflow_csv(result: &OfferResult, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(CASHFLOW_HEADER.split(','))?;
    for (index, position) in result.financial.cumulative_cashflow_eur.iter().enumerate() {
        wtr.write_record(&[(index + 1).to_string(), format!("{position:.2}")])?;
    }

    wtr.flush()?;
    Ok(())
}
