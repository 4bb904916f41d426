/// CSV export of offer tables.
pub mod export;
