//! Run-receipt ingestion utilities.
//!
//! shipkit reads back the receipts it wrote on earlier runs so `shipkit runs`
//! can summarize them. Loading is tolerant: a receipt with extra fields, or
//! one that fails to parse at all, is surfaced alongside the healthy ones
//! instead of aborting the scan.

mod load;

pub use load::{LoadedReceipt, ReceiptLoadError, load_receipts};
