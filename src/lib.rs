//! # Report Table Builder
//!
//! A library for reshaping nested accounting-report JSON (Profit & Loss,
//! Balance Sheet) into flat display tables, and for bucketing outstanding
//! invoices/bills into AR/AP aging summaries.
//!
//! ## Core Concepts
//!
//! - **Report tree**: sections containing nested account lines, as returned
//!   by the accounting API's report endpoints
//! - **Flat rows**: the tree in pre-order, each line classified as a grand
//!   total (top-level section), sub-total (nested group), or leaf
//! - **Aging**: classification of a document by days relative to its due
//!   date under an explicit [`BucketingConvention`]
//! - **Aging summary**: a per-counterparty cross-tab over the five fixed
//!   bucket columns, with raw and foreign-currency (FCY) totals
//!
//! Everything is a pure transformation over already-fetched data: no I/O,
//! no network, no shared state. Fetching, OAuth, pagination, and rendering
//! belong to the callers on either side.
//!
//! ## Example
//!
//! ```rust
//! use report_table_builder::*;
//! use chrono::NaiveDate;
//!
//! let payload: ReportPayload = serde_json::from_str(
//!     r#"{"profit_and_loss": [
//!         {"name": "Gross Profit", "total": -3400,
//!          "account_transactions": [
//!              {"name": "Sales", "total": 5000},
//!              {"name": "COGS", "total": 8400}
//!          ]}
//!     ]}"#,
//! )
//! .unwrap();
//!
//! let outcome = flatten_report(&payload);
//! assert_eq!(outcome.rows.len(), 3);
//! assert_eq!(outcome.rows[0].classification, RowClassification::GrandTotal);
//!
//! let documents = vec![AgeableDocument {
//!     id: "INV-1".to_string(),
//!     counterparty_name: "Acme Ltd".to_string(),
//!     due_date: NaiveDate::from_ymd_opt(2024, 6, 10),
//!     balance: 100.0,
//!     exchange_rate: None,
//! }];
//!
//! let as_of = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
//! let summary = build_aging_summary(&documents, as_of, BucketingConvention::DaysOverdue);
//! assert_eq!(summary.grand_total, 100.0);
//! ```

pub mod aggregate;
pub mod aging;
pub mod error;
pub mod flatten;
pub mod schema;
pub mod utils;

pub use aggregate::{aggregate, AgingSummary, CounterpartyRow, BUCKET_COUNT};
pub use aging::{
    bucket_days_overdue, bucket_days_to_due, classify, fcy_balance, AgingBucket,
    BucketingConvention, Classification, ExclusionReason,
};
pub use error::{Diagnostic, ReportTableError, Result};
pub use flatten::{
    flatten, flatten_with_diagnostics, promote_section, rows_to_csv, FlatRow, FlattenOutcome,
    RowClassification,
};
pub use schema::{AgeableDocument, ReportNode, ReportPayload};
pub use utils::parse_as_of_date;

use chrono::NaiveDate;
use log::{debug, info};

/// Flattens a decoded report payload into pre-order display rows.
pub fn flatten_report(payload: &ReportPayload) -> FlattenOutcome {
    info!(
        "Flattening report with {} top-level sections",
        payload.sections.len()
    );
    let outcome = flatten_with_diagnostics(&payload.sections);
    for diagnostic in &outcome.diagnostics {
        debug!("Flatten recovery: {}", diagnostic);
    }
    outcome
}

/// Buckets and cross-tabulates outstanding documents as of `as_of`.
pub fn build_aging_summary(
    documents: &[AgeableDocument],
    as_of: NaiveDate,
    convention: BucketingConvention,
) -> AgingSummary {
    info!(
        "Building aging summary for {} documents as of {}",
        documents.len(),
        as_of
    );
    let summary = aggregate(documents, as_of, convention);
    for diagnostic in &summary.diagnostics {
        debug!("Aging exclusion: {}", diagnostic);
    }
    summary
}
