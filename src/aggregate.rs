use crate::aging::{classify, fcy_balance, BucketingConvention, Classification, ExclusionReason};
use crate::error::Diagnostic;
use crate::schema::AgeableDocument;
use crate::utils::csv_field;
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};

pub const BUCKET_COUNT: usize = 5;

/// One summary row: a counterparty's balances across the five bucket
/// columns, in the convention's canonical order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterpartyRow {
    pub counterparty: String,
    pub balances: [f64; BUCKET_COUNT],
    pub fcy_balances: [f64; BUCKET_COUNT],
    pub total: f64,
    pub total_fcy: f64,
}

impl CounterpartyRow {
    fn new(counterparty: String) -> Self {
        Self {
            counterparty,
            balances: [0.0; BUCKET_COUNT],
            fcy_balances: [0.0; BUCKET_COUNT],
            total: 0.0,
            total_fcy: 0.0,
        }
    }
}

/// Per-counterparty aging cross-tab with column and grand totals.
///
/// Row order follows each counterparty's first appearance in the input;
/// column order is the convention's fixed bucket order. Excluded documents
/// (no due date, or not yet due under days-overdue) contribute to no bucket
/// and no total and are reported through `diagnostics`.
#[derive(Debug, Clone)]
pub struct AgingSummary {
    pub convention: BucketingConvention,
    pub as_of: NaiveDate,
    pub rows: Vec<CounterpartyRow>,
    pub bucket_totals: [f64; BUCKET_COUNT],
    pub bucket_totals_fcy: [f64; BUCKET_COUNT],
    pub grand_total: f64,
    pub grand_total_fcy: f64,
    pub diagnostics: Vec<Diagnostic>,
}

impl AgingSummary {
    pub fn excluded_missing_due_date(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, Diagnostic::MissingDueDate { .. }))
            .count()
    }

    pub fn excluded_not_yet_due(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, Diagnostic::NotYetDue { .. }))
            .count()
    }

    /// Serializes the summary as UTF-8 CSV, header
    /// `Counterparty,Total (FCY),<bucket columns...>,Total`, amounts with
    /// two decimal places, plus a final column-totals row.
    pub fn to_csv(&self) -> String {
        let mut output = String::new();

        output.push_str("Counterparty,Total (FCY)");
        for bucket in self.convention.buckets() {
            output.push_str(&format!(",{}", bucket));
        }
        output.push_str(",Total\n");

        for row in &self.rows {
            output.push_str(&csv_field(&row.counterparty));
            output.push_str(&format!(",{:.2}", row.total_fcy));
            for balance in row.balances {
                output.push_str(&format!(",{:.2}", balance));
            }
            output.push_str(&format!(",{:.2}\n", row.total));
        }

        output.push_str("Total");
        output.push_str(&format!(",{:.2}", self.grand_total_fcy));
        for total in self.bucket_totals {
            output.push_str(&format!(",{:.2}", total));
        }
        output.push_str(&format!(",{:.2}\n", self.grand_total));

        output
    }
}

/// Classifies and cross-tabulates documents by counterparty and bucket as
/// of `as_of`.
///
/// Raw and FCY balances are summed independently; counterparty names are
/// matched case-sensitively with no normalization.
pub fn aggregate(
    documents: &[AgeableDocument],
    as_of: NaiveDate,
    convention: BucketingConvention,
) -> AgingSummary {
    let mut summary = AgingSummary {
        convention,
        as_of,
        rows: Vec::new(),
        bucket_totals: [0.0; BUCKET_COUNT],
        bucket_totals_fcy: [0.0; BUCKET_COUNT],
        grand_total: 0.0,
        grand_total_fcy: 0.0,
        diagnostics: Vec::new(),
    };

    for document in documents {
        let bucket = match classify(document, as_of, convention) {
            Classification::Bucketed(bucket) => bucket,
            Classification::Excluded(ExclusionReason::MissingDueDate) => {
                summary.diagnostics.push(Diagnostic::MissingDueDate {
                    document_id: document.id.clone(),
                });
                continue;
            }
            Classification::Excluded(ExclusionReason::NotYetDue) => {
                summary.diagnostics.push(Diagnostic::NotYetDue {
                    document_id: document.id.clone(),
                });
                continue;
            }
        };

        if document.exchange_rate == Some(0.0) {
            summary.diagnostics.push(Diagnostic::ZeroExchangeRate {
                document_id: document.id.clone(),
            });
        }

        // Bucket came from this convention's classify, so the index exists.
        let col = convention
            .bucket_index(bucket)
            .expect("classify returned a bucket outside its own convention");
        let fcy = fcy_balance(document);

        let idx = match summary
            .rows
            .iter()
            .position(|r| r.counterparty == document.counterparty_name)
        {
            Some(idx) => idx,
            None => {
                summary
                    .rows
                    .push(CounterpartyRow::new(document.counterparty_name.clone()));
                summary.rows.len() - 1
            }
        };
        let row = &mut summary.rows[idx];

        row.balances[col] += document.balance;
        row.fcy_balances[col] += fcy;
        row.total += document.balance;
        row.total_fcy += fcy;

        summary.bucket_totals[col] += document.balance;
        summary.bucket_totals_fcy[col] += fcy;
        summary.grand_total += document.balance;
        summary.grand_total_fcy += fcy;
    }

    debug!(
        "Aged {} documents into {} counterparty rows ({} excluded without due date, {} not yet due)",
        documents.len(),
        summary.rows.len(),
        summary.excluded_missing_due_date(),
        summary.excluded_not_yet_due()
    );

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    fn doc(id: &str, counterparty: &str, days_overdue: i64, balance: f64) -> AgeableDocument {
        let due_date = if days_overdue >= 0 {
            as_of().checked_sub_days(Days::new(days_overdue as u64))
        } else {
            as_of().checked_add_days(Days::new((-days_overdue) as u64))
        };
        AgeableDocument {
            id: id.to_string(),
            counterparty_name: counterparty.to_string(),
            due_date,
            balance,
            exchange_rate: None,
        }
    }

    #[test]
    fn test_same_counterparty_two_buckets() {
        let documents = vec![
            doc("INV-1", "Acme Ltd", 10, 50.0),
            doc("INV-2", "Acme Ltd", 60, 200.0),
        ];

        let summary = aggregate(&documents, as_of(), BucketingConvention::DaysOverdue);
        assert_eq!(summary.rows.len(), 1);

        let row = &summary.rows[0];
        assert_eq!(row.counterparty, "Acme Ltd");
        assert_eq!(row.balances, [0.0, 50.0, 0.0, 0.0, 200.0]);
        assert_eq!(row.total, 250.0);
        assert_eq!(row.total_fcy, 250.0);
    }

    #[test]
    fn test_row_order_follows_first_appearance() {
        let documents = vec![
            doc("INV-1", "Zeta GmbH", 5, 10.0),
            doc("INV-2", "Acme Ltd", 5, 20.0),
            doc("INV-3", "Zeta GmbH", 40, 30.0),
        ];

        let summary = aggregate(&documents, as_of(), BucketingConvention::DaysOverdue);
        let names: Vec<_> = summary.rows.iter().map(|r| r.counterparty.as_str()).collect();
        assert_eq!(names, vec!["Zeta GmbH", "Acme Ltd"]);
    }

    #[test]
    fn test_counterparty_match_is_case_sensitive() {
        let documents = vec![
            doc("INV-1", "Acme Ltd", 5, 10.0),
            doc("INV-2", "ACME LTD", 5, 20.0),
        ];

        let summary = aggregate(&documents, as_of(), BucketingConvention::DaysOverdue);
        assert_eq!(summary.rows.len(), 2);
    }

    #[test]
    fn test_exclusions_contribute_nothing() {
        let mut no_due_date = doc("INV-3", "Acme Ltd", 0, 500.0);
        no_due_date.due_date = None;
        let documents = vec![
            doc("INV-1", "Acme Ltd", 5, 100.0),
            doc("INV-2", "Acme Ltd", -5, 300.0), // due in 5 days
            no_due_date,
        ];

        let summary = aggregate(&documents, as_of(), BucketingConvention::DaysOverdue);
        assert_eq!(summary.grand_total, 100.0);
        assert_eq!(summary.excluded_missing_due_date(), 1);
        assert_eq!(summary.excluded_not_yet_due(), 1);
        assert_eq!(
            summary.diagnostics,
            vec![
                Diagnostic::NotYetDue {
                    document_id: "INV-2".to_string()
                },
                Diagnostic::MissingDueDate {
                    document_id: "INV-3".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_signed_offset_keeps_future_documents() {
        let documents = vec![
            doc("BILL-1", "Supplies Co", -5, 300.0),
            doc("BILL-2", "Supplies Co", 3, 120.0),
        ];

        let summary = aggregate(&documents, as_of(), BucketingConvention::SignedOffset);
        let row = &summary.rows[0];
        // Due in 5 days -> "0-30 days"; 3 days overdue -> "Overdue".
        assert_eq!(row.balances, [120.0, 300.0, 0.0, 0.0, 0.0]);
        assert_eq!(summary.grand_total, 420.0);
    }

    #[test]
    fn test_conservation_of_totals() {
        let mut documents = vec![
            doc("INV-1", "Acme Ltd", 0, 101.25),
            doc("INV-2", "Beta Pty", 20, 44.75),
            doc("INV-3", "Acme Ltd", 90, 1000.0),
            doc("INV-4", "Gamma SA", 33, 7.5),
        ];
        documents[1].exchange_rate = Some(1.25);
        documents[3].exchange_rate = Some(0.5);

        let summary = aggregate(&documents, as_of(), BucketingConvention::DaysOverdue);

        let balance_sum: f64 = documents.iter().map(|d| d.balance).sum();
        let fcy_sum: f64 = documents.iter().map(fcy_balance).sum();

        assert!((summary.grand_total - balance_sum).abs() < 1e-9);
        assert!((summary.grand_total_fcy - fcy_sum).abs() < 1e-9);
        assert!((summary.bucket_totals.iter().sum::<f64>() - balance_sum).abs() < 1e-9);
        assert!((summary.rows.iter().map(|r| r.total).sum::<f64>() - balance_sum).abs() < 1e-9);
    }

    #[test]
    fn test_zero_exchange_rate_guarded() {
        let mut document = doc("INV-1", "Acme Ltd", 5, 100.0);
        document.exchange_rate = Some(0.0);

        let summary = aggregate(&[document], as_of(), BucketingConvention::DaysOverdue);
        assert_eq!(summary.rows[0].total_fcy, 100.0);
        assert!(summary.grand_total_fcy.is_finite());
        assert_eq!(
            summary.diagnostics,
            vec![Diagnostic::ZeroExchangeRate {
                document_id: "INV-1".to_string()
            }]
        );
    }

    #[test]
    fn test_to_csv_layout() {
        let documents = vec![
            doc("INV-1", "Acme Ltd", 10, 50.0),
            doc("INV-2", "Smith, Jones & Co", 60, 200.0),
        ];

        let summary = aggregate(&documents, as_of(), BucketingConvention::DaysOverdue);
        let csv = summary.to_csv();
        let mut lines = csv.lines();

        assert_eq!(
            lines.next(),
            Some("Counterparty,Total (FCY),Current,1-15 days,16-30 days,31-45 days,>45 days,Total")
        );
        assert_eq!(
            lines.next(),
            Some("Acme Ltd,50.00,0.00,50.00,0.00,0.00,0.00,50.00")
        );
        assert_eq!(
            lines.next(),
            Some("\"Smith, Jones & Co\",200.00,0.00,0.00,0.00,0.00,200.00,200.00")
        );
        assert_eq!(
            lines.next(),
            Some("Total,250.00,0.00,50.00,0.00,0.00,200.00,250.00")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_empty_input() {
        let summary = aggregate(&[], as_of(), BucketingConvention::DaysOverdue);
        assert!(summary.rows.is_empty());
        assert_eq!(summary.grand_total, 0.0);
        assert!(summary.diagnostics.is_empty());
    }
}
