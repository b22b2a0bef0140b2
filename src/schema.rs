use crate::error::Result;
use crate::utils::{de_flexible_amount, de_opt_date, de_opt_flexible_amount};
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One node of a financial report tree as returned by the accounting API:
/// a statement section, an account under it, or a nested sub-account.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ReportNode {
    #[serde(default)]
    #[schemars(description = "Display name of the section or account (e.g. 'Assets', 'Sales'). May be absent on synthetic total lines.")]
    pub name: Option<String>,

    #[serde(default)]
    #[schemars(description = "Label used for total-only lines when 'name' is absent (e.g. 'Total for Operating Expense').")]
    pub total_label: Option<String>,

    #[serde(default)]
    #[schemars(description = "Amount for this line. The API supplies it as a number or a numeric string; absent or malformed values are read as 0.")]
    pub total: Option<Value>,

    #[serde(default, alias = "account_transactions", alias = "sub_accounts")]
    #[schemars(description = "Nested line items. The wire field name varies by report type ('account_transactions' on P&L and Balance Sheet payloads).")]
    pub children: Vec<ReportNode>,
}

impl ReportNode {
    /// Display name with the `total_label` fallback. `None` marks an
    /// unnamed node whose row is skipped during flattening.
    pub fn resolved_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.total_label.as_deref().filter(|s| !s.trim().is_empty()))
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Envelope around a report response: the section list lives under a
/// report-type-specific key (`balance_sheet`, `profit_and_loss`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ReportPayload {
    #[serde(
        default,
        alias = "balance_sheet",
        alias = "profit_and_loss",
        alias = "cash_flow"
    )]
    #[schemars(description = "Top-level report sections in statement order.")]
    pub sections: Vec<ReportNode>,
}

impl ReportPayload {
    /// Decodes a raw report response body.
    pub fn from_json(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ReportPayload)
    }

    pub fn schema_as_json() -> Result<String> {
        Ok(serde_json::to_string_pretty(&Self::generate_json_schema())?)
    }
}

/// An outstanding invoice or bill, as delivered by the list endpoints.
///
/// The upstream fetch layer is responsible for status filtering (draft,
/// void, and paid documents never reach this type) and for dropping
/// non-positive balances.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AgeableDocument {
    #[serde(alias = "invoice_id", alias = "bill_id")]
    #[schemars(description = "Unique document key ('invoice_id' for receivables, 'bill_id' for payables).")]
    pub id: String,

    #[serde(alias = "customer_name", alias = "vendor_name")]
    #[schemars(description = "Counterparty display name ('customer_name' on invoices, 'vendor_name' on bills). Matched case-sensitively when aggregating.")]
    pub counterparty_name: String,

    #[serde(default, deserialize_with = "de_opt_date")]
    #[schemars(description = "Due date in YYYY-MM-DD format. Documents without one are excluded from aging and counted separately.")]
    pub due_date: Option<NaiveDate>,

    #[serde(default, deserialize_with = "de_flexible_amount")]
    #[schemars(description = "Outstanding amount in base currency. Number or numeric string; malformed values are read as 0.")]
    pub balance: f64,

    #[serde(default, deserialize_with = "de_opt_flexible_amount")]
    #[schemars(description = "Base-to-foreign exchange rate for the FCY balance. Absent means 1. A rate of exactly 0 is also treated as 1.")]
    pub exchange_rate: Option<f64>,
}

impl AgeableDocument {
    /// Decodes one page of a document-list response body.
    pub fn list_from_json(body: &str) -> Result<Vec<Self>> {
        Ok(serde_json::from_str(body)?)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(AgeableDocument)
    }

    pub fn schema_as_json() -> Result<String> {
        Ok(serde_json::to_string_pretty(&Self::generate_json_schema())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_node_wire_shape() {
        let json = r#"{
            "balance_sheet": [
                {
                    "name": "Assets",
                    "total": "52,000.00",
                    "account_transactions": [
                        {"name": "Cash", "total": 12000},
                        {"total_label": "Total for Assets", "total": 52000.0}
                    ]
                }
            ]
        }"#;

        let payload: ReportPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.sections.len(), 1);

        let assets = &payload.sections[0];
        assert_eq!(assets.resolved_name(), Some("Assets"));
        assert_eq!(assets.children.len(), 2);
        assert!(assets.children[0].is_leaf());
        assert_eq!(assets.children[1].resolved_name(), Some("Total for Assets"));
    }

    #[test]
    fn test_resolved_name_blank_fallback() {
        let node = ReportNode {
            name: Some("   ".to_string()),
            total_label: Some("Total for Income".to_string()),
            ..Default::default()
        };
        assert_eq!(node.resolved_name(), Some("Total for Income"));

        let unnamed = ReportNode::default();
        assert_eq!(unnamed.resolved_name(), None);
    }

    #[test]
    fn test_ageable_document_wire_shape() {
        let json = r#"{
            "invoice_id": "INV-0042",
            "customer_name": "Acme Ltd",
            "due_date": "2024-03-15",
            "balance": "1,500.00",
            "exchange_rate": 1.25
        }"#;

        let doc: AgeableDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.id, "INV-0042");
        assert_eq!(doc.counterparty_name, "Acme Ltd");
        assert_eq!(doc.due_date, NaiveDate::from_ymd_opt(2024, 3, 15));
        assert_eq!(doc.balance, 1500.0);
        assert_eq!(doc.exchange_rate, Some(1.25));
    }

    #[test]
    fn test_ageable_document_lenient_fields() {
        let json = r#"{
            "bill_id": "BILL-7",
            "vendor_name": "Supplies Co",
            "due_date": "",
            "balance": null
        }"#;

        let doc: AgeableDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.due_date, None);
        assert_eq!(doc.balance, 0.0);
        assert_eq!(doc.exchange_rate, None);
    }

    #[test]
    fn test_schema_generation() {
        let schema_json = ReportPayload::schema_as_json().unwrap();
        assert!(schema_json.contains("sections"));

        let schema_json = AgeableDocument::schema_as_json().unwrap();
        assert!(schema_json.contains("counterparty_name"));
        assert!(schema_json.contains("due_date"));
    }
}
