use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportTableError {
    #[error("Date calculation error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReportTableError>;

/// Non-fatal recovery surfaced alongside best-effort output.
///
/// Malformed individual records never abort a flatten or an aggregation.
/// Each coercion, skip, or exclusion is recorded here for the caller to
/// report (e.g. an "N documents without a due date" footnote).
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A `total`/`balance` field was present but non-numeric; coerced to 0.0.
    MalformedAmount { account: String, raw: String },
    /// A report tree node had neither `name` nor `total_label`; no row
    /// was emitted and its children were promoted to its depth.
    UnnamedNode { depth: usize },
    /// A document had no due date and was excluded from aging entirely.
    MissingDueDate { document_id: String },
    /// A document was due after the as-of date and was excluded under the
    /// days-overdue convention.
    NotYetDue { document_id: String },
    /// An exchange rate of exactly 0 was treated as 1 to keep the FCY
    /// balance finite.
    ZeroExchangeRate { document_id: String },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::MalformedAmount { account, raw } => {
                write!(f, "Malformed amount '{}' on '{}': coerced to 0.0", raw, account)
            }
            Diagnostic::UnnamedNode { depth } => {
                write!(f, "Unnamed report node at depth {}: row skipped, children kept", depth)
            }
            Diagnostic::MissingDueDate { document_id } => {
                write!(f, "Document '{}' has no due date: excluded from aging", document_id)
            }
            Diagnostic::NotYetDue { document_id } => {
                write!(f, "Document '{}' is not yet due: excluded from aging", document_id)
            }
            Diagnostic::ZeroExchangeRate { document_id } => {
                write!(f, "Document '{}' has exchange rate 0: treated as 1", document_id)
            }
        }
    }
}
