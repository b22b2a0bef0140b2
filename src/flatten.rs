use crate::error::Diagnostic;
use crate::schema::ReportNode;
use crate::utils::{csv_field, indent_name, parse_amount};
use log::debug;
use serde::{Deserialize, Serialize};

/// Position-based classification of a flattened report line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowClassification {
    /// Top-level statement section (depth 0), regardless of children.
    GrandTotal,
    /// Nested grouping line with at least one child.
    SubTotal,
    /// Nested line with no children.
    Leaf,
}

impl std::fmt::Display for RowClassification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowClassification::GrandTotal => write!(f, "Grand Total"),
            RowClassification::SubTotal => write!(f, "Sub Total"),
            RowClassification::Leaf => write!(f, "Leaf"),
        }
    }
}

/// One line of the flattened report, in pre-order position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatRow {
    pub account: String,
    pub amount: f64,
    pub classification: RowClassification,
    pub depth: usize,
}

impl FlatRow {
    /// Account name with four spaces of display indentation per depth level.
    pub fn indented_account(&self) -> String {
        indent_name(&self.account, self.depth)
    }
}

/// Flattened rows plus the non-fatal recoveries made along the way.
#[derive(Debug, Clone, Default)]
pub struct FlattenOutcome {
    pub rows: Vec<FlatRow>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Flattens a report tree into pre-order rows, dropping diagnostics.
pub fn flatten(sections: &[ReportNode]) -> Vec<FlatRow> {
    flatten_with_diagnostics(sections).rows
}

/// Flattens a report tree into pre-order rows.
///
/// Each top-level section starts at depth 0 and is classified
/// [`RowClassification::GrandTotal`]; nested nodes are `SubTotal` when they
/// have children and `Leaf` otherwise. A node without a resolvable name
/// emits no row but its children are still visited at the depth the node
/// itself would have occupied. Child order is preserved exactly.
pub fn flatten_with_diagnostics(sections: &[ReportNode]) -> FlattenOutcome {
    let mut outcome = FlattenOutcome::default();
    for section in sections {
        visit(section, 0, &mut outcome);
    }
    debug!(
        "Flattened {} sections into {} rows ({} diagnostics)",
        sections.len(),
        outcome.rows.len(),
        outcome.diagnostics.len()
    );
    outcome
}

fn visit(node: &ReportNode, depth: usize, outcome: &mut FlattenOutcome) {
    match node.resolved_name() {
        Some(name) => {
            let (amount, malformed) = match &node.total {
                Some(raw) => parse_amount(raw),
                None => (0.0, false),
            };
            if malformed {
                outcome.diagnostics.push(Diagnostic::MalformedAmount {
                    account: name.to_string(),
                    raw: node.total.as_ref().map(|v| v.to_string()).unwrap_or_default(),
                });
            }

            // Depth is checked before child-emptiness: a childless
            // top-level section is still a grand total.
            let classification = if depth == 0 {
                RowClassification::GrandTotal
            } else if node.is_leaf() {
                RowClassification::Leaf
            } else {
                RowClassification::SubTotal
            };

            outcome.rows.push(FlatRow {
                account: name.to_string(),
                amount,
                classification,
                depth,
            });

            for child in &node.children {
                visit(child, depth + 1, outcome);
            }
        }
        None => {
            outcome.diagnostics.push(Diagnostic::UnnamedNode { depth });
            // Children are promoted to the depth the unnamed node held.
            for child in &node.children {
                visit(child, depth, outcome);
            }
        }
    }
}

/// Moves the named child out of the named parent section and reinserts it
/// as a top-level section directly after the parent, preserving the order
/// of everything else. No-op when the parent or child is not found.
///
/// The dashboards used this to surface "Other Current Assets" as its own
/// Balance Sheet section.
pub fn promote_section(sections: &mut Vec<ReportNode>, parent: &str, child: &str) {
    let Some(parent_idx) = sections
        .iter()
        .position(|s| s.resolved_name() == Some(parent))
    else {
        return;
    };

    let Some(child_idx) = sections[parent_idx]
        .children
        .iter()
        .position(|c| c.resolved_name() == Some(child))
    else {
        return;
    };

    let promoted = sections[parent_idx].children.remove(child_idx);
    sections.insert(parent_idx + 1, promoted);
}

/// Serializes flattened rows as UTF-8 CSV with an
/// `Account,Amount,Classification,Depth` header. With `indent` set, the
/// account column carries the display indentation.
pub fn rows_to_csv(rows: &[FlatRow], indent: bool) -> String {
    let mut output = String::new();
    output.push_str("Account,Amount,Classification,Depth\n");

    for row in rows {
        let account = if indent {
            row.indented_account()
        } else {
            row.account.clone()
        };
        output.push_str(&format!(
            "{},{:.2},{},{}\n",
            csv_field(&account),
            row.amount,
            row.classification,
            row.depth
        ));
    }

    output
}
