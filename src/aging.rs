use crate::schema::AgeableDocument;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which of the two aging boundary schemes to apply.
///
/// The source dashboards carried both, inconsistently. They are kept as one
/// explicit switch rather than separate code paths: pick exactly one per
/// report, never mix them within an aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BucketingConvention {
    /// Keyed on `as_of - due_date`. Documents due after the as-of date are
    /// excluded from the report entirely (inherited policy of the AR/AP
    /// aging summary, not a defect to fix). Buckets: Current, 1-15, 16-30,
    /// 31-45, >45 days.
    DaysOverdue,
    /// Keyed on `due_date - as_of` (negative means overdue). Future-dated
    /// documents are bucketed, never dropped. Buckets: Overdue, 0-30,
    /// 31-60, 61-90, >90 days.
    SignedOffset,
}

/// The canonical aging ranges across both conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgingBucket {
    // Days-overdue scheme.
    Current,
    Days1To15,
    Days16To30,
    Days31To45,
    Over45,
    // Signed-offset scheme.
    Overdue,
    Days0To30,
    Days31To60,
    Days61To90,
    Over90,
}

impl std::fmt::Display for AgingBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            AgingBucket::Current => "Current",
            AgingBucket::Days1To15 => "1-15 days",
            AgingBucket::Days16To30 => "16-30 days",
            AgingBucket::Days31To45 => "31-45 days",
            AgingBucket::Over45 => ">45 days",
            AgingBucket::Overdue => "Overdue",
            AgingBucket::Days0To30 => "0-30 days",
            AgingBucket::Days31To60 => "31-60 days",
            AgingBucket::Days61To90 => "61-90 days",
            AgingBucket::Over90 => ">90 days",
        };
        write!(f, "{}", label)
    }
}

impl BucketingConvention {
    /// Fixed column order for this convention. Aggregates always render
    /// buckets in this order, never alphabetically.
    pub fn buckets(&self) -> [AgingBucket; 5] {
        match self {
            BucketingConvention::DaysOverdue => [
                AgingBucket::Current,
                AgingBucket::Days1To15,
                AgingBucket::Days16To30,
                AgingBucket::Days31To45,
                AgingBucket::Over45,
            ],
            BucketingConvention::SignedOffset => [
                AgingBucket::Overdue,
                AgingBucket::Days0To30,
                AgingBucket::Days31To60,
                AgingBucket::Days61To90,
                AgingBucket::Over90,
            ],
        }
    }

    /// Column index of a bucket under this convention, if it belongs to it.
    pub fn bucket_index(&self, bucket: AgingBucket) -> Option<usize> {
        self.buckets().iter().position(|b| *b == bucket)
    }
}

/// Why a document contributes to no bucket and no total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionReason {
    /// No due date on the document.
    MissingDueDate,
    /// Due after the as-of date, under the days-overdue convention.
    NotYetDue,
}

/// Outcome of classifying one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Bucketed(AgingBucket),
    Excluded(ExclusionReason),
}

/// Buckets a days-overdue count (`as_of - due_date`). Total over all
/// integers; upper edges are inclusive, so day 15 lands in "1-15 days" and
/// day 16 in "16-30 days".
pub fn bucket_days_overdue(days: i64) -> AgingBucket {
    if days <= 0 {
        AgingBucket::Current
    } else if days <= 15 {
        AgingBucket::Days1To15
    } else if days <= 30 {
        AgingBucket::Days16To30
    } else if days <= 45 {
        AgingBucket::Days31To45
    } else {
        AgingBucket::Over45
    }
}

/// Buckets a days-to-due offset (`due_date - as_of`, negative when
/// overdue). Total over all integers with inclusive upper edges.
pub fn bucket_days_to_due(days: i64) -> AgingBucket {
    if days < 0 {
        AgingBucket::Overdue
    } else if days <= 30 {
        AgingBucket::Days0To30
    } else if days <= 60 {
        AgingBucket::Days31To60
    } else if days <= 90 {
        AgingBucket::Days61To90
    } else {
        AgingBucket::Over90
    }
}

/// Classifies one document relative to `as_of` under the given convention.
///
/// A missing due date always excludes the document; under
/// [`BucketingConvention::DaysOverdue`] a due date after `as_of` excludes
/// it as well.
pub fn classify(
    document: &AgeableDocument,
    as_of: NaiveDate,
    convention: BucketingConvention,
) -> Classification {
    let Some(due_date) = document.due_date else {
        return Classification::Excluded(ExclusionReason::MissingDueDate);
    };

    match convention {
        BucketingConvention::DaysOverdue => {
            if due_date > as_of {
                return Classification::Excluded(ExclusionReason::NotYetDue);
            }
            let days = (as_of - due_date).num_days();
            Classification::Bucketed(bucket_days_overdue(days))
        }
        BucketingConvention::SignedOffset => {
            let days = (due_date - as_of).num_days();
            Classification::Bucketed(bucket_days_to_due(days))
        }
    }
}

/// Foreign-currency balance: `balance / exchange_rate` when a nonzero rate
/// is present, otherwise the raw balance. A rate of exactly 0 is guarded so
/// no Infinity or NaN can reach an aggregate.
pub fn fcy_balance(document: &AgeableDocument) -> f64 {
    match document.exchange_rate {
        Some(rate) if rate != 0.0 => document.balance / rate,
        _ => document.balance,
    }
}
