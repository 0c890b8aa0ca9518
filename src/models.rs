//! Data models for resume analytics.
//!
//! This module contains the record shape read from the key-value store,
//! the derived analytics snapshot, and the lenient parsing logic that
//! turns untyped store payloads into `ResumeRecord` values. All fallback
//! policy for missing or malformed fields lives in one place
//! (`ResumeRecord::from_value`) so it can be audited and tested in
//! isolation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A feedback score at or above this value classifies a resume as matched.
///
/// Fixed policy constant, inclusive lower bound. Not configurable.
pub const MATCH_THRESHOLD: f64 = 70.0;

/// Number of calendar days in the uploads-over-time window.
pub const WINDOW_DAYS: usize = 14;

/// Histogram label for records with a missing or empty job title.
pub const UNKNOWN_JOB: &str = "Unknown";

/// Display color for the matched slice of the match breakdown.
pub const MATCHED_COLOR: &str = "#10b981";

/// Display color for the unmatched slice of the match breakdown.
pub const UNMATCHED_COLOR: &str = "#ef4444";

/// AI feedback attached to a resume record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    /// Overall match score. Observed range 0-100, but unconstrained at
    /// the source; non-numeric values are treated as absent.
    #[serde(rename = "overallScore")]
    pub overall_score: Option<f64>,
}

/// A single resume record as persisted in the store.
///
/// Every field is optional: the store payload is untyped and written by
/// an external front end. A record missing `feedback` still counts toward
/// totals but never toward analysis or match statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeRecord {
    /// Job posting the resume was matched against.
    #[serde(rename = "jobTitle")]
    pub job_title: Option<String>,
    /// Upload time.
    #[serde(rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    /// Uploading user. Carried for future per-user breakdowns; no
    /// current output reads it.
    #[serde(rename = "ownerId")]
    pub owner_id: Option<String>,
    /// AI feedback, present once the resume has been analyzed.
    pub feedback: Option<Feedback>,
}

impl ResumeRecord {
    /// Parse a record from an untyped JSON value.
    ///
    /// Returns `None` when the value is not a JSON object. Malformed
    /// fields (non-string `jobTitle`, non-numeric `overallScore`,
    /// unparseable `createdAt`) degrade to absent fields rather than
    /// rejecting the record.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;

        let job_title = obj
            .get("jobTitle")
            .and_then(Value::as_str)
            .map(str::to_string);

        let created_at = obj.get("createdAt").and_then(parse_timestamp);

        let owner_id = obj
            .get("ownerId")
            .and_then(Value::as_str)
            .map(str::to_string);

        // The source front end filters on plain truthiness of `feedback`,
        // so null, false, 0 and "" count as absent; anything else counts
        // as an analysis even when it carries no usable score.
        let feedback = obj.get("feedback").filter(|v| is_truthy(v)).map(|v| {
            Feedback {
                overall_score: v.get("overallScore").and_then(Value::as_f64),
            }
        });

        Some(Self {
            job_title,
            created_at,
            owner_id,
            feedback,
        })
    }

    /// Parse a record from a serialized store payload.
    pub fn from_payload(payload: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(payload).ok()?;
        Self::from_value(&value)
    }

    /// Trimmed job title, or `None` when missing or blank.
    pub fn trimmed_job_title(&self) -> Option<&str> {
        self.job_title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Whether this record classifies as matched.
    pub fn is_matched(&self) -> bool {
        self.feedback
            .as_ref()
            .and_then(|f| f.overall_score)
            .map_or(false, |score| score >= MATCH_THRESHOLD)
    }
}

/// Accept RFC 3339 strings or integer epoch milliseconds.
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

/// JavaScript truthiness of a JSON value.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Resume count for a single job title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobCount {
    pub job: String,
    pub count: usize,
}

/// Upload count for a single calendar day (UTC, `YYYY-MM-DD`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBucket {
    pub date: String,
    pub count: usize,
}

/// One slice of the matched/unmatched breakdown, with its display color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStat {
    pub name: String,
    pub value: usize,
    pub color: String,
}

impl MatchStat {
    pub fn matched(value: usize) -> Self {
        Self {
            name: "Matched".to_string(),
            value,
            color: MATCHED_COLOR.to_string(),
        }
    }

    pub fn unmatched(value: usize) -> Self {
        Self {
            name: "Unmatched".to_string(),
            value,
            color: UNMATCHED_COLOR.to_string(),
        }
    }
}

/// The complete analytics result for one refresh cycle.
///
/// Immutable value object, recomputed from scratch every cycle and
/// published atomically; no partial snapshot is ever observable.
/// Serializes with the camelCase field names the dashboard consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    /// Count of all parsed records.
    pub total_resumes: usize,
    /// Count of distinct non-empty trimmed job titles.
    pub total_jobs: usize,
    /// Count of records carrying feedback.
    pub total_analyses: usize,
    /// Integer percentage of analyses that matched.
    pub match_success_rate: u32,
    /// Per-job histogram, descending by count, ties in encounter order.
    pub resumes_per_job: Vec<JobCount>,
    /// Exactly `WINDOW_DAYS` entries, ascending, ending at today (UTC).
    pub uploads_over_time: Vec<DayBucket>,
    /// Exactly two entries: Matched then Unmatched.
    pub match_stats: Vec<MatchStat>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_record() {
        let record = ResumeRecord::from_value(&json!({
            "jobTitle": "Backend Engineer",
            "createdAt": "2026-08-20T10:30:00Z",
            "ownerId": "user-42",
            "feedback": { "overallScore": 83 }
        }))
        .unwrap();

        assert_eq!(record.job_title.as_deref(), Some("Backend Engineer"));
        assert_eq!(record.owner_id.as_deref(), Some("user-42"));
        assert!(record.created_at.is_some());
        assert_eq!(
            record.feedback.as_ref().and_then(|f| f.overall_score),
            Some(83.0)
        );
        assert!(record.is_matched());
    }

    #[test]
    fn test_parse_rejects_non_object() {
        assert!(ResumeRecord::from_value(&json!("just a string")).is_none());
        assert!(ResumeRecord::from_value(&json!(42)).is_none());
        assert!(ResumeRecord::from_payload("not json at all").is_none());
    }

    #[test]
    fn test_malformed_fields_degrade_to_absent() {
        let record = ResumeRecord::from_value(&json!({
            "jobTitle": 123,
            "createdAt": "yesterday-ish",
            "feedback": { "overallScore": "eighty" }
        }))
        .unwrap();

        assert!(record.job_title.is_none());
        assert!(record.created_at.is_none());
        // Feedback is present (truthy object) but carries no usable score.
        let feedback = record.feedback.unwrap();
        assert!(feedback.overall_score.is_none());
    }

    #[test]
    fn test_feedback_truthiness() {
        let absent = [json!(null), json!(false), json!(0), json!("")];
        for v in &absent {
            let record = ResumeRecord::from_value(&json!({ "feedback": v })).unwrap();
            assert!(record.feedback.is_none(), "expected absent for {v}");
        }

        // Truthy non-object values still count as an analysis.
        let record = ResumeRecord::from_value(&json!({ "feedback": "done" })).unwrap();
        let feedback = record.feedback.unwrap();
        assert!(feedback.overall_score.is_none());
    }

    #[test]
    fn test_epoch_millis_timestamp() {
        let record = ResumeRecord::from_value(&json!({
            "createdAt": 1_755_686_400_000_i64
        }))
        .unwrap();
        let created = record.created_at.unwrap();
        assert_eq!(created.format("%Y-%m-%d").to_string(), "2025-08-20");
    }

    #[test]
    fn test_trimmed_job_title() {
        let record = ResumeRecord::from_value(&json!({ "jobTitle": "  SRE  " })).unwrap();
        assert_eq!(record.trimmed_job_title(), Some("SRE"));

        let blank = ResumeRecord::from_value(&json!({ "jobTitle": "   " })).unwrap();
        assert_eq!(blank.trimmed_job_title(), None);
    }

    #[test]
    fn test_match_threshold_edge() {
        let at = ResumeRecord::from_value(&json!({ "feedback": { "overallScore": 70 } })).unwrap();
        assert!(at.is_matched());

        let below =
            ResumeRecord::from_value(&json!({ "feedback": { "overallScore": 69 } })).unwrap();
        assert!(!below.is_matched());
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let snapshot = AnalyticsSnapshot {
            total_resumes: 1,
            total_jobs: 1,
            total_analyses: 0,
            match_success_rate: 0,
            resumes_per_job: vec![],
            uploads_over_time: vec![],
            match_stats: vec![MatchStat::matched(0), MatchStat::unmatched(0)],
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["totalResumes"], 1);
        assert_eq!(json["matchSuccessRate"], 0);
        assert_eq!(json["matchStats"][0]["color"], MATCHED_COLOR);
    }
}
