//! Snapshot computation.
//!
//! This module turns a batch of store entries into an
//! [`AnalyticsSnapshot`]. The computation is synchronous and
//! deterministic: given the same ordered record list and the same
//! current date it produces an identical snapshot, which is what makes
//! the refresh cycle safe to re-run and the whole policy testable
//! against a fake store.

use crate::models::{
    AnalyticsSnapshot, DayBucket, JobCount, MatchStat, ResumeRecord, UNKNOWN_JOB, WINDOW_DAYS,
};
use crate::store::{KvEntry, KvStore, StoreError};
use chrono::{Duration, NaiveDate, Utc};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Parse store entries into records, dropping the ones that fail.
///
/// A parse failure is strictly per-record: it is logged at debug level
/// and the remaining entries are unaffected. Entry order is preserved,
/// which the day-bucket fallback in [`compute_snapshot`] relies on.
pub fn collect_records(entries: &[KvEntry]) -> Vec<ResumeRecord> {
    let mut records = Vec::with_capacity(entries.len());

    for entry in entries {
        let parsed = match &entry.value {
            // Stores may hand back the payload still serialized.
            Value::String(payload) => ResumeRecord::from_payload(payload),
            other => ResumeRecord::from_value(other),
        };

        match parsed {
            Some(record) => records.push(record),
            None => debug!(key = %entry.key, "skipping unparseable record"),
        }
    }

    records
}

/// Compute a full snapshot from parsed records.
///
/// `today` is the current UTC date; the uploads window covers the
/// `WINDOW_DAYS` calendar days ending at it, inclusive.
pub fn compute_snapshot(records: &[ResumeRecord], today: NaiveDate) -> AnalyticsSnapshot {
    let total_resumes = records.len();
    let total_analyses = records.iter().filter(|r| r.feedback.is_some()).count();

    let job_set: HashSet<&str> = records.iter().filter_map(|r| r.trimmed_job_title()).collect();
    let total_jobs = job_set.len();

    let matched = records.iter().filter(|r| r.is_matched()).count();
    let unmatched = total_analyses.saturating_sub(matched);

    let resumes_per_job = per_job_histogram(records);
    let uploads_over_time = uploads_window(records, today);

    let match_success_rate = if total_analyses > 0 {
        ((matched as f64 / total_analyses as f64) * 100.0).round() as u32
    } else {
        0
    };

    AnalyticsSnapshot {
        total_resumes,
        total_jobs,
        total_analyses,
        match_success_rate,
        resumes_per_job,
        uploads_over_time,
        match_stats: vec![MatchStat::matched(matched), MatchStat::unmatched(unmatched)],
    }
}

/// Per-job histogram, descending by count.
///
/// Records without a usable title are bucketed under `UNKNOWN_JOB`.
/// The sort is stable over first-encounter order, so ties keep the order
/// in which the jobs first appeared in the batch.
fn per_job_histogram(records: &[ResumeRecord]) -> Vec<JobCount> {
    let mut counts: Vec<JobCount> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let job = record.trimmed_job_title().unwrap_or(UNKNOWN_JOB);
        match index.get(job) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(job.to_string(), counts.len());
                counts.push(JobCount {
                    job: job.to_string(),
                    count: 1,
                });
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Zero-filled ascending day window with records bucketed into it.
///
/// Records dated inside the window land in their calendar day (UTC).
/// Records dated outside it are dropped from the window entirely.
/// Records with no date at all are assigned by their ordinal position
/// modulo the window length, which keeps the fallback reproducible for
/// a given record order.
fn uploads_window(records: &[ResumeRecord], today: NaiveDate) -> Vec<DayBucket> {
    let start = today - Duration::days(WINDOW_DAYS as i64 - 1);
    let mut counts = vec![0usize; WINDOW_DAYS];

    for (idx, record) in records.iter().enumerate() {
        match record.created_at {
            Some(created) => {
                let offset = (created.date_naive() - start).num_days();
                if (0..WINDOW_DAYS as i64).contains(&offset) {
                    counts[offset as usize] += 1;
                }
            }
            None => counts[idx % WINDOW_DAYS] += 1,
        }
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| DayBucket {
            date: (start + Duration::days(i as i64))
                .format("%Y-%m-%d")
                .to_string(),
            count,
        })
        .collect()
}

/// Run one full refresh cycle against the store.
///
/// The only suspension point is the bulk read; everything after it is
/// synchronous. Fetch failures propagate so the caller can publish the
/// absent snapshot.
pub async fn refresh(
    store: &dyn KvStore,
    pattern: &str,
) -> Result<AnalyticsSnapshot, StoreError> {
    let entries = store.list(pattern, true).await?;
    let records = collect_records(&entries);
    debug!(
        entries = entries.len(),
        records = records.len(),
        "refresh cycle fetched records"
    );
    Ok(compute_snapshot(&records, Utc::now().date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MATCHED_COLOR, UNMATCHED_COLOR};
    use crate::store::MemoryStore;
    use serde_json::json;

    fn record(value: serde_json::Value) -> ResumeRecord {
        ResumeRecord::from_value(&value).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 27).unwrap()
    }

    #[test]
    fn test_empty_input() {
        let snapshot = compute_snapshot(&[], today());

        assert_eq!(snapshot.total_resumes, 0);
        assert_eq!(snapshot.total_jobs, 0);
        assert_eq!(snapshot.total_analyses, 0);
        assert_eq!(snapshot.match_success_rate, 0);
        assert_eq!(snapshot.match_stats[0].value, 0);
        assert_eq!(snapshot.match_stats[1].value, 0);
        assert_eq!(snapshot.uploads_over_time.len(), WINDOW_DAYS);
        assert!(snapshot.uploads_over_time.iter().all(|b| b.count == 0));
    }

    #[test]
    fn test_determinism() {
        let records = vec![
            record(json!({"jobTitle": "A", "feedback": {"overallScore": 90}})),
            record(json!({"jobTitle": "B"})),
            record(json!({"createdAt": "2026-08-25T08:00:00Z"})),
        ];

        let first = compute_snapshot(&records, today());
        let second = compute_snapshot(&records, today());
        assert_eq!(first, second);
    }

    #[test]
    fn test_conservation() {
        let records = vec![
            record(json!({"feedback": {"overallScore": 95}})),
            record(json!({"feedback": {"overallScore": 40}})),
            record(json!({"feedback": {}})),
            record(json!({"jobTitle": "no analysis yet"})),
        ];

        let snapshot = compute_snapshot(&records, today());
        assert_eq!(snapshot.total_analyses, 3);
        assert_eq!(
            snapshot.total_analyses,
            snapshot.match_stats[0].value + snapshot.match_stats[1].value
        );
    }

    #[test]
    fn test_window_completeness() {
        let snapshot = compute_snapshot(&[], today());
        let window = &snapshot.uploads_over_time;

        assert_eq!(window.len(), WINDOW_DAYS);
        assert_eq!(window.first().unwrap().date, "2026-08-14");
        assert_eq!(window.last().unwrap().date, "2026-08-27");

        // Contiguous ascending run.
        for pair in window.windows(2) {
            let a = NaiveDate::parse_from_str(&pair[0].date, "%Y-%m-%d").unwrap();
            let b = NaiveDate::parse_from_str(&pair[1].date, "%Y-%m-%d").unwrap();
            assert_eq!(b - a, Duration::days(1));
        }
    }

    #[test]
    fn test_histogram_ordering() {
        let records = vec![
            record(json!({"jobTitle": "A"})),
            record(json!({"jobTitle": "A"})),
            record(json!({"jobTitle": "B"})),
        ];

        let snapshot = compute_snapshot(&records, today());
        assert_eq!(snapshot.resumes_per_job.len(), 2);
        assert_eq!(snapshot.resumes_per_job[0].job, "A");
        assert_eq!(snapshot.resumes_per_job[0].count, 2);
        assert_eq!(snapshot.resumes_per_job[1].job, "B");
        assert_eq!(snapshot.resumes_per_job[1].count, 1);
    }

    #[test]
    fn test_histogram_ties_keep_encounter_order() {
        let records = vec![
            record(json!({"jobTitle": "Zebra"})),
            record(json!({"jobTitle": "Apple"})),
        ];

        let snapshot = compute_snapshot(&records, today());
        assert_eq!(snapshot.resumes_per_job[0].job, "Zebra");
        assert_eq!(snapshot.resumes_per_job[1].job, "Apple");
    }

    #[test]
    fn test_unknown_bucketing() {
        let records = vec![
            record(json!({"jobTitle": ""})),
            record(json!({"jobTitle": "   "})),
            record(json!({})),
        ];

        let snapshot = compute_snapshot(&records, today());
        assert_eq!(snapshot.total_jobs, 0);
        assert_eq!(snapshot.resumes_per_job.len(), 1);
        assert_eq!(snapshot.resumes_per_job[0].job, UNKNOWN_JOB);
        assert_eq!(snapshot.resumes_per_job[0].count, 3);
    }

    #[test]
    fn test_distinct_jobs_are_trimmed() {
        let records = vec![
            record(json!({"jobTitle": "Dev"})),
            record(json!({"jobTitle": "  Dev "})),
            record(json!({"jobTitle": "Ops"})),
        ];

        let snapshot = compute_snapshot(&records, today());
        assert_eq!(snapshot.total_jobs, 2);
        assert_eq!(snapshot.resumes_per_job[0].job, "Dev");
        assert_eq!(snapshot.resumes_per_job[0].count, 2);
    }

    #[test]
    fn test_match_success_rate_rounding() {
        let records = vec![
            record(json!({"feedback": {"overallScore": 80}})),
            record(json!({"feedback": {"overallScore": 75}})),
            record(json!({"feedback": {"overallScore": 10}})),
        ];

        // 2/3 -> 66.66..% rounds to 67.
        let snapshot = compute_snapshot(&records, today());
        assert_eq!(snapshot.match_success_rate, 67);
    }

    #[test]
    fn test_window_bucketing_and_out_of_window_drop() {
        let records = vec![
            record(json!({"createdAt": "2026-08-27T01:00:00Z"})),
            record(json!({"createdAt": "2026-08-14T23:59:59Z"})),
            // Outside the window: counted in totals, absent from the chart.
            record(json!({"createdAt": "2026-07-01T12:00:00Z"})),
        ];

        let snapshot = compute_snapshot(&records, today());
        assert_eq!(snapshot.total_resumes, 3);

        let window = &snapshot.uploads_over_time;
        assert_eq!(window.last().unwrap().count, 1);
        assert_eq!(window.first().unwrap().count, 1);
        let bucketed: usize = window.iter().map(|b| b.count).sum();
        assert_eq!(bucketed, 2);
    }

    #[test]
    fn test_fallback_distribution_by_index() {
        // 15 undated records: indexes 0..13 land in buckets 0..13, index
        // 14 wraps back to bucket 0.
        let records: Vec<ResumeRecord> = (0..15).map(|_| record(json!({}))).collect();

        let snapshot = compute_snapshot(&records, today());
        let window = &snapshot.uploads_over_time;
        assert_eq!(window[0].count, 2);
        assert!(window[1..].iter().all(|b| b.count == 1));
    }

    #[test]
    fn test_fallback_index_counts_parsed_order() {
        let records = vec![
            record(json!({"createdAt": "2026-08-27T01:00:00Z"})),
            record(json!({})),
        ];

        // The undated record is index 1, so it lands in bucket 1.
        let snapshot = compute_snapshot(&records, today());
        assert_eq!(snapshot.uploads_over_time[1].count, 1);
    }

    #[test]
    fn test_match_stats_colors() {
        let snapshot = compute_snapshot(&[], today());
        assert_eq!(snapshot.match_stats[0].name, "Matched");
        assert_eq!(snapshot.match_stats[0].color, MATCHED_COLOR);
        assert_eq!(snapshot.match_stats[1].name, "Unmatched");
        assert_eq!(snapshot.match_stats[1].color, UNMATCHED_COLOR);
    }

    #[test]
    fn test_collect_records_drops_bad_entries() {
        let entries = vec![
            KvEntry {
                key: "resume:0".into(),
                value: json!({"jobTitle": "Dev"}),
            },
            KvEntry {
                key: "resume:1".into(),
                value: json!("{ not json"),
            },
            KvEntry {
                key: "resume:2".into(),
                value: json!(r#"{"jobTitle": "Ops"}"#),
            },
        ];

        let records = collect_records(&entries);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].job_title.as_deref(), Some("Dev"));
        assert_eq!(records[1].job_title.as_deref(), Some("Ops"));
    }

    #[tokio::test]
    async fn test_refresh_against_memory_store() {
        let store = MemoryStore::from_records(vec![
            json!({"jobTitle": "Dev", "feedback": {"overallScore": 88}}),
            json!({"jobTitle": "Dev"}),
        ]);

        let snapshot = refresh(&store, "resume:*").await.unwrap();
        assert_eq!(snapshot.total_resumes, 2);
        assert_eq!(snapshot.total_analyses, 1);
        assert_eq!(snapshot.match_success_rate, 100);
    }
}
