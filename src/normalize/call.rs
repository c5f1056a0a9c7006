//! Twilio call records and status grouping.
//!
//! Call payloads are the messiest the backend produces: Twilio's own REST
//! casing (`CallSid`, `DateCreated`), the backend's snake_case, and a couple
//! of camelCase frontends have all left their mark. On top of the per-record
//! cleanup, callers need the flat payloads folded into status buckets
//! (active / queued / completed / declined) for display.

use std::collections::HashSet;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{first_present, first_string};

const SID_FIELDS: &[&str] = &["sid", "call_sid", "Sid", "CallSid"];
const TO_FIELDS: &[&str] = &["to", "to_number", "To", "to_formatted", "phone_number", "toNumber"];
const STATUS_FIELDS: &[&str] = &["status", "state", "Status", "call_status"];
const START_FIELDS: &[&str] = &["start_time", "startTime", "date_created", "DateCreated", "time_created"];
const END_FIELDS: &[&str] = &["end_time", "endTime", "date_updated", "DateUpdated", "completed_time"];
const DURATION_FIELDS: &[&str] = &["duration", "duration_seconds", "Duration"];
const FROM_FIELDS: &[&str] = &["from", "from_number", "From", "fromNumber"];

/// Placeholder for sid / to / status when nothing usable was found.
const UNKNOWN: &str = "unknown";

/// Keys whose arrays map straight into a bucket, checked in this order.
/// Later aliases replace what an earlier alias put in the same bucket.
const KNOWN_BUCKET_KEYS: &[(&str, Bucket)] = &[
    ("active", Bucket::Active),
    ("in_progress", Bucket::Active),
    ("in-progress", Bucket::Active),
    ("ongoing", Bucket::Active),
    ("ringing", Bucket::Active),
    ("queued", Bucket::Queued),
    ("pending", Bucket::Queued),
    ("completed", Bucket::Completed),
    ("finished", Bucket::Completed),
    ("ended", Bucket::Completed),
];

/// Top-level keys of the call-status summary shape.
const SUMMARY_KEYS: &[&str] = &["ongoing", "completed", "declined", "others"];

/// A single call in canonical form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    /// Twilio call SID, "unknown" when absent
    pub sid: String,
    /// Callee number, "unknown" when absent
    pub to: String,
    /// Raw call status string, "unknown" when absent
    pub status: String,
    /// Duration in whole seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    /// Pre-formatted duration supplied by the backend, relayed as-is
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_human: Option<String>,
    /// ISO-8601 UTC start time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    /// ISO-8601 UTC end time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
}

/// Calls grouped by display status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallGroups {
    pub active: Vec<CallRecord>,
    pub queued: Vec<CallRecord>,
    pub completed: Vec<CallRecord>,
    pub declined: Vec<CallRecord>,
}

/// Buckets a call can be classified into from ambiguous input. `declined`
/// is deliberately missing: it only ever fills from the summary shape.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Bucket {
    Active,
    Queued,
    Completed,
}

impl CallGroups {
    fn bucket_mut(&mut self, bucket: Bucket) -> &mut Vec<CallRecord> {
        match bucket {
            Bucket::Active => &mut self.active,
            Bucket::Queued => &mut self.queued,
            Bucket::Completed => &mut self.completed,
        }
    }

    /// Build groups from the call-status summary shape
    /// `{ongoing, completed, declined, others}`.
    ///
    /// Returns `None` when the payload is not an object carrying at least one
    /// summary key, so callers can fall back to [`categorize_calls`].
    /// `others` contributes only entries still waiting to connect; anything
    /// with a different status (failed, busy, canceled) is dropped here.
    pub fn from_summary(payload: &Value) -> Option<CallGroups> {
        let map = payload.as_object()?;
        if !SUMMARY_KEYS.iter().any(|key| map.contains_key(*key)) {
            return None;
        }

        let mut groups = CallGroups::default();
        if let Some(items) = map.get("ongoing").and_then(Value::as_array) {
            groups.active = normalize_all(items);
        }
        if let Some(items) = map.get("completed").and_then(Value::as_array) {
            groups.completed = normalize_all(items);
        }
        if let Some(items) = map.get("declined").and_then(Value::as_array) {
            groups.declined = normalize_all(items);
        }
        if let Some(items) = map.get("others").and_then(Value::as_array) {
            groups.queued = items
                .iter()
                .filter(|entry| {
                    let status = entry
                        .get("status")
                        .and_then(Value::as_str)
                        .unwrap_or("")
                        .to_lowercase();
                    status == "queued" || status == "ringing"
                })
                .filter_map(normalize_call)
                .collect();
        }
        Some(groups)
    }
}

/// Reduce one raw payload to a [`CallRecord`].
///
/// Unlike the prompt and conversation normalizers this never rejects an
/// object: a call with nothing usable still renders as an "unknown" row.
pub fn normalize_call(raw: &Value) -> Option<CallRecord> {
    if !raw.is_object() {
        return None;
    }

    let start = first_present(raw, START_FIELDS).and_then(parse_timestamp);
    let end = first_present(raw, END_FIELDS).and_then(parse_timestamp);
    let duration = parse_duration_seconds(first_present(raw, DURATION_FIELDS), start, end);

    Some(CallRecord {
        sid: first_string(raw, SID_FIELDS).unwrap_or_else(|| UNKNOWN.to_string()),
        to: first_string(raw, TO_FIELDS).unwrap_or_else(|| UNKNOWN.to_string()),
        status: first_string(raw, STATUS_FIELDS).unwrap_or_else(|| UNKNOWN.to_string()),
        duration,
        duration_human: raw.get("duration_human").and_then(Value::as_str).map(str::to_string),
        start_time: start.map(to_iso),
        end_time: end.map(to_iso),
        from: first_string(raw, FROM_FIELDS),
        direction: raw.get("direction").and_then(Value::as_str).map(str::to_string),
    })
}

/// Fold a flat call payload into status buckets.
///
/// Three passes, later ones only as fallback:
/// 1. known bucket keys (`active`, `ongoing`, `pending`, ...) consume their
///    arrays directly into the matching bucket
/// 2. a `calls` array is classified entry-by-entry on status substrings
/// 3. only if all of active/queued/completed are still empty, every remaining
///    array-valued key is scanned, with the key name as a classification hint
pub fn categorize_calls(payload: &Value) -> CallGroups {
    let mut groups = CallGroups::default();
    let Some(map) = payload.as_object() else {
        return groups;
    };

    let mut seen: HashSet<&str> = HashSet::new();
    for (key, bucket) in KNOWN_BUCKET_KEYS {
        if let Some(value) = map.get(*key) {
            if let Some(items) = value.as_array() {
                *groups.bucket_mut(*bucket) = normalize_all(items);
            }
            seen.insert(*key);
        }
    }

    if let Some(calls) = map.get("calls").and_then(Value::as_array) {
        for entry in calls {
            let Some(record) = normalize_call(entry) else {
                continue;
            };
            let bucket = classify_status(&record.status, None);
            groups.bucket_mut(bucket).push(record);
        }
        seen.insert("calls");
    }

    if groups.active.is_empty() && groups.completed.is_empty() && groups.queued.is_empty() {
        for (key, value) in map {
            if seen.contains(key.as_str()) {
                continue;
            }
            let Some(items) = value.as_array() else {
                continue;
            };
            for entry in items {
                let Some(record) = normalize_call(entry) else {
                    continue;
                };
                let bucket = classify_status(&record.status, Some(key.as_str()));
                groups.bucket_mut(bucket).push(record);
            }
        }
    }

    groups
}

/// Classify a status string, optionally with the source key as a hint.
/// The hint only ever argues for queued or completed, never active.
fn classify_status(status: &str, key_hint: Option<&str>) -> Bucket {
    let status = status.to_lowercase();
    let key = key_hint.map(str::to_lowercase);
    let key_contains = |needle: &str| key.as_deref().is_some_and(|k| k.contains(needle));

    if status.contains("queue") || key_contains("queue") {
        Bucket::Queued
    } else if status.contains("complete")
        || status.contains("finish")
        || status.contains("ended")
        || key_contains("complete")
    {
        Bucket::Completed
    } else {
        Bucket::Active
    }
}

fn normalize_all(items: &[Value]) -> Vec<CallRecord> {
    items.iter().filter_map(normalize_call).collect()
}

/// Duration in whole seconds, from the explicit value when usable, otherwise
/// computed from the start/end pair.
///
/// An explicit string may be numeric ("42", "12.5") or a clock value
/// ("00:02:05"). Negative and non-finite values are unusable and fall
/// through; a fall-through with no parseable timestamps yields `None`.
fn parse_duration_seconds(
    raw: Option<&Value>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Option<u64> {
    if let Some(value) = raw {
        match value {
            Value::Number(number) => {
                if let Some(n) = number.as_f64() {
                    if n.is_finite() && n >= 0.0 {
                        return Some(n.round() as u64);
                    }
                }
            }
            Value::String(text) => {
                let text = text.trim();
                if let Ok(n) = text.parse::<f64>() {
                    if n.is_finite() && n >= 0.0 {
                        return Some(n.round() as u64);
                    }
                } else if let Some(seconds) = parse_hms(text) {
                    return Some(seconds);
                }
            }
            _ => {}
        }
    }

    if let (Some(start), Some(end)) = (start, end) {
        if end >= start {
            let millis = (end - start).num_milliseconds();
            return Some((millis as f64 / 1000.0).round() as u64);
        }
    }
    None
}

/// Parse "HH:MM:SS" into seconds. Hours may be one or two digits.
fn parse_hms(text: &str) -> Option<u64> {
    let caps = hms_regex().captures(text)?;
    let hours: u64 = caps[1].parse().ok()?;
    let minutes: u64 = caps[2].parse().ok()?;
    let seconds: u64 = caps[3].parse().ok()?;
    Some(hours * 3600 + minutes * 60 + seconds)
}

fn hms_regex() -> &'static Regex {
    static HMS: OnceLock<Regex> = OnceLock::new();
    HMS.get_or_init(|| Regex::new(r"^(\d{1,2}):(\d{2}):(\d{2})$").expect("valid clock pattern"))
}

/// Parse a timestamp value. Only strings are considered; numbers and other
/// types are not timestamps here.
///
/// Accepted formats, in order: RFC 3339, RFC 2822 (Twilio's REST casing
/// ships these), then a few naive formats assumed to be UTC.
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let text = value.as_str()?.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date.and_time(chrono::NaiveTime::MIN).and_utc());
    }
    None
}

/// Millisecond-precision ISO-8601 with a trailing Z, e.g.
/// "2024-01-01T00:02:05.000Z".
fn to_iso(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
