use std::fmt;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::error::ImportError;
use crate::model::{Task, TaskId};

/// Root of the interchange document. Unknown elements are ignored.
#[derive(Debug, Deserialize)]
struct XmlProject {
    #[serde(rename = "Name")]
    name: Option<String>,
    #[serde(rename = "Tasks", default)]
    tasks: XmlTasks,
}

#[derive(Debug, Default, Deserialize)]
struct XmlTasks {
    #[serde(rename = "Task", default)]
    items: Vec<XmlTask>,
}

#[derive(Debug, Deserialize)]
struct XmlTask {
    #[serde(rename = "UID")]
    uid: Option<String>,
    #[serde(rename = "Name")]
    name: Option<String>,
    #[serde(rename = "Start")]
    start: Option<String>,
    #[serde(rename = "Finish")]
    finish: Option<String>,
    #[serde(rename = "PercentComplete")]
    percent_complete: Option<String>,
    #[serde(rename = "Summary")]
    summary: Option<String>,
    #[serde(rename = "OutlineLevel")]
    outline_level: Option<String>,
    #[serde(rename = "PredecessorLink", default)]
    predecessor_links: Vec<XmlPredecessorLink>,
}

#[derive(Debug, Deserialize)]
struct XmlPredecessorLink {
    #[serde(rename = "PredecessorUID")]
    predecessor_uid: Option<String>,
}

/// Why a record was left out of the import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingId,
    MissingStart,
    MissingFinish,
    FinishBeforeStart,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::MissingId => "missing or invalid unique id",
            SkipReason::MissingStart => "missing or invalid start date",
            SkipReason::MissingFinish => "missing or invalid finish date",
            SkipReason::FinishBeforeStart => "finish date precedes start date",
        };
        f.write_str(text)
    }
}

/// A dropped record. Non-fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportWarning {
    /// 1-based position of the record in the document.
    pub record: usize,
    pub uid: Option<String>,
    pub name: String,
    pub reason: SkipReason,
}

impl fmt::Display for ImportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.uid.as_deref().map(str::trim).filter(|uid| !uid.is_empty()) {
            Some(uid) => write!(
                f,
                "record {} (uid {}, '{}'): {}",
                self.record, uid, self.name, self.reason
            ),
            None => write!(f, "record {} ('{}'): {}", self.record, self.name, self.reason),
        }
    }
}

/// Tasks accepted from a document plus the records that were dropped.
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub project_name: Option<String>,
    /// Flat list in document (outline pre-) order.
    pub tasks: Vec<Task>,
    pub warnings: Vec<ImportWarning>,
}

impl ImportOutcome {
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}

/// Try parsing a date-time string with the formats schedule tools emit.
fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in &[
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Inclusive day count: partial days round up, then the start day is added.
fn inclusive_days(start: NaiveDateTime, finish: NaiveDateTime) -> i64 {
    let seconds = (finish - start).num_seconds() as f64;
    (seconds / 86_400.0).ceil() as i64 + 1
}

fn parse_flag(s: Option<&str>) -> bool {
    matches!(
        s.map(|v| v.trim().to_lowercase()).as_deref(),
        Some("1") | Some("true") | Some("yes")
    )
}

fn convert(record: usize, raw: XmlTask) -> Result<Task, ImportWarning> {
    let name = raw
        .name
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();
    let skip = |reason: SkipReason| ImportWarning {
        record,
        uid: raw.uid.clone(),
        name: name.clone(),
        reason,
    };

    let id = raw
        .uid
        .as_deref()
        .and_then(|s| s.trim().parse::<u32>().ok())
        .map(TaskId)
        .ok_or_else(|| skip(SkipReason::MissingId))?;
    let start = raw
        .start
        .as_deref()
        .and_then(parse_datetime)
        .ok_or_else(|| skip(SkipReason::MissingStart))?;
    let finish = raw
        .finish
        .as_deref()
        .and_then(parse_datetime)
        .ok_or_else(|| skip(SkipReason::MissingFinish))?;
    if finish < start {
        return Err(skip(SkipReason::FinishBeforeStart));
    }

    let percent_complete = raw
        .percent_complete
        .as_deref()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|p| p.is_finite())
        .map(|p| p.clamp(0.0, 100.0))
        .unwrap_or(0.0);
    let outline_level = raw
        .outline_level
        .as_deref()
        .and_then(|s| s.trim().parse::<i32>().ok())
        .unwrap_or(1);
    let dependencies = raw
        .predecessor_links
        .iter()
        .filter_map(|link| link.predecessor_uid.as_deref())
        .filter_map(|s| s.trim().parse::<u32>().ok())
        .map(TaskId)
        .collect();

    Ok(Task {
        id,
        name,
        start: start.date(),
        end: finish.date(),
        duration: inclusive_days(start, finish),
        percent_complete,
        is_summary: parse_flag(raw.summary.as_deref()),
        outline_level,
        dependencies,
        children: Vec::new(),
    })
}

/// Import tasks from an interchange document held in memory.
///
/// Records without a usable id, start or finish are dropped and reported as
/// warnings. Fails when the document cannot be parsed or nothing survives.
pub fn import_str(source: &str) -> Result<ImportOutcome, ImportError> {
    let project: XmlProject =
        quick_xml::de::from_str(source).map_err(|e| ImportError::Malformed(e.to_string()))?;

    let mut tasks = Vec::new();
    let mut warnings = Vec::new();
    for (i, raw) in project.tasks.items.into_iter().enumerate() {
        match convert(i + 1, raw) {
            Ok(task) => tasks.push(task),
            Err(warning) => {
                tracing::warn!(
                    record = warning.record,
                    uid = ?warning.uid,
                    reason = %warning.reason,
                    "Skipping task record"
                );
                warnings.push(warning);
            }
        }
    }

    if tasks.is_empty() {
        return Err(ImportError::NoValidTasks {
            dropped: warnings.len(),
        });
    }

    tracing::info!(
        imported = tasks.len(),
        skipped = warnings.len(),
        "Imported schedule"
    );
    Ok(ImportOutcome {
        project_name: project
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
        tasks,
        warnings,
    })
}

/// Import tasks from an interchange document on disk.
pub fn import_file(path: &Path) -> Result<ImportOutcome, ImportError> {
    let content = std::fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    import_str(&content)
}
