//! CSV import of case and agency exports from the collections ledger.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use std::io::Read;
use std::path::Path;

use super::domain::{Agency, Case, CaseId, CaseStatus};
use crate::workflows::triage::{CaseFeatures, FeatureError, PriorityLabel, TriageEngine};

#[derive(Debug)]
pub enum CaseImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidRow { row: usize, reason: String },
}

impl std::fmt::Display for CaseImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaseImportError::Io(err) => write!(f, "failed to read export: {}", err),
            CaseImportError::Csv(err) => write!(f, "invalid CSV data: {}", err),
            CaseImportError::InvalidRow { row, reason } => {
                write!(f, "row {} rejected: {}", row, reason)
            }
        }
    }
}

impl std::error::Error for CaseImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CaseImportError::Io(err) => Some(err),
            CaseImportError::Csv(err) => Some(err),
            CaseImportError::InvalidRow { .. } => None,
        }
    }
}

impl From<std::io::Error> for CaseImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for CaseImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

#[derive(Debug, Deserialize)]
struct CaseRow {
    id: String,
    customer_name: String,
    amount: f64,
    overdue_days: i64,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    status: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    priority: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    dca_assigned: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    recovery_probability: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    customer_segment: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    previous_defaults: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    created_at: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    resolved_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AgencyRow {
    name: String,
    performance_score: f64,
    active_cases: u32,
    recovery_rate: f64,
    avg_resolution_days: u32,
}

pub struct CaseImporter<'a> {
    engine: &'a TriageEngine,
    as_of: DateTime<Utc>,
}

impl<'a> CaseImporter<'a> {
    /// Missing priority or recovery columns are filled by `engine`; missing creation
    /// times are back-dated from `as_of` by the overdue-day count.
    pub fn new(engine: &'a TriageEngine, as_of: DateTime<Utc>) -> Self {
        Self { engine, as_of }
    }

    pub fn cases_from_path<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Case>, CaseImportError> {
        let file = std::fs::File::open(path)?;
        self.cases_from_reader(file)
    }

    pub fn cases_from_reader<R: Read>(&self, reader: R) -> Result<Vec<Case>, CaseImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut cases = Vec::new();

        for (index, record) in csv_reader.deserialize::<CaseRow>().enumerate() {
            let row_number = index + 1;
            let case = self
                .case_from_row(record?)
                .map_err(|reason| CaseImportError::InvalidRow {
                    row: row_number,
                    reason,
                })?;
            cases.push(case);
        }

        Ok(cases)
    }

    fn case_from_row(&self, row: CaseRow) -> Result<Case, String> {
        if row.id.is_empty() {
            return Err("id is blank".to_string());
        }
        if row.customer_name.is_empty() {
            return Err("customer_name is blank".to_string());
        }

        let previous_defaults = row
            .previous_defaults
            .as_deref()
            .map(|raw| raw.parse::<i64>().map_err(|err| format!("previous_defaults: {err}")))
            .transpose()?;
        let features = CaseFeatures::try_from_raw(
            row.amount,
            row.overdue_days,
            row.customer_segment.as_deref(),
            previous_defaults,
        )
        .map_err(|err: FeatureError| err.to_string())?;

        let status = match row.status.as_deref() {
            Some(raw) => CaseStatus::parse(raw).ok_or_else(|| format!("unknown status '{raw}'"))?,
            None => CaseStatus::Open,
        };
        let priority = match row.priority.as_deref() {
            Some(raw) => {
                PriorityLabel::parse(raw).ok_or_else(|| format!("unknown priority '{raw}'"))?
            }
            None => self.engine.classify(&features).priority,
        };
        let recovery_probability = match row.recovery_probability.as_deref() {
            Some(raw) => {
                let value = raw
                    .parse::<f64>()
                    .map_err(|err| format!("recovery_probability: {err}"))?;
                if !(0.0..=1.0).contains(&value) {
                    return Err(format!("recovery_probability {value} outside [0, 1]"));
                }
                value
            }
            None => self.engine.estimate(&features).recovery_probability,
        };

        let created_at = match row.created_at.as_deref() {
            Some(raw) => parse_timestamp(raw).ok_or_else(|| format!("created_at '{raw}'"))?,
            None => self
                .as_of
                .checked_sub_signed(Duration::days(i64::from(features.overdue_days)))
                .ok_or_else(|| {
                    format!("overdue_days {} predates the calendar", features.overdue_days)
                })?,
        };
        let resolved_at = match row.resolved_at.as_deref() {
            Some(raw) => Some(parse_timestamp(raw).ok_or_else(|| format!("resolved_at '{raw}'"))?),
            None if status.is_terminal() => Some(self.as_of),
            None => None,
        };
        if resolved_at.is_some_and(|resolved| resolved < created_at) {
            return Err("resolved_at precedes created_at".to_string());
        }

        Ok(Case {
            id: CaseId(row.id),
            customer_name: row.customer_name,
            amount: features.amount,
            overdue_days: features.overdue_days,
            status,
            priority,
            assigned_agency: row.dca_assigned,
            recovery_probability: Some(recovery_probability),
            customer_segment: features.segment,
            previous_defaults: features.previous_defaults,
            created_at,
            updated_at: resolved_at.unwrap_or(created_at),
            resolved_at: resolved_at.filter(|_| status.is_terminal()),
        })
    }
}

pub fn agencies_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Agency>, CaseImportError> {
    let file = std::fs::File::open(path)?;
    agencies_from_reader(file)
}

pub fn agencies_from_reader<R: Read>(reader: R) -> Result<Vec<Agency>, CaseImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut agencies: Vec<Agency> = Vec::new();

    for (index, record) in csv_reader.deserialize::<AgencyRow>().enumerate() {
        let row = record?;
        if row.name.is_empty() {
            return Err(CaseImportError::InvalidRow {
                row: index + 1,
                reason: "agency name is blank".to_string(),
            });
        }
        if agencies.iter().any(|agency| agency.name == row.name) {
            return Err(CaseImportError::InvalidRow {
                row: index + 1,
                reason: format!("duplicate agency '{}'", row.name),
            });
        }
        agencies.push(Agency {
            name: row.name,
            performance_score: row.performance_score,
            active_cases: row.active_cases,
            recovery_rate: row.recovery_rate,
            avg_resolution_days: row.avg_resolution_days,
        });
    }

    Ok(agencies)
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
