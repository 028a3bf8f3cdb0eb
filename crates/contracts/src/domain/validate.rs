//! The single defaulting/coercion/validation layer for client payloads.
//!
//! Both the manual create/update handlers and the spreadsheet import loop run
//! drafts through [`normalize`], so the two paths cannot diverge. Closed
//! enumerations (stage, status, priority, source) silently default invalid
//! values; the stage/status compatibility table is a softer cross-field check
//! that only emits a warning and never alters the stored status.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::domain::client::{ClientDraft, ClientStatus, LeadSource, Priority, Stage};
use crate::reference::{allowed_statuses, DEFAULT_SERVICE};

/// Fully typed client attributes after defaulting and coercion.
#[derive(Debug, Clone)]
pub struct ClientCandidate {
    pub company_name: String,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub stage: Stage,
    pub status: Option<ClientStatus>,
    pub value: f64,
    pub priority: Priority,
    pub country: Option<String>,
    pub responsible_person: Option<String>,
    pub service: String,
    pub source: Option<LeadSource>,
    pub industry: Option<String>,
    pub linkedin: Option<String>,
    pub notes: Option<String>,
    pub win_probability: Option<i32>,
    pub estimated_close_date: Option<DateTime<Utc>>,
    pub last_follow_up: DateTime<Utc>,
    pub next_follow_up: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct NormalizeOutcome {
    pub candidate: ClientCandidate,
    /// Business errors. A candidate with errors is still fully populated so
    /// callers can decide per row whether to persist or report.
    pub errors: Vec<FieldIssue>,
    /// Advisory findings, currently only stage/status incompatibility.
    pub warnings: Vec<FieldIssue>,
}

pub fn normalize(draft: &ClientDraft, now: DateTime<Utc>) -> NormalizeOutcome {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let company_name = non_blank(&draft.company_name).unwrap_or_default();
    if company_name.is_empty() {
        errors.push(FieldIssue {
            field: "Company Name",
            message: "Company name is required".into(),
        });
    }

    let email = non_blank(&draft.email);
    if let Some(addr) = &email {
        if !is_valid_email(addr) {
            errors.push(FieldIssue {
                field: "Email",
                message: format!("Invalid email address: \"{addr}\""),
            });
        }
    }

    let stage = non_blank(&draft.stage)
        .and_then(|s| Stage::parse(&s))
        .unwrap_or(Stage::Lead);

    // Unknown statuses are silently downgraded to none, not rejected.
    let status = non_blank(&draft.status).and_then(|s| ClientStatus::parse(&s));

    if let Some(status) = status {
        let allowed = allowed_statuses(stage);
        if !allowed.contains(&status) {
            let message = if allowed.is_empty() {
                format!(
                    "Status \"{status}\" is not valid for stage \"{stage}\": \"{stage}\" accepts no status"
                )
            } else {
                let options = allowed
                    .iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(
                    "Status \"{status}\" is not valid for stage \"{stage}\". Valid options: {options}"
                )
            };
            warnings.push(FieldIssue {
                field: "Status",
                message,
            });
        }
    }

    let priority = non_blank(&draft.priority)
        .and_then(|s| Priority::parse(&s))
        .unwrap_or(Priority::Medium);

    let value = draft
        .value
        .as_ref()
        .and_then(scalar_to_string)
        .and_then(|s| parse_money(&s))
        .unwrap_or(0.0)
        .max(0.0);

    let service = non_blank(&draft.service).unwrap_or_else(|| DEFAULT_SERVICE.to_string());

    // Blank stays unset; an unrecognized value downgrades to Other.
    let source = non_blank(&draft.source).map(|s| LeadSource::parse(&s).unwrap_or(LeadSource::Other));

    let win_probability = draft
        .win_probability
        .as_ref()
        .and_then(scalar_to_string)
        .and_then(|s| parse_win_probability(&s));

    let estimated_close_date = non_blank(&draft.estimated_close_date).and_then(|s| parse_date(&s));

    let last_follow_up = non_blank(&draft.last_follow_up)
        .and_then(|s| parse_date(&s))
        .unwrap_or(now);
    let next_follow_up = non_blank(&draft.next_follow_up)
        .and_then(|s| parse_date(&s))
        .unwrap_or(now + Duration::days(7));

    NormalizeOutcome {
        candidate: ClientCandidate {
            company_name,
            contact_person: non_blank(&draft.contact_person),
            email,
            phone: non_blank(&draft.phone),
            stage,
            status,
            value,
            priority,
            country: non_blank(&draft.country),
            responsible_person: non_blank(&draft.responsible_person),
            service,
            source,
            industry: non_blank(&draft.industry),
            linkedin: non_blank(&draft.linkedin),
            notes: non_blank(&draft.notes),
            win_probability,
            estimated_close_date,
            last_follow_up,
            next_follow_up,
        },
        errors,
        warnings,
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn scalar_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Accepts plain numbers plus light formatting ("$100,000").
fn parse_money(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | '€' | '£' | ' '))
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Strips a trailing `%`, clamps to [0, 100], rounds to the nearest integer.
fn parse_win_probability(s: &str) -> Option<i32> {
    let trimmed = s.trim().trim_end_matches('%').trim();
    let value = trimmed.parse::<f64>().ok().filter(|v| v.is_finite())?;
    Some(value.clamp(0.0, 100.0).round() as i32)
}

pub fn is_valid_email(s: &str) -> bool {
    let mut parts = s.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
                && !s.chars().any(char::is_whitespace)
        }
        _ => false,
    }
}

/// Lenient date parsing for form and spreadsheet input.
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let t = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(t) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(t, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    for fmt in ["%Y-%m-%d", "%d.%m.%Y", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(t, fmt) {
            return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft(fields: serde_json::Value) -> ClientDraft {
        serde_json::from_value(fields).unwrap()
    }

    #[test]
    fn empty_draft_defaults() {
        let out = normalize(&ClientDraft::default(), Utc::now());
        assert_eq!(out.candidate.stage, Stage::Lead);
        assert_eq!(out.candidate.status, None);
        assert_eq!(out.candidate.priority, Priority::Medium);
        assert_eq!(out.candidate.value, 0.0);
        assert_eq!(out.candidate.service, DEFAULT_SERVICE);
        assert_eq!(out.candidate.source, None);
        assert_eq!(out.candidate.win_probability, None);
        assert_eq!(out.candidate.estimated_close_date, None);
        // Missing company name is the only business error.
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].field, "Company Name");
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn follow_up_dates_default_to_now_and_plus_seven_days() {
        let now = Utc::now();
        let out = normalize(&ClientDraft::default(), now);
        assert_eq!(out.candidate.last_follow_up, now);
        assert_eq!(out.candidate.next_follow_up, now + Duration::days(7));
    }

    #[test]
    fn invalid_stage_defaults_to_lead_and_unknown_status_drops() {
        let out = normalize(
            &draft(json!({
                "companyName": "Acme",
                "stage": "Negotiation Phase",
                "status": "Sleeping"
            })),
            Utc::now(),
        );
        assert_eq!(out.candidate.stage, Stage::Lead);
        assert_eq!(out.candidate.status, None);
        assert!(out.errors.is_empty());
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn negative_value_clamps_to_zero() {
        let out = normalize(
            &draft(json!({"companyName": "Acme", "value": "-500"})),
            Utc::now(),
        );
        assert_eq!(out.candidate.value, 0.0);
        assert!(out.errors.is_empty());
    }

    #[test]
    fn formatted_value_parses() {
        let out = normalize(
            &draft(json!({"companyName": "Acme", "value": "$100,000"})),
            Utc::now(),
        );
        assert_eq!(out.candidate.value, 100_000.0);
    }

    #[test]
    fn win_probability_strips_percent_and_clamps() {
        let now = Utc::now();
        let case = |v: serde_json::Value| {
            normalize(&draft(json!({"companyName": "Acme", "winProbability": v})), now)
                .candidate
                .win_probability
        };
        assert_eq!(case(json!("60%")), Some(60));
        assert_eq!(case(json!(150)), Some(100));
        assert_eq!(case(json!("-5")), Some(0));
        assert_eq!(case(json!("37.6")), Some(38));
        assert_eq!(case(json!("maybe")), None);
    }

    #[test]
    fn invalid_email_is_a_business_error() {
        let out = normalize(
            &draft(json!({"companyName": "Acme", "email": "not-an-email"})),
            Utc::now(),
        );
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].field, "Email");
    }

    #[test]
    fn unknown_source_downgrades_to_other_blank_stays_unset() {
        let now = Utc::now();
        let other = normalize(&draft(json!({"companyName": "A", "source": "Telepathy"})), now);
        assert_eq!(other.candidate.source, Some(LeadSource::Other));
        let blank = normalize(&draft(json!({"companyName": "A", "source": "  "})), now);
        assert_eq!(blank.candidate.source, None);
    }

    #[test]
    fn incompatible_status_warns_but_is_kept() {
        let out = normalize(
            &draft(json!({"companyName": "Acme", "stage": "Won", "status": "In Negotiation"})),
            Utc::now(),
        );
        assert!(out.errors.is_empty());
        assert_eq!(out.candidate.status, Some(ClientStatus::InNegotiation));
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].field, "Status");
        assert!(out.warnings[0].message.contains("\"Won\" accepts no status"));
    }

    #[test]
    fn incompatible_status_warning_names_alternatives() {
        let out = normalize(
            &draft(json!({"companyName": "Acme", "stage": "Lead", "status": "In Negotiation"})),
            Utc::now(),
        );
        assert_eq!(out.warnings.len(), 1);
        let msg = &out.warnings[0].message;
        assert!(msg.contains("Lead"));
        assert!(msg.contains("In Negotiation"));
        assert!(msg.contains("On Hold"), "lists valid options: {msg}");
    }

    #[test]
    fn compatible_status_produces_no_warning() {
        let out = normalize(
            &draft(json!({"companyName": "Acme", "stage": "Lead", "status": "New"})),
            Utc::now(),
        );
        assert!(out.warnings.is_empty());
        assert_eq!(out.candidate.status, Some(ClientStatus::New));
    }

    #[test]
    fn date_formats() {
        assert!(parse_date("2026-08-25").is_some());
        assert!(parse_date("2026-08-25T10:30:00Z").is_some());
        assert!(parse_date("25.08.2026").is_some());
        assert!(parse_date("08/25/2026").is_some());
        assert!(parse_date("soon").is_none());
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("jane.cooper@acme.com"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("a@@b.com"));
    }
}
