use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::timeline::TimelineStatus;

// ============================================================================
// Closed enumerations
// ============================================================================

/// Fixed, ordered pipeline stages. `Won` and `Lost` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Lead,
    Qualified,
    #[serde(rename = "Meeting Scheduled")]
    MeetingScheduled,
    #[serde(rename = "Demo Completed")]
    DemoCompleted,
    #[serde(rename = "Proof of Concept (POC)")]
    ProofOfConcept,
    #[serde(rename = "Proposal Sent")]
    ProposalSent,
    #[serde(rename = "Verbal Commitment")]
    VerbalCommitment,
    #[serde(rename = "Contract Review")]
    ContractReview,
    Won,
    Lost,
}

impl Stage {
    pub const ALL: [Stage; 10] = [
        Stage::Lead,
        Stage::Qualified,
        Stage::MeetingScheduled,
        Stage::DemoCompleted,
        Stage::ProofOfConcept,
        Stage::ProposalSent,
        Stage::VerbalCommitment,
        Stage::ContractReview,
        Stage::Won,
        Stage::Lost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Lead => "Lead",
            Stage::Qualified => "Qualified",
            Stage::MeetingScheduled => "Meeting Scheduled",
            Stage::DemoCompleted => "Demo Completed",
            Stage::ProofOfConcept => "Proof of Concept (POC)",
            Stage::ProposalSent => "Proposal Sent",
            Stage::VerbalCommitment => "Verbal Commitment",
            Stage::ContractReview => "Contract Review",
            Stage::Won => "Won",
            Stage::Lost => "Lost",
        }
    }

    pub fn parse(s: &str) -> Option<Stage> {
        let t = s.trim();
        Stage::ALL
            .iter()
            .copied()
            .find(|v| v.as_str().eq_ignore_ascii_case(t))
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Won | Stage::Lost)
    }

    /// Position within the ordered pipeline, used for stable sort orders.
    pub fn position(&self) -> usize {
        Stage::ALL.iter().position(|v| v == self).unwrap_or(0)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional secondary descriptor qualifying a stage. Which statuses are
/// meaningful for which stage is defined by `reference::allowed_statuses`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClientStatus {
    New,
    #[serde(rename = "Attempting Contact")]
    AttemptingContact,
    Contacted,
    #[serde(rename = "Meeting Set")]
    MeetingSet,
    #[serde(rename = "Waiting for Response")]
    WaitingForResponse,
    #[serde(rename = "In Negotiation")]
    InNegotiation,
    #[serde(rename = "Contract Sent")]
    ContractSent,
    #[serde(rename = "On Hold")]
    OnHold,
}

impl ClientStatus {
    pub const ALL: [ClientStatus; 8] = [
        ClientStatus::New,
        ClientStatus::AttemptingContact,
        ClientStatus::Contacted,
        ClientStatus::MeetingSet,
        ClientStatus::WaitingForResponse,
        ClientStatus::InNegotiation,
        ClientStatus::ContractSent,
        ClientStatus::OnHold,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClientStatus::New => "New",
            ClientStatus::AttemptingContact => "Attempting Contact",
            ClientStatus::Contacted => "Contacted",
            ClientStatus::MeetingSet => "Meeting Set",
            ClientStatus::WaitingForResponse => "Waiting for Response",
            ClientStatus::InNegotiation => "In Negotiation",
            ClientStatus::ContractSent => "Contract Sent",
            ClientStatus::OnHold => "On Hold",
        }
    }

    pub fn parse(s: &str) -> Option<ClientStatus> {
        let t = s.trim();
        ClientStatus::ALL
            .iter()
            .copied()
            .find(|v| v.as_str().eq_ignore_ascii_case(t))
    }
}

impl std::fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Priority> {
        let t = s.trim();
        Priority::ALL
            .iter()
            .copied()
            .find(|v| v.as_str().eq_ignore_ascii_case(t))
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the lead came from. Unknown values are downgraded to `Other` during
/// normalization; a blank source stays unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeadSource {
    Website,
    Referral,
    #[serde(rename = "Cold Call")]
    ColdCall,
    LinkedIn,
    #[serde(rename = "Email Campaign")]
    EmailCampaign,
    #[serde(rename = "Trade Show")]
    TradeShow,
    Partner,
    Other,
}

impl LeadSource {
    pub const ALL: [LeadSource; 8] = [
        LeadSource::Website,
        LeadSource::Referral,
        LeadSource::ColdCall,
        LeadSource::LinkedIn,
        LeadSource::EmailCampaign,
        LeadSource::TradeShow,
        LeadSource::Partner,
        LeadSource::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadSource::Website => "Website",
            LeadSource::Referral => "Referral",
            LeadSource::ColdCall => "Cold Call",
            LeadSource::LinkedIn => "LinkedIn",
            LeadSource::EmailCampaign => "Email Campaign",
            LeadSource::TradeShow => "Trade Show",
            LeadSource::Partner => "Partner",
            LeadSource::Other => "Other",
        }
    }

    pub fn parse(s: &str) -> Option<LeadSource> {
        let t = s.trim();
        LeadSource::ALL
            .iter()
            .copied()
            .find(|v| v.as_str().eq_ignore_ascii_case(t))
    }
}

impl std::fmt::Display for LeadSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// API shapes
// ============================================================================

/// Audit log line attached to a client, append/delete only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub action: String,
    pub user_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Denormalized client view returned by the API. Storage keeps foreign keys;
/// reads resolve them to display names and inline the activity log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub company_name: String,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub stage: Stage,
    pub status: Option<ClientStatus>,
    pub value: f64,
    pub priority: Priority,
    pub country: Option<String>,
    /// Derived from `country` via the static reference table, never stored.
    pub currency: Option<String>,
    pub responsible_person: Option<String>,
    pub service: Option<String>,
    pub notes: Option<String>,
    pub linkedin: Option<String>,
    pub source: Option<LeadSource>,
    pub industry: Option<String>,
    pub estimated_close_date: Option<DateTime<Utc>>,
    pub win_probability: Option<i32>,
    pub last_follow_up: Option<DateTime<Utc>>,
    pub next_follow_up: Option<DateTime<Utc>>,
    pub pipeline_start_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub activities: Vec<Activity>,
    /// Classification of the current open stage, annotated on list reads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline_status: Option<TimelineStatus>,
}

/// Raw client payload as it arrives from a form or a spreadsheet row, before
/// the shared normalization pass. Everything is optional; `value` and
/// `winProbability` accept either a JSON number or a string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientDraft {
    pub company_name: Option<String>,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub stage: Option<String>,
    pub status: Option<String>,
    pub value: Option<serde_json::Value>,
    pub priority: Option<String>,
    pub country: Option<String>,
    pub responsible_person: Option<String>,
    pub service: Option<String>,
    pub source: Option<String>,
    pub industry: Option<String>,
    pub linkedin: Option<String>,
    pub notes: Option<String>,
    pub win_probability: Option<serde_json::Value>,
    pub estimated_close_date: Option<String>,
    pub last_follow_up: Option<String>,
    pub next_follow_up: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_round_trips_through_display_strings() {
        for stage in Stage::ALL {
            assert_eq!(Stage::parse(stage.as_str()), Some(stage));
        }
        assert_eq!(Stage::parse("  proposal sent "), Some(Stage::ProposalSent));
        assert_eq!(Stage::parse("Nonsense"), None);
    }

    #[test]
    fn stage_serializes_as_display_string() {
        let json = serde_json::to_string(&Stage::ProofOfConcept).unwrap();
        assert_eq!(json, "\"Proof of Concept (POC)\"");
        let back: Stage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Stage::ProofOfConcept);
    }

    #[test]
    fn terminal_stages() {
        assert!(Stage::Won.is_terminal());
        assert!(Stage::Lost.is_terminal());
        assert!(!Stage::ContractReview.is_terminal());
    }

    #[test]
    fn draft_accepts_numeric_and_string_values() {
        let draft: ClientDraft =
            serde_json::from_str(r#"{"companyName":"Acme","value":100000,"winProbability":"60%"}"#)
                .unwrap();
        assert_eq!(draft.company_name.as_deref(), Some("Acme"));
        assert!(draft.value.is_some());
        assert!(draft.win_probability.is_some());
    }
}
