//! Static reference data: expected stage durations, stage/status
//! compatibility, country currencies, and template dropdown suggestions.

use crate::domain::client::{ClientStatus, Stage};

/// Expected occupancy band for a stage, in whole days. `(0, 0)` marks the
/// band as not applicable (terminal stages are always on-track).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationBand {
    pub min_days: i64,
    pub max_days: i64,
}

pub fn expected_duration(stage: Stage) -> DurationBand {
    let (min_days, max_days) = match stage {
        Stage::Lead => (1, 7),
        Stage::Qualified => (3, 14),
        Stage::MeetingScheduled => (1, 7),
        Stage::DemoCompleted => (2, 10),
        Stage::ProofOfConcept => (7, 21),
        Stage::ProposalSent => (3, 14),
        Stage::VerbalCommitment => (2, 7),
        Stage::ContractReview => (3, 14),
        Stage::Won | Stage::Lost => (0, 0),
    };
    DurationBand { min_days, max_days }
}

/// Statuses that make sense while a client occupies the given stage. The
/// check is advisory: an incompatible status produces a warning, never a
/// rejection, and is stored as given.
pub fn allowed_statuses(stage: Stage) -> &'static [ClientStatus] {
    use ClientStatus::*;
    match stage {
        Stage::Lead => &[New, AttemptingContact, Contacted, OnHold],
        Stage::Qualified => &[Contacted, MeetingSet, WaitingForResponse, OnHold],
        Stage::MeetingScheduled => &[MeetingSet, WaitingForResponse, OnHold],
        Stage::DemoCompleted => &[WaitingForResponse, InNegotiation, OnHold],
        Stage::ProofOfConcept => &[InNegotiation, WaitingForResponse, OnHold],
        Stage::ProposalSent => &[InNegotiation, WaitingForResponse, OnHold],
        Stage::VerbalCommitment => &[InNegotiation, ContractSent, OnHold],
        Stage::ContractReview => &[ContractSent, InNegotiation, OnHold],
        Stage::Won | Stage::Lost => &[],
    }
}

/// Default service assigned when the field is blank. Service is free text,
/// unlike the closed stage/status/priority enumerations.
pub const DEFAULT_SERVICE: &str = "Product Development";

/// Suggestions offered in the import template dropdown. Not a constraint.
pub const SERVICE_SUGGESTIONS: &[&str] = &[
    "Product Development",
    "CRM",
    "Consulting",
    "Web Development",
    "Mobile App",
    "Integration",
    "Support & Maintenance",
];

/// Country to ISO currency code lookup, matched case-insensitively.
const COUNTRY_CURRENCIES: &[(&str, &str)] = &[
    ("United States", "USD"),
    ("USA", "USD"),
    ("Canada", "CAD"),
    ("United Kingdom", "GBP"),
    ("UK", "GBP"),
    ("Germany", "EUR"),
    ("France", "EUR"),
    ("Spain", "EUR"),
    ("Italy", "EUR"),
    ("Netherlands", "EUR"),
    ("Belgium", "EUR"),
    ("Austria", "EUR"),
    ("Ireland", "EUR"),
    ("Portugal", "EUR"),
    ("Finland", "EUR"),
    ("Switzerland", "CHF"),
    ("Sweden", "SEK"),
    ("Norway", "NOK"),
    ("Denmark", "DKK"),
    ("Poland", "PLN"),
    ("Czech Republic", "CZK"),
    ("Australia", "AUD"),
    ("New Zealand", "NZD"),
    ("Japan", "JPY"),
    ("China", "CNY"),
    ("India", "INR"),
    ("Singapore", "SGD"),
    ("Hong Kong", "HKD"),
    ("South Korea", "KRW"),
    ("Brazil", "BRL"),
    ("Mexico", "MXN"),
    ("Argentina", "ARS"),
    ("South Africa", "ZAR"),
    ("United Arab Emirates", "AED"),
    ("Israel", "ILS"),
    ("Turkey", "TRY"),
];

pub fn currency_for_country(country: &str) -> Option<&'static str> {
    let t = country.trim();
    COUNTRY_CURRENCIES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(t))
        .map(|(_, code)| *code)
}
