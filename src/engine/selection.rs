//! Candidate filtering and history-weighted random selection.
//!
//! Weights are `1 / (questionsAsked + 1)^p`, so people who have been asked
//! fewer questions are picked more often and participation evens out over time.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::db::models::PersonRecord;
use crate::validation::parse_int_or_zero;

/// Result shown when no candidate is left after filtering.
pub const NO_NAMES_SENTINEL: &str = "No names available";

// =============================================================================
// Audience
// =============================================================================

/// Built-in audience filters for the wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    #[default]
    Everyone,
    Developers,
    NonDevelopers,
}

impl Audience {
    /// Parse from config / query strings. Accepts the labels used by the
    /// different UI variants ("whole team", "engineers", ...).
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "everyone" | "all" | "team" | "whole_team" => Some(Audience::Everyone),
            "developers" | "devs" | "engineers" => Some(Audience::Developers),
            "non_developers" | "nondevelopers" | "non_devs" => Some(Audience::NonDevelopers),
            _ => None,
        }
    }

    pub fn matches(&self, record: &PersonRecord) -> bool {
        match self {
            Audience::Everyone => true,
            Audience::Developers => record.is_developer(),
            Audience::NonDevelopers => !record.is_developer(),
        }
    }

    /// Plural noun for "No ... available" messages.
    pub fn label(&self) -> &'static str {
        match self {
            Audience::Everyone => "team members",
            Audience::Developers => "engineers",
            Audience::NonDevelopers => "non-developers",
        }
    }
}

// =============================================================================
// Filtering
// =============================================================================

/// Records not soft-deleted.
pub fn visible_roster(records: &[PersonRecord]) -> Vec<&PersonRecord> {
    records.iter().filter(|r| !r.is_removed()).collect()
}

/// Visible, named records accepted by `audience_filter`, in roster order.
pub fn eligible_candidates<'a, P>(records: &'a [PersonRecord], audience_filter: P) -> Vec<&'a PersonRecord>
where
    P: Fn(&PersonRecord) -> bool,
{
    records
        .iter()
        .filter(|r| !r.is_removed())
        .filter(|r| !r.name.trim().is_empty())
        .filter(|r| audience_filter(*r))
        .collect()
}

/// `1 / (questionsAsked + 1)^exponent`. Unparseable or negative counts are treated as 0.
pub fn selection_weight(record: &PersonRecord, exponent: u32) -> f64 {
    let asked = parse_int_or_zero(&record.questions_asked).max(0);
    1.0 / (asked as f64 + 1.0).powi(exponent as i32)
}

/// Weighted draw over `candidates`. `None` only when `candidates` is empty.
pub fn pick_weighted<'a, R>(candidates: &[&'a PersonRecord], exponent: u32, rng: &mut R) -> Option<&'a PersonRecord>
where
    R: Rng + ?Sized,
{
    let last = *candidates.last()?;
    let weights: Vec<f64> = candidates.iter().map(|c| selection_weight(c, exponent)).collect();
    let total: f64 = weights.iter().sum();

    let mut remaining = rng.gen::<f64>() * total;
    for (&candidate, weight) in candidates.iter().zip(&weights) {
        remaining -= weight;
        if remaining <= 0.0 {
            return Some(candidate);
        }
    }
    // Floating-point drift left a sliver over.
    Some(last)
}

// =============================================================================
// Wheel
// =============================================================================

/// Outcome of one draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Picked(PersonRecord),
    NoCandidates,
}

impl Selection {
    /// Winner's name, or the sentinel when nobody was eligible.
    pub fn display_name(&self) -> &str {
        match self {
            Selection::Picked(record) => &record.name,
            Selection::NoCandidates => NO_NAMES_SENTINEL,
        }
    }
}

type AudienceFilter = Box<dyn Fn(&PersonRecord) -> bool + Send + Sync>;

/// The name picker, parameterized by audience predicate and weighting exponent.
pub struct Wheel {
    audience_filter: AudienceFilter,
    exponent: u32,
}

impl Wheel {
    pub fn for_audience(audience: Audience, exponent: u32) -> Self {
        Self::with_filter(move |r| audience.matches(r), exponent)
    }

    pub fn with_filter<F>(filter: F, exponent: u32) -> Self
    where
        F: Fn(&PersonRecord) -> bool + Send + Sync + 'static,
    {
        Self {
            audience_filter: Box::new(filter),
            exponent,
        }
    }

    pub fn exponent(&self) -> u32 {
        self.exponent
    }

    pub fn candidates<'a>(&self, records: &'a [PersonRecord]) -> Vec<&'a PersonRecord> {
        eligible_candidates(records, |r| (self.audience_filter)(r))
    }

    pub fn weight(&self, record: &PersonRecord) -> f64 {
        selection_weight(record, self.exponent)
    }

    pub fn pick<R: Rng + ?Sized>(&self, records: &[PersonRecord], rng: &mut R) -> Selection {
        let candidates = self.candidates(records);
        match pick_weighted(&candidates, self.exponent, rng) {
            Some(winner) => Selection::Picked(winner.clone()),
            None => Selection::NoCandidates,
        }
    }
}
