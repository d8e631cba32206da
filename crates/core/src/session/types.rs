//! Narrowing session states and their serializable views.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::catalog::{DiseaseRecord, Severity, Species};
use crate::matching::{AnswerMap, CandidateQuestion, MatchResult};

// ============================================================================
// States
// ============================================================================

/// Where a narrowing session currently is.
///
/// ```text
/// SpeciesSelect ─► SymptomEntry ─► Narrowing ─► ImageConfirm ─► Result
///                        │              │                          ▲
///                        │              └──────────────────────────┤
///                        └── (no match) ───────────────────────────┘
/// ```
///
/// Each state carries everything needed to render it and to recompute
/// the previous state on back-navigation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum NarrowingState {
    /// Waiting for the user to pick dog or cat.
    SpeciesSelect,

    /// Waiting for symptoms.
    SymptomEntry { species: Species },

    /// Asking follow-up questions, one at a time.
    Narrowing {
        species: Species,
        symptoms: Vec<String>,
        /// Unrefined ranking; stays put until every question is answered.
        candidates: Vec<MatchResult>,
        questions: Vec<CandidateQuestion>,
        answers: AnswerMap,
        question_index: usize,
    },

    /// A leading refined candidate needs visual confirmation.
    ImageConfirm {
        species: Species,
        symptoms: Vec<String>,
        /// Refined ranking.
        ranking: Vec<MatchResult>,
    },

    /// Terminal state of a pass; only reset or back leave it.
    Result {
        species: Species,
        symptoms: Vec<String>,
        outcome: ResultOutcome,
    },
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResultOutcome {
    /// The matcher found nothing for the submitted symptoms.
    NoMatch,
    /// A single disease was chosen, automatically or by the user.
    Selected { candidate: MatchResult },
    /// Nothing could be auto-selected; the user picks from `choices`.
    ManualChoice { choices: Vec<MatchResult> },
}

impl ResultOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            ResultOutcome::NoMatch => "no_match",
            ResultOutcome::Selected { .. } => "selected",
            ResultOutcome::ManualChoice { .. } => "manual_choice",
        }
    }
}

impl NarrowingState {
    /// Stable name of the state, used in logs, errors and the API.
    pub fn state_type(&self) -> &'static str {
        match self {
            NarrowingState::SpeciesSelect => "species_select",
            NarrowingState::SymptomEntry { .. } => "symptom_entry",
            NarrowingState::Narrowing { .. } => "narrowing",
            NarrowingState::ImageConfirm { .. } => "image_confirm",
            NarrowingState::Result { .. } => "result",
        }
    }

    pub fn species(&self) -> Option<Species> {
        match self {
            NarrowingState::SpeciesSelect => None,
            NarrowingState::SymptomEntry { species }
            | NarrowingState::Narrowing { species, .. }
            | NarrowingState::ImageConfirm { species, .. }
            | NarrowingState::Result { species, .. } => Some(*species),
        }
    }

    pub fn symptoms(&self) -> &[String] {
        match self {
            NarrowingState::Narrowing { symptoms, .. }
            | NarrowingState::ImageConfirm { symptoms, .. }
            | NarrowingState::Result { symptoms, .. } => symptoms,
            _ => &[],
        }
    }

    /// Ranking the user currently sees: unrefined while narrowing,
    /// refined at the image gate, the offered choices on a manual result.
    pub fn ranking(&self) -> &[MatchResult] {
        match self {
            NarrowingState::Narrowing { candidates, .. } => candidates,
            NarrowingState::ImageConfirm { ranking, .. } => ranking,
            NarrowingState::Result {
                outcome: ResultOutcome::ManualChoice { choices },
                ..
            } => choices,
            _ => &[],
        }
    }

    pub fn is_result(&self) -> bool {
        matches!(self, NarrowingState::Result { .. })
    }
}

// ============================================================================
// Views
// ============================================================================

/// Compact candidate description for rendering lists.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CandidateSummary {
    /// Catalog position; the key for picking this candidate.
    pub position: usize,
    pub disease_id: String,
    pub name: String,
    pub display_name: String,
    pub severity: Severity,
    pub severity_score: u8,
    pub needs_image: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_type: Option<String>,
    pub score: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_score: Option<f64>,
    pub matched_keywords: Vec<String>,
}

impl From<&MatchResult> for CandidateSummary {
    fn from(m: &MatchResult) -> Self {
        Self {
            position: m.catalog_position,
            disease_id: m.disease.id.clone(),
            name: m.disease.name.clone(),
            display_name: m.disease.display_name().to_string(),
            severity: m.disease.severity(),
            severity_score: m.disease.severity_score,
            needs_image: m.disease.needs_image,
            image_type: m
                .disease
                .needs_image
                .then(|| m.disease.expected_image_type().to_string()),
            score: m.score,
            final_score: m.final_score,
            matched_keywords: m.matched_keywords.clone(),
        }
    }
}

/// The question currently asked.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QuestionView {
    pub symptom: String,
    pub related_positions: Vec<usize>,
    pub related_disease_ids: Vec<String>,
    /// Zero-based position of this question.
    pub index: usize,
    pub total: usize,
}

/// The disease a session settled on, with its full record for the
/// detail view.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SelectedDisease {
    pub summary: CandidateSummary,
    pub record: Arc<DiseaseRecord>,
}

/// Everything a UI needs to render a session.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SessionSnapshot {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species: Option<Species>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub symptoms: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<CandidateSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answers: Option<AnswerMap>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub image_choices: Vec<CandidateSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_fallback: Option<CandidateSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<SelectedDisease>,
}
