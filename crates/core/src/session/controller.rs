//! The narrowing controller: one user's walk from species selection to a
//! result.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::catalog::{Catalog, Species};
use crate::config::NarrowingConfig;
use crate::matching::{
    match_diseases, Answer, AnswerMap, CandidateQuestion, MatchResult, QuestionGenerator,
    QuestionGeneratorConfig, Refiner,
};
use crate::metrics;
use crate::session::types::{
    CandidateSummary, NarrowingState, QuestionView, ResultOutcome, SelectedDisease,
    SessionSnapshot,
};
use crate::session::SessionError;

/// Split comma-separated symptom text into trimmed, non-empty entries.
pub fn parse_symptom_text(text: &str) -> Vec<String> {
    clean_symptoms(text.split(','))
}

fn clean_symptoms<I, S>(symptoms: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    symptoms
        .into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// A single narrowing session.
///
/// Owns all of its mutable state; the catalog is shared read-only.
/// Operations that do not apply to the current state return
/// [`SessionError::InvalidTransition`] and leave the session unchanged.
#[derive(Debug, Clone)]
pub struct NarrowingSession {
    id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    catalog: Arc<Catalog>,
    config: NarrowingConfig,
    state: NarrowingState,
}

impl NarrowingSession {
    /// Start a session in `SpeciesSelect`.
    pub fn new(catalog: Arc<Catalog>, config: NarrowingConfig) -> Self {
        let now = Utc::now();
        let session = Self {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            catalog,
            config,
            state: NarrowingState::SpeciesSelect,
        };
        metrics::SESSIONS_STARTED.inc();
        info!(session_id = %session.id, "Narrowing session started");
        session
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn state(&self) -> &NarrowingState {
        &self.state
    }

    pub fn config(&self) -> &NarrowingConfig {
        &self.config
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    /// `SpeciesSelect -> SymptomEntry`.
    pub fn select_species(&mut self, species: Species) -> Result<&NarrowingState, SessionError> {
        self.expect_state("species_select", "select species")?;
        self.transition(NarrowingState::SymptomEntry { species });
        Ok(&self.state)
    }

    /// `SymptomEntry -> Narrowing | ImageConfirm | Result`.
    ///
    /// Entries are trimmed and blanks dropped; an empty list is rejected
    /// and the session stays in `SymptomEntry`.
    pub fn submit_symptoms<I, S>(&mut self, symptoms: I) -> Result<&NarrowingState, SessionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let species = match &self.state {
            NarrowingState::SymptomEntry { species } => *species,
            other => return Err(invalid(other, "submit symptoms")),
        };

        let symptoms = clean_symptoms(symptoms);
        if symptoms.is_empty() {
            return Err(SessionError::EmptySymptoms);
        }

        let next = self.enter_narrowing(species, symptoms);
        let result = if matches!(
            next,
            NarrowingState::Result {
                outcome: ResultOutcome::NoMatch,
                ..
            }
        ) {
            "no_match"
        } else {
            "matched"
        };
        metrics::SYMPTOM_SUBMISSIONS
            .with_label_values(&[result])
            .inc();

        self.transition(next);
        Ok(&self.state)
    }

    /// Like [`submit_symptoms`](Self::submit_symptoms) for comma-separated text.
    pub fn submit_symptom_text(&mut self, text: &str) -> Result<&NarrowingState, SessionError> {
        self.submit_symptoms(parse_symptom_text(text))
    }

    /// Answer the current question. After the last answer the ranking is
    /// refined once and the image gate decides the next state.
    pub fn answer(&mut self, answer: Answer) -> Result<&NarrowingState, SessionError> {
        let NarrowingState::Narrowing {
            species,
            symptoms,
            candidates,
            questions,
            answers,
            question_index,
        } = &mut self.state
        else {
            return Err(invalid(&self.state, "answer"));
        };

        // Narrowing always holds at least one pending question
        let Some(question) = questions.get(*question_index) else {
            return Err(SessionError::InvalidTransition {
                state: "narrowing",
                operation: "answer",
            });
        };

        answers.record(question.symptom.clone(), answer);
        *question_index += 1;
        metrics::ANSWERS.with_label_values(&[answer.as_str()]).inc();
        debug!(
            session_id = %self.id,
            answered = *question_index,
            total = questions.len(),
            "Recorded answer"
        );

        if *question_index < questions.len() {
            self.updated_at = Utc::now();
            return Ok(&self.state);
        }

        let species = *species;
        let symptoms = std::mem::take(symptoms);
        let candidates = std::mem::take(candidates);
        let answers = std::mem::take(answers);
        let next = self.finish_narrowing(species, symptoms, &candidates, &answers);
        self.transition(next);
        Ok(&self.state)
    }

    /// Pick a candidate directly by catalog position.
    ///
    /// In `Narrowing` any displayed candidate may be picked, skipping the
    /// remaining questions. In a manual-choice `Result` one of the offered
    /// choices may be picked.
    pub fn pick(&mut self, position: usize) -> Result<&NarrowingState, SessionError> {
        let (species, symptoms, chosen) = match &self.state {
            NarrowingState::Narrowing {
                species,
                symptoms,
                candidates,
                ..
            } => {
                let shown = &candidates[..candidates.len().min(self.config.candidate_display_limit)];
                (*species, symptoms.clone(), find_candidate(shown, position)?)
            }
            NarrowingState::Result {
                species,
                symptoms,
                outcome: ResultOutcome::ManualChoice { choices },
            } => (*species, symptoms.clone(), find_candidate(choices, position)?),
            other => return Err(invalid(other, "pick a candidate")),
        };

        self.transition(selected(species, symptoms, chosen));
        Ok(&self.state)
    }

    /// `ImageConfirm -> Result` with one of the offered image-needing
    /// candidates, named by catalog position, chosen by the user.
    pub fn select_image_candidate(
        &mut self,
        position: usize,
    ) -> Result<&NarrowingState, SessionError> {
        let NarrowingState::ImageConfirm {
            species, symptoms, ..
        } = &self.state
        else {
            return Err(invalid(&self.state, "select an image candidate"));
        };

        let chosen = self
            .image_choices()
            .into_iter()
            .find(|m| m.catalog_position == position)
            .cloned()
            .ok_or(SessionError::UnknownCandidate(position))?;

        let next = selected(*species, symptoms.clone(), chosen);
        self.transition(next);
        Ok(&self.state)
    }

    /// `ImageConfirm -> Result` without a photo: selects the best refined
    /// candidate that needs no image, or offers a manual choice when every
    /// candidate needs one.
    pub fn skip_image(&mut self) -> Result<&NarrowingState, SessionError> {
        let NarrowingState::ImageConfirm {
            species,
            symptoms,
            ranking,
        } = &self.state
        else {
            return Err(invalid(&self.state, "skip image confirmation"));
        };

        let next = match self.image_fallback() {
            Some(fallback) => selected(*species, symptoms.clone(), fallback.clone()),
            None => {
                let choices = top(ranking, self.config.manual_choice_limit);
                metrics::OUTCOMES
                    .with_label_values(&["manual_choice"])
                    .inc();
                NarrowingState::Result {
                    species: *species,
                    symptoms: symptoms.clone(),
                    outcome: ResultOutcome::ManualChoice { choices },
                }
            }
        };
        self.transition(next);
        Ok(&self.state)
    }

    /// Step back one state, discarding what the current state accumulated.
    pub fn back(&mut self) -> Result<&NarrowingState, SessionError> {
        let next = match &self.state {
            NarrowingState::SpeciesSelect => {
                return Err(invalid(&self.state, "go back"));
            }
            NarrowingState::SymptomEntry { .. } => NarrowingState::SpeciesSelect,
            NarrowingState::Narrowing { species, .. }
            | NarrowingState::Result {
                species,
                outcome: ResultOutcome::NoMatch,
                ..
            } => NarrowingState::SymptomEntry { species: *species },
            NarrowingState::ImageConfirm {
                species, symptoms, ..
            }
            | NarrowingState::Result {
                species, symptoms, ..
            } => self.reenter_narrowing(*species, symptoms.clone()),
        };
        self.transition(next);
        Ok(&self.state)
    }

    /// `Result -> SpeciesSelect` ("diagnose again").
    pub fn reset(&mut self) -> Result<&NarrowingState, SessionError> {
        self.expect_state("result", "reset")?;
        self.transition(NarrowingState::SpeciesSelect);
        Ok(&self.state)
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// The pending question while narrowing.
    pub fn current_question(&self) -> Option<&CandidateQuestion> {
        match &self.state {
            NarrowingState::Narrowing {
                questions,
                question_index,
                ..
            } => questions.get(*question_index),
            _ => None,
        }
    }

    /// `(answered, total)` while narrowing.
    pub fn progress(&self) -> Option<(usize, usize)> {
        match &self.state {
            NarrowingState::Narrowing {
                questions,
                question_index,
                ..
            } => Some((*question_index, questions.len())),
            _ => None,
        }
    }

    /// Candidates to list, truncated to the display limit.
    pub fn displayed_candidates(&self) -> &[MatchResult] {
        let ranking = self.state.ranking();
        &ranking[..ranking.len().min(self.config.candidate_display_limit)]
    }

    /// Image-needing candidates offered at the image gate, refined order.
    pub fn image_choices(&self) -> Vec<&MatchResult> {
        match &self.state {
            NarrowingState::ImageConfirm { ranking, .. } => ranking
                .iter()
                .filter(|m| m.needs_image())
                .take(self.config.image_choice_limit)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Best refined candidate not needing an image, at the image gate.
    pub fn image_fallback(&self) -> Option<&MatchResult> {
        match &self.state {
            NarrowingState::ImageConfirm { ranking, .. } => {
                ranking.iter().find(|m| !m.needs_image())
            }
            _ => None,
        }
    }

    /// Serializable view of the whole session.
    pub fn snapshot(&self) -> SessionSnapshot {
        let question = match &self.state {
            NarrowingState::Narrowing {
                questions,
                question_index,
                ..
            } => questions.get(*question_index).map(|q| QuestionView {
                symptom: q.symptom.clone(),
                related_positions: q.related_positions.clone(),
                related_disease_ids: q.related_disease_ids.clone(),
                index: *question_index,
                total: questions.len(),
            }),
            _ => None,
        };
        let answers = match &self.state {
            NarrowingState::Narrowing { answers, .. } => Some(answers.clone()),
            _ => None,
        };
        let (outcome, selected) = match &self.state {
            NarrowingState::Result { outcome, .. } => (
                Some(outcome.kind()),
                match outcome {
                    ResultOutcome::Selected { candidate } => Some(SelectedDisease {
                        summary: CandidateSummary::from(candidate),
                        record: Arc::clone(&candidate.disease),
                    }),
                    _ => None,
                },
            ),
            _ => (None, None),
        };

        SessionSnapshot {
            id: self.id.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            state: self.state.state_type(),
            species: self.state.species(),
            symptoms: self.state.symptoms().to_vec(),
            candidates: self
                .displayed_candidates()
                .iter()
                .map(CandidateSummary::from)
                .collect(),
            question,
            answers,
            image_choices: self
                .image_choices()
                .into_iter()
                .map(CandidateSummary::from)
                .collect(),
            image_fallback: self.image_fallback().map(CandidateSummary::from),
            outcome,
            selected,
        }
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn expect_state(
        &self,
        expected: &'static str,
        operation: &'static str,
    ) -> Result<(), SessionError> {
        if self.state.state_type() == expected {
            Ok(())
        } else {
            Err(invalid(&self.state, operation))
        }
    }

    fn transition(&mut self, next: NarrowingState) {
        debug!(
            session_id = %self.id,
            from = self.state.state_type(),
            to = next.state_type(),
            "Session transition"
        );
        self.state = next;
        self.updated_at = Utc::now();
    }

    fn rank(&self, species: Species, symptoms: &[String]) -> (Vec<MatchResult>, Vec<CandidateQuestion>) {
        let candidates = match_diseases(species, symptoms, self.catalog.records());
        let questions = QuestionGenerator::with_config(QuestionGeneratorConfig::from(&self.config))
            .generate(&candidates);
        (candidates, questions)
    }

    /// Entry into `Narrowing`: match, then generate questions. Falls
    /// through to the result or image gate when nothing is left to ask.
    fn enter_narrowing(&self, species: Species, symptoms: Vec<String>) -> NarrowingState {
        let (candidates, questions) = self.rank(species, &symptoms);
        if candidates.is_empty() {
            info!(session_id = %self.id, species = %species, "No disease matched the symptoms");
            metrics::OUTCOMES.with_label_values(&["no_match"]).inc();
            return NarrowingState::Result {
                species,
                symptoms,
                outcome: ResultOutcome::NoMatch,
            };
        }

        if questions.is_empty() {
            return self.finish_narrowing(species, symptoms, &candidates, &AnswerMap::new());
        }

        NarrowingState::Narrowing {
            species,
            symptoms,
            candidates,
            questions,
            answers: AnswerMap::new(),
            question_index: 0,
        }
    }

    /// Back-navigation target for states past narrowing. A narrowing pass
    /// without questions is never shown, so that case goes back to
    /// symptom entry instead.
    fn reenter_narrowing(&self, species: Species, symptoms: Vec<String>) -> NarrowingState {
        let (candidates, questions) = self.rank(species, &symptoms);
        if questions.is_empty() {
            return NarrowingState::SymptomEntry { species };
        }
        NarrowingState::Narrowing {
            species,
            symptoms,
            candidates,
            questions,
            answers: AnswerMap::new(),
            question_index: 0,
        }
    }

    /// Refine once and apply the image gate.
    fn finish_narrowing(
        &self,
        species: Species,
        symptoms: Vec<String>,
        candidates: &[MatchResult],
        answers: &AnswerMap,
    ) -> NarrowingState {
        let ranking = Refiner::from(&self.config).refine(candidates, answers);

        let gate_hit = ranking
            .iter()
            .take(self.config.image_gate_depth)
            .any(|m| m.needs_image());

        if gate_hit {
            info!(session_id = %self.id, "Top candidates need visual confirmation");
            metrics::OUTCOMES
                .with_label_values(&["image_confirm"])
                .inc();
            return NarrowingState::ImageConfirm {
                species,
                symptoms,
                ranking,
            };
        }

        match ranking.into_iter().next() {
            Some(top) => selected(species, symptoms, top),
            // The matcher never hands over an empty ranking
            None => NarrowingState::Result {
                species,
                symptoms,
                outcome: ResultOutcome::NoMatch,
            },
        }
    }
}

fn invalid(state: &NarrowingState, operation: &'static str) -> SessionError {
    SessionError::InvalidTransition {
        state: state.state_type(),
        operation,
    }
}

fn find_candidate(candidates: &[MatchResult], position: usize) -> Result<MatchResult, SessionError> {
    candidates
        .iter()
        .find(|m| m.catalog_position == position)
        .cloned()
        .ok_or(SessionError::UnknownCandidate(position))
}

fn top(ranking: &[MatchResult], limit: usize) -> Vec<MatchResult> {
    ranking.iter().take(limit).cloned().collect()
}

fn selected(species: Species, symptoms: Vec<String>, candidate: MatchResult) -> NarrowingState {
    info!(
        disease_id = %candidate.disease_id(),
        position = candidate.catalog_position,
        "Disease selected"
    );
    metrics::OUTCOMES.with_label_values(&["selected"]).inc();
    NarrowingState::Result {
        species,
        symptoms,
        outcome: ResultOutcome::Selected { candidate },
    }
}
