use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub narrowing: NarrowingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum number of live narrowing sessions held in memory.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    /// Seconds without activity after which a session is dropped.
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_sessions: default_max_sessions(),
            session_idle_secs: default_session_idle_secs(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

fn default_max_sessions() -> usize {
    10_000
}

fn default_session_idle_secs() -> u64 {
    30 * 60
}

/// Disease catalog configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("diseases.json")
}

/// Tunables of the narrowing flow.
///
/// By default questions come from the top 5 candidates, 3 unmatched
/// keywords each, at most 5 questions. A confirmed symptom is worth +1
/// and a denied one -0.5; the image gate looks at the top 3 refined
/// candidates.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NarrowingConfig {
    /// Number of top-ranked candidates examined for questions.
    pub question_pool: usize,
    /// Unmatched keywords taken from each examined candidate.
    pub questions_per_candidate: usize,
    /// Maximum number of questions asked per session.
    pub max_questions: usize,
    /// Score added when the user confirms an unmatched symptom.
    pub positive_bonus: f64,
    /// Score removed when the user denies a matched symptom.
    pub negative_penalty: f64,
    /// Number of refined candidates inspected by the image gate.
    pub image_gate_depth: usize,
    /// Image-needing candidates offered on the confirmation step.
    pub image_choice_limit: usize,
    /// Candidates offered when no candidate could be auto-selected.
    pub manual_choice_limit: usize,
    /// Unrefined candidates shown alongside questions.
    pub candidate_display_limit: usize,
}

impl Default for NarrowingConfig {
    fn default() -> Self {
        Self {
            question_pool: 5,
            questions_per_candidate: 3,
            max_questions: 5,
            positive_bonus: 1.0,
            negative_penalty: 0.5,
            image_gate_depth: 3,
            image_choice_limit: 5,
            manual_choice_limit: 5,
            candidate_display_limit: 10,
        }
    }
}
