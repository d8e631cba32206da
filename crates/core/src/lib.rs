pub mod catalog;
pub mod config;
pub mod matching;
pub mod metrics;
pub mod session;
pub mod testing;

pub use catalog::{Catalog, CatalogError, CatalogStats, DiseaseRecord, Severity, Species, SpeciesScope};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, NarrowingConfig,
};
pub use matching::{match_diseases, normalize, Answer, AnswerMap, CandidateQuestion, MatchResult};
pub use session::{NarrowingSession, NarrowingState, ResultOutcome, SessionError, SessionSnapshot};
