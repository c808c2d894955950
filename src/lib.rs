pub mod anthropic;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod engine;
pub mod generator;
pub mod logging;
pub mod marker;
pub mod openai;
pub mod phase;
pub mod profile;
pub mod prompts;
pub mod safety;
pub mod session;
pub mod templates;

pub use classifier::{Classifier, EmotionTag, KeywordLexicon, RiskLevel};
pub use config::{Config, ConfigError, Provider};
pub use engine::{CompanionEngine, EngineError, TurnReply};
pub use generator::{GenerationError, GenerationRequest, ReplySource, ResponseGenerator, TextGenerator};
pub use phase::{select_phase, Phase};
pub use profile::{JsonProfileStore, ProfileError, ProfileStore, ProfileUpdate, UserProfile};
pub use session::{Session, SessionReply, Speaker};
pub use templates::ResponseTemplates;

/// Wire a session from configuration: classifier, backend, JSON store
pub fn build_session(config: &Config) -> Result<Session<JsonProfileStore>, ConfigError> {
    let classifier = Classifier::new(config.lexicon()?);
    let generator = ResponseGenerator::new(config.backend(), ResponseTemplates::default());
    let store = JsonProfileStore::new(config.memory_file.clone());

    logging::log_session(Some(&config.user_id), &format!(
        "Session ready: provider={}, backend={}, memory={}",
        config.provider.as_str(),
        generator.backend_name().unwrap_or("templates"),
        config.memory_file.display()
    ));

    let engine = CompanionEngine::new(classifier, generator, store).with_user_id(&config.user_id);
    Ok(Session::new(engine))
}
