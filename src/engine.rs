//! Turn orchestration
//!
//! classify → select phase → generate (model or templates) → persist → reply

use crate::classifier::{Classifier, EmotionTag, RiskLevel};
use crate::generator::{GenerationError, GenerationRequest, ReplySource, ResponseGenerator};
use crate::logging;
use crate::marker::{MarkerStatus, TaggedReply};
use crate::phase::{select_phase, Phase};
use crate::profile::{
    ProfileError, ProfileStore, COMPANION_LINE_PREFIX, DEFAULT_USER_ID, HISTORY_WINDOW,
    USER_LINE_PREFIX,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnReply {
    pub text: String,
    pub emotion: Option<EmotionTag>,
    pub phase: Phase,
    pub source: ReplySource,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Profile(#[from] ProfileError),
}

pub struct CompanionEngine<S: ProfileStore> {
    classifier: Classifier,
    generator: ResponseGenerator,
    store: S,
    user_id: String,
}

impl<S: ProfileStore> CompanionEngine<S> {
    pub fn new(classifier: Classifier, generator: ResponseGenerator, store: S) -> Self {
        Self {
            classifier,
            generator,
            store,
            user_id: DEFAULT_USER_ID.to_string(),
        }
    }

    pub fn with_user_id(mut self, user_id: &str) -> Self {
        self.user_id = user_id.to_string();
        self
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run one conversation turn. Only profile storage failures surface as errors.
    pub async fn handle_turn(
        &self,
        user_message: &str,
        user_summary: &str,
        turn_count: u32,
    ) -> Result<TurnReply, EngineError> {
        let user = Some(self.user_id.as_str());

        if self.classifier.risk_level(user_message) == RiskLevel::High {
            logging::log_classify(user, "risk=high, switching to safety script");
            let reply = self.generator.fallback(Phase::Safety, EmotionTag::Sad, user_message);
            return self.finish_turn(user_message, reply, Phase::Safety, ReplySource::Template);
        }

        let close_requested = self.classifier.is_close_request(user_message);
        let comfort_requested = self.classifier.is_comfort_request(user_message);
        let distress_detected = self.classifier.is_distress(user_message);
        let phase = select_phase(
            RiskLevel::Normal,
            close_requested,
            comfort_requested,
            distress_detected,
            turn_count,
        );
        logging::log_phase(user, &format!(
            "turn={} close={} comfort={} distress={} -> {}",
            turn_count, close_requested, comfort_requested, distress_detected, phase
        ));

        let history = self
            .store
            .load(&self.user_id)?
            .recent_contexts(HISTORY_WINDOW)
            .to_vec();
        let request = GenerationRequest::new(phase, turn_count, user_message, user_summary, history);

        let (reply, source) = match self.generator.generate(&request).await {
            Ok(reply) => {
                match reply.status {
                    MarkerStatus::Present => {}
                    MarkerStatus::Absent => {
                        logging::log_generation(user, "Reply has no emotion marker");
                    }
                    MarkerStatus::Malformed => {
                        logging::log_generation(user, "Malformed emotion marker, emotion left unset");
                    }
                }
                (reply, ReplySource::Generative)
            }
            Err(e) => {
                match &e {
                    GenerationError::Unavailable => {}
                    GenerationError::RateLimited(_) => {
                        logging::log_generation(user, &format!("{}, using templates", e));
                    }
                    GenerationError::Timeout
                    | GenerationError::MalformedOutput(_)
                    | GenerationError::Other(_) => {
                        logging::log_error(user, &format!("Generation failed, using templates: {}", e));
                    }
                }
                let emotion = self.classifier.emotion(user_message);
                logging::log_classify(user, &format!("emotion={}", emotion));
                (self.generator.fallback(phase, emotion, user_message), ReplySource::Template)
            }
        };

        self.finish_turn(user_message, reply, phase, source)
    }

    /// Append the exchange to the profile and save it as a whole
    fn finish_turn(
        &self,
        user_message: &str,
        reply: TaggedReply,
        phase: Phase,
        source: ReplySource,
    ) -> Result<TurnReply, EngineError> {
        let mut profile = self.store.load(&self.user_id)?;
        profile.add_context(&format!("{}{}", USER_LINE_PREFIX, user_message));
        profile.add_context(&format!("{}{}", COMPANION_LINE_PREFIX, reply.text));
        if let Some(emotion) = reply.emotion {
            profile.log_emotion(emotion);
        }
        self.store.save(&self.user_id, &profile)?;

        Ok(TurnReply {
            text: reply.text,
            emotion: reply.emotion,
            phase,
            source,
        })
    }
}
