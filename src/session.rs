//! Chat session state for a front-end: turn counter, transcript, crisis
//! shortcut and the "remember this about me" form.

use crate::classifier::EmotionTag;
use crate::engine::{CompanionEngine, EngineError};
use crate::logging;
use crate::profile::{update_user_profile, ProfileError, ProfileStore, ProfileUpdate, UserProfile};
use crate::safety::{is_crisis, CRISIS_MESSAGE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Companion,
}

impl Speaker {
    pub fn label(&self) -> &'static str {
        match self {
            Speaker::User => "You",
            Speaker::Companion => "InnerCompanion",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReply {
    pub text: String,
    pub emotion: Option<EmotionTag>,
}

pub struct Session<S: ProfileStore> {
    engine: CompanionEngine<S>,
    turn_count: u32,
    transcript: Vec<(Speaker, String)>,
}

impl<S: ProfileStore> Session<S> {
    pub fn new(engine: CompanionEngine<S>) -> Self {
        Self {
            engine,
            turn_count: 0,
            transcript: Vec::new(),
        }
    }

    pub fn engine(&self) -> &CompanionEngine<S> {
        &self.engine
    }

    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    pub fn transcript(&self) -> &[(Speaker, String)] {
        &self.transcript
    }

    /// Background summary built from the stored profile
    pub fn user_summary(&self) -> Result<String, ProfileError> {
        Ok(self.engine.store().load(self.engine.user_id())?.summary())
    }

    /// Send one message. Blank input is ignored and returns `None`.
    pub async fn send(&mut self, message: &str) -> Result<Option<SessionReply>, EngineError> {
        let message = message.trim();
        if message.is_empty() {
            return Ok(None);
        }

        self.turn_count += 1;

        let reply = if is_crisis(message) {
            logging::log_session(Some(self.engine.user_id()), "Crisis shortcut triggered");
            SessionReply {
                text: CRISIS_MESSAGE.to_string(),
                emotion: Some(EmotionTag::Crisis),
            }
        } else {
            let summary = self.user_summary()?;
            let turn = self.engine.handle_turn(message, &summary, self.turn_count).await?;
            SessionReply {
                text: turn.text,
                emotion: turn.emotion,
            }
        };

        self.transcript.push((Speaker::User, message.to_string()));
        self.transcript.push((Speaker::Companion, reply.text.clone()));

        Ok(Some(reply))
    }

    /// Save optional name, age and a free-text note to the profile
    pub fn remember(
        &self,
        name: Option<String>,
        age: Option<String>,
        note: Option<String>,
    ) -> Result<UserProfile, ProfileError> {
        let update = ProfileUpdate {
            name,
            age,
            context: note,
            helpful_action: None,
        };
        update_user_profile(self.engine.store(), self.engine.user_id(), &update)
    }
}
