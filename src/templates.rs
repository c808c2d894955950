//! Offline reply templates
//!
//! Used whenever the generative backend is unavailable or fails. Every reply
//! assembled here ends with the same emotion marker the model is asked to
//! emit, so both paths are parsed identically.

use crate::classifier::EmotionTag;
use crate::marker::with_marker;
use crate::phase::Phase;

/// Longest slice of the user's message quoted back in an opinion reply
pub const QUOTE_MAX_CHARS: usize = 80;

pub const SAFETY_SCRIPT: &str = "It sounds like you are going through something really frightening and painful right now. \
What you are feeling makes sense, and none of this is your fault. \
Please reach out to someone you trust, a local helpline, or emergency services if you are in danger, because you deserve real support. \
Are you somewhere safe at the moment?";

/// Emotion attached to every safety reply
pub const SAFETY_EMOTION: EmotionTag = EmotionTag::Sad;

const CLOSING_LINE: &str = "Thank you for sharing this with me today, I'm here whenever you want to talk again.";

/// One row of the lookup table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRow {
    pub reflection: String,
    /// Soft question, stored without its trailing question mark
    pub question: String,
    /// Tiny grounding action
    pub action: String,
    pub opinion: String,
    pub comfort: String,
}

impl TemplateRow {
    fn new(reflection: &str, question: &str, action: &str, opinion: &str, comfort: &str) -> Self {
        Self {
            reflection: reflection.to_string(),
            question: question.to_string(),
            action: action.to_string(),
            opinion: opinion.to_string(),
            comfort: comfort.to_string(),
        }
    }
}

/// Lookup table keyed by emotion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseTemplates {
    pub lonely: TemplateRow,
    pub sad: TemplateRow,
    pub anxious: TemplateRow,
    pub angry: TemplateRow,
    pub tired: TemplateRow,
    pub happy: TemplateRow,
    pub default: TemplateRow,
}

impl Default for ResponseTemplates {
    fn default() -> Self {
        let lonely = TemplateRow::new(
            "I hear the quiet ache of loneliness in your words.",
            "What's one small thing that usually brings you comfort",
            "Take 3 slow breaths and notice the air moving in and out.",
            "Feeling left out can hurt more than people admit, and it doesn't mean something is wrong with you",
            "You matter, even on the days when it feels like nobody notices, and reaching out like this already takes courage",
        );
        let sad = TemplateRow::new(
            "That heaviness you're carrying sounds really tender.",
            "What's weighing on your heart right now",
            "Place one hand on your heart, one on your belly. Feel them rise together.",
            "It sounds like you've been holding a lot of hurt, and it makes sense that it feels this heavy",
            "This sadness is real, and it is allowed to take up space while you slowly find your footing again",
        );
        let anxious = TemplateRow::new(
            "I can feel that restless energy moving through you.",
            "What's the smallest step you can take right now",
            "Name 3 things you can see around you, right in this moment.",
            "A lot of this worry seems to come from trying to hold every possible outcome at once",
            "You don't have to solve all of it tonight, and you've made it through uncertain moments before",
        );
        let angry = TemplateRow::new(
            "That fire inside makes complete sense given what happened.",
            "What do you need most right now to feel steadier",
            "Shake out your hands and arms for 10 seconds. Let some tension go.",
            "Your anger seems to be pointing at something that felt unfair, and that signal is worth listening to",
            "It's okay to feel this strongly, and you get to decide what to do with it once it settles a little",
        );
        let tired = TemplateRow::new(
            "Your exhaustion is so valid after everything.",
            "What's one tiny thing you can release right now",
            "Close your eyes for 10 seconds. Just rest in the darkness.",
            "It seems like you've been running on empty for a while, and rest might be a need rather than a luxury",
            "You've been carrying so much, and resting now is not giving up, it's taking care of yourself",
        );
        let happy = TemplateRow::new(
            "That spark of joy lighting you up feels so beautiful.",
            "What made this moment feel so good",
            "Smile softly to yourself and let it sink in.",
            "Moments like this seem to show what really matters to you",
            "You deserve this good feeling, and it's okay to let yourself fully enjoy it",
        );
        let default = TemplateRow::new(
            "I'm right here holding space for whatever you're feeling.",
            "What's alive in you right now",
            "Place both feet flat on the ground. Feel your connection to earth.",
            "It seems like there is more underneath this than it first looks like",
            "Whatever you're feeling right now is allowed, and you don't have to carry it alone in this moment",
        );
        Self {
            lonely,
            sad,
            anxious,
            angry,
            tired,
            happy,
            default,
        }
    }
}

/// Truncate on character boundaries, adding "..." if anything was cut
pub fn truncate_message(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_chars {
        trimmed.to_string()
    } else {
        let cut: String = trimmed.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}

impl ResponseTemplates {
    pub fn row(&self, emotion: EmotionTag) -> &TemplateRow {
        match emotion {
            EmotionTag::Lonely => &self.lonely,
            EmotionTag::Sad => &self.sad,
            EmotionTag::Anxious => &self.anxious,
            EmotionTag::Angry => &self.angry,
            EmotionTag::Tired => &self.tired,
            EmotionTag::Happy => &self.happy,
            EmotionTag::Default | EmotionTag::Crisis => &self.default,
        }
    }

    /// Assemble the reply text (without marker) for a phase
    pub fn compose(&self, phase: Phase, emotion: EmotionTag, user_message: &str) -> String {
        let row = self.row(emotion);

        match phase {
            Phase::Understanding => format!("{} {}?", row.reflection, row.question),
            Phase::Opinion | Phase::OpinionComfort => {
                let opinion = if phase == Phase::OpinionComfort {
                    &row.comfort
                } else {
                    &row.opinion
                };
                format!(
                    "From what you told me, it seems that this situation is about {}. {}. What do you think about this view? Does this fit how you see it?",
                    truncate_message(user_message, QUOTE_MAX_CHARS),
                    opinion
                )
            }
            Phase::Closing => format!("{} {} {}", row.reflection, CLOSING_LINE, row.action),
            Phase::Safety => SAFETY_SCRIPT.to_string(),
        }
    }

    /// Full fallback output including the trailing marker.
    /// Safety replies always carry the safety emotion.
    pub fn render(&self, phase: Phase, emotion: EmotionTag, user_message: &str) -> String {
        let emotion = if phase == Phase::Safety {
            SAFETY_EMOTION
        } else {
            emotion
        };
        with_marker(&self.compose(phase, emotion, user_message), emotion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_understanding_shape() {
        let templates = ResponseTemplates::default();
        let text = templates.compose(Phase::Understanding, EmotionTag::Lonely, "I feel lonely");
        assert_eq!(
            text,
            "I hear the quiet ache of loneliness in your words. What's one small thing that usually brings you comfort?"
        );
    }

    #[test]
    fn test_opinion_quotes_truncated_message() {
        let templates = ResponseTemplates::default();
        let long = "a".repeat(100);
        let text = templates.compose(Phase::Opinion, EmotionTag::Default, &long);
        let expected_quote = format!("{}...", "a".repeat(80));
        assert!(text.starts_with(&format!(
            "From what you told me, it seems that this situation is about {}.",
            expected_quote
        )));
        assert!(text.ends_with("What do you think about this view? Does this fit how you see it?"));
    }

    #[test]
    fn test_comfort_uses_comfort_entry() {
        let templates = ResponseTemplates::default();
        let row = templates.row(EmotionTag::Tired).clone();
        let text = templates.compose(Phase::OpinionComfort, EmotionTag::Tired, "so drained");
        assert!(text.contains("situation is about so drained."));
        assert!(text.contains(&row.comfort));
        assert!(!text.contains(&row.opinion));
    }

    #[test]
    fn test_safety_ignores_emotion() {
        let templates = ResponseTemplates::default();
        let raw = templates.render(Phase::Safety, EmotionTag::Happy, "anything");
        assert_eq!(raw, format!("{}\n\n[EMOTION=sad]", SAFETY_SCRIPT));
    }

    #[test]
    fn test_render_appends_marker() {
        let templates = ResponseTemplates::default();
        let raw = templates.render(Phase::Closing, EmotionTag::Happy, "bye");
        assert!(raw.contains("Smile softly to yourself"));
        assert!(raw.ends_with("[EMOTION=happy]"));
    }

    #[test]
    fn test_crisis_uses_default_row() {
        let templates = ResponseTemplates::default();
        assert_eq!(templates.row(EmotionTag::Crisis), templates.row(EmotionTag::Default));
    }

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate_message("  short  ", 80), "short");
        assert_eq!(truncate_message("héllo wörld", 5), "héllo...");
    }
}
