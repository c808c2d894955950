// Instruction prompts for the generative backend - one fixed rule block plus
// per-phase guidance

use crate::phase::Phase;

pub const SYSTEM_PROMPT: &str = r#"You are InnerCompanion, a gentle, warm, reflective inner voice.

You help the user understand what they are feeling, one small step at a time.

Rules:
- NEVER say you're a therapist or give medical advice.
- Keep responses short, warm, soothing, and natural.
- Ask at most ONE question per reply.
- Never break character.
- If the user mentions danger, self-harm or abuse, gently encourage them to contact someone they trust or local emergency services.

After your reply, add this tag on its own line, using exactly one of:
lonely, sad, anxious, angry, tired, happy, default

[EMOTION=primary_emotion]
"#;

const UNDERSTANDING_GUIDANCE: &str = "Understanding phase. Reflect back what you heard in one sentence, then ask ONE gentle question to understand the situation better. Do not give opinions or advice yet.";

const OPINION_GUIDANCE: &str = "Opinion phase. Briefly summarize what this situation seems to be about, offer ONE gentle perspective on it, then ask whether that view fits how they see it.";

const OPINION_COMFORT_GUIDANCE: &str = "Comfort phase. The user needs reassurance. Start with warm comfort, then offer ONE gentle perspective, then ask whether it fits how they feel. Avoid problem-solving.";

const CLOSING_GUIDANCE: &str = "Closing phase. The user wants to end the conversation. Thank them warmly, offer one tiny grounding action they can do in 10-15 seconds, and let them know they can come back anytime. Do not ask a question.";

/// Guidance for a phase, with an extra note on the first turns.
/// Safety turns are answered by the fixed script and get none.
pub fn phase_guidance(phase: Phase, turn_count: u32) -> String {
    let base = match phase {
        Phase::Understanding => UNDERSTANDING_GUIDANCE,
        Phase::Opinion => OPINION_GUIDANCE,
        Phase::OpinionComfort => OPINION_COMFORT_GUIDANCE,
        Phase::Closing => CLOSING_GUIDANCE,
        Phase::Safety => return String::new(),
    };

    match turn_count {
        1 => format!("{} First message: be extra welcoming and soft.", base),
        2 => format!("{} Second turn: gently go a little deeper.", base),
        _ => base.to_string(),
    }
}

/// Render the user-side prompt for one turn
pub fn render_turn_prompt(summary: &str, history: &[String], guidance: &str, message: &str) -> String {
    let summary = if summary.trim().is_empty() {
        "No background yet."
    } else {
        summary.trim()
    };
    let history = if history.is_empty() {
        "No prior conversation.".to_string()
    } else {
        history.join("\n")
    };

    format!(
        "User summary: {}\nRecent history:\n{}\n\nTurn guidance: {}\n\nUser says: {}\n\nRespond following the turn guidance.\nAfter your response, add this tag on a new line:\n\n[EMOTION=primary_emotion]",
        summary, history, guidance, message
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_turn_guidance_is_welcoming() {
        let guidance = phase_guidance(Phase::Understanding, 1);
        assert!(guidance.starts_with("Understanding phase."));
        assert!(guidance.contains("extra welcoming"));
        assert!(!phase_guidance(Phase::Opinion, 4).contains("welcoming"));
        assert!(phase_guidance(Phase::Safety, 1).is_empty());
    }

    #[test]
    fn test_render_turn_prompt_defaults() {
        let prompt = render_turn_prompt("  ", &[], "Be kind.", "hello");
        assert!(prompt.contains("User summary: No background yet."));
        assert!(prompt.contains("No prior conversation."));
        assert!(prompt.contains("User says: hello"));
        assert!(prompt.ends_with("[EMOTION=primary_emotion]"));
    }

    #[test]
    fn test_render_turn_prompt_includes_history_in_order() {
        let history = vec!["User: hi".to_string(), "Companion: hello".to_string()];
        let prompt = render_turn_prompt("Name: Sam.", &history, "Be kind.", "again");
        assert!(prompt.contains("Recent history:\nUser: hi\nCompanion: hello\n"));
    }
}
