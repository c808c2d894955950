//! Trailing emotion marker handling
//!
//! Replies carry their emotion as a final line of the form
//! `<text>\n\n[EMOTION=<tag>]`. Model output is not trusted to follow that
//! grammar exactly, so parsing reports whether the marker was present, absent
//! or malformed instead of failing.

use crate::classifier::EmotionTag;

pub const MARKER_OPEN: &str = "[EMOTION=";
pub const MARKER_CLOSE: char = ']';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerStatus {
    Present,
    Absent,
    /// Opening found but no closing bracket, or a tag outside the vocabulary
    Malformed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedReply {
    pub text: String,
    pub emotion: Option<EmotionTag>,
    pub status: MarkerStatus,
}

/// Append the marker line to a reply
pub fn with_marker(text: &str, emotion: EmotionTag) -> String {
    format!("{}\n\n{}{}{}", text.trim_end(), MARKER_OPEN, emotion, MARKER_CLOSE)
}

/// Split raw output into clean reply text and its emotion tag
pub fn parse_tagged_reply(raw: &str) -> TaggedReply {
    let Some((before, after)) = raw.split_once(MARKER_OPEN) else {
        return TaggedReply {
            text: raw.trim().to_string(),
            emotion: None,
            status: MarkerStatus::Absent,
        };
    };

    let text = before.trim().to_string();
    let emotion = after
        .split_once(MARKER_CLOSE)
        .and_then(|(tag, _)| tag.trim().parse::<EmotionTag>().ok())
        // The crisis tag belongs to the session shortcut, not to model output
        .filter(|tag| *tag != EmotionTag::Crisis);

    let status = if emotion.is_some() {
        MarkerStatus::Present
    } else {
        MarkerStatus::Malformed
    };

    TaggedReply { text, emotion, status }
}
