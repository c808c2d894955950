//! Keyword classifiers for incoming user messages
//!
//! Every classifier is a case-insensitive substring scan over a fixed phrase
//! list. Rules are evaluated in order and the first match wins; there is no
//! scoring and no tokenization.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

// ============ Emotion Tags ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionTag {
    Lonely,
    Sad,
    Anxious,
    Angry,
    Tired,
    Happy,
    Default,
    /// Only produced by the session's crisis shortcut, never by the classifier.
    Crisis,
}

impl EmotionTag {
    /// Single-list categories in the order the classifier tests them
    pub const CLASSIFIED: [EmotionTag; 6] = [
        EmotionTag::Lonely,
        EmotionTag::Sad,
        EmotionTag::Anxious,
        EmotionTag::Angry,
        EmotionTag::Tired,
        EmotionTag::Happy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionTag::Lonely => "lonely",
            EmotionTag::Sad => "sad",
            EmotionTag::Anxious => "anxious",
            EmotionTag::Angry => "angry",
            EmotionTag::Tired => "tired",
            EmotionTag::Happy => "happy",
            EmotionTag::Default => "default",
            EmotionTag::Crisis => "crisis",
        }
    }
}

impl fmt::Display for EmotionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown emotion tag '{0}'")]
pub struct UnknownEmotion(pub String);

impl FromStr for EmotionTag {
    type Err = UnknownEmotion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lonely" => Ok(EmotionTag::Lonely),
            "sad" => Ok(EmotionTag::Sad),
            "anxious" => Ok(EmotionTag::Anxious),
            "angry" => Ok(EmotionTag::Angry),
            "tired" => Ok(EmotionTag::Tired),
            "happy" => Ok(EmotionTag::Happy),
            "default" => Ok(EmotionTag::Default),
            "crisis" => Ok(EmotionTag::Crisis),
            other => Err(UnknownEmotion(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Normal,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Normal => "normal",
            RiskLevel::High => "high",
        }
    }
}

// ============ Default Keyword Tables ============

const HIGH_RISK_KEYWORDS: &[&str] = &[
    // Suicide ideation
    "suicide", "suicidal", "kill myself", "end my life", "want to die",
    "better off dead", "no reason to live",
    // Self-harm
    "hurt myself", "self harm", "self-harm", "cut myself", "cutting myself", "overdose",
    // Blackmail and sexual exploitation
    "blackmail", "leak my photos", "leak my pictures", "leak my pics",
    "threatening to leak", "threatening to share", "sextortion", "nudes",
    "send him pictures", "send her pictures",
    // Abuse
    "abuse", "abusing me", "molest", "raped me", "was raped", "raping me",
    "touched me inappropriately", "touches me inappropriately", "he beats me", "she beats me",
    "beats me up", "he hits me", "she hits me",
];

const ACADEMIC_FAILURE_KEYWORDS: &[&str] = &[
    "my exam", "an exam", "the exam", "exams", "my test", "the test", "test results",
    "failed", "fail", "grades", "my marks", "bad marks", "report card", "my results",
];

const REACTION_KEYWORDS: &[&str] = &["scold", "shout", "angry", "disappointed", "yell"];

const LONELY_KEYWORDS: &[&str] = &[
    "lonely", "alone", "left out", "isolated", "no friends", "nobody", "ignored",
];

const SAD_KEYWORDS: &[&str] = &[
    "sad", "cry", "crying", "depressed", "unhappy", "heartbroken", "hopeless", "miserable",
];

const ANXIOUS_KEYWORDS: &[&str] = &[
    "anxious", "anxiety", "nervous", "worried", "worry", "panic", "stressed", "scared",
    "afraid", "overthinking",
];

const ANGRY_KEYWORDS: &[&str] = &[
    "angry", "furious", "annoyed", "frustrated", "irritated", "pissed", "enraged",
    "full of rage",
];

const TIRED_KEYWORDS: &[&str] = &[
    "tired", "exhausted", "sleepy", "drained", "burnt out", "burned out", "no energy",
];

const HAPPY_KEYWORDS: &[&str] = &[
    "happy", "glad", "excited", "joyful", "so much joy", "great day", "grateful", "proud",
];

const COMFORT_KEYWORDS: &[&str] = &[
    "comfort me", "make me feel better", "say something nice", "cheer me up",
    "need comfort", "need a hug", "tell me it will be okay", "tell me it's okay",
    "reassure me", "console me",
];

const DISTRESS_KEYWORDS: &[&str] = &[
    "can't take it", "cannot take it", "can't handle", "too much for me",
    "breaking down", "falling apart", "overwhelmed", "i give up", "can't stop crying",
    "tired of everything",
];

const CLOSE_KEYWORDS: &[&str] = &[
    "bye", "good night", "goodnight", "see you", "talk later", "that's all",
    "done for today", "end the chat", "gotta go", "have to go",
];

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

// ============ Lexicon ============

/// Immutable keyword data a `Classifier` is built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordLexicon {
    pub high_risk: Vec<String>,
    pub academic_failure: Vec<String>,
    pub reaction: Vec<String>,
    pub lonely: Vec<String>,
    pub sad: Vec<String>,
    pub anxious: Vec<String>,
    pub angry: Vec<String>,
    pub tired: Vec<String>,
    pub happy: Vec<String>,
    pub comfort: Vec<String>,
    pub distress: Vec<String>,
    pub close: Vec<String>,
}

impl Default for KeywordLexicon {
    fn default() -> Self {
        Self {
            high_risk: owned(HIGH_RISK_KEYWORDS),
            academic_failure: owned(ACADEMIC_FAILURE_KEYWORDS),
            reaction: owned(REACTION_KEYWORDS),
            lonely: owned(LONELY_KEYWORDS),
            sad: owned(SAD_KEYWORDS),
            anxious: owned(ANXIOUS_KEYWORDS),
            angry: owned(ANGRY_KEYWORDS),
            tired: owned(TIRED_KEYWORDS),
            happy: owned(HAPPY_KEYWORDS),
            comfort: owned(COMFORT_KEYWORDS),
            distress: owned(DISTRESS_KEYWORDS),
            close: owned(CLOSE_KEYWORDS),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LexiconError {
    #[error("failed to read lexicon file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid lexicon JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl KeywordLexicon {
    /// Load a complete lexicon from a JSON file with the same field names
    pub fn from_json_file(path: &Path) -> Result<Self, LexiconError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn emotion_list(&self, tag: EmotionTag) -> &[String] {
        match tag {
            EmotionTag::Lonely => &self.lonely,
            EmotionTag::Sad => &self.sad,
            EmotionTag::Anxious => &self.anxious,
            EmotionTag::Angry => &self.angry,
            EmotionTag::Tired => &self.tired,
            EmotionTag::Happy => &self.happy,
            EmotionTag::Default | EmotionTag::Crisis => &[],
        }
    }

    fn lowercased(mut self) -> Self {
        for list in [
            &mut self.high_risk,
            &mut self.academic_failure,
            &mut self.reaction,
            &mut self.lonely,
            &mut self.sad,
            &mut self.anxious,
            &mut self.angry,
            &mut self.tired,
            &mut self.happy,
            &mut self.comfort,
            &mut self.distress,
            &mut self.close,
        ] {
            for word in list.iter_mut() {
                *word = word.to_lowercase();
            }
            list.retain(|w| !w.is_empty());
        }
        self
    }
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles.iter().any(|kw| haystack.contains(kw.as_str()))
}

// ============ Classifier ============

#[derive(Debug, Clone)]
pub struct Classifier {
    lexicon: KeywordLexicon,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(KeywordLexicon::default())
    }
}

impl Classifier {
    pub fn new(lexicon: KeywordLexicon) -> Self {
        // Empty keywords would match every message
        Self {
            lexicon: lexicon.lowercased(),
        }
    }

    pub fn lexicon(&self) -> &KeywordLexicon {
        &self.lexicon
    }

    /// Severity check that short-circuits the whole turn when `High`
    pub fn risk_level(&self, text: &str) -> RiskLevel {
        if contains_any(&text.to_lowercase(), &self.lexicon.high_risk) {
            RiskLevel::High
        } else {
            RiskLevel::Normal
        }
    }

    /// Primary emotion of the message, first matching rule wins
    pub fn emotion(&self, text: &str) -> EmotionTag {
        let lower = text.to_lowercase();

        // Academic failure plus someone's reaction reads as sadness
        if contains_any(&lower, &self.lexicon.academic_failure)
            && contains_any(&lower, &self.lexicon.reaction)
        {
            return EmotionTag::Sad;
        }

        EmotionTag::CLASSIFIED
            .into_iter()
            .find(|tag| contains_any(&lower, self.lexicon.emotion_list(*tag)))
            .unwrap_or(EmotionTag::Default)
    }

    pub fn is_comfort_request(&self, text: &str) -> bool {
        contains_any(&text.to_lowercase(), &self.lexicon.comfort)
    }

    pub fn is_distress(&self, text: &str) -> bool {
        contains_any(&text.to_lowercase(), &self.lexicon.distress)
    }

    pub fn is_close_request(&self, text: &str) -> bool {
        contains_any(&text.to_lowercase(), &self.lexicon.close)
    }
}
