use crate::classifier::RiskLevel;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Response mode for a single turn. Recomputed from scratch every turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Understanding,
    Opinion,
    OpinionComfort,
    Closing,
    Safety,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Understanding => "understanding",
            Phase::Opinion => "opinion",
            Phase::OpinionComfort => "opinion-comfort",
            Phase::Closing => "closing",
            Phase::Safety => "safety",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Turns at or below this count stay in the understanding phase
pub const UNDERSTANDING_TURNS: u32 = 2;
/// Distress only switches to comfort from this turn onwards
pub const DISTRESS_COMFORT_FROM_TURN: u32 = 3;

/// Pick the phase for a turn. First matching rule wins.
pub fn select_phase(
    risk: RiskLevel,
    close_requested: bool,
    comfort_requested: bool,
    distress_detected: bool,
    turn_count: u32,
) -> Phase {
    if risk == RiskLevel::High {
        Phase::Safety
    } else if close_requested {
        Phase::Closing
    } else if comfort_requested
        || (distress_detected && turn_count >= DISTRESS_COMFORT_FROM_TURN)
    {
        Phase::OpinionComfort
    } else if turn_count <= UNDERSTANDING_TURNS {
        Phase::Understanding
    } else {
        Phase::Opinion
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_early_and_late_turns_without_flags() {
        assert_eq!(select_phase(RiskLevel::Normal, false, false, false, 1), Phase::Understanding);
        assert_eq!(select_phase(RiskLevel::Normal, false, false, false, 2), Phase::Understanding);
        assert_eq!(select_phase(RiskLevel::Normal, false, false, false, 3), Phase::Opinion);
        assert_eq!(select_phase(RiskLevel::Normal, false, false, false, 5), Phase::Opinion);
    }

    #[test]
    fn test_risk_overrides_everything() {
        for turn in [1, 2, 3, 10] {
            assert_eq!(select_phase(RiskLevel::High, true, true, true, turn), Phase::Safety);
        }
    }

    #[test]
    fn test_close_precedes_comfort() {
        for turn in [1, 4] {
            assert_eq!(select_phase(RiskLevel::Normal, true, true, true, turn), Phase::Closing);
        }
    }

    #[test]
    fn test_comfort_and_distress() {
        assert_eq!(select_phase(RiskLevel::Normal, false, true, false, 1), Phase::OpinionComfort);
        // Distress waits until the third turn
        assert_eq!(select_phase(RiskLevel::Normal, false, false, true, 2), Phase::Understanding);
        assert_eq!(select_phase(RiskLevel::Normal, false, false, true, 3), Phase::OpinionComfort);
    }

    #[test]
    fn test_selection_is_pure() {
        let first = select_phase(RiskLevel::Normal, false, false, true, 7);
        let second = select_phase(RiskLevel::Normal, false, false, true, 7);
        assert_eq!(first, second);
    }

    #[test]
    fn test_phase_labels() {
        assert_eq!(Phase::OpinionComfort.to_string(), "opinion-comfort");
        assert_eq!(
            serde_json::to_string(&Phase::OpinionComfort).unwrap(),
            "\"opinion-comfort\""
        );
    }
}
