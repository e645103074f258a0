use serde::{Deserialize, Serialize};
use std::fmt;

const FEMALE_TOKENS: [&str; 3] = ["women", "womens", "women's"];
const MALE_TOKENS: [&str; 3] = ["men", "mens", "men's"];

/// Splits a free-text team label into lowercase word tokens.
///
/// Apostrophes stay inside the word (`"Women's"` is one token) and the
/// typographic apostrophe is folded onto the ASCII one.
fn word_tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '\u{2019}'))
        .filter(|token| !token.is_empty())
        .map(|token| token.to_lowercase().replace('\u{2019}', "'"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl Gender {
    /// Infers gender from a team label such as `"Women's Basketball"`.
    ///
    /// Matching is on whole words, and the female patterns are tried first:
    /// `"women"` contains `"men"`, so a plain substring test on the male
    /// pattern would misfile every women's team.
    pub fn infer(team: &str) -> Self {
        let tokens: Vec<String> = word_tokens(team).collect();
        if tokens.iter().any(|t| FEMALE_TOKENS.contains(&t.as_str())) {
            Gender::Female
        } else if tokens.iter().any(|t| MALE_TOKENS.contains(&t.as_str())) {
            Gender::Male
        } else {
            Gender::Unknown
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Sport {
    Basketball,
    Football,
    Other,
    Unknown,
}

impl Sport {
    /// Infers the sport from a team label. Blank labels are `Unknown`,
    /// anything non-blank that is not recognised is `Other`.
    pub fn infer(team: &str) -> Self {
        let lowered = team.trim().to_lowercase();
        if lowered.is_empty() {
            Sport::Unknown
        } else if lowered.contains("basketball") {
            Sport::Basketball
        } else if lowered.contains("football") {
            Sport::Football
        } else {
            Sport::Other
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Sport::Basketball => "Basketball",
            Sport::Football => "Football",
            Sport::Other => "Other",
            Sport::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

/// Risk tier of an athlete. Declaration order is the reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLabel {
    LowRisk,
    HighAsymmetry,
    HighLoad,
    CombinedRisk,
}

impl RiskLabel {
    pub const ALL: [RiskLabel; 4] = [
        RiskLabel::LowRisk,
        RiskLabel::HighAsymmetry,
        RiskLabel::HighLoad,
        RiskLabel::CombinedRisk,
    ];
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskLabel::LowRisk => "Low Risk",
            RiskLabel::HighAsymmetry => "High Asymmetry",
            RiskLabel::HighLoad => "High Load",
            RiskLabel::CombinedRisk => "Combined Risk",
        };
        f.write_str(label)
    }
}

/// The stronger limb of a bilateral test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
    Even,
}

impl Side {
    pub fn stronger(left: f64, right: f64) -> Self {
        if left > right {
            Side::Left
        } else if right > left {
            Side::Right
        } else {
            Side::Even
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn womens_team_is_female_despite_containing_men() {
        assert_eq!(Gender::infer("Women's Basketball"), Gender::Female);
        assert_eq!(Gender::infer("Womens Basketball"), Gender::Female);
        assert_eq!(Gender::infer("WOMEN BASKETBALL"), Gender::Female);
        assert_eq!(Gender::infer("Women\u{2019}s Soccer"), Gender::Female);
    }

    #[test]
    fn mens_team_is_male() {
        assert_eq!(Gender::infer("Men's Basketball"), Gender::Male);
        assert_eq!(Gender::infer("Mens Basketball"), Gender::Male);
        assert_eq!(Gender::infer("men basketball"), Gender::Male);
    }

    #[test]
    fn unrelated_words_do_not_match_by_substring() {
        assert_eq!(Gender::infer("Football"), Gender::Unknown);
        assert_eq!(Gender::infer("Mentors Club"), Gender::Unknown);
        assert_eq!(Gender::infer(""), Gender::Unknown);
    }

    #[test]
    fn sport_inference() {
        assert_eq!(Sport::infer("Women's Basketball"), Sport::Basketball);
        assert_eq!(Sport::infer("Football"), Sport::Football);
        assert_eq!(Sport::infer("Men's Soccer"), Sport::Other);
        assert_eq!(Sport::infer("   "), Sport::Unknown);
    }

    #[test]
    fn stronger_side() {
        assert_eq!(Side::stronger(100.0, 80.0), Side::Left);
        assert_eq!(Side::stronger(80.0, 100.0), Side::Right);
        assert_eq!(Side::stronger(90.0, 90.0), Side::Even);
    }

    #[test]
    fn labels_sort_in_reporting_order() {
        let mut labels = vec![RiskLabel::CombinedRisk, RiskLabel::LowRisk, RiskLabel::HighLoad];
        labels.sort();
        assert_eq!(
            labels,
            vec![RiskLabel::LowRisk, RiskLabel::HighLoad, RiskLabel::CombinedRisk]
        );
    }
}
