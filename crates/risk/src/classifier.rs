use core_types::RiskLabel;
use serde::{Deserialize, Serialize};

/// Which flag conditions an athlete satisfies.
///
/// A not-evaluable flag is `false` here: it can never satisfy a rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagSet {
    pub high_asymmetry: bool,
    pub high_load: bool,
}

/// One row of the classification table.
#[derive(Debug, Clone, Copy)]
pub struct ClassificationRule {
    pub label: RiskLabel,
    pub matches: fn(&FlagSet) -> bool,
}

/// Evaluated top to bottom; the first matching row wins. The last row always matches.
pub const CLASSIFICATION_RULES: [ClassificationRule; 4] = [
    ClassificationRule {
        label: RiskLabel::CombinedRisk,
        matches: |f: &FlagSet| f.high_asymmetry && f.high_load,
    },
    ClassificationRule {
        label: RiskLabel::HighAsymmetry,
        matches: |f: &FlagSet| f.high_asymmetry,
    },
    ClassificationRule {
        label: RiskLabel::HighLoad,
        matches: |f: &FlagSet| f.high_load,
    },
    ClassificationRule {
        label: RiskLabel::LowRisk,
        matches: |_: &FlagSet| true,
    },
];

pub fn classify(flags: &FlagSet) -> RiskLabel {
    CLASSIFICATION_RULES
        .iter()
        .find(|rule| (rule.matches)(flags))
        .map_or(RiskLabel::LowRisk, |rule| rule.label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_covers_every_combination() {
        let cases = [
            (false, false, RiskLabel::LowRisk),
            (true, false, RiskLabel::HighAsymmetry),
            (false, true, RiskLabel::HighLoad),
            (true, true, RiskLabel::CombinedRisk),
        ];
        for (high_asymmetry, high_load, expected) in cases {
            let flags = FlagSet {
                high_asymmetry,
                high_load,
            };
            assert_eq!(classify(&flags), expected);
        }
    }

    #[test]
    fn combined_rule_precedes_single_flag_rules() {
        let first_match = CLASSIFICATION_RULES
            .iter()
            .position(|rule| {
                (rule.matches)(&FlagSet {
                    high_asymmetry: true,
                    high_load: true,
                })
            })
            .unwrap();
        assert_eq!(CLASSIFICATION_RULES[first_match].label, RiskLabel::CombinedRisk);
        assert_eq!(CLASSIFICATION_RULES.last().map(|r| r.label), Some(RiskLabel::LowRisk));
    }
}
