//! Category rule table
//!
//! Pure data: an ordered list of categories `01`-`10`, each with an ordered
//! list of matchers. The first category with a matching pattern wins; an
//! item that matches nothing falls back to `99`.

use crate::entities::Category;

/// Tokens that are always matched by containment, whatever their length
pub const RESERVED_TOKENS: [&str; 2] = ["Fire", "ESS"];

/// Patterns up to this length are matched as a prefix
const SHORT_PATTERN_LEN: usize = 3;

/// One predicate over an equipment number (and its PLU)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    /// Generic pattern, evaluated in one of three shapes (see [`Matcher::matches`])
    Pattern(&'static str),
    /// Prefix immediately followed by an ASCII digit (`E1`, `EB2`, `EEP3`)
    DigitAfter(&'static str),
    /// Plain prefix match
    Prefix(&'static str),
}

impl Matcher {
    /// Evaluate the matcher
    ///
    /// Generic patterns take one of three shapes:
    /// - `+`-prefixed: the equipment number starts with the pattern
    /// - short (three characters or fewer, reserved tokens excluded): the
    ///   number starts with the pattern and does not start with `+`
    /// - otherwise: the number or the PLU contains the pattern
    pub fn matches(&self, equipment_number: &str, plu: Option<&str>) -> bool {
        match *self {
            Matcher::Pattern(pattern) => {
                if pattern.starts_with('+') {
                    equipment_number.starts_with(pattern)
                } else if pattern.len() <= SHORT_PATTERN_LEN && !RESERVED_TOKENS.contains(&pattern)
                {
                    equipment_number.starts_with(pattern) && !equipment_number.starts_with('+')
                } else {
                    equipment_number.contains(pattern)
                        || plu.is_some_and(|p| p.contains(pattern))
                }
            }
            Matcher::DigitAfter(prefix) => equipment_number
                .strip_prefix(prefix)
                .and_then(|rest| rest.chars().next())
                .is_some_and(|c| c.is_ascii_digit()),
            Matcher::Prefix(prefix) => equipment_number.starts_with(prefix),
        }
    }
}

/// Matchers for one category
#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    pub category: Category,
    pub matchers: &'static [Matcher],
}

impl CategoryRule {
    pub fn matches(&self, equipment_number: &str, plu: Option<&str>) -> bool {
        self.matchers
            .iter()
            .any(|m| m.matches(equipment_number, plu))
    }
}

use Matcher::{DigitAfter, Pattern, Prefix};

/// Ordered rule table for categories `01`-`10`
pub const CATEGORY_RULES: [CategoryRule; 10] = [
    CategoryRule {
        category: Category::Preparations,
        matchers: &[],
    },
    CategoryRule {
        category: Category::ProtectionPanels,
        matchers: &[Pattern("+UH"), Pattern("UH"), Pattern("PROT"), Pattern("REL")],
    },
    CategoryRule {
        category: Category::HvSwitchboards,
        matchers: &[
            Pattern("+WA"),
            Pattern("+WB"),
            Pattern("HVS"),
            Pattern("RMU"),
            Pattern("Switchgear"),
        ],
    },
    CategoryRule {
        category: Category::LvSwitchboards,
        matchers: &[
            Pattern("+WC"),
            Pattern("+WD"),
            Pattern("LVS"),
            Pattern("MSB"),
            Pattern("DB"),
        ],
    },
    CategoryRule {
        category: Category::Transformers,
        matchers: &[
            Pattern("+T"),
            Pattern("TX"),
            Pattern("NER"),
            Pattern("NET"),
            Pattern("Transformer"),
        ],
    },
    CategoryRule {
        category: Category::BatterySystems,
        matchers: &[
            Pattern("+GB"),
            Pattern("BAT"),
            Pattern("BCR"),
            Pattern("UPS"),
            Pattern("Charger"),
        ],
    },
    CategoryRule {
        category: Category::Earthing,
        matchers: &[
            DigitAfter("E"),
            DigitAfter("EB"),
            DigitAfter("EEP"),
            Prefix("MEB"),
        ],
    },
    CategoryRule {
        category: Category::BuildingServices,
        matchers: &[
            Pattern("+HN"),
            Pattern("LTG"),
            Pattern("GPO"),
            Pattern("HVAC"),
            Pattern("Fire"),
            Pattern("ESS"),
            Pattern("FIP"),
        ],
    },
    CategoryRule {
        category: Category::InterfaceTesting,
        matchers: &[],
    },
    CategoryRule {
        category: Category::AncillarySystems,
        matchers: &[
            Pattern("+CA"),
            Pattern("+KA"),
            Pattern("PSU"),
            Pattern("RTU"),
            Pattern("SCADA"),
            Pattern("CCTV"),
        ],
    },
];

/// First category whose rules match, in table order
pub fn match_category(equipment_number: &str, plu: Option<&str>) -> Option<Category> {
    CATEGORY_RULES
        .iter()
        .find(|rule| rule.matches(equipment_number, plu))
        .map(|rule| rule.category)
}

/// Whether any rule of categories `02`-`10` matches
///
/// An item for which this is false belongs to `99`.
pub fn matches_any_rule(equipment_number: &str, plu: Option<&str>) -> bool {
    CATEGORY_RULES
        .iter()
        .filter(|rule| rule.category != Category::Preparations)
        .any(|rule| rule.matches(equipment_number, plu))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_in_positional_order() {
        for (i, rule) in CATEGORY_RULES.iter().enumerate() {
            assert_eq!(rule.category.position() as usize, i + 1);
        }
    }

    #[test]
    fn test_patternless_categories() {
        assert!(CATEGORY_RULES[0].matchers.is_empty());
        assert!(CATEGORY_RULES[8].matchers.is_empty());
    }

    #[test]
    fn test_plus_prefixed_pattern() {
        let m = Matcher::Pattern("+UH");
        assert!(m.matches("+UH101", None));
        assert!(!m.matches("UH101", None));
        assert!(!m.matches("X+UH101", None));
    }

    #[test]
    fn test_short_pattern_requires_prefix_without_plus() {
        let m = Matcher::Pattern("TX");
        assert!(m.matches("TX1", None));
        assert!(!m.matches("+TX1", None));
        assert!(!m.matches("ATX1", None));
        assert!(!m.matches("A1", Some("TX")));
    }

    #[test]
    fn test_long_pattern_uses_containment_and_plu() {
        let m = Matcher::Pattern("SCADA");
        assert!(m.matches("NODE-SCADA-1", None));
        assert!(m.matches("N1", Some("PLU SCADA RACK")));
        assert!(!m.matches("N1", None));
    }

    #[test]
    fn test_reserved_tokens_use_containment() {
        let ess = Matcher::Pattern("ESS");
        assert!(ess.matches("+ESS1", None));
        assert!(ess.matches("X-ESS", None));

        let fire = Matcher::Pattern("Fire");
        assert!(fire.matches("Fire-Panel", None));
        assert!(fire.matches("FP1", Some("Fire indicator")));
    }

    #[test]
    fn test_earthing_positional_rules() {
        let earthing = &CATEGORY_RULES[6];
        assert!(earthing.matches("E101", None));
        assert!(earthing.matches("EB2", None));
        assert!(earthing.matches("EEP3", None));
        assert!(earthing.matches("MEB", None));
        assert!(earthing.matches("MEB-01", None));

        assert!(!earthing.matches("+E101", None));
        assert!(!earthing.matches("EB", None));
        assert!(!earthing.matches("EBX1", None));
        assert!(!earthing.matches("EEPA", None));
        assert!(!earthing.matches("ESS1", None));
        assert!(!earthing.matches("E", None));
    }

    #[test]
    fn test_match_category_first_wins() {
        assert_eq!(match_category("+UH101", None), Some(Category::ProtectionPanels));
        assert_eq!(match_category("E101", None), Some(Category::Earthing));
        assert_eq!(match_category("ESS-01", None), Some(Category::BuildingServices));
        assert_eq!(match_category("TX1", None), Some(Category::Transformers));
        assert_eq!(match_category("DB-1", None), Some(Category::LvSwitchboards));
        assert_eq!(match_category("UPS1", None), Some(Category::BatterySystems));
        assert_eq!(match_category("+CA01", None), Some(Category::AncillarySystems));
        // Contains "UPS" but a protection prefix comes first in table order
        assert_eq!(match_category("+UH-UPS", None), Some(Category::ProtectionPanels));
        assert_eq!(match_category("ZZZ", None), None);
    }

    #[test]
    fn test_matches_any_rule() {
        assert!(matches_any_rule("E5", None));
        assert!(matches_any_rule("Q1", Some("Switchgear")));
        assert!(!matches_any_rule("Q1", None));
    }
}
