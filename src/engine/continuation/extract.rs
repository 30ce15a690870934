//! Equipment extraction from an existing node set

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::entities::category::fixed_child_names;
use crate::entities::node::names;
use crate::entities::{WbsCode, WbsNode};

/// Names the generator itself produces: categories, Milestones,
/// Prerequisites, subsystems and the TBC branch
static STRUCTURAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{2} \| |[MP] \| |S\d+ \| |TBC - )").expect("structural pattern is valid")
});

/// `<number> | <description>`, split at the first ` | `; the number may
/// contain spaces
static EQUIPMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\s+\|\s*(.*)$").expect("equipment pattern is valid"));

/// Older `<token> - <description>` form, only used when there is no `|`
static DASHED_EQUIPMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S+)\s+-\s*(.*)$").expect("dashed pattern is valid"));

/// `S<n> | <name>`
static SUBSYSTEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^S(\d+) \| (.+)$").expect("subsystem pattern is valid"));

/// An equipment node found in an existing structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedEquipment {
    pub equipment_number: String,
    pub code: WbsCode,
}

/// A subsystem node (`S<n> | <name>` directly under the root)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedSubsystem {
    pub ordinal: u32,
    pub name: String,
    pub code: WbsCode,
}

impl ExtractedSubsystem {
    pub fn label(&self) -> String {
        format!("S{} | {}", self.ordinal, self.name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Equipment nodes in node order
    pub equipment: Vec<ExtractedEquipment>,
    pub subsystems: Vec<ExtractedSubsystem>,
    /// Code of the TBC branch, if present
    pub tbc: Option<WbsCode>,
    by_number: HashMap<String, WbsCode>,
}

impl Extraction {
    /// Code of the first node carrying this equipment number
    pub fn code_of(&self, equipment_number: &str) -> Option<&WbsCode> {
        self.by_number.get(equipment_number)
    }

    pub fn contains(&self, equipment_number: &str) -> bool {
        self.by_number.contains_key(equipment_number)
    }

    /// Whether a code lies inside the TBC branch
    pub fn in_tbc_branch(&self, code: &WbsCode) -> bool {
        self.tbc
            .as_ref()
            .is_some_and(|tbc| code == tbc || code.is_descendant_of(tbc))
    }
}

pub fn is_structural_name(name: &str) -> bool {
    STRUCTURAL_RE.is_match(name) || fixed_child_names().any(|fixed| fixed == name)
}

/// Split an equipment node name into number and description
pub fn parse_equipment_name(name: &str) -> Option<(String, String)> {
    let name = name.trim();
    let caps = EQUIPMENT_RE
        .captures(name)
        .or_else(|| DASHED_EQUIPMENT_RE.captures(name))?;
    let number = caps.get(1)?.as_str().trim().to_string();
    let description = caps.get(2).map_or("", |m| m.as_str()).trim().to_string();
    Some((number, description))
}

/// Collect equipment, subsystems and the TBC branch from a node set
pub fn extract(nodes: &[WbsNode]) -> Extraction {
    let root = WbsCode::root();
    let mut extraction = Extraction::default();

    for node in nodes {
        if node.is_root() {
            continue;
        }
        let under_root = node.parent_wbs_code.as_ref() == Some(&root);

        if is_structural_name(&node.wbs_name) {
            if under_root {
                if node.wbs_name == names::TBC {
                    extraction.tbc.get_or_insert_with(|| node.wbs_code.clone());
                } else if let Some(caps) = SUBSYSTEM_RE.captures(&node.wbs_name) {
                    if let (Some(n), Some(name)) = (caps.get(1), caps.get(2)) {
                        extraction.subsystems.push(ExtractedSubsystem {
                            ordinal: n.as_str().parse().unwrap_or(0),
                            name: name.as_str().to_string(),
                            code: node.wbs_code.clone(),
                        });
                    }
                }
            }
            continue;
        }

        let Some((number, _)) = parse_equipment_name(&node.wbs_name) else {
            tracing::debug!(code = %node.wbs_code, name = %node.wbs_name, "skipping unparseable node");
            continue;
        };
        extraction
            .by_number
            .entry(number.clone())
            .or_insert_with(|| node.wbs_code.clone());
        extraction.equipment.push(ExtractedEquipment {
            equipment_number: number,
            code: node.wbs_code.clone(),
        });
    }

    tracing::debug!(
        equipment = extraction.equipment.len(),
        subsystems = extraction.subsystems.len(),
        "extracted existing structure"
    );
    extraction
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(code: &str, name: &str) -> WbsNode {
        WbsNode::new(WbsCode::parse(code).unwrap(), name)
    }

    #[test]
    fn test_structural_names() {
        assert!(is_structural_name("02 | Protection Panels"));
        assert!(is_structural_name("M | Milestones"));
        assert!(is_structural_name("P | Pre-requisites"));
        assert!(is_structural_name("S12 | +Z01 - Switchroom"));
        assert!(is_structural_name("TBC - Equipment To Be Confirmed"));
        assert!(is_structural_name("Panel Shop"));
        assert!(is_structural_name("Phase 2"));
        assert!(!is_structural_name("+UH101 | Panel A"));
        assert!(!is_structural_name("E101 - Earth rod"));
    }

    #[test]
    fn test_parse_equipment_name() {
        assert_eq!(
            parse_equipment_name("+UH101 | Panel A"),
            Some(("+UH101".to_string(), "Panel A".to_string()))
        );
        assert_eq!(
            parse_equipment_name("E101 - Earth rod"),
            Some(("E101".to_string(), "Earth rod".to_string()))
        );
        assert_eq!(
            parse_equipment_name("X1 |"),
            Some(("X1".to_string(), String::new()))
        );
        assert_eq!(
            parse_equipment_name("MCC 01 | Motor control centre"),
            Some(("MCC 01".to_string(), "Motor control centre".to_string()))
        );
        assert_eq!(
            parse_equipment_name("+UH101-F1 | Relay - spare"),
            Some(("+UH101-F1".to_string(), "Relay - spare".to_string()))
        );
        assert_eq!(parse_equipment_name("Lonely"), None);
    }

    #[test]
    fn test_extract() {
        let nodes = vec![
            node("1", "Demo"),
            node("1.1", "M | Milestones"),
            node("1.2", "P | Pre-requisites"),
            node("1.2.1", "S1 | +Z01 - Switchroom"),
            node("1.3", "S1 | +Z01 - Switchroom"),
            node("1.3.1", "01 | Preparations and set-up"),
            node("1.3.1.1", "Test bay"),
            node("1.3.2", "02 | Protection Panels"),
            node("1.3.2.1", "+UH101 | Panel A"),
            node("1.3.2.1.1", "+UH101-F1 | Relay"),
            node("1.4", "TBC - Equipment To Be Confirmed"),
            node("1.4.1", "X9 | Spare"),
        ];
        let extraction = extract(&nodes);

        let numbers: Vec<&str> = extraction
            .equipment
            .iter()
            .map(|e| e.equipment_number.as_str())
            .collect();
        assert_eq!(numbers, vec!["+UH101", "+UH101-F1", "X9"]);
        assert_eq!(
            extraction.code_of("+UH101-F1").map(|c| c.to_string()),
            Some("1.3.2.1.1".to_string())
        );

        assert_eq!(extraction.subsystems.len(), 1);
        assert_eq!(extraction.subsystems[0].name, "+Z01 - Switchroom");
        assert_eq!(extraction.subsystems[0].code.to_string(), "1.3");
        assert_eq!(extraction.subsystems[0].label(), "S1 | +Z01 - Switchroom");

        assert_eq!(extraction.tbc.as_ref().map(|c| c.to_string()), Some("1.4".to_string()));
        assert!(extraction.in_tbc_branch(&WbsCode::parse("1.4.1").unwrap()));
        assert!(!extraction.in_tbc_branch(&WbsCode::parse("1.3.2.1").unwrap()));
    }
}
