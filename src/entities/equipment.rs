//! Equipment record - one row of a commissioning equipment list

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Commissioning flag controlling where (and whether) an item lands in the WBS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Commissioning {
    /// Included in the main subsystem structure
    #[serde(rename = "Y")]
    Yes,
    /// Excluded from the structure entirely
    #[serde(rename = "N")]
    No,
    /// Isolated under the "To Be Confirmed" branch
    #[serde(rename = "TBC")]
    Tbc,
}

impl Commissioning {
    pub fn as_str(&self) -> &'static str {
        match self {
            Commissioning::Yes => "Y",
            Commissioning::No => "N",
            Commissioning::Tbc => "TBC",
        }
    }

    /// Whether the item takes part in generation at all (Y or TBC)
    pub fn is_relevant(&self) -> bool {
        !matches!(self, Commissioning::No)
    }
}

impl std::fmt::Display for Commissioning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Commissioning {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "Y" | "YES" => Ok(Commissioning::Yes),
            "N" | "NO" => Ok(Commissioning::No),
            "TBC" => Ok(Commissioning::Tbc),
            _ => Err(format!(
                "Invalid commissioning value: '{}'. Use Y, N or TBC",
                s
            )),
        }
    }
}

/// A normalized equipment record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentRecord {
    /// Equipment tag, the natural key within a project
    pub equipment_number: String,

    /// Tag of the equipment this item is nested under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_equipment_number: Option<String>,

    /// Raw subsystem label, may embed a zone code such as `Z02`
    pub subsystem: String,

    pub description: String,

    pub commissioning: Commissioning,

    /// PLU reference, consulted by "contains" classification patterns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plu: Option<String>,

    /// Supplier, model and any other columns, carried through untouched
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl EquipmentRecord {
    /// Create a record with no parent, PLU or metadata
    pub fn new(
        equipment_number: impl Into<String>,
        subsystem: impl Into<String>,
        description: impl Into<String>,
        commissioning: Commissioning,
    ) -> Self {
        Self {
            equipment_number: equipment_number.into(),
            parent_equipment_number: None,
            subsystem: subsystem.into(),
            description: description.into(),
            commissioning,
            plu: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Builder-style setter for the parent tag; blank values mean "no parent"
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        let parent = parent.into();
        self.parent_equipment_number = if parent.trim().is_empty() {
            None
        } else {
            Some(parent.trim().to_string())
        };
        self
    }

    pub fn with_plu(mut self, plu: impl Into<String>) -> Self {
        self.plu = Some(plu.into());
        self
    }

    /// Parent tag, if one is set and is not a placeholder like `-`
    pub fn parent(&self) -> Option<&str> {
        self.parent_equipment_number
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty() && *p != "-")
    }

    /// WBS node name for this item: `<equipmentNumber> | <description>`
    pub fn wbs_name(&self) -> String {
        format!("{} | {}", self.equipment_number, self.description)
    }
}
