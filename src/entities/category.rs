//! Equipment categories - the fixed 11-slot grouping under every subsystem

use serde::{Deserialize, Serialize};

/// Equipment category
///
/// The declaration order is the positional order used for WBS codes:
/// category `01` is always child 1 of a subsystem, `99` is always child 11.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Category {
    #[serde(rename = "01")]
    Preparations,
    #[serde(rename = "02")]
    ProtectionPanels,
    #[serde(rename = "03")]
    HvSwitchboards,
    #[serde(rename = "04")]
    LvSwitchboards,
    #[serde(rename = "05")]
    Transformers,
    #[serde(rename = "06")]
    BatterySystems,
    #[serde(rename = "07")]
    Earthing,
    #[serde(rename = "08")]
    BuildingServices,
    #[serde(rename = "09")]
    InterfaceTesting,
    #[serde(rename = "10")]
    AncillarySystems,
    #[serde(rename = "99")]
    Unrecognised,
}

impl Category {
    /// Every category in positional order
    pub const ALL: [Category; 11] = [
        Category::Preparations,
        Category::ProtectionPanels,
        Category::HvSwitchboards,
        Category::LvSwitchboards,
        Category::Transformers,
        Category::BatterySystems,
        Category::Earthing,
        Category::BuildingServices,
        Category::InterfaceTesting,
        Category::AncillarySystems,
        Category::Unrecognised,
    ];

    /// Two-digit category code
    pub fn code(&self) -> &'static str {
        match self {
            Category::Preparations => "01",
            Category::ProtectionPanels => "02",
            Category::HvSwitchboards => "03",
            Category::LvSwitchboards => "04",
            Category::Transformers => "05",
            Category::BatterySystems => "06",
            Category::Earthing => "07",
            Category::BuildingServices => "08",
            Category::InterfaceTesting => "09",
            Category::AncillarySystems => "10",
            Category::Unrecognised => "99",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Category::Preparations => "Preparations and set-up",
            Category::ProtectionPanels => "Protection Panels",
            Category::HvSwitchboards => "HV Switchboards",
            Category::LvSwitchboards => "LV Switchboards",
            Category::Transformers => "Transformers",
            Category::BatterySystems => "Battery Systems",
            Category::Earthing => "Earthing",
            Category::BuildingServices => "Building Services",
            Category::InterfaceTesting => "Interface Testing",
            Category::AncillarySystems => "Ancillary Systems",
            Category::Unrecognised => "Unrecognised Equipment",
        }
    }

    /// 1-based position among a subsystem's category children
    pub fn position(&self) -> u32 {
        match self {
            Category::Preparations => 1,
            Category::ProtectionPanels => 2,
            Category::HvSwitchboards => 3,
            Category::LvSwitchboards => 4,
            Category::Transformers => 5,
            Category::BatterySystems => 6,
            Category::Earthing => 7,
            Category::BuildingServices => 8,
            Category::InterfaceTesting => 9,
            Category::AncillarySystems => 10,
            Category::Unrecognised => 11,
        }
    }

    /// Node name, e.g. `02 | Protection Panels`
    pub fn label(&self) -> String {
        format!("{} | {}", self.code(), self.name())
    }

    /// Children every subsystem receives under this category, equipment or not
    pub fn fixed_children(&self) -> &'static [&'static str] {
        match self {
            Category::Preparations => &["Test bay", "Panel Shop", "Pad"],
            Category::InterfaceTesting => &["Phase 1", "Phase 2"],
            _ => &[],
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.code() == code)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s.trim())
            .ok_or_else(|| format!("Unknown category code: {}. Use 01-10 or 99", s))
    }
}

/// Every fixed literal child name across all categories
pub fn fixed_child_names() -> impl Iterator<Item = &'static str> {
    Category::ALL
        .iter()
        .flat_map(|c| c.fixed_children().iter().copied())
}
