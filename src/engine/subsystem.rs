//! Subsystem resolver
//!
//! Turns raw subsystem names into canonical labels, extracts zone codes and
//! fixes the order in which subsystems are numbered.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Zone code such as `Z02`, optionally preceded by `+`
static ZONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\+?z(\d+)").expect("zone pattern is valid"));

/// A raw subsystem name after formatting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedSubsystem {
    /// Canonical label, `+Z<NN> - <name>` when a zone code is present
    pub formatted: String,
    /// Zone number, if the raw name carried one
    pub zone: Option<u32>,
}

/// A subsystem ready to be numbered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSubsystem {
    /// Raw names folded into this subsystem, first-appearance order
    pub raw_names: Vec<String>,
    pub formatted: String,
    pub zone: Option<u32>,
    pub is_substation: bool,
    /// `n` of the `S<n>` label
    pub ordinal: usize,
}

impl ResolvedSubsystem {
    /// Short label, e.g. `S4`
    pub fn label(&self) -> String {
        format!("S{}", self.ordinal)
    }

    /// Node name, e.g. `S4 | +Z02 - Battery Room`
    pub fn node_name(&self) -> String {
        format!("S{} | {}", self.ordinal, self.formatted)
    }
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, '-' | '_' | '+' | ',' | '(' | ')' | '[' | ']' | '/' | '|' | ':')
}

/// Format a raw subsystem name
///
/// `Switchroom +Z01` becomes `+Z01 - Switchroom`; names without a zone code
/// are only trimmed.
pub fn format_subsystem(raw: &str) -> FormattedSubsystem {
    let Some(caps) = ZONE_RE.captures(raw) else {
        return FormattedSubsystem {
            formatted: raw.trim().to_string(),
            zone: None,
        };
    };

    let (Some(whole), Some(digits)) = (caps.get(0), caps.get(1)) else {
        return FormattedSubsystem {
            formatted: raw.trim().to_string(),
            zone: None,
        };
    };

    let before = raw[..whole.start()].trim_end_matches(is_separator);
    let after = raw[whole.end()..].trim_start_matches(is_separator);
    let clean = match (before.is_empty(), after.is_empty()) {
        (false, false) => format!("{} {}", before.trim_start(), after.trim_end()),
        (false, true) => before.trim_start().to_string(),
        (true, false) => after.trim_end().to_string(),
        (true, true) => String::new(),
    };

    let zone_label = format!("+Z{:0>2}", digits.as_str());
    let formatted = if clean.is_empty() {
        zone_label
    } else {
        format!("{} - {}", zone_label, clean)
    };

    FormattedSubsystem {
        formatted,
        zone: digits.as_str().parse().ok(),
    }
}

/// Zone number embedded in a name, if any
pub fn zone_number(raw: &str) -> Option<u32> {
    ZONE_RE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

pub fn is_substation(raw: &str) -> bool {
    raw.to_lowercase().contains("substation")
}

/// Sort position of a subsystem; derive order is the numbering order
///
/// Zone-less names compare lexically by label. Zoned labels all start
/// `+Z<digit>`, so keying them under `+Z0` places them where a lexical
/// comparison would while keeping zone numbers numeric among themselves.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum OrderKey {
    Ranked {
        prefix: String,
        zone: Option<u32>,
        label: String,
    },
    Substation,
}

const ZONED_PREFIX: &str = "+Z0";

fn order_key(subsystem: &ResolvedSubsystem) -> OrderKey {
    if subsystem.is_substation {
        return OrderKey::Substation;
    }
    match subsystem.zone {
        Some(zone) => OrderKey::Ranked {
            prefix: ZONED_PREFIX.to_string(),
            zone: Some(zone),
            label: subsystem.formatted.clone(),
        },
        None => OrderKey::Ranked {
            prefix: subsystem.formatted.clone(),
            zone: None,
            label: String::new(),
        },
    }
}

/// Resolve and order subsystem names
///
/// Raw names that format to the same label (ignoring case) are folded
/// together. Substations go last in input order. Zoned subsystems are
/// ordered by zone number; anything compared with a zone-less subsystem
/// is ordered by label. Labels continue after
/// `existing_count` subsystems already allocated.
pub fn resolve<'a, I>(raw_names: I, existing_count: usize) -> Vec<ResolvedSubsystem>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut subsystems: Vec<ResolvedSubsystem> = Vec::new();

    for raw in raw_names {
        let raw = raw.trim();
        let formatted = format_subsystem(raw);
        match subsystems
            .iter_mut()
            .find(|s| s.formatted.eq_ignore_ascii_case(&formatted.formatted))
        {
            Some(existing) => {
                if !existing.raw_names.iter().any(|r| r == raw) {
                    existing.raw_names.push(raw.to_string());
                }
                existing.is_substation |= is_substation(raw);
            }
            None => subsystems.push(ResolvedSubsystem {
                raw_names: vec![raw.to_string()],
                formatted: formatted.formatted,
                zone: formatted.zone,
                is_substation: is_substation(raw),
                ordinal: 0,
            }),
        }
    }

    subsystems.sort_by_key(order_key);

    for (k, subsystem) in subsystems.iter_mut().enumerate() {
        subsystem.ordinal = existing_count + k + 1;
    }

    tracing::debug!(count = subsystems.len(), existing_count, "resolved subsystems");
    subsystems
}
