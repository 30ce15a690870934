//! Fuzzy subsystem lookup for continuation
//!
//! Revised equipment lists rarely spell a subsystem exactly the way the
//! saved structure does. Resolution tries, in order: the raw name, its
//! formatted form and a handful of normalized variants, then substring
//! containment in either direction.

use regex::Regex;
use std::sync::LazyLock;

use crate::engine::subsystem::format_subsystem;
use crate::entities::WbsCode;

static SUB_STATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)sub[\s-]+station").expect("substation pattern is valid")
});

static ZONE_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\+?z0*(\d+)").expect("zone label pattern is valid"));

/// Candidates shorter than this never match by containment
const MIN_CONTAINMENT_LEN: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct SubsystemMatcher {
    /// Lowercased key and subsystem code, registration order
    entries: Vec<(String, WbsCode)>,
}

impl SubsystemMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subsystem under its formatted name, with and without a
    /// leading `+`
    pub fn register(&mut self, name: &str, code: &WbsCode) {
        let key = name.trim().to_lowercase();
        if key.is_empty() {
            return;
        }
        let alternate = match key.strip_prefix('+') {
            Some(rest) => rest.to_string(),
            None => format!("+{}", key),
        };
        self.push(key, code);
        self.push(alternate, code);
    }

    fn push(&mut self, key: String, code: &WbsCode) {
        if !self.entries.iter().any(|(k, _)| *k == key) {
            self.entries.push((key, code.clone()));
        }
    }

    fn lookup(&self, key: &str) -> Option<&WbsCode> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, code)| code)
    }

    /// Find the subsystem code for a raw subsystem name
    pub fn resolve(&self, raw: &str) -> Option<&WbsCode> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        if let Some(code) = self.lookup(&raw.to_lowercase()) {
            return Some(code);
        }

        for candidate in variants(raw) {
            if let Some(code) = self.lookup(&candidate) {
                tracing::debug!(raw, matched = %candidate, "subsystem resolved by variant");
                return Some(code);
            }
        }

        let needle = format_subsystem(raw).formatted.to_lowercase();
        let needle = needle.trim_start_matches('+');
        if needle.len() < MIN_CONTAINMENT_LEN {
            return None;
        }
        self.entries
            .iter()
            .filter(|(key, _)| key.len() >= MIN_CONTAINMENT_LEN)
            .find(|(key, _)| key.contains(needle) || needle.contains(key.as_str()))
            .map(|(key, code)| {
                tracing::debug!(raw, matched = %key, "subsystem resolved by containment");
                code
            })
    }
}

/// Lowercased normalized spellings of a raw subsystem name
fn variants(raw: &str) -> Vec<String> {
    let mut bases = vec![raw.to_string()];
    let normalized = SUB_STATION_RE.replace_all(raw, "Substation").into_owned();
    if normalized != raw {
        bases.push(normalized);
    }

    let mut out: Vec<String> = Vec::new();
    let mut add = |s: String| {
        let s = s.trim().to_lowercase();
        if !s.is_empty() && !out.contains(&s) {
            out.push(s);
        }
    };

    for base in bases {
        let formatted = format_subsystem(&base).formatted;
        for form in [base.clone(), formatted] {
            add(form.clone());
            if let Some(rest) = form.strip_prefix('+') {
                add(rest.to_string());
                add(format!("-{}", rest));
            } else if let Some(rest) = form.strip_prefix('-') {
                add(format!("+{}", rest));
                add(rest.to_string());
            } else {
                add(format!("+{}", form));
            }
            for padded in zone_padding_variants(&form) {
                add(padded);
            }
        }
    }
    out
}

/// `+Z1 - X` and `+Z01 - X` forms of a zone-labelled name
fn zone_padding_variants(form: &str) -> Vec<String> {
    let Some(caps) = ZONE_LABEL_RE.captures(form) else {
        return Vec::new();
    };
    let (Some(whole), Some(digits)) = (caps.get(0), caps.get(1)) else {
        return Vec::new();
    };
    let rest = &form[whole.end()..];
    let digits = digits.as_str();
    vec![
        format!("+Z{}{}", digits, rest),
        format!("+Z{:0>2}{}", digits, rest),
        format!("Z{}{}", digits, rest),
        format!("Z{:0>2}{}", digits, rest),
    ]
}
