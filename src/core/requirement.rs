//! External dependency declarations.
//!
//! A [`Requirement`] names a package and a version selector written in the
//! range syntax package recipes use: `>=0`, `>=1.2 <2`, `~1.3`, `^2.0`,
//! `1.2.3` (exact), `*`, alternatives separated by `||`, and optionally
//! wrapped in brackets (`[>=0]`). Clauses separated by spaces must all hold.
//!
//! This crate only declares requirements. Picking a version that satisfies
//! them is the host resolver's job; [`VersionSelector::matches`] is exposed so
//! a host-supplied resolution can be checked against the declaration.

use std::fmt;
use std::str::FromStr;

use semver::{Comparator, Op, Prerelease, Version, VersionReq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Error for a requirement that cannot be declared.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RequirementError {
    #[error("dependency name must not be empty")]
    EmptyName,

    #[error("invalid version selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },
}

/// A version range over published versions of a dependency.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionSelector {
    /// Selector as written, without surrounding brackets
    raw: String,
    /// Disjunction of semver requirements
    alternatives: Vec<VersionReq>,
    /// Whether pre-release versions are candidates
    include_prerelease: bool,
}

impl VersionSelector {
    /// Selector accepting every published version.
    pub fn any() -> Self {
        let at_least_zero = Comparator {
            op: Op::GreaterEq,
            major: 0,
            minor: None,
            patch: None,
            pre: Prerelease::EMPTY,
        };
        VersionSelector {
            raw: ">=0".to_string(),
            alternatives: vec![VersionReq {
                comparators: vec![at_least_zero],
            }],
            include_prerelease: false,
        }
    }

    /// Parse a selector.
    pub fn parse(input: &str) -> Result<Self, RequirementError> {
        let invalid = |reason: String| RequirementError::InvalidSelector {
            selector: input.to_string(),
            reason,
        };

        let trimmed = input.trim();
        let inner = match trimmed.strip_prefix('[') {
            Some(rest) => rest
                .strip_suffix(']')
                .ok_or_else(|| invalid("unbalanced brackets".to_string()))?,
            None => trimmed,
        }
        .trim();

        if inner.is_empty() {
            return Err(invalid("selector is empty".to_string()));
        }

        // Options follow the range after a comma: `>=1.0, include_prerelease`
        let mut parts = inner.split(',');
        let range = parts.next().unwrap_or_default().trim();
        let mut include_prerelease = false;
        for option in parts {
            match option.trim() {
                "include_prerelease" => include_prerelease = true,
                "" => {}
                other => return Err(invalid(format!("unknown option `{}`", other))),
            }
        }

        let mut alternatives = Vec::new();
        for alternative in range.split("||") {
            alternatives.push(translate_clauses(alternative).map_err(invalid)?);
        }

        Ok(VersionSelector {
            raw: inner.to_string(),
            alternatives,
            include_prerelease,
        })
    }

    /// The selector as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether `version` is in the selected range.
    pub fn matches(&self, version: &Version) -> bool {
        let candidate = if self.include_prerelease && !version.pre.is_empty() {
            Version::new(version.major, version.minor, version.patch)
        } else {
            version.clone()
        };
        self.alternatives.iter().any(|req| req.matches(&candidate))
    }

    /// Like [`matches`](Self::matches) but accepts partial versions (`1.2`).
    pub fn matches_str(&self, version: &str) -> bool {
        parse_version_flexible(version).is_some_and(|v| self.matches(&v))
    }
}

impl FromStr for VersionSelector {
    type Err = RequirementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VersionSelector::parse(s)
    }
}

impl fmt::Display for VersionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for VersionSelector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for VersionSelector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        VersionSelector::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Turn space separated range clauses into one semver requirement.
fn translate_clauses(range: &str) -> Result<VersionReq, String> {
    let mut comparators: Vec<String> = Vec::new();
    let mut pending_op: Option<&str> = None;

    for token in range.split_whitespace() {
        if token == "*" {
            continue;
        }
        if is_operator(token) {
            // `>= 1.2` written with a space
            pending_op = Some(token);
            continue;
        }

        let clause = match pending_op.take() {
            Some(op) => format!("{}{}", op, token),
            None if token.starts_with(|c: char| c.is_ascii_digit()) => format!("={}", token),
            None => token.to_string(),
        };
        comparators.push(clause);
    }

    if let Some(op) = pending_op {
        return Err(format!("operator `{}` has no version", op));
    }

    if comparators.is_empty() {
        return Ok(VersionReq::STAR);
    }

    VersionReq::parse(&comparators.join(", ")).map_err(|e| e.to_string())
}

fn is_operator(token: &str) -> bool {
    matches!(token, ">" | ">=" | "<" | "<=" | "=" | "~" | "^")
}

/// Parse a version, padding missing minor/patch components with zero.
pub fn parse_version_flexible(version_str: &str) -> Option<Version> {
    let trimmed = version_str.trim();
    if let Ok(v) = Version::parse(trimmed) {
        return Some(v);
    }

    let clean = trimmed
        .split(|c: char| !c.is_ascii_digit() && c != '.')
        .next()
        .unwrap_or(trimmed);

    let mut parts = clean.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0);
    let patch = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0);

    Some(Version::new(major, minor, patch))
}

/// A single external dependency declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Requirement {
    name: String,
    selector: VersionSelector,
}

impl Requirement {
    /// Declare a dependency on `name` within `selector`.
    pub fn new(name: impl Into<String>, selector: VersionSelector) -> Result<Self, RequirementError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RequirementError::EmptyName);
        }
        Ok(Requirement { name, selector })
    }

    /// Parse a reference like `name/[>=0]`.
    pub fn parse_reference(reference: &str) -> Result<Self, RequirementError> {
        let (name, selector) = reference
            .split_once('/')
            .ok_or(RequirementError::InvalidSelector {
                selector: reference.to_string(),
                reason: "expected `name/[range]`".to_string(),
            })?;
        Requirement::new(name, VersionSelector::parse(selector)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn selector(&self) -> &VersionSelector {
        &self.selector
    }

    /// Reference form handed to the resolver (`name/[selector]`).
    pub fn reference(&self) -> String {
        format!("{}/[{}]", self.name, self.selector)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reference())
    }
}

/// The set of requirements a package declares, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RequirementSet(Vec<Requirement>);

impl RequirementSet {
    pub fn new() -> Self {
        RequirementSet(Vec::new())
    }

    /// Insert a requirement, replacing any earlier one with the same name.
    pub fn insert(&mut self, requirement: Requirement) {
        match self
            .0
            .binary_search_by(|r| r.name.as_str().cmp(requirement.name()))
        {
            Ok(i) => self.0[i] = requirement,
            Err(i) => self.0.insert(i, requirement),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Requirement> {
        self.0.iter().find(|r| r.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Requirement> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Requirement> for RequirementSet {
    fn from_iter<I: IntoIterator<Item = Requirement>>(iter: I) -> Self {
        let mut set = RequirementSet::new();
        for requirement in iter {
            set.insert(requirement);
        }
        set
    }
}

impl<'a> IntoIterator for &'a RequirementSet {
    type Item = &'a Requirement;
    type IntoIter = std::slice::Iter<'a, Requirement>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_any_version_selector() {
        let selector = VersionSelector::parse(">=0").unwrap();
        assert!(selector.matches(&v("0.0.1")));
        assert!(selector.matches(&v("0.1.0")));
        assert!(selector.matches(&v("1.0.0")));
        assert!(selector.matches(&v("42.7.3")));
        assert_eq!(selector.as_str(), ">=0");
    }

    #[test]
    fn test_bracketed_and_compound_ranges() {
        let selector = VersionSelector::parse("[>=1.2 <2]").unwrap();
        assert!(selector.matches(&v("1.2.0")));
        assert!(selector.matches(&v("1.9.9")));
        assert!(!selector.matches(&v("2.0.0")));
        assert!(!selector.matches(&v("1.1.9")));

        let spaced = VersionSelector::parse(">= 1.2 < 2").unwrap();
        assert!(spaced.matches(&v("1.5.0")));
    }

    #[test]
    fn test_bare_version_is_exact() {
        let selector = VersionSelector::parse("1.2.3").unwrap();
        assert!(selector.matches(&v("1.2.3")));
        assert!(!selector.matches(&v("1.2.4")));
    }

    #[test]
    fn test_alternatives_and_prerelease() {
        let selector = VersionSelector::parse("<1 || >=3").unwrap();
        assert!(selector.matches(&v("0.5.0")));
        assert!(!selector.matches(&v("2.0.0")));
        assert!(selector.matches(&v("3.1.0")));

        let strict = VersionSelector::parse(">=1.0").unwrap();
        assert!(!strict.matches(&v("1.1.0-beta")));
        let loose = VersionSelector::parse(">=1.0, include_prerelease").unwrap();
        assert!(loose.matches(&v("1.1.0-beta")));
    }

    #[test]
    fn test_invalid_selectors() {
        assert!(VersionSelector::parse("").is_err());
        assert!(VersionSelector::parse("[]").is_err());
        assert!(VersionSelector::parse("[>=1").is_err());
        assert!(VersionSelector::parse(">=").is_err());
        assert!(VersionSelector::parse(">=banana").is_err());
        assert!(VersionSelector::parse(">=1, nightly").is_err());
    }

    #[test]
    fn test_partial_candidate_versions() {
        let selector = VersionSelector::parse("~1.3").unwrap();
        assert!(selector.matches_str("1.3"));
        assert!(!selector.matches_str("1.4"));
        assert!(!selector.matches_str("not-a-version"));
    }

    #[test]
    fn test_requirement_reference() {
        let req = Requirement::new("external-math-library", VersionSelector::any()).unwrap();
        assert_eq!(req.reference(), "external-math-library/[>=0]");

        let parsed = Requirement::parse_reference("external-math-library/[>=0]").unwrap();
        assert_eq!(parsed, req);

        assert_eq!(
            Requirement::new("  ", VersionSelector::any()),
            Err(RequirementError::EmptyName)
        );
    }

    #[test]
    fn test_requirement_set_is_keyed_by_name() {
        let set: RequirementSet = [
            Requirement::parse_reference("zlib/[>=1]").unwrap(),
            Requirement::parse_reference("abseil/[>=2]").unwrap(),
            Requirement::parse_reference("zlib/[>=1.3]").unwrap(),
        ]
        .into_iter()
        .collect();

        assert_eq!(set.len(), 2);
        let names: Vec<_> = set.iter().map(|r| r.name()).collect();
        assert_eq!(names, ["abseil", "zlib"]);
        assert_eq!(set.get("zlib").unwrap().selector().as_str(), ">=1.3");
    }
}
