//! Access rule table: ordered `(path pattern → requirement)` rules.
//!
//! Rules are compiled once at startup and evaluated top to bottom; the first
//! pattern that matches the request path decides. Paths no rule matches fall
//! through to the table's default requirement, which is [`Requirement::DenyAll`]
//! unless the builder says otherwise.

use thiserror::Error;
use wildmatch::WildMatch;

use crate::Role;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("invalid path pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: &'static str },
}

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Glob(WildMatch),
    /// `**`: zero or more whole segments.
    AnyDepth,
}

impl Segment {
    fn matches(&self, segment: &str) -> bool {
        match self {
            Segment::Literal(lit) => lit == segment,
            Segment::Glob(glob) => glob.matches(segment),
            Segment::AnyDepth => true,
        }
    }
}

/// Ant-style path pattern.
///
/// - `/login` matches exactly `/login` (a trailing slash is ignored).
/// - `*` matches within one segment, `?` matches one character.
/// - `**` matches any number of segments, including none, so `/admin/**`
///   matches `/admin`, `/admin/` and `/admin/users/1` but not `/administrator`.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Result<Self, RuleError> {
        let invalid = |reason| RuleError::InvalidPattern {
            pattern: pattern.to_string(),
            reason,
        };

        if !pattern.starts_with('/') {
            return Err(invalid("must start with '/'"));
        }

        let mut segments: Vec<Segment> = Vec::new();
        for raw in split_path(pattern) {
            let segment = if raw == "**" {
                if matches!(segments.last(), Some(Segment::AnyDepth)) {
                    continue;
                }
                Segment::AnyDepth
            } else if raw.contains("**") {
                return Err(invalid("'**' must be a whole segment"));
            } else if raw.contains(['*', '?']) {
                Segment::Glob(WildMatch::new(raw))
            } else {
                Segment::Literal(raw.to_string())
            };
            segments.push(segment);
        }

        Ok(Self {
            source: pattern.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Match a request path (no query string).
    pub fn matches(&self, path: &str) -> bool {
        let path: Vec<&str> = split_path(path).collect();
        match_segments(&self.segments, &path)
    }
}

impl PartialEq for PathPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for PathPattern {}

impl core::fmt::Display for PathPattern {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.source)
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn match_segments(pattern: &[Segment], path: &[&str]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((Segment::AnyDepth, rest)) => {
            (0..=path.len()).any(|skip| match_segments(rest, &path[skip..]))
        }
        Some((segment, rest)) => match path.split_first() {
            Some((head, tail)) => segment.matches(head) && match_segments(rest, tail),
            None => false,
        },
    }
}

/// What a request must carry to pass a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// Anyone, with or without a session.
    Public,
    /// Any authenticated session.
    Authenticated,
    /// An authenticated session holding this role.
    Role(Role),
    /// Nobody.
    DenyAll,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRule {
    pub pattern: PathPattern,
    pub requirement: Requirement,
}

/// Immutable, ordered rule list with a fallback for unmatched paths.
#[derive(Debug, Clone)]
pub struct AccessRuleTable {
    rules: Vec<AccessRule>,
    default: Requirement,
}

impl AccessRuleTable {
    pub fn builder() -> AccessRuleTableBuilder {
        AccessRuleTableBuilder::default()
    }

    pub fn rules(&self) -> &[AccessRule] {
        &self.rules
    }

    pub fn default_requirement(&self) -> &Requirement {
        &self.default
    }

    /// First matching rule for `path`, if any.
    pub fn rule_for(&self, path: &str) -> Option<&AccessRule> {
        self.rules.iter().find(|rule| rule.pattern.matches(path))
    }

    pub fn requirement_for(&self, path: &str) -> &Requirement {
        self.rule_for(path)
            .map(|rule| &rule.requirement)
            .unwrap_or(&self.default)
    }
}

/// Builder mirroring the declarative "pattern → requirement" style.
///
/// Patterns are only parsed in [`AccessRuleTableBuilder::build`], so a typo
/// surfaces as one startup error instead of a panic mid-chain.
#[derive(Debug)]
pub struct AccessRuleTableBuilder {
    rules: Vec<(String, Requirement)>,
    default: Requirement,
}

impl Default for AccessRuleTableBuilder {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            default: Requirement::DenyAll,
        }
    }
}

impl AccessRuleTableBuilder {
    pub fn rule(mut self, pattern: impl Into<String>, requirement: Requirement) -> Self {
        self.rules.push((pattern.into(), requirement));
        self
    }

    pub fn permit_all(self, pattern: impl Into<String>) -> Self {
        self.rule(pattern, Requirement::Public)
    }

    pub fn authenticated(self, pattern: impl Into<String>) -> Self {
        self.rule(pattern, Requirement::Authenticated)
    }

    pub fn has_role(self, pattern: impl Into<String>, role: impl Into<Role>) -> Self {
        self.rule(pattern, Requirement::Role(role.into()))
    }

    /// Requirement applied when no rule matches.
    pub fn default_requirement(mut self, requirement: Requirement) -> Self {
        self.default = requirement;
        self
    }

    pub fn build(self) -> Result<AccessRuleTable, RuleError> {
        let rules = self
            .rules
            .into_iter()
            .map(|(pattern, requirement)| {
                Ok(AccessRule {
                    pattern: PathPattern::parse(&pattern)?,
                    requirement,
                })
            })
            .collect::<Result<Vec<_>, RuleError>>()?;

        Ok(AccessRuleTable {
            rules,
            default: self.default,
        })
    }
}
