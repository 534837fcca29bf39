//! Window match rules
//!
//! A tiny predicate language used to choose an effect per window:
//!
//! ```text
//! any
//! type=normal|dialog
//! class=Firefox & !title=Picture-in-Picture
//! ```
//!
//! Terms are joined with `&`; a leading `!` negates a term.

use crate::error::{ConfigError, Result};
use crate::event::WindowEvent;
use crate::registry::EffectId;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::str::FromStr;

/// Window type as reported by the host
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    #[default]
    Normal,
    Dialog,
    Utility,
    Menu,
    Dock,
    Desktop,
    Splash,
    Notification,
}

impl FromStr for WindowKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(WindowKind::Normal),
            "dialog" => Ok(WindowKind::Dialog),
            "utility" => Ok(WindowKind::Utility),
            "menu" => Ok(WindowKind::Menu),
            "dock" => Ok(WindowKind::Dock),
            "desktop" => Ok(WindowKind::Desktop),
            "splash" => Ok(WindowKind::Splash),
            "notification" => Ok(WindowKind::Notification),
            other => Err(ConfigError::Invalid(format!("unknown window type '{}'", other))),
        }
    }
}

/// Properties a match rule can test
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WindowInfo {
    pub kind: WindowKind,
    pub class: String,
    pub title: String,
}

impl WindowInfo {
    pub fn new(kind: WindowKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = class.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Predicate {
    Any,
    Kind(SmallVec<[WindowKind; 2]>),
    Class(String),
    Title(String),
}

#[derive(Clone, Debug, PartialEq)]
struct Term {
    predicate: Predicate,
    negated: bool,
}

impl Term {
    fn matches(&self, info: &WindowInfo) -> bool {
        let hit = match &self.predicate {
            Predicate::Any => true,
            Predicate::Kind(kinds) => kinds.contains(&info.kind),
            Predicate::Class(class) => info.class.eq_ignore_ascii_case(class),
            Predicate::Title(needle) => info.title.contains(needle.as_str()),
        };
        hit != self.negated
    }
}

/// A parsed match rule
#[derive(Clone, Debug, PartialEq)]
pub struct WindowMatch {
    terms: SmallVec<[Term; 2]>,
}

impl Default for WindowMatch {
    fn default() -> Self {
        Self::any()
    }
}

impl WindowMatch {
    /// Rule that matches every window
    pub fn any() -> Self {
        let mut terms = SmallVec::new();
        terms.push(Term {
            predicate: Predicate::Any,
            negated: false,
        });
        Self { terms }
    }

    /// Rule that matches no window
    pub fn nothing() -> Self {
        let mut rule = Self::any();
        rule.terms[0].negated = true;
        rule
    }

    pub fn parse(source: &str) -> Result<Self> {
        let source = source.trim();
        if source.is_empty() {
            return Ok(Self::any());
        }

        let mut terms = SmallVec::new();
        for raw in source.split('&') {
            let raw = raw.trim();
            let (negated, body) = match raw.strip_prefix('!') {
                Some(rest) => (true, rest.trim()),
                None => (false, raw),
            };
            let predicate = parse_predicate(body)?;
            terms.push(Term { predicate, negated });
        }
        Ok(Self { terms })
    }

    pub fn matches(&self, info: &WindowInfo) -> bool {
        self.terms.iter().all(|term| term.matches(info))
    }
}

impl FromStr for WindowMatch {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn parse_predicate(body: &str) -> Result<Predicate> {
    if body.eq_ignore_ascii_case("any") {
        return Ok(Predicate::Any);
    }
    let Some((key, value)) = body.split_once('=') else {
        return Err(ConfigError::Invalid(format!("malformed match term '{}'", body)));
    };
    let value = value.trim();
    match key.trim() {
        "type" => {
            let kinds = value
                .split('|')
                .map(WindowKind::from_str)
                .collect::<Result<SmallVec<_>>>()?;
            Ok(Predicate::Kind(kinds))
        }
        "class" => Ok(Predicate::Class(value.to_string())),
        "title" => Ok(Predicate::Title(value.to_string())),
        other => Err(ConfigError::Invalid(format!("unknown match key '{}'", other))),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Compiled per-event rules
// ─────────────────────────────────────────────────────────────────────────────

/// One row of an event's option lists
#[derive(Clone, Debug, PartialEq)]
pub struct EffectRule {
    pub matcher: WindowMatch,
    pub effect: EffectId,
    pub duration_ms: f32,
}

/// Validated option lists of one event
///
/// When the lists were inconsistent `problem` holds the reason and no row is
/// ever selected.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompiledRules {
    pub rows: Vec<EffectRule>,
    pub problem: Option<String>,
}

impl CompiledRules {
    /// Validate parallel `effects`/`durations`/`matches` lists
    ///
    /// The three lists must have the same length; otherwise the event does not
    /// animate at all.
    pub fn compile(event: WindowEvent, effects: &[String], durations: &[f32], matches: &[String]) -> Self {
        let lengths_agree = effects.len() == durations.len() && matches.len() == effects.len();
        if !lengths_agree {
            let problem = format!(
                "{} option lists disagree: {} effects, {} durations, {} matches",
                event.name(),
                effects.len(),
                durations.len(),
                matches.len()
            );
            tracing::warn!("{}", problem);
            return Self::invalid(problem);
        }

        let mut rows = Vec::with_capacity(effects.len());
        let lists = effects.iter().zip(durations).zip(matches).enumerate();
        for (i, ((name, &duration_ms), source)) in lists {
            let effect = match EffectId::from_str(name) {
                Ok(effect) => effect,
                Err(err) => {
                    tracing::warn!("{} rule {}: {}", event.name(), i, err);
                    return Self::invalid(err.to_string());
                }
            };
            let matcher = WindowMatch::parse(source).unwrap_or_else(|err| {
                tracing::warn!("{} rule {}: {}, rule disabled", event.name(), i, err);
                WindowMatch::nothing()
            });
            rows.push(EffectRule {
                matcher,
                effect,
                duration_ms: duration_ms.max(0.0),
            });
        }
        Self { rows, problem: None }
    }

    fn invalid(problem: String) -> Self {
        Self {
            rows: Vec::new(),
            problem: Some(problem),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.problem.is_none()
    }

    /// First row whose rule matches the window
    pub fn select(&self, info: &WindowInfo) -> Option<&EffectRule> {
        self.rows.iter().find(|row| row.matcher.matches(info))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn firefox() -> WindowInfo {
        WindowInfo::new(WindowKind::Normal)
            .with_class("Firefox")
            .with_title("Picture-in-Picture")
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_and_match() {
        assert!(WindowMatch::parse("any").unwrap().matches(&firefox()));
        assert!(WindowMatch::parse("").unwrap().matches(&firefox()));
        assert!(WindowMatch::parse("type=normal|dialog").unwrap().matches(&firefox()));
        assert!(!WindowMatch::parse("type=dock").unwrap().matches(&firefox()));
        assert!(WindowMatch::parse("class=firefox").unwrap().matches(&firefox()));
        assert!(!WindowMatch::parse("class=firefox & !title=Picture")
            .unwrap()
            .matches(&firefox()));
        assert!(!WindowMatch::nothing().matches(&firefox()));
    }

    #[test]
    fn test_parse_errors() {
        assert!(WindowMatch::parse("type=spaceship").is_err());
        assert!(WindowMatch::parse("role=main").is_err());
        assert!(WindowMatch::parse("class").is_err());
    }

    #[test]
    fn test_first_matching_row_wins() {
        let rules = CompiledRules::compile(
            WindowEvent::Close,
            &strings(&["explode", "fade"]),
            &[400.0, 150.0],
            &strings(&["type=dialog", "any"]),
        );
        assert!(rules.is_valid());
        let row = rules.select(&firefox()).unwrap();
        assert_eq!(row.effect, EffectId::Fade);
        assert_eq!(row.duration_ms, 150.0);

        let dialog = WindowInfo::new(WindowKind::Dialog);
        assert_eq!(rules.select(&dialog).unwrap().effect, EffectId::Explode);
    }

    #[test]
    fn test_mismatched_lists_select_nothing() {
        let rules = CompiledRules::compile(
            WindowEvent::Minimize,
            &strings(&["magic_lamp", "fade"]),
            &[300.0],
            &strings(&["any", "any"]),
        );
        assert!(!rules.is_valid());
        assert!(rules.select(&firefox()).is_none());
    }

    #[test]
    fn test_missing_matches_invalidate_event() {
        let rules = CompiledRules::compile(WindowEvent::Open, &strings(&["zoom"]), &[200.0], &[]);
        assert!(!rules.is_valid());
        assert!(rules.select(&firefox()).is_none());
    }

    #[test]
    fn test_unknown_effect_invalidates_event() {
        let rules = CompiledRules::compile(WindowEvent::Open, &strings(&["teleport"]), &[200.0], &strings(&["any"]));
        assert!(!rules.is_valid());
    }

    #[test]
    fn test_bad_rule_disables_row_only() {
        let rules = CompiledRules::compile(
            WindowEvent::Close,
            &strings(&["explode", "fade"]),
            &[400.0, 150.0],
            &strings(&["type=", "any"]),
        );
        assert!(rules.is_valid());
        assert_eq!(rules.select(&firefox()).unwrap().effect, EffectId::Fade);
    }
}
