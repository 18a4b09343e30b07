// src/watch/layout.rs

//! Mapping of root-relative paths onto units.
//!
//! The project layout is an ordered table of [`LayoutRule`]s evaluated top to
//! bottom; the first rule that matches decides the scope. Container rules are
//! listed before root-unit rules so `apps/foo/src/x` is always `foo`, never
//! the root application.

use std::fmt;
use std::path::PathBuf;

use crate::config::LayoutSection;
use crate::types::{Scope, UnitName};

/// One entry of the layout table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutRule {
    /// `<dir>/<name>/...` belongs to the unit `name`.
    Container(String),
    /// `<dir>/...` belongs to the root unit.
    RootUnit(String),
}

/// Result of classifying a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification<'a> {
    pub scope: Scope,
    /// The path relative to the unit's own directory.
    pub unit_path: &'a [String],
}

impl LayoutRule {
    fn apply<'a>(&self, components: &'a [String], root_unit: &str) -> Option<Classification<'a>> {
        match self {
            LayoutRule::Container(dir) => match components {
                [first, name, rest @ ..] if first == dir => Some(Classification {
                    scope: Scope::named(name.clone(), PathBuf::from(first).join(name)),
                    unit_path: rest,
                }),
                _ => None,
            },
            LayoutRule::RootUnit(dir) => match components.first() {
                Some(first) if first == dir => Some(Classification {
                    scope: Scope::named(root_unit, PathBuf::new()),
                    unit_path: components,
                }),
                _ => None,
            },
        }
    }
}

impl fmt::Display for LayoutRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutRule::Container(dir) => write!(f, "{dir}/<unit>/..."),
            LayoutRule::RootUnit(dir) => write!(f, "{dir}/... (root unit)"),
        }
    }
}

/// Classifies root-relative components into a [`Scope`].
#[derive(Debug, Clone)]
pub struct PathClassifier {
    rules: Vec<LayoutRule>,
    root_unit: UnitName,
}

impl PathClassifier {
    pub fn new(rules: Vec<LayoutRule>, root_unit: impl Into<UnitName>) -> Self {
        Self {
            rules,
            root_unit: root_unit.into(),
        }
    }

    /// Build the rule table from `[layout]`: containers first, then the
    /// root unit's directories.
    pub fn from_layout(layout: &LayoutSection, root_unit: impl Into<UnitName>) -> Self {
        let rules = layout
            .containers
            .iter()
            .cloned()
            .map(LayoutRule::Container)
            .chain(layout.root_unit_dirs.iter().cloned().map(LayoutRule::RootUnit))
            .collect();
        Self::new(rules, root_unit)
    }

    pub fn rules(&self) -> &[LayoutRule] {
        &self.rules
    }

    pub fn root_unit(&self) -> &str {
        &self.root_unit
    }

    /// Scope of `components`, plus the unit-relative remainder.
    ///
    /// Unmatched paths yield `Scope::Unhandled` with the full components as
    /// the remainder.
    pub fn classify<'a>(&self, components: &'a [String]) -> Classification<'a> {
        self.rules
            .iter()
            .find_map(|rule| rule.apply(components, &self.root_unit))
            .unwrap_or(Classification {
                scope: Scope::Unhandled,
                unit_path: components,
            })
    }
}
