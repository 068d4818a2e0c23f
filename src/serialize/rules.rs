//! Typed exclusion rules over the relationship graph.
//!
//! A [`Projection`] always contains the root kind's default exclusions; callers can only add to
//! them. Descending into a relation rebases the remaining rules and adds the target kind's own
//! defaults, so every nested record prunes its back-references the same way a root one does.

use crate::model::EntityKind;
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Relation {
    Missions,
    Scientist,
    Planet,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cardinality {
    One,
    Many,
}

impl Relation {
    pub fn name(self) -> &'static str {
        match self {
            Relation::Missions => "missions",
            Relation::Scientist => "scientist",
            Relation::Planet => "planet",
        }
    }

    pub fn from_name(name: &str) -> Option<Relation> {
        match name {
            "missions" => Some(Relation::Missions),
            "scientist" => Some(Relation::Scientist),
            "planet" => Some(Relation::Planet),
            _ => None,
        }
    }

    pub fn target(self) -> EntityKind {
        match self {
            Relation::Missions => EntityKind::Mission,
            Relation::Scientist => EntityKind::Scientist,
            Relation::Planet => EntityKind::Planet,
        }
    }

    pub fn cardinality(self) -> Cardinality {
        match self {
            Relation::Missions => Cardinality::Many,
            Relation::Scientist | Relation::Planet => Cardinality::One,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Relations of `kind`, in output order.
pub fn relations(kind: EntityKind) -> &'static [Relation] {
    match kind {
        EntityKind::Scientist | EntityKind::Planet => &[Relation::Missions],
        EntityKind::Mission => &[Relation::Scientist, Relation::Planet],
    }
}

fn default_exclusions(kind: EntityKind) -> &'static [&'static [Relation]] {
    match kind {
        EntityKind::Scientist => &[&[Relation::Missions, Relation::Scientist]],
        EntityKind::Planet => &[&[Relation::Missions, Relation::Planet]],
        EntityKind::Mission => &[
            &[Relation::Scientist, Relation::Missions],
            &[Relation::Planet, Relation::Missions],
        ],
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RuleError {
    #[error("{kind} has no relation '{relation}'")]
    UnknownRelation { kind: EntityKind, relation: String },
    #[error("empty rule path")]
    EmptyPath,
}

/// Walks `path` from `root`, failing on the first hop the graph does not have.
fn check_path(root: EntityKind, path: &[Relation]) -> Result<(), RuleError> {
    if path.is_empty() {
        return Err(RuleError::EmptyPath);
    }
    let mut kind = root;
    for rel in path {
        if !relations(kind).contains(rel) {
            return Err(RuleError::UnknownRelation {
                kind,
                relation: rel.name().to_string(),
            });
        }
        kind = rel.target();
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Projection {
    root: EntityKind,
    excluded: BTreeSet<Vec<Relation>>,
}

impl Projection {
    pub fn new(root: EntityKind) -> Self {
        let excluded = default_exclusions(root).iter().map(|p| p.to_vec()).collect();
        Projection { root, excluded }
    }

    pub fn root(&self) -> EntityKind {
        self.root
    }

    pub fn exclude(mut self, path: &[Relation]) -> Result<Self, RuleError> {
        check_path(self.root, path)?;
        self.excluded.insert(path.to_vec());
        Ok(self)
    }

    /// Dotted form, e.g. `missions.planet`.
    pub fn exclude_rule(self, rule: &str) -> Result<Self, RuleError> {
        let mut kind = self.root;
        let mut path = Vec::new();
        for segment in rule.split('.').filter(|s| !s.is_empty()) {
            let rel = Relation::from_name(segment).ok_or_else(|| RuleError::UnknownRelation {
                kind,
                relation: segment.to_string(),
            })?;
            kind = rel.target();
            path.push(rel);
        }
        self.exclude(&path)
    }

    pub fn is_excluded(&self, rel: Relation) -> bool {
        self.excluded.iter().any(|p| p.len() == 1 && p[0] == rel)
    }

    /// Projection for the records reached through `rel`.
    pub fn descend(&self, rel: Relation) -> Projection {
        let mut child = Projection::new(rel.target());
        for path in &self.excluded {
            if path.len() > 1 && path[0] == rel {
                child.excluded.insert(path[1..].to_vec());
            }
        }
        child
    }

    /// Deepest relation chain this projection can expand, or `None` past `limit` hops.
    #[cfg(test)]
    fn max_depth(&self, limit: usize) -> Option<usize> {
        if limit == 0 {
            return None;
        }
        let mut deepest = 0;
        for rel in relations(self.root) {
            if self.is_excluded(*rel) {
                continue;
            }
            let below = self.descend(*rel).max_depth(limit - 1)?;
            deepest = deepest.max(below + 1);
        }
        Some(deepest)
    }
}
