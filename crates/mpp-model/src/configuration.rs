//! Configurations: ordered mark collections with unique identifiers.

use std::collections::BTreeSet;
use std::sync::Arc;

use mpp_core::errors::ErrorInfo;
use mpp_core::{MarkId, MppError};
use serde::{Deserialize, Serialize};

use crate::mark::Mark;

/// An ordered collection of marks forming one candidate solution.
///
/// Mark identifiers are unique within a configuration. Marks are held behind
/// `Arc` handles so that [`Configuration::duplicate`] copies references, not
/// recomputed values; a duplicate is cheap enough to be taken once per
/// proposal, and cached feature values tied to shared marks remain valid in
/// both copies.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Mark>", into = "Vec<Mark>")]
pub struct Configuration {
    marks: Vec<Arc<Mark>>,
}

impl Configuration {
    /// Creates an empty configuration.
    pub fn empty() -> Self {
        Self { marks: Vec::new() }
    }

    /// Builds a configuration from marks, enforcing identifier uniqueness.
    pub fn from_marks(marks: Vec<Mark>) -> Result<Self, MppError> {
        let mut configuration = Self::empty();
        for mark in marks {
            configuration.insert(mark)?;
        }
        Ok(configuration)
    }

    /// Builds a configuration without checking the unique-id invariant.
    ///
    /// Callers own the invariant; [`Configuration::validate`] reports
    /// violations. Exists so adversarial states can be constructed when
    /// exercising the abnormal-failure path.
    pub fn from_marks_unvalidated(marks: Vec<Mark>) -> Self {
        Self {
            marks: marks.into_iter().map(Arc::new).collect(),
        }
    }

    /// Inserts a mark; fails when its identifier is already present.
    pub fn insert(&mut self, mark: Mark) -> Result<(), MppError> {
        if self.get(mark.id()).is_some() {
            return Err(MppError::Model(
                ErrorInfo::new("duplicate-mark-id", "mark id already present in configuration")
                    .with_context("mark", mark.id().as_raw().to_string()),
            ));
        }
        self.marks.push(Arc::new(mark));
        Ok(())
    }

    /// Removes and returns the mark with the given identifier.
    pub fn remove(&mut self, id: MarkId) -> Result<Arc<Mark>, MppError> {
        let index = self
            .marks
            .iter()
            .position(|mark| mark.id() == id)
            .ok_or_else(|| {
                MppError::Model(
                    ErrorInfo::new("absent-mark-id", "mark id not present in configuration")
                        .with_context("mark", id.as_raw().to_string()),
                )
            })?;
        Ok(self.marks.remove(index))
    }

    /// Replaces the mark carrying the same identifier with a new snapshot.
    pub fn replace(&mut self, mark: Mark) -> Result<(), MppError> {
        let slot = self
            .marks
            .iter_mut()
            .find(|existing| existing.id() == mark.id())
            .ok_or_else(|| {
                MppError::Model(
                    ErrorInfo::new("absent-mark-id", "cannot replace a mark that is not present")
                        .with_context("mark", mark.id().as_raw().to_string()),
                )
            })?;
        *slot = Arc::new(mark);
        Ok(())
    }

    /// Returns the mark with the given identifier, if present.
    pub fn get(&self, id: MarkId) -> Option<&Arc<Mark>> {
        self.marks.iter().find(|mark| mark.id() == id)
    }

    /// Returns the marks in insertion order.
    pub fn marks(&self) -> &[Arc<Mark>] {
        &self.marks
    }

    /// Iterates over the marks in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Mark>> {
        self.marks.iter()
    }

    /// Number of marks in the configuration.
    pub fn len(&self) -> usize {
        self.marks.len()
    }

    /// Whether the configuration holds no marks.
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Structural duplication: copies mark handles, never feature values.
    pub fn duplicate(&self) -> Self {
        self.clone()
    }

    /// Checks the unique-identifier invariant.
    ///
    /// The sampler treats a violation as an abnormal failure of the run, not
    /// an ordinary rejection: a configuration with duplicate identifiers is
    /// a corrupted state no proposal can be trusted against.
    pub fn validate(&self) -> Result<(), MppError> {
        let mut seen = BTreeSet::new();
        for mark in &self.marks {
            if !seen.insert(mark.id()) {
                return Err(MppError::Model(
                    ErrorInfo::new("duplicate-mark-id", "configuration holds duplicate mark ids")
                        .with_context("mark", mark.id().as_raw().to_string()),
                ));
            }
        }
        Ok(())
    }

    /// Returns the set of mark identifiers, for mark-set equality checks.
    pub fn mark_id_set(&self) -> BTreeSet<MarkId> {
        self.marks.iter().map(|mark| mark.id()).collect()
    }

    /// Smallest identifier not yet used by any mark in the configuration.
    pub fn next_free_id(&self) -> MarkId {
        let next = self
            .marks
            .iter()
            .map(|mark| mark.id().as_raw() + 1)
            .max()
            .unwrap_or(0);
        MarkId::from_raw(next)
    }
}

impl TryFrom<Vec<Mark>> for Configuration {
    type Error = MppError;

    fn try_from(marks: Vec<Mark>) -> Result<Self, Self::Error> {
        Configuration::from_marks(marks)
    }
}

impl From<Configuration> for Vec<Mark> {
    fn from(configuration: Configuration) -> Self {
        configuration
            .marks
            .iter()
            .map(|mark| Mark::clone(mark))
            .collect()
    }
}
