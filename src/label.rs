// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Labels and the per-run label pool

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A named tag used to sort files. Two labels are equal when their names are.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label {
    name: String,
}

impl Label {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for Label {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Labels created during one classification run, keyed by lower-cased name.
///
/// Owned by the classifier for the duration of a run and dropped with it.
#[derive(Debug, Default)]
pub struct LabelPool {
    labels: HashMap<String, Label>,
}

impl LabelPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the pooled label for `name`, creating it on first use
    pub fn get_or_insert(&mut self, name: &str) -> Label {
        let key = name.to_lowercase();
        self.labels
            .entry(key)
            .or_insert_with(|| Label::new(name))
            .clone()
    }

    pub fn get(&self, name: &str) -> Option<&Label> {
        self.labels.get(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Pooled labels sorted by name
    pub fn labels(&self) -> Vec<&Label> {
        let mut labels: Vec<&Label> = self.labels.values().collect();
        labels.sort_by(|a, b| a.name.cmp(&b.name));
        labels
    }
}
