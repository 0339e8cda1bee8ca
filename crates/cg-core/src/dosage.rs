//! Label to milligram dosage mapping.

use crate::label::{Label, LABEL_COUNT};
use std::collections::HashMap;

/// Default per-serving dosages in mg, indexed like [`Label::ALL`].
const DEFAULT_DOSAGES_MG: [u32; LABEL_COUNT] = [120, 40, 20, 30, 80, 0];

/// Total mapping from [`Label`] to a caffeine dosage in milligrams.
///
/// Backed by a fixed-size array indexed by label discriminant, so every label
/// has exactly one entry and lookup can never miss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DosageTable {
    milligrams: [u32; LABEL_COUNT],
}

impl Default for DosageTable {
    fn default() -> Self {
        Self {
            milligrams: DEFAULT_DOSAGES_MG,
        }
    }
}

impl DosageTable {
    /// Dosage for a label, in milligrams. Pure and total.
    pub fn lookup(&self, label: Label) -> u32 {
        self.milligrams[label.index()]
    }

    /// Replace the dosage for one label.
    pub fn set(&mut self, label: Label, milligrams: u32) {
        self.milligrams[label.index()] = milligrams;
    }

    /// Default table with per-label overrides applied on top.
    pub fn with_overrides(overrides: &HashMap<Label, u32>) -> Self {
        let mut table = Self::default();
        for (&label, &mg) in overrides {
            table.set(label, mg);
        }
        table
    }

    /// Iterate labels with their dosages, in [`Label::ALL`] order.
    pub fn entries(&self) -> impl Iterator<Item = (Label, u32)> + '_ {
        Label::ALL
            .into_iter()
            .map(move |label| (label, self.lookup(label)))
    }
}
