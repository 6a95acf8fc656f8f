//! Document-wide usage accounting.
//!
//! One classifier pass over every line merges LHS and RHS references into
//! per-category used-number sets, counts lines with and without
//! comment-only/blank lines, and collects residual tokens for the report.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::core::alloc::{format_intervals, free_intervals};
use crate::core::catalog::{Catalog, CategoryCode, Instance};
use crate::core::document::{LineKind, LogicDocument};
use crate::core::tokenize::Classifier;

/// Per-category sets of instance numbers in use anywhere in the document.
#[derive(Debug, Clone, Default)]
pub struct UsageIndex {
    used: BTreeMap<CategoryCode, BTreeSet<u16>>,
    pub lines_total: usize,
    pub lines_uncommented: usize,
    residuals: BTreeSet<String>,
}

impl UsageIndex {
    /// Scan a whole document. LHS and RHS references both count as "in
    /// use"; residual tokens are collected, not rejected.
    pub fn scan(catalog: &Catalog, classifier: &Classifier, doc: &LogicDocument) -> Self {
        let mut index = Self::default();

        for (_, line) in doc.iter() {
            index.lines_total += 1;
            if line.kind() == LineKind::Equation {
                index.lines_uncommented += 1;
            }
            let comps = classifier.line_components(catalog, line.equation());
            for token in comps.symbols {
                index
                    .used
                    .entry(token.instance.code)
                    .or_default()
                    .insert(token.instance.number);
            }
            index.residuals.extend(comps.residuals);
        }
        index
    }

    pub fn used(&self, code: CategoryCode) -> BTreeSet<u16> {
        self.used.get(&code).cloned().unwrap_or_default()
    }

    pub fn used_count(&self, code: CategoryCode) -> usize {
        self.used.get(&code).map_or(0, BTreeSet::len)
    }

    pub fn is_used(&self, instance: Instance) -> bool {
        self.used
            .get(&instance.code)
            .is_some_and(|s| s.contains(&instance.number))
    }

    pub fn residuals(&self) -> impl Iterator<Item = &str> {
        self.residuals.iter().map(String::as_str)
    }
}

/// One row of the usage report.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryUsage {
    pub category: CategoryCode,
    pub used: usize,
    pub capacity: u16,
    /// Fraction of the pool still free, 0.0..=1.0.
    pub free_fraction: f64,
    /// Free numbers as minimal closed intervals, e.g. `"4-6, 8-10"`.
    pub free: String,
}

/// Usage report consumed by the table renderer and `--json` output.
#[derive(Debug, Clone, Serialize)]
pub struct UsageReport {
    pub lines_total: usize,
    pub lines_uncommented: usize,
    pub categories: Vec<CategoryUsage>,
    pub residuals: Vec<String>,
}

impl UsageReport {
    pub fn build(catalog: &Catalog, index: &UsageIndex) -> Self {
        let categories = catalog
            .categories()
            .iter()
            .map(|cat| {
                let used = index.used(cat.code);
                let capacity = cat.capacity();
                CategoryUsage {
                    category: cat.code,
                    used: used.len(),
                    capacity,
                    free_fraction: 1.0 - used.len() as f64 / f64::from(capacity),
                    free: format_intervals(&free_intervals(cat, &used)),
                }
            })
            .collect();

        Self {
            lines_total: index.lines_total,
            lines_uncommented: index.lines_uncommented,
            categories,
            residuals: index.residuals().map(str::to_string).collect(),
        }
    }
}
