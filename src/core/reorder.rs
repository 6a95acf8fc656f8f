//! Renumbering a category's defined instances onto fresh slots from a
//! caller floor, applied as one atomic simultaneous rename.


use indexmap::IndexMap;
use tracing::info;

use crate::core::alloc::allocate;
use crate::core::catalog::{Catalog, CategoryCode, Instance};
use crate::core::convert::expand_instance;
use crate::core::document::LogicDocument;
use crate::core::error::LogicError;
use crate::core::tokenize::Classifier;
use crate::core::usage::UsageIndex;

/// Mapping from old to new instances, in first-seen document order.
#[derive(Debug, Clone)]
pub struct ReorderReport {
    pub moves: Vec<(Instance, Instance)>,
    pub lines_changed: usize,
}

/// Relocate every LHS-defined instance of `code` to fresh numbers
/// ascending from `floor`.
///
/// The allocator excludes the category's whole used set, so a destination
/// can coincide neither with another instance's pending-old number nor
/// with a number that is only referenced here. The whole mapping is
/// applied in one non-cascading pass.
pub fn reorder(
    catalog: &Catalog,
    classifier: &Classifier,
    doc: &mut LogicDocument,
    code: CategoryCode,
    floor: u16,
) -> Result<ReorderReport, LogicError> {
    let cat = catalog.get(code);

    // Distinct defined numbers in first-seen order.
    let mut defined: Vec<u16> = Vec::new();
    for (_, line) in doc.iter() {
        let Some(lhs) = line.lhs() else { continue };
        let Some(token) = classifier.classify_token(catalog, lhs) else {
            continue;
        };
        if token.instance.code == code && !defined.contains(&token.instance.number) {
            defined.push(token.instance.number);
        }
    }
    if defined.is_empty() {
        return Ok(ReorderReport {
            moves: Vec::new(),
            lines_changed: 0,
        });
    }

    // Exclude every number in use anywhere in the document, referenced or
    // defined. The defined set alone would let a destination land on a
    // live reference in the same pool.
    let used = UsageIndex::scan(catalog, classifier, doc).used(code);
    let destinations = allocate(cat, defined.len(), Some(floor), None, &used);
    if destinations.len() < defined.len() {
        return Err(LogicError::CapacityExhausted {
            category: code,
            requested: defined.len(),
            available: destinations.len(),
        });
    }

    let mut mapping: IndexMap<String, String> = IndexMap::new();
    let mut moves = Vec::with_capacity(defined.len());
    for (&old, &new) in defined.iter().zip(&destinations) {
        let from = Instance::new(code, old);
        let to = Instance::new(code, new);
        for token in expand_instance(catalog, from) {
            let new_token = crate::core::catalog::Token {
                instance: to,
                field: token.field,
            };
            mapping.insert(token.text(catalog), new_token.text(catalog));
        }
        moves.push((from, to));
    }

    let changed = doc.multi_replace(&mapping)?;
    info!(
        category = %code,
        instances = moves.len(),
        lines = changed.len(),
        "reorder applied"
    );
    Ok(ReorderReport {
        moves,
        lines_changed: changed.len(),
    })
}
