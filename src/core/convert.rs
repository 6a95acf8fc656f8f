//! Domain remapping: move instances between the protection and automation
//! pools, plus the selector grammar shared by every batch operation.

use regex::Regex;
use tracing::debug;

use crate::core::catalog::{Catalog, CategoryCode, Domain, Instance, Token};
use crate::core::document::{LineId, LogicDocument};
use crate::core::error::LogicError;
use crate::core::usage::UsageIndex;

/// What a batch operation runs over: one instance (`PLT13`), an inclusive
/// range within one category (`PLT4-9`), or every instance of a category
/// currently present in the document (`PLT`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    One(Instance),
    Range(CategoryCode, u16, u16),
    All(CategoryCode),
}

impl Selector {
    pub fn parse(catalog: &Catalog, s: &str) -> Result<Self, LogicError> {
        // Selector shapes are tiny; one anchored regex covers all three.
        let re = Regex::new(r"^([A-Za-z]{3})(?:([0-9]{1,3})(?:-([0-9]{1,3}))?)?$")
            .unwrap_or_else(|_| unreachable!());
        let caps = re
            .captures(s.trim())
            .ok_or_else(|| LogicError::InvalidSelector(s.to_string()))?;

        let code = CategoryCode::parse(&caps[1])
            .ok_or_else(|| LogicError::UnknownCategory(caps[1].to_string()))?;
        let cat = catalog.get(code);

        let number = |m: &regex::Match<'_>| -> Result<u16, LogicError> {
            let n: u16 = m
                .as_str()
                .parse()
                .map_err(|_| LogicError::InvalidSelector(s.to_string()))?;
            if !cat.contains(n) {
                return Err(LogicError::NumberOutOfRange {
                    token: s.to_string(),
                    category: code,
                    low: cat.bounds.0,
                    high: cat.bounds.1,
                });
            }
            Ok(n)
        };

        match (caps.get(2), caps.get(3)) {
            (None, _) => Ok(Selector::All(code)),
            (Some(a), None) => Ok(Selector::One(Instance::new(code, number(&a)?))),
            (Some(a), Some(b)) => {
                let (lo, hi) = (number(&a)?, number(&b)?);
                if lo > hi {
                    return Err(LogicError::InvalidSelector(s.to_string()));
                }
                Ok(Selector::Range(code, lo, hi))
            }
        }
    }

    pub fn category(&self) -> CategoryCode {
        match self {
            Selector::One(inst) => inst.code,
            Selector::Range(code, _, _) | Selector::All(code) => *code,
        }
    }

    /// Concrete instances this selector names. `All` resolves against the
    /// numbers the document actually uses, not the full capacity.
    pub fn resolve(&self, usage: &UsageIndex) -> Vec<Instance> {
        match self {
            Selector::One(inst) => vec![*inst],
            Selector::Range(code, lo, hi) => {
                (*lo..=*hi).map(|n| Instance::new(*code, n)).collect()
            }
            Selector::All(code) => usage
                .used(*code)
                .into_iter()
                .map(|n| Instance::new(*code, n))
                .collect(),
        }
    }
}

/// Every field-qualified token an instance produces per its category's
/// templates, e.g. `PLT13` ⇒ `[PLT13S, PLT13R, PLT13]`.
pub fn expand_instance(catalog: &Catalog, instance: Instance) -> Vec<Token> {
    catalog
        .get(instance.code)
        .fields
        .iter()
        .map(|field| Token {
            instance,
            field: *field,
        })
        .collect()
}

/// One applied token rename and the lines it touched. An empty line list
/// means the token never appeared: a no-op, not an error.
#[derive(Debug, Clone)]
pub struct RenameRecord {
    pub old: String,
    pub new: String,
    pub lines: Vec<LineId>,
}

#[derive(Debug, Clone)]
pub struct InstanceChange {
    pub from: Instance,
    pub to: Instance,
    pub renames: Vec<RenameRecord>,
}

#[derive(Debug, Default)]
pub struct DomainReport {
    pub changes: Vec<InstanceChange>,
    /// Instances that could not be remapped; the rest of the batch ran.
    pub failures: Vec<(Instance, LogicError)>,
}

/// Remap every selected instance into the counterpart pool of
/// `target`: swap the domain-indicating letter and re-pad the numeric
/// body to the destination width (`PSV13` ⇒ `ASV013`).
pub fn change_domain(
    catalog: &Catalog,
    doc: &mut LogicDocument,
    selector: &Selector,
    target: Domain,
    usage: &UsageIndex,
) -> Result<DomainReport, LogicError> {
    let source = catalog.get(selector.category());
    if source.domain == target {
        return Err(LogicError::InvalidSelector(format!(
            "{} is already a {target} category",
            source.code
        )));
    }
    let dest_code = source.counterpart.ok_or(LogicError::NoCounterpart {
        category: source.code,
    })?;
    let dest = catalog.get(dest_code);

    let mut report = DomainReport::default();
    for instance in selector.resolve(usage) {
        if !dest.contains(instance.number) {
            report.failures.push((
                instance,
                LogicError::NumberOutOfRange {
                    token: instance.canonical(catalog),
                    category: dest_code,
                    low: dest.bounds.0,
                    high: dest.bounds.1,
                },
            ));
            continue;
        }

        let to = Instance::new(dest_code, instance.number);
        // The destination number must be vacant; moving onto a live
        // instance would merge two unrelated signals.
        if usage.is_used(to) {
            report.failures.push((
                instance,
                LogicError::DestinationInUse {
                    moved: instance.canonical(catalog),
                    destination: to.canonical(catalog),
                },
            ));
            continue;
        }

        let mut renames = Vec::new();
        for token in expand_instance(catalog, instance) {
            let old = token.text(catalog);
            let new = Token {
                instance: to,
                field: token.field,
            }
            .text(catalog);
            let lines = doc.replace(&old, &new)?;
            debug!(%old, %new, touched = lines.len(), "domain remap");
            renames.push(RenameRecord { old, new, lines });
        }
        report.changes.push(InstanceChange {
            from: instance,
            to,
            renames,
        });
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tokenize::Classifier;

    fn setup(text: &str) -> (Catalog, LogicDocument, UsageIndex) {
        let catalog = Catalog::sel400();
        let classifier = Classifier::new(&catalog);
        let doc = LogicDocument::parse(text);
        let usage = UsageIndex::scan(&catalog, &classifier, &doc);
        (catalog, doc, usage)
    }

    #[test]
    fn selector_grammar() {
        let catalog = Catalog::sel400();
        assert_eq!(
            Selector::parse(&catalog, "PLT13").unwrap(),
            Selector::One(Instance::new(CategoryCode::Plt, 13))
        );
        assert_eq!(
            Selector::parse(&catalog, "PLT4-9").unwrap(),
            Selector::Range(CategoryCode::Plt, 4, 9)
        );
        assert_eq!(
            Selector::parse(&catalog, "plt").unwrap(),
            Selector::All(CategoryCode::Plt)
        );
        assert!(matches!(
            Selector::parse(&catalog, "PLT99"),
            Err(LogicError::NumberOutOfRange { .. })
        ));
        assert!(matches!(
            Selector::parse(&catalog, "PLT9-4"),
            Err(LogicError::InvalidSelector(_))
        ));
        assert!(matches!(
            Selector::parse(&catalog, "XYZ1"),
            Err(LogicError::UnknownCategory(_))
        ));
    }

    #[test]
    fn expand_covers_all_fields() {
        let catalog = Catalog::sel400();
        let tokens = expand_instance(&catalog, Instance::new(CategoryCode::Plt, 13));
        let texts: Vec<String> = tokens.iter().map(|t| t.text(&catalog)).collect();
        assert_eq!(texts, ["PLT13S", "PLT13R", "PLT13"]);
    }

    #[test]
    fn latch_moves_to_automation_with_width_kept() {
        let (catalog, mut doc, usage) =
            setup("PLT13S := X\nPLT13R := Y\nPSV01 := PLT13\n");
        let selector = Selector::parse(&catalog, "PLT13").unwrap();
        let report =
            change_domain(&catalog, &mut doc, &selector, Domain::Automation, &usage).unwrap();

        assert_eq!(doc.render(), "ALT13S := X\nALT13R := Y\nPSV01 := ALT13\n");
        assert!(report.failures.is_empty());
        let change = &report.changes[0];
        // Both defining lines show up as touched for their suffixes.
        let set = change.renames.iter().find(|r| r.old == "PLT13S").unwrap();
        let reset = change.renames.iter().find(|r| r.old == "PLT13R").unwrap();
        assert_eq!(set.lines.len(), 1);
        assert_eq!(reset.lines.len(), 1);
    }

    #[test]
    fn boolean_variable_repads_to_wider_pool() {
        let (catalog, mut doc, usage) = setup("PSV13 := A\nOUT1 := PSV13\n");
        let selector = Selector::parse(&catalog, "PSV13").unwrap();
        change_domain(&catalog, &mut doc, &selector, Domain::Automation, &usage).unwrap();
        assert_eq!(doc.render(), "ASV013 := A\nOUT1 := ASV013\n");
    }

    #[test]
    fn narrowing_out_of_bounds_number_fails_per_instance() {
        let (catalog, mut doc, usage) = setup("ASV200 := A\nASV003 := B\n");
        let selector = Selector::parse(&catalog, "ASV").unwrap();
        let report =
            change_domain(&catalog, &mut doc, &selector, Domain::Protection, &usage).unwrap();

        // 200 exceeds the PSV pool; 3 converts fine.
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            report.failures[0].1,
            LogicError::NumberOutOfRange { .. }
        ));
        assert_eq!(doc.render(), "ASV200 := A\nPSV03 := B\n");
    }

    #[test]
    fn occupied_destination_fails_instead_of_merging() {
        let (catalog, mut doc, usage) =
            setup("ALT13S := IN300\nPLT13S := IN201\nPSV01 := PLT13 OR ALT13\n");
        let selector = Selector::parse(&catalog, "PLT13").unwrap();
        let report =
            change_domain(&catalog, &mut doc, &selector, Domain::Automation, &usage).unwrap();

        // ALT13 is live; merging the latch into it must be refused.
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            report.failures[0].1,
            LogicError::DestinationInUse { .. }
        ));
        assert_eq!(
            doc.render(),
            "ALT13S := IN300\nPLT13S := IN201\nPSV01 := PLT13 OR ALT13\n"
        );
    }

    #[test]
    fn conditioning_timer_has_no_destination() {
        let (catalog, mut doc, usage) = setup("PCT01IN := X\n");
        let selector = Selector::parse(&catalog, "PCT01").unwrap();
        let err = change_domain(&catalog, &mut doc, &selector, Domain::Automation, &usage)
            .unwrap_err();
        assert!(matches!(err, LogicError::NoCounterpart { .. }));
    }

    #[test]
    fn absent_symbol_is_a_no_op_not_an_error() {
        let (catalog, mut doc, usage) = setup("PSV01 := 1\n");
        let selector = Selector::parse(&catalog, "PLT20").unwrap();
        let report =
            change_domain(&catalog, &mut doc, &selector, Domain::Automation, &usage).unwrap();
        assert!(report.changes[0].renames.iter().all(|r| r.lines.is_empty()));
        assert_eq!(doc.render(), "PSV01 := 1\n");
    }
}
