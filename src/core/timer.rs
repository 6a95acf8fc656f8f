//! Conversion of conditioning timers (PCT: pickup/dropoff) into sequencing
//! timers (PST: preset/reset), one instance at a time.
//!
//! A conditioning timer carries two thresholds; a sequencing timer carries
//! one preset plus a reset input, so only pickup-only or dropoff-only
//! instances have an equivalent. Dropoff conversion inverts the output
//! polarity, and edge-detector operators cannot wrap a negated expression,
//! so affected edge operands are rerouted through a freshly allocated
//! helper variable.
//!
//! Everything is staged against an in-memory view first; the document is
//! only mutated once an instance's full rewrite (allocations included) is
//! known to succeed. There is no rollback log.

use std::collections::HashMap;

use indexmap::IndexMap;
use regex::Regex;
use tracing::{debug, info};

use crate::core::alloc::allocate;
use crate::core::catalog::{Catalog, CategoryCode, Instance};
use crate::core::convert::Selector;
use crate::core::document::{LineId, LogicDocument, SubstitutionEngine};
use crate::core::error::LogicError;
use crate::core::tokenize::Classifier;
use crate::core::usage::UsageIndex;

/// Terminal outcome of one instance's conversion. `Rejected` carries no
/// document effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Committed,
    Rejected,
}

#[derive(Debug, Clone)]
pub struct TimerOptions {
    /// Nominal system frequency used to turn cycle thresholds into
    /// seconds.
    pub frequency_hz: f64,
    /// Lowest sequencing-timer number the converter may allocate.
    pub dest_floor: u16,
    /// Lowest helper-variable number the polarity fixup may allocate.
    pub helper_floor: u16,
    /// System-blocking guard appended to dropoff enable expressions.
    pub blocking_term: String,
}

impl Default for TimerOptions {
    fn default() -> Self {
        Self {
            frequency_hz: 50.0,
            dest_floor: 1,
            helper_floor: 1,
            blocking_term: "HALARM".to_string(),
        }
    }
}

/// Non-fatal findings that require manual follow-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerWarning {
    /// A threshold was symbolic, not numeric; it was carried through
    /// unchanged and cannot be rescaled to seconds automatically.
    UnresolvedSymbolicValue { symbol: String, expression: String },
}

/// Result of running the state machine for one instance.
#[derive(Debug, Clone)]
pub struct TimerOutcome {
    pub instance: Instance,
    pub state: TimerState,
    pub destination: Option<Instance>,
    pub helper: Option<Instance>,
    pub warnings: Vec<TimerWarning>,
    pub error: Option<LogicError>,
}

impl TimerOutcome {
    fn rejected(instance: Instance, error: LogicError) -> Self {
        Self {
            instance,
            state: TimerState::Rejected,
            destination: None,
            helper: None,
            warnings: Vec::new(),
            error: Some(error),
        }
    }
}

/// Convert every selected conditioning timer. Instances run
/// independently; one rejection never blocks the rest.
pub fn convert_timers(
    catalog: &Catalog,
    classifier: &Classifier,
    doc: &mut LogicDocument,
    selector: &Selector,
    opts: &TimerOptions,
) -> Result<Vec<TimerOutcome>, LogicError> {
    if selector.category() != CategoryCode::Pct {
        return Err(LogicError::InvalidSelector(format!(
            "timer conversion runs on PCT instances, got {}",
            selector.category()
        )));
    }

    let usage = UsageIndex::scan(catalog, classifier, doc);
    let instances = selector.resolve(&usage);

    let mut outcomes = Vec::with_capacity(instances.len());
    for instance in instances {
        let outcome = convert_one(catalog, classifier, doc, instance, opts);
        info!(
            instance = %instance.canonical(catalog),
            state = ?outcome.state,
            "timer conversion"
        );
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

/// The three driving lines of one conditioning timer.
struct SourceLines {
    pickup: (LineId, String),
    dropoff: (LineId, String),
    enable: (LineId, String),
}

fn convert_one(
    catalog: &Catalog,
    classifier: &Classifier,
    doc: &mut LogicDocument,
    instance: Instance,
    opts: &TimerOptions,
) -> TimerOutcome {
    let name = instance.canonical(catalog);

    // ReadSource: locate the PU/DO/IN definitions and the output symbol.
    let src = match read_source(doc, &name) {
        Ok(src) => src,
        Err(e) => return TimerOutcome::rejected(instance, e),
    };
    let q_old = format!("{name}Q");

    // Validate: the two timing behaviors are mutually exclusive.
    let pickup_zero = is_zero(classifier, &src.pickup.1);
    let dropoff_zero = is_zero(classifier, &src.dropoff.1);
    if !pickup_zero && !dropoff_zero {
        return TimerOutcome::rejected(
            instance,
            LogicError::InvalidConversionState {
                instance: name,
                pickup: src.pickup.1.clone(),
                dropoff: src.dropoff.1.clone(),
            },
        );
    }
    let dropoff_only = pickup_zero && !dropoff_zero;

    // Allocate the destination before touching anything. The usage index
    // is rescanned per instance so earlier conversions in the same batch
    // count as occupied.
    let usage = UsageIndex::scan(catalog, classifier, doc);
    let pst = catalog.get(CategoryCode::Pst);
    let Some(dest_number) = allocate(
        pst,
        1,
        Some(opts.dest_floor),
        None,
        &usage.used(CategoryCode::Pst),
    )
    .first()
    .copied() else {
        return TimerOutcome::rejected(
            instance,
            LogicError::CapacityExhausted {
                category: CategoryCode::Pst,
                requested: 1,
                available: 0,
            },
        );
    };
    let dest = Instance::new(CategoryCode::Pst, dest_number);
    let dest_name = dest.canonical(catalog);
    let q_new = format!("{dest_name}Q");

    let mut warnings = Vec::new();
    let enable = src.enable.1.clone();

    // Stage the three rewritten definitions. The preset lands on the line
    // whose threshold drove it so its comment stays truthful.
    let mut staged: HashMap<LineId, String> = HashMap::new();
    if dropoff_only {
        let preset = scale_threshold(classifier, &src.dropoff.1, opts.frequency_hz)
            .unwrap_or_else(|| {
                warnings.push(TimerWarning::UnresolvedSymbolicValue {
                    symbol: format!("{name}DO"),
                    expression: src.dropoff.1.clone(),
                });
                src.dropoff.1.clone()
            });
        staged.insert(src.dropoff.0, format!("{dest_name}PT := {preset}"));
        staged.insert(src.pickup.0, format!("{dest_name}R := {enable}"));
        staged.insert(
            src.enable.0,
            format!(
                "{dest_name}IN := NOT ({enable}) AND NOT {}",
                opts.blocking_term
            ),
        );
    } else {
        let preset = scale_threshold(classifier, &src.pickup.1, opts.frequency_hz)
            .unwrap_or_else(|| {
                warnings.push(TimerWarning::UnresolvedSymbolicValue {
                    symbol: format!("{name}PU"),
                    expression: src.pickup.1.clone(),
                });
                src.pickup.1.clone()
            });
        staged.insert(src.pickup.0, format!("{dest_name}PT := {preset}"));
        staged.insert(src.dropoff.0, format!("{dest_name}R := NOT ({enable})"));
        staged.insert(src.enable.0, format!("{dest_name}IN := {enable}"));
    }

    // Rename the output symbol document-wide on the staged view. Dropoff
    // conversion inverts polarity.
    let replacement = if dropoff_only {
        format!("NOT {q_new}")
    } else {
        q_new.clone()
    };
    let mut mapping = IndexMap::new();
    mapping.insert(q_old.clone(), replacement);
    let engine = match SubstitutionEngine::compile(&mapping) {
        Ok(engine) => engine,
        Err(e) => return TimerOutcome::rejected(instance, e),
    };
    let line_ids: Vec<LineId> = doc.iter().map(|(id, _)| id).collect();
    for id in &line_ids {
        let base = staged
            .get(id)
            .cloned()
            .or_else(|| doc.line(*id).map(|l| l.equation().to_string()))
            .unwrap_or_default();
        if let Some(rewritten) = engine.apply(&base) {
            staged.insert(*id, rewritten);
        }
    }

    // PolarityFixup: edge detectors cannot take a negated operand. Reroute
    // them through a helper defined as the negation.
    let edge_re = Regex::new(&format!(r"(R_TRIG|F_TRIG)\s+NOT\s+{q_new}\b"))
        .unwrap_or_else(|_| unreachable!());
    let needs_fixup: Vec<LineId> = line_ids
        .iter()
        .copied()
        .filter(|id| {
            let text = staged
                .get(id)
                .map(String::as_str)
                .or_else(|| doc.line(*id).map(|l| l.equation()));
            text.is_some_and(|t| edge_re.is_match(t))
        })
        .collect();

    let mut helper = None;
    if !needs_fixup.is_empty() {
        let psv = catalog.get(CategoryCode::Psv);
        let Some(helper_number) = allocate(
            psv,
            1,
            Some(opts.helper_floor),
            None,
            &usage.used(CategoryCode::Psv),
        )
        .first()
        .copied() else {
            // Abort before any mutation is committed.
            return TimerOutcome::rejected(
                instance,
                LogicError::CapacityExhausted {
                    category: CategoryCode::Psv,
                    requested: 1,
                    available: 0,
                },
            );
        };
        let helper_inst = Instance::new(CategoryCode::Psv, helper_number);
        let helper_name = helper_inst.canonical(catalog);
        debug!(%helper_name, "edge-detector polarity fixup");

        for id in &needs_fixup {
            let text = staged
                .get(id)
                .cloned()
                .or_else(|| doc.line(*id).map(|l| l.equation().to_string()))
                .unwrap_or_default();
            let rewritten = edge_re
                .replace_all(&text, format!("${{1}} {helper_name}"))
                .into_owned();
            staged.insert(*id, rewritten);
        }
        helper = Some(helper_inst);
    }

    // Commit: every staged line, then the helper definition after the
    // converted block.
    let mut anchor = src.pickup.0;
    for id in [src.dropoff.0, src.enable.0] {
        if doc.position_of(id) > doc.position_of(anchor) {
            anchor = id;
        }
    }
    for (id, eqn) in &staged {
        // Ids were taken from this document moments ago.
        doc.replace_line(*id, eqn, None)
            .unwrap_or_else(|_| unreachable!("staged line vanished during commit"));
    }
    if let Some(helper_inst) = helper {
        let helper_name = helper_inst.canonical(catalog);
        let eqn = format!("{helper_name} := NOT {q_new}");
        doc.insert_after(anchor, &eqn, None)
            .map(|_| ())
            .unwrap_or_else(|_| unreachable!("anchor line vanished during commit"));
    }

    TimerOutcome {
        instance,
        state: TimerState::Committed,
        destination: Some(dest),
        helper,
        warnings,
        error: None,
    }
}

fn read_source(doc: &LogicDocument, name: &str) -> Result<SourceLines, LogicError> {
    let find = |suffix: &str| -> Result<(LineId, String), LogicError> {
        let symbol = format!("{name}{suffix}");
        let defs = doc.definitions_of(&symbol);
        match defs.as_slice() {
            [] => Err(LogicError::MissingDefinition { symbol }),
            [id] => {
                let rhs = doc
                    .line(*id)
                    .and_then(|l| l.rhs())
                    .ok_or(LogicError::MissingDefinition {
                        symbol: symbol.clone(),
                    })?;
                Ok((*id, rhs.to_string()))
            }
            many => Err(LogicError::AmbiguousDefinition {
                symbol,
                count: many.len(),
            }),
        }
    };

    Ok(SourceLines {
        pickup: find("PU")?,
        dropoff: find("DO")?,
        enable: find("IN")?,
    })
}

/// A threshold is zero iff it parses numerically to zero; symbolic
/// expressions count as non-zero.
fn is_zero(classifier: &Classifier, expr: &str) -> bool {
    classifier.is_numeric(expr) && expr.parse::<f64>().is_ok_and(|v| v == 0.0)
}

/// Cycles → seconds at the nominal frequency, rounded to 5 decimals.
/// `None` when the threshold is symbolic.
fn scale_threshold(classifier: &Classifier, expr: &str, frequency_hz: f64) -> Option<String> {
    if !classifier.is_numeric(expr) {
        return None;
    }
    let cycles: f64 = expr.parse().ok()?;
    Some(format!("{:.5}", cycles / frequency_hz))
}
