//! Console rendering of usage tables and operation reports.

use owo_colors::OwoColorize;
use tabled::{Table, Tabled};

use crate::core::catalog::Catalog;
use crate::core::convert::DomainReport;
use crate::core::reorder::ReorderReport;
use crate::core::timer::{TimerOutcome, TimerState, TimerWarning};
use crate::core::usage::UsageReport;

#[derive(Tabled)]
struct UsageRow {
    category: String,
    used: String,
    capacity: u16,
    free: String,
    available: String,
}

/// Per-category usage table plus line totals and residual listing.
pub fn render_usage(report: &UsageReport, color: bool) -> String {
    let rows: Vec<UsageRow> = report
        .categories
        .iter()
        .map(|c| UsageRow {
            category: c.category.to_string(),
            used: c.used.to_string(),
            capacity: c.capacity,
            free: format!("{:.0}%", c.free_fraction * 100.0),
            available: c.free.clone(),
        })
        .collect();

    let mut out = String::new();
    out.push_str(&format!(
        "Lines used (w/ comment lines):  {}\n",
        report.lines_total
    ));
    out.push_str(&format!(
        "Lines used (w/o comment lines): {}\n\n",
        report.lines_uncommented
    ));
    out.push_str(&Table::new(rows).to_string());
    out.push('\n');

    if !report.residuals.is_empty() {
        let header = if color {
            "Residual tokens (external points, aliases):".dimmed().to_string()
        } else {
            "Residual tokens (external points, aliases):".to_string()
        };
        out.push_str(&format!("\n{header}\n  {}\n", report.residuals.join(" ")));
    }
    out
}

/// One line per applied rename pair with the count of touched lines.
pub fn render_domain(report: &DomainReport, color: bool) -> String {
    let mut out = String::new();
    for change in &report.changes {
        for r in &change.renames {
            let arrow = format!("{} -> {}", r.old, r.new);
            let touched = if r.lines.is_empty() {
                "not present".to_string()
            } else {
                format!("{} line(s)", r.lines.len())
            };
            out.push_str(&format!("{arrow:<20} {touched}\n"));
        }
    }
    for (instance, err) in &report.failures {
        let tag = if color {
            "skipped".yellow().to_string()
        } else {
            "skipped".to_string()
        };
        out.push_str(&format!("{tag} {}{}: {err}\n", instance.code, instance.number));
    }
    out
}

pub fn render_timers(catalog: &Catalog, outcomes: &[TimerOutcome], color: bool) -> String {
    let mut out = String::new();
    for o in outcomes {
        let name = o.instance.canonical(catalog);
        let status = match o.state {
            TimerState::Committed if color => "converted".green().to_string(),
            TimerState::Committed => "converted".to_string(),
            _ if color => "rejected".red().to_string(),
            _ => "rejected".to_string(),
        };
        match (&o.destination, &o.error) {
            (Some(dest), _) => {
                let mut line = format!("{name}: {status} -> {}", dest.canonical(catalog));
                if let Some(h) = o.helper {
                    line.push_str(&format!(" (helper {})", h.canonical(catalog)));
                }
                out.push_str(&line);
                out.push('\n');
            }
            (None, Some(err)) => out.push_str(&format!("{name}: {status} ({err})\n")),
            (None, None) => out.push_str(&format!("{name}: {status}\n")),
        }
        for w in &o.warnings {
            let TimerWarning::UnresolvedSymbolicValue { symbol, expression } = w;
            out.push_str(&format!(
                "  warning: {symbol} threshold {expression:?} is symbolic; review the preset manually\n"
            ));
        }
    }
    out
}

pub fn render_reorder(catalog: &Catalog, report: &ReorderReport) -> String {
    let mut out = String::new();
    for (from, to) in &report.moves {
        out.push_str(&format!(
            "{} -> {}\n",
            from.canonical(catalog),
            to.canonical(catalog)
        ));
    }
    out.push_str(&format!("{} line(s) changed\n", report.lines_changed));
    out
}
