//! Command runners: wire CLI arguments to the core engines.
//!
//! Rewritten documents go to stdout (or `--output`); human-readable
//! reports go to stderr so piped output stays valid logic text.

use anyhow::{Context, Result, bail};
use indexmap::IndexMap;

use crate::cli::{
    AppContext, ChangeDomainArgs, ConvertTimersArgs, LinesArgs, RenameArgs, ReorderArgs, UsageArgs,
};
use crate::core::catalog::{Catalog, CategoryCode};
use crate::core::convert::{Selector, change_domain};
use crate::core::document::{LineKind, LogicDocument};
use crate::core::report;
use crate::core::reorder::reorder;
use crate::core::timer::convert_timers;
use crate::core::tokenize::Classifier;
use crate::core::usage::{UsageIndex, UsageReport};
use crate::infra::config::load_config;
use crate::infra::io::{read_input, write_output};

struct Session {
    catalog: Catalog,
    classifier: Classifier,
    doc: LogicDocument,
}

fn open(input: &std::path::Path) -> Result<Session> {
    let catalog = Catalog::sel400();
    let classifier = Classifier::new(&catalog);
    let text = read_input(input)?;
    Ok(Session {
        catalog,
        classifier,
        doc: LogicDocument::parse(&text),
    })
}

pub fn usage_run(args: UsageArgs, ctx: &AppContext) -> Result<()> {
    let s = open(&args.input)?;
    let index = UsageIndex::scan(&s.catalog, &s.classifier, &s.doc);
    let mut report_data = UsageReport::build(&s.catalog, &index);
    if !args.residuals {
        report_data.residuals.clear();
    }

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report_data).context("Failed to encode report")?
        );
    } else {
        print!("{}", report::render_usage(&report_data, !ctx.no_color));
    }
    Ok(())
}

pub fn lines_run(args: LinesArgs, _ctx: &AppContext) -> Result<()> {
    let s = open(&args.input)?;
    for (id, line) in s.doc.iter() {
        let pos = s.doc.position_of(id).unwrap_or_default();
        match line.kind() {
            LineKind::Equation => {
                // LHS assignment target does not count toward the cost.
                let cost = s
                    .classifier
                    .count_elements_used(line.equation())
                    .saturating_sub(1);
                println!("{pos:<5} {cost:>4}  {}", line.render());
            }
            _ => println!("{pos:<5}       {}", line.render()),
        }
    }
    Ok(())
}

pub fn rename_run(args: RenameArgs, ctx: &AppContext) -> Result<()> {
    let mut s = open(&args.input)?;

    let mut mapping = IndexMap::new();
    for pair in &args.maps {
        let Some((old, new)) = pair.split_once('=') else {
            bail!("Invalid --map {pair:?}: expected OLD=NEW");
        };
        mapping.insert(old.trim().to_string(), new.trim().to_string());
    }

    let changed = s.doc.multi_replace(&mapping)?;
    if !ctx.quiet {
        eprintln!("{} line(s) changed", changed.len());
    }
    write_output(args.output.as_ref(), &s.doc.render(), ctx)
}

pub fn change_domain_run(args: ChangeDomainArgs, ctx: &AppContext) -> Result<()> {
    let mut s = open(&args.input)?;
    let selector = Selector::parse(&s.catalog, &args.selector)?;
    let usage = UsageIndex::scan(&s.catalog, &s.classifier, &s.doc);

    let report_data = change_domain(
        &s.catalog,
        &mut s.doc,
        &selector,
        args.to.into(),
        &usage,
    )?;
    if !ctx.quiet {
        eprint!("{}", report::render_domain(&report_data, !ctx.no_color));
    }
    write_output(args.output.as_ref(), &s.doc.render(), ctx)
}

pub fn convert_timers_run(args: ConvertTimersArgs, ctx: &AppContext) -> Result<()> {
    let mut s = open(&args.input)?;
    let config = load_config()?;
    let mut opts = config.timer_options();
    if let Some(f) = args.frequency {
        opts.frequency_hz = f;
    }
    if let Some(floor) = args.floor {
        opts.dest_floor = floor;
    }

    let selector = Selector::parse(&s.catalog, &args.selector)?;
    let outcomes = convert_timers(&s.catalog, &s.classifier, &mut s.doc, &selector, &opts)?;
    if !ctx.quiet {
        eprint!(
            "{}",
            report::render_timers(&s.catalog, &outcomes, !ctx.no_color)
        );
    }
    write_output(args.output.as_ref(), &s.doc.render(), ctx)
}

pub fn reorder_run(args: ReorderArgs, ctx: &AppContext) -> Result<()> {
    let mut s = open(&args.input)?;
    let code = CategoryCode::parse(&args.category)
        .with_context(|| format!("Unknown category {:?}", args.category))?;

    let report_data = reorder(&s.catalog, &s.classifier, &mut s.doc, code, args.floor)?;
    if !ctx.quiet {
        eprint!("{}", report::render_reorder(&s.catalog, &report_data));
    }
    write_output(args.output.as_ref(), &s.doc.render(), ctx)
}
