//! **relogic** - Analysis and rewriting toolkit for protective-relay control logic
//!
//! Parses SEL-400 series logic equation text, reports element usage per
//! category, and performs safe bulk rewrites: renames, protection/automation
//! domain moves, timer conversions and renumbering.

/// Command-line interface with clap integration
pub mod cli;

/// Command runners wiring CLI arguments to the core engines
pub mod commands;
pub use commands::{
    change_domain_run, convert_timers_run, lines_run, rename_run, reorder_run, usage_run,
};

/// Core engines - classification, indexing and document rewriting
pub mod core {
    /// Static element catalog: categories, widths, bounds and field suffixes
    pub mod catalog;
    pub use catalog::{Catalog, Category, CategoryCode, Domain, Instance, Token};

    /// Error taxonomy shared by every engine
    pub mod error;
    pub use error::LogicError;

    /// Equation tokenizer and element classifier
    pub mod tokenize;
    pub use tokenize::Classifier;

    /// Line-identity preserving logic document with non-cascading substitution
    pub mod document;
    pub use document::{LineId, LogicDocument, SubstitutionEngine};

    /// Free-slot computation and ordered allocation
    pub mod alloc;

    /// Whole-document usage index and report model
    pub mod usage;
    pub use usage::{UsageIndex, UsageReport};

    /// Protection/automation domain moves
    pub mod convert;
    pub use convert::{DomainReport, Selector, change_domain};

    /// Conditioning-to-sequencing timer conversion
    pub mod timer;
    pub use timer::{TimerOptions, TimerOutcome, convert_timers};

    /// Category renumbering onto fresh slots
    pub mod reorder;
    pub use reorder::{ReorderReport, reorder};

    /// Human-readable report rendering (tables, colorized summaries)
    pub mod report;
}

/// Infrastructure - Configuration and I/O
pub mod infra {
    /// Configuration management with TOML support
    pub mod config;
    pub use config::{Config, init as config_init, load_config};

    /// Input reading (file or stdin) and dry-run aware output writing
    pub mod io;
    pub use io::{read_input, write_output};
}

// Strategic re-exports for clean CLI interface
pub use cli::{AppContext, Cli, Commands};
pub use core::{Catalog, Classifier, LogicDocument, LogicError};
pub use infra::{Config, load_config};
