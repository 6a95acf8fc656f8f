//! Category catalog: the fixed namespace of relay logic variables.
//!
//! Every symbol the rewriter understands belongs to one of a small set of
//! capacity-bounded categories (latches, timers, math variables, ...). The
//! catalog is an immutable value built once and passed explicitly to every
//! component; nothing in this crate keeps category data in global state.

use std::fmt;

use serde::Serialize;

/// The two parallel namespaces a category can live in.
///
/// Protection and automation pools are structurally equivalent but may
/// differ in capacity and numeric width (e.g. `PSV01` vs `ASV001`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Protection,
    Automation,
}

impl Domain {
    /// Leading letter carried by every category code in this domain.
    pub fn letter(self) -> char {
        match self {
            Domain::Protection => 'P',
            Domain::Automation => 'A',
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Protection => write!(f, "protection"),
            Domain::Automation => write!(f, "automation"),
        }
    }
}

/// Identifier of one variable category. The vocabulary is closed, so an
/// enum keeps instances cheap to copy and impossible to misspell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CategoryCode {
    /// Protection boolean (status) variables
    Psv,
    /// Protection math variables
    Pmv,
    /// Protection latches
    Plt,
    /// Protection conditioning timers (pickup/dropoff)
    Pct,
    /// Protection sequencing timers (preset/elapsed)
    Pst,
    /// Protection counters
    Pcn,
    /// Automation boolean variables
    Asv,
    /// Automation math variables
    Amv,
    /// Automation latches
    Alt,
    /// Automation sequencing timers
    Ast,
    /// Automation counters
    Acn,
}

impl CategoryCode {
    pub const ALL: [CategoryCode; 11] = [
        CategoryCode::Psv,
        CategoryCode::Pmv,
        CategoryCode::Plt,
        CategoryCode::Pct,
        CategoryCode::Pst,
        CategoryCode::Pcn,
        CategoryCode::Asv,
        CategoryCode::Amv,
        CategoryCode::Alt,
        CategoryCode::Ast,
        CategoryCode::Acn,
    ];

    /// Three-letter code as it appears in source text.
    pub fn as_str(self) -> &'static str {
        match self {
            CategoryCode::Psv => "PSV",
            CategoryCode::Pmv => "PMV",
            CategoryCode::Plt => "PLT",
            CategoryCode::Pct => "PCT",
            CategoryCode::Pst => "PST",
            CategoryCode::Pcn => "PCN",
            CategoryCode::Asv => "ASV",
            CategoryCode::Amv => "AMV",
            CategoryCode::Alt => "ALT",
            CategoryCode::Ast => "AST",
            CategoryCode::Acn => "ACN",
        }
    }

    pub fn parse(s: &str) -> Option<CategoryCode> {
        CategoryCode::ALL
            .into_iter()
            .find(|c| c.as_str() == s.to_ascii_uppercase())
    }
}

impl fmt::Display for CategoryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of one category.
#[derive(Debug, Clone)]
pub struct Category {
    pub code: CategoryCode,
    pub domain: Domain,
    /// Digits in the canonical numeric body (`PSV01` = 2, `ASV001` = 3).
    pub width: usize,
    /// Inclusive capacity bounds for instance numbers.
    pub bounds: (u16, u16),
    /// Field suffix templates, longest first so classification never
    /// mistakes `PLT13S` for bare `PLT13` with residue. `None` = the bare
    /// instance name itself is a valid token.
    pub fields: &'static [Option<&'static str>],
    /// Structurally equivalent category in the other domain, if any.
    /// Conditioning timers (PCT) have no automation counterpart.
    pub counterpart: Option<CategoryCode>,
}

impl Category {
    pub fn contains(&self, number: u16) -> bool {
        number >= self.bounds.0 && number <= self.bounds.1
    }

    /// Total instance capacity of the pool.
    pub fn capacity(&self) -> u16 {
        self.bounds.1 - self.bounds.0 + 1
    }
}

/// One concrete numbered member of a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Instance {
    pub code: CategoryCode,
    pub number: u16,
}

impl Instance {
    pub fn new(code: CategoryCode, number: u16) -> Self {
        Self { code, number }
    }

    /// Canonical textual form, zero-padded to the category's width.
    pub fn canonical(&self, catalog: &Catalog) -> String {
        let cat = catalog.get(self.code);
        format!("{}{:0w$}", self.code, self.number, w = cat.width)
    }
}

/// A field-qualified instance reference, e.g. `PLT13S` or bare `PSV04`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub instance: Instance,
    pub field: Option<&'static str>,
}

impl Token {
    /// Exact substring this token renders to in source text.
    pub fn text(&self, catalog: &Catalog) -> String {
        let mut s = self.instance.canonical(catalog);
        if let Some(f) = self.field {
            s.push_str(f);
        }
        s
    }
}

/// Immutable catalog of every known category.
#[derive(Debug, Clone)]
pub struct Catalog {
    categories: Vec<Category>,
}

const BARE: &[Option<&str>] = &[None];
const LATCH: &[Option<&str>] = &[Some("S"), Some("R"), None];
const COND_TIMER: &[Option<&str>] = &[Some("IN"), Some("PU"), Some("DO"), Some("Q")];
const SEQ_TIMER: &[Option<&str>] = &[Some("IN"), Some("PT"), Some("R"), Some("ET"), Some("Q")];
const COUNTER: &[Option<&str>] = &[Some("IN"), Some("PV"), Some("R"), Some("CV"), Some("Q")];

impl Catalog {
    /// Catalog for the SEL-400 series variable table.
    pub fn sel400() -> Self {
        use CategoryCode::*;
        use Domain::{Automation, Protection};

        let cat = |code, domain, width, bounds, fields, counterpart| Category {
            code,
            domain,
            width,
            bounds,
            fields,
            counterpart,
        };

        Self {
            categories: vec![
                cat(Psv, Protection, 2, (1, 64), BARE, Some(Asv)),
                cat(Pmv, Protection, 2, (1, 64), BARE, Some(Amv)),
                cat(Plt, Protection, 2, (1, 32), LATCH, Some(Alt)),
                cat(Pct, Protection, 2, (1, 32), COND_TIMER, None),
                cat(Pst, Protection, 2, (1, 32), SEQ_TIMER, Some(Ast)),
                cat(Pcn, Protection, 2, (1, 32), COUNTER, Some(Acn)),
                cat(Asv, Automation, 3, (1, 256), BARE, Some(Psv)),
                cat(Amv, Automation, 3, (1, 256), BARE, Some(Pmv)),
                cat(Alt, Automation, 2, (1, 32), LATCH, Some(Plt)),
                cat(Ast, Automation, 2, (1, 32), SEQ_TIMER, Some(Pst)),
                cat(Acn, Automation, 2, (1, 32), COUNTER, Some(Pcn)),
            ],
        }
    }

    pub fn get(&self, code: CategoryCode) -> &Category {
        // The constructor covers every CategoryCode variant.
        self.categories
            .iter()
            .find(|c| c.code == code)
            .unwrap_or_else(|| unreachable!("catalog covers all category codes"))
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }
}
