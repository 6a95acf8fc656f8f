//! Tokenizer and symbol classifier for single-line logic equations.
//!
//! An equation line is split on whitespace, then each token is stripped of
//! operator/keyword/bracket cruft through ordered substitution passes. What
//! survives is either a catalog symbol (`PLT13S`, `ASV042`) or a residual
//! token: an external relay point, alias or literal. Residuals are reported,
//! never treated as errors.

use memchr::memchr;
use regex::Regex;

use crate::core::catalog::{Catalog, CategoryCode, Instance, Token};

/// Math function names that can prefix a call, e.g. `FLOOR(PMV03)`.
const FUNCTIONS: [&str; 11] = [
    "ABS", "ASIN", "ACOS", "CEIL", "COS", "EXP", "FLOOR", "LN", "LOG", "SIN", "SQRT",
];

/// Comment marker. Everything from the first `#` to end of line.
pub const COMMENT_MARKER: u8 = b'#';

/// Byte offset of the comment marker, if the line carries one.
pub fn comment_start(line: &str) -> Option<usize> {
    memchr(COMMENT_MARKER, line.as_bytes())
}

/// Strip the trailing comment (if any) and surrounding whitespace.
pub fn strip_comment(line: &str) -> &str {
    match comment_start(line) {
        Some(pos) => line[..pos].trim(),
        None => line.trim(),
    }
}

/// Split an equation into whitespace-separated raw tokens.
pub fn tokenize(eqn: &str) -> impl Iterator<Item = &str> {
    eqn.split_whitespace()
}

/// Result of classifying the tokens of one line.
#[derive(Debug, Clone, Default)]
pub struct LineComponents {
    /// Every surviving element, catalog symbols and residuals alike.
    pub elements: Vec<String>,
    /// Catalog symbols, field-qualified.
    pub symbols: Vec<Token>,
    /// Tokens no category template matched.
    pub residuals: Vec<String>,
}

/// Compiled matchers for the fixed equation vocabulary and every category
/// field template. Built once from a [`Catalog`] and reused for a whole
/// document scan.
pub struct Classifier {
    /// (category, field, anchored matcher) per template, longest suffix
    /// first within a category.
    templates: Vec<(CategoryCode, Option<&'static str>, Regex)>,
    functions: Regex,
    keywords: Regex,
    numeric: Regex,
}

impl Classifier {
    pub fn new(catalog: &Catalog) -> Self {
        let mut templates = Vec::new();
        for cat in catalog.categories() {
            for field in cat.fields {
                let suffix = field.unwrap_or("");
                let pattern = format!("^{}([0-9]{{{}}}){}$", cat.code, cat.width, suffix);
                // Patterns are assembled from fixed catalog data; they are
                // valid by construction.
                let re = Regex::new(&pattern).unwrap_or_else(|e| {
                    unreachable!("invalid template pattern {pattern:?}: {e}")
                });
                templates.push((cat.code, *field, re));
            }
        }

        let fn_alt = FUNCTIONS.join("|");
        Self {
            templates,
            functions: Regex::new(&format!(r"({fn_alt})\(")).unwrap_or_else(|_| unreachable!()),
            keywords: Regex::new(r"AND|NOT|OR|R_TRIG|F_TRIG").unwrap_or_else(|_| unreachable!()),
            // Digits optional on both sides so bare fractions like `.5`
            // still count; callers filter the empty string first.
            numeric: Regex::new(r"^-?[0-9]*\.?[0-9]*$").unwrap_or_else(|_| unreachable!()),
        }
    }

    /// Classify one cleaned token against every category template.
    /// Returns `None` for residuals, including numbers that fall outside
    /// the category's capacity bounds.
    pub fn classify_token(&self, catalog: &Catalog, token: &str) -> Option<Token> {
        for (code, field, re) in &self.templates {
            if let Some(caps) = re.captures(token) {
                let number: u16 = caps[1].parse().ok()?;
                if !catalog.get(*code).contains(number) {
                    return None;
                }
                return Some(Token {
                    instance: Instance::new(*code, number),
                    field: *field,
                });
            }
        }
        None
    }

    /// Strip operators, keywords, brackets and function prefixes from the
    /// tokens of one comment-free equation. Duplicates and ordering are
    /// preserved; numeric literals survive only when `keep_numbers`.
    pub fn equation_elements(&self, eqn: &str, keep_numbers: bool) -> Vec<String> {
        tokenize(eqn)
            .filter_map(|tok| {
                // Function prefixes go first so `FLOOR(` is consumed whole
                // before the keyword pass can eat the `OR` inside it.
                let t = self.functions.replace_all(tok, "");
                let t = t.replace(['+', '*', '/'], "");
                let t = if t == ":=" { String::new() } else { t };
                let t = self.keywords.replace_all(&t, "").into_owned();
                let t: String = t
                    .chars()
                    .filter(|c| !matches!(c, '<' | '>' | '(' | ')' | '='))
                    .collect();
                if t.is_empty() {
                    return None;
                }
                if !keep_numbers && self.numeric.is_match(&t) {
                    return None;
                }
                Some(t)
            })
            .collect()
    }

    /// Break one line (comment allowed) into elements, catalog symbols and
    /// residual tokens.
    pub fn line_components(&self, catalog: &Catalog, line: &str) -> LineComponents {
        let eqn = strip_comment(line);
        let elements = self.equation_elements(eqn, false);

        let mut symbols = Vec::new();
        let mut residuals = Vec::new();
        for el in &elements {
            match self.classify_token(catalog, el) {
                Some(tok) => symbols.push(tok),
                None => residuals.push(el.clone()),
            }
        }

        LineComponents {
            elements,
            symbols,
            residuals,
        }
    }

    /// Per-line logic cost: every surviving token (numbers and duplicates
    /// retained) plus one per function call.
    pub fn count_elements_used(&self, line: &str) -> usize {
        let eqn = strip_comment(line);
        let elements = self.equation_elements(eqn, true);
        let functions = self.functions.find_iter(eqn).count();
        elements.len() + functions
    }

    /// Whether a token is purely a numeric literal.
    pub fn is_numeric(&self, token: &str) -> bool {
        self.numeric.is_match(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> (Catalog, Classifier) {
        let catalog = Catalog::sel400();
        let cls = Classifier::new(&catalog);
        (catalog, cls)
    }

    #[test]
    fn strip_comment_drops_trailing_text() {
        assert_eq!(strip_comment("PSV01 := X # note"), "PSV01 := X");
        assert_eq!(strip_comment("# whole line"), "");
        assert_eq!(strip_comment("  PSV01 := X  "), "PSV01 := X");
    }

    #[test]
    fn classify_field_qualified_tokens() {
        let (catalog, cls) = classifier();

        let tok = cls.classify_token(&catalog, "PLT13S").unwrap();
        assert_eq!(tok.instance, Instance::new(CategoryCode::Plt, 13));
        assert_eq!(tok.field, Some("S"));

        let bare = cls.classify_token(&catalog, "PLT13").unwrap();
        assert_eq!(bare.field, None);

        let wide = cls.classify_token(&catalog, "ASV042").unwrap();
        assert_eq!(wide.instance, Instance::new(CategoryCode::Asv, 42));
    }

    #[test]
    fn out_of_bounds_numbers_are_residual() {
        let (catalog, cls) = classifier();
        // PLT pool ends at 32.
        assert!(cls.classify_token(&catalog, "PLT33").is_none());
        // Unpadded numbers do not match the exact-width template.
        assert!(cls.classify_token(&catalog, "PSV1").is_none());
    }

    #[test]
    fn residuals_survive_classification() {
        let (catalog, cls) = classifier();
        let comps =
            cls.line_components(&catalog, "PSV08 := (PCT19Q OR IN203) AND NOT 52CLS # cmt");
        let names: Vec<&str> = comps.symbols.iter().map(|t| t.field.unwrap_or("")).collect();
        assert_eq!(comps.symbols.len(), 2); // PSV08, PCT19Q
        assert_eq!(names, ["", "Q"]);
        assert_eq!(comps.residuals, ["IN203", "52CLS"]);
    }

    #[test]
    fn count_elements_handles_functions_and_duplicates() {
        let (_, cls) = classifier();
        // PSV44, PSV44, PMV64, 2.000000, TRIP + one function call = 6
        let line = "PSV50 := FLOOR(PMV64) AND (PSV44 OR PSV44) AND 2.000000 AND TRIP";
        // Elements: PSV50, PMV64, PSV44, PSV44, 2.000000, TRIP = 6 + 1 fn
        assert_eq!(cls.count_elements_used(line), 7);
    }

    #[test]
    fn edge_keywords_are_removed() {
        let (catalog, cls) = classifier();
        let comps = cls.line_components(&catalog, "PLT15S := R_TRIG RB16");
        assert_eq!(comps.residuals, ["RB16"]);
        assert_eq!(comps.symbols.len(), 1);
    }

    #[test]
    fn bare_fraction_literals_count_as_numeric() {
        let (_, cls) = classifier();
        assert!(cls.is_numeric(".5"));
        assert!(cls.is_numeric("-0.5"));
        assert!(cls.is_numeric("2."));
        assert!(!cls.is_numeric("50P1"));

        let elements = cls.equation_elements("PMV01 := PMV02 * .5", false);
        assert_eq!(elements, ["PMV01", "PMV02"]);
    }

    #[test]
    fn function_prefix_survives_keyword_pass() {
        let (_, cls) = classifier();
        // FLOOR contains OR; the function pass must consume it first.
        let elements = cls.equation_elements("PMV01 := FLOOR(PMV02)", false);
        assert_eq!(elements, ["PMV01", "PMV02"]);
    }
}
