//! Ordered, identity-addressed document model for logic programs.
//!
//! Lines carry stable opaque identities that survive inserts and deletes;
//! numeric position is a derived view, never a stored reference. The
//! whole-document rename primitive resolves every pattern of a mapping in
//! one simultaneous pass over the source text; substituted output is
//! never re-scanned, so chained mappings like `PSV1→PSV2, PSV2→PSV3` can
//! not cascade.

use std::collections::HashMap;

use aho_corasick::{AhoCorasick, MatchKind};
use indexmap::IndexMap;
use regex::Regex;

use crate::core::error::LogicError;
use crate::core::tokenize::comment_start;

/// Stable, opaque identity of one line. Never reused within a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Equation,
    CommentOnly,
    Blank,
}

/// One source line: comment-stripped equation text plus the verbatim
/// trailing comment (marker included).
#[derive(Debug, Clone)]
pub struct LogicLine {
    equation: String,
    comment: String,
}

impl LogicLine {
    fn parse(raw: &str) -> Self {
        match comment_start(raw) {
            Some(pos) => Self {
                equation: raw[..pos].trim().to_string(),
                comment: raw[pos..].to_string(),
            },
            None => Self {
                equation: raw.trim().to_string(),
                comment: String::new(),
            },
        }
    }

    pub fn equation(&self) -> &str {
        &self.equation
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn kind(&self) -> LineKind {
        match (self.equation.is_empty(), self.comment.is_empty()) {
            (false, _) => LineKind::Equation,
            (true, false) => LineKind::CommentOnly,
            (true, true) => LineKind::Blank,
        }
    }

    /// `"<equation> <comment>"`, or just one of the two when the other is
    /// empty.
    pub fn render(&self) -> String {
        match self.kind() {
            LineKind::Equation if self.comment.is_empty() => self.equation.clone(),
            LineKind::Equation => format!("{} {}", self.equation, self.comment),
            LineKind::CommentOnly => self.comment.clone(),
            LineKind::Blank => String::new(),
        }
    }

    /// Left-hand-side symbol of an assignment, if this is one.
    pub fn lhs(&self) -> Option<&str> {
        let mut it = self.equation.split_whitespace();
        let lhs = it.next()?;
        (it.next()? == ":=").then_some(lhs)
    }

    /// Right-hand-side expression text of an assignment, if this is one.
    pub fn rhs(&self) -> Option<&str> {
        let (_, rhs) = self.equation.split_once(":=")?;
        Some(rhs.trim())
    }
}

/// Ordered sequence of identity-addressed lines.
#[derive(Debug, Clone, Default)]
pub struct LogicDocument {
    order: Vec<LineId>,
    lines: HashMap<LineId, LogicLine>,
    next_id: u64,
    trailing_newline: bool,
}

impl LogicDocument {
    pub fn parse(text: &str) -> Self {
        let mut doc = Self {
            trailing_newline: text.ends_with('\n'),
            ..Self::default()
        };
        let body = text.strip_suffix('\n').unwrap_or(text);
        if !body.is_empty() || text.ends_with('\n') {
            for raw in body.split('\n') {
                doc.push(LogicLine::parse(raw));
            }
        }
        doc
    }

    fn fresh_id(&mut self) -> LineId {
        let id = LineId(self.next_id);
        self.next_id += 1;
        id
    }

    fn push(&mut self, line: LogicLine) -> LineId {
        let id = self.fresh_id();
        self.order.push(id);
        self.lines.insert(id, line);
        id
    }

    /// Regenerate document text. With zero edits this reproduces the
    /// parsed canonical text byte-for-byte per line.
    pub fn render(&self) -> String {
        let mut out = self
            .order
            .iter()
            .map(|id| self.lines[id].render())
            .collect::<Vec<_>>()
            .join("\n");
        if self.trailing_newline {
            out.push('\n');
        }
        out
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Lines in document order.
    pub fn iter(&self) -> impl Iterator<Item = (LineId, &LogicLine)> {
        self.order.iter().map(|id| (*id, &self.lines[id]))
    }

    pub fn line(&self, id: LineId) -> Option<&LogicLine> {
        self.lines.get(&id)
    }

    /// Derived, on-demand position of a line (0-based).
    pub fn position_of(&self, id: LineId) -> Option<usize> {
        self.order.iter().position(|x| *x == id)
    }

    /// Every line whose LHS assignment symbol equals `symbol`. More than
    /// one hit is the caller's ambiguity to surface, never silently
    /// resolved here.
    pub fn definitions_of(&self, symbol: &str) -> Vec<LineId> {
        self.iter()
            .filter(|(_, line)| line.lhs() == Some(symbol))
            .map(|(id, _)| id)
            .collect()
    }

    /// Lines whose equation text matches the pattern.
    pub fn find_matching(&self, pattern: &Regex) -> Vec<LineId> {
        self.iter()
            .filter(|(_, line)| pattern.is_match(line.equation()))
            .map(|(id, _)| id)
            .collect()
    }

    /// Literal, symbol-boundary-guarded substitution of one token on every
    /// equation. Comments are untouched. Returns the changed lines.
    pub fn replace(&mut self, old: &str, new: &str) -> Result<Vec<LineId>, LogicError> {
        let mut mapping = IndexMap::new();
        mapping.insert(old.to_string(), new.to_string());
        self.multi_replace(&mapping)
    }

    /// Apply an entire old→new mapping in one simultaneous, non-cascading
    /// pass. At every position the leftmost (longest on ties) match among
    /// all keys wins and is replaced by its own value; generated output is
    /// never re-scanned within the pass.
    pub fn multi_replace(
        &mut self,
        mapping: &IndexMap<String, String>,
    ) -> Result<Vec<LineId>, LogicError> {
        if mapping.is_empty() {
            return Ok(Vec::new());
        }
        let engine = SubstitutionEngine::compile(mapping)?;

        let mut changed = Vec::new();
        for id in &self.order {
            let line = self
                .lines
                .get_mut(id)
                .unwrap_or_else(|| unreachable!("ordered id always present"));
            if let Some(new_eqn) = engine.apply(&line.equation) {
                line.equation = new_eqn;
                changed.push(*id);
            }
        }
        Ok(changed)
    }

    /// Insert a new equation line after `after`, keeping all other
    /// identities stable.
    pub fn insert_after(
        &mut self,
        after: LineId,
        equation: &str,
        comment: Option<&str>,
    ) -> Result<LineId, LogicError> {
        let pos = self.position_of(after).ok_or(LogicError::UnknownLine)?;
        let id = self.fresh_id();
        self.order.insert(pos + 1, id);
        self.lines.insert(
            id,
            LogicLine {
                equation: equation.trim().to_string(),
                comment: comment.unwrap_or("").to_string(),
            },
        );
        Ok(id)
    }

    pub fn delete(&mut self, id: LineId) -> Result<(), LogicError> {
        let pos = self.position_of(id).ok_or(LogicError::UnknownLine)?;
        self.order.remove(pos);
        self.lines.remove(&id);
        Ok(())
    }

    /// Overwrite a line's equation. The existing comment is preserved
    /// unless a new one is given.
    pub fn replace_line(
        &mut self,
        id: LineId,
        equation: &str,
        comment: Option<&str>,
    ) -> Result<(), LogicError> {
        let line = self.lines.get_mut(&id).ok_or(LogicError::UnknownLine)?;
        line.equation = equation.trim().to_string();
        if let Some(c) = comment {
            line.comment = c.to_string();
        }
        Ok(())
    }
}

/// Compiled simultaneous-substitution pass: one combined leftmost-longest
/// matcher tagged by rule, each match resolved against only its own rule.
pub struct SubstitutionEngine {
    matcher: AhoCorasick,
    replacements: Vec<String>,
}

impl SubstitutionEngine {
    pub fn compile(mapping: &IndexMap<String, String>) -> Result<Self, LogicError> {
        if let Some(empty) = mapping.keys().find(|k| k.is_empty()) {
            return Err(LogicError::BadRenameMapping(format!(
                "empty pattern (maps to {:?})",
                mapping[empty.as_str()]
            )));
        }
        let matcher = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .build(mapping.keys())
            .map_err(|e| LogicError::BadRenameMapping(e.to_string()))?;
        Ok(Self {
            matcher,
            replacements: mapping.values().cloned().collect(),
        })
    }

    /// Apply the pass to one equation. Returns `None` when nothing
    /// matched. Matches inside a longer identifier are skipped, so a rule
    /// for `PSV1` never fires inside `PSV12` or a residual point name.
    pub fn apply(&self, text: &str) -> Option<String> {
        let bytes = text.as_bytes();
        let mut out = String::with_capacity(text.len());
        let mut last = 0usize;
        let mut changed = false;

        for m in self.matcher.find_iter(text) {
            let left_ok = m.start() == 0 || !is_symbol_byte(bytes[m.start() - 1]);
            let right_ok = m.end() == bytes.len() || !is_symbol_byte(bytes[m.end()]);
            if left_ok && right_ok {
                out.push_str(&text[last..m.start()]);
                out.push_str(&self.replacements[m.pattern().as_usize()]);
                last = m.end();
                changed = true;
            }
        }
        if !changed {
            return None;
        }
        out.push_str(&text[last..]);
        Some(out)
    }
}

fn is_symbol_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
