//! Syntax engine: lazily built, per-language tree-sitter handles.

use dashmap::DashMap;
use log::{debug, trace};
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};
use tree_sitter::{Parser, Point, Query, QueryCursor, Tree};

use crate::{cancel::CancellationToken, error::AnalyzeError, languages::Language};

/// Input is handed to the parser in chunks of this size; the cancellation
/// token is polled before each one.
const PARSE_CHUNK_BYTES: usize = 16 * 1024;

/// Capture name to matched text for one query match.
pub type CaptureSet = BTreeMap<String, String>;

/// Parser plus compiled query for one language.
///
/// Not safe for concurrent use; the registry hands it out behind a mutex and
/// callers hold the lock across one parse-then-query unit of work.
pub struct SyntaxHandle {
    language: Language,
    parser: Parser,
    query: Query,
}

impl SyntaxHandle {
    fn new(language: Language) -> Result<Self, AnalyzeError> {
        debug!("Loading {} parser", language);
        let grammar = language.grammar();

        let mut parser = Parser::new();
        parser
            .set_language(&grammar)
            .map_err(|source| AnalyzeError::LanguageSetup { language, source })?;

        let query = Query::new(&grammar, language.spec().query)
            .map_err(|source| AnalyzeError::QueryFailure { language, source })?;

        Ok(Self { language, parser, query })
    }

    /// Parses `source`, aborting early once `cancel` fires.
    ///
    /// Returns `Ok(None)` when the engine could not produce a tree and
    /// `Err(Canceled)` when cancellation was observed; a tree built from
    /// truncated input is never returned.
    pub fn parse(
        &mut self,
        source: &[u8],
        cancel: &CancellationToken,
    ) -> Result<Option<Tree>, AnalyzeError> {
        cancel.check()?;

        let len = source.len();
        let mut input = |offset: usize, _: Point| {
            if offset >= len || cancel.is_cancelled() {
                return &source[0..0];
            }
            let end = (offset + PARSE_CHUNK_BYTES).min(len);
            &source[offset..end]
        };
        let tree = self.parser.parse_with(&mut input, None);

        cancel.check()?;
        Ok(tree)
    }

    /// Runs the language query over `tree`. Captures whose name starts with
    /// `_` only feed predicates and are left out.
    pub fn captures(&self, tree: &Tree, source: &[u8]) -> Vec<CaptureSet> {
        let names = self.query.capture_names();
        let mut cursor = QueryCursor::new();
        let mut sets = Vec::new();

        for m in cursor.matches(&self.query, tree.root_node(), source) {
            let mut set = CaptureSet::new();
            for capture in m.captures {
                let name = names[capture.index as usize];
                if name.starts_with('_') {
                    continue;
                }
                match capture.node.utf8_text(source) {
                    Ok(text) => {
                        set.insert(name.to_string(), text.to_string());
                    }
                    Err(e) => trace!("Skipping non-UTF-8 {} capture '{}': {}", self.language, name, e),
                }
            }
            if !set.is_empty() {
                sets.push(set);
            }
        }

        sets
    }
}

/// One handle per language, created on first request and kept until the
/// registry is cleared or dropped. Owned by the caller and passed down
/// explicitly.
#[derive(Default)]
pub struct ParserRegistry {
    handles: DashMap<Language, Arc<Mutex<SyntaxHandle>>>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self { handles: DashMap::new() }
    }

    pub fn acquire(&self, language: Language) -> Result<Arc<Mutex<SyntaxHandle>>, AnalyzeError> {
        if let Some(handle) = self.handles.get(&language) {
            trace!("Reusing {} parser", language);
            return Ok(Arc::clone(handle.value()));
        }

        let entry = self
            .handles
            .entry(language)
            .or_try_insert_with(|| SyntaxHandle::new(language).map(|h| Arc::new(Mutex::new(h))))?;
        Ok(Arc::clone(entry.value()))
    }

    pub fn loaded(&self) -> usize {
        self.handles.len()
    }

    pub fn clear(&self) {
        if !self.handles.is_empty() {
            debug!("Closing {} parser handles", self.handles.len());
        }
        self.handles.clear();
    }
}

impl Drop for ParserRegistry {
    fn drop(&mut self) {
        self.clear();
    }
}
