//! Hooks for the two silent recovery paths.
//!
//! Undecodable lines are dropped and recognized-keyword mismatches fall back
//! to generic decoding. Neither changes the result or fails the parse, but
//! both can be watched through a [`ParseObserver`].

/// A recognized keyword whose dedicated decoder gave up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordFallback {
    /// Block name or line verb that was recognized.
    pub keyword: String,
    /// 1-based logical line where decoding started.
    pub line: usize,
    /// What the decoder did not find.
    pub reason: &'static str,
}

/// Receives notifications while a file is parsed.
///
/// All methods default to doing nothing.
pub trait ParseObserver {
    /// A raw line (1-based) was dropped because it was not valid UTF-8.
    fn skipped_line(&mut self, raw_line: usize) {
        let _ = raw_line;
    }

    /// A recognized keyword was decoded generically instead.
    fn keyword_fallback(&mut self, fallback: &KeywordFallback) {
        let _ = fallback;
    }
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreDiagnostics;

impl ParseObserver for IgnoreDiagnostics {}

/// Observer that records everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Raw line numbers dropped during preprocessing.
    pub skipped_lines: Vec<usize>,
    /// Keyword decoders that fell back to generic decoding.
    pub fallbacks: Vec<KeywordFallback>,
}

impl Diagnostics {
    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.skipped_lines.is_empty() && self.fallbacks.is_empty()
    }
}

impl ParseObserver for Diagnostics {
    fn skipped_line(&mut self, raw_line: usize) {
        self.skipped_lines.push(raw_line);
    }

    fn keyword_fallback(&mut self, fallback: &KeywordFallback) {
        self.fallbacks.push(fallback.clone());
    }
}
