//! Parse options.

use esparse_ast::SourceType;

/// Options controlling a parse attempt.
#[derive(Debug, Clone)]
pub struct Options {
    /// Script vs module goal. Module input defaults to strict mode.
    pub source_type: SourceType,
    /// Explicit strict-mode override. `None` derives strictness from
    /// `source_type`.
    pub strict_mode: Option<bool>,
    /// Line number of the first line, for embedded sources.
    pub start_line: u32,
    /// Record the token stream on the output file.
    pub tokens: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            source_type: SourceType::Script,
            strict_mode: None,
            start_line: 1,
            tokens: false,
        }
    }
}

impl Options {
    pub fn module() -> Self {
        Self {
            source_type: SourceType::Module,
            ..Self::default()
        }
    }
}
