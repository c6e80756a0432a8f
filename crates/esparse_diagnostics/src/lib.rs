//! esparse_diagnostics: Syntax errors and the parser message catalog.
//!
//! Every error the lexer or grammar engine raises carries the character
//! offset it was raised at, the line/column position derived from that
//! offset, and a human-readable message from the catalog below. Errors
//! abort the current parse attempt immediately; there is no recovery at
//! this layer.

use esparse_core::Position;

/// A syntax error positioned in the source text.
///
/// Formatting matches the upstream convention of appending the location to
/// the message, e.g. `Unexpected token (1:4)`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message} ({loc})")]
pub struct SyntaxError {
    /// Character offset the error was raised at.
    pub pos: u32,
    /// Line/column of `pos`.
    pub loc: Position,
    pub message: String,
}

impl SyntaxError {
    pub fn new(pos: u32, loc: Position, message: impl Into<String>) -> Self {
        Self {
            pos,
            loc,
            message: message.into(),
        }
    }
}

/// Result alias used by every fallible parser operation.
pub type ParseResult<T> = Result<T, SyntaxError>;

/// Format a message template by replacing `{0}`, `{1}`, etc. with arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

// ============================================================================
// Message catalog
// ============================================================================

pub mod messages {
    // ------------------------------------------------------------------------
    // Lexer errors
    // ------------------------------------------------------------------------
    pub const UNEXPECTED_CHARACTER: &str = "Unexpected character '{0}'";
    pub const UNTERMINATED_STRING: &str = "Unterminated string constant";
    pub const UNTERMINATED_COMMENT: &str = "Unterminated comment";
    pub const UNTERMINATED_REGEXP: &str = "Unterminated regular expression";
    pub const UNTERMINATED_TEMPLATE: &str = "Unterminated template";
    pub const INVALID_NUMBER: &str = "Invalid number";
    pub const IDENTIFIER_AFTER_NUMBER: &str = "Identifier directly after number";
    pub const INVALID_UNICODE_ESCAPE: &str = "Invalid Unicode escape";
    pub const EXPECTED_UNICODE_ESCAPE: &str = "Expecting Unicode escape sequence \\uXXXX";
    pub const BAD_CHARACTER_ESCAPE: &str = "Bad character escape sequence";
    pub const CODE_POINT_OUT_OF_BOUNDS: &str = "Code point out of bounds";
    pub const EXPECTED_NUMBER_IN_RADIX: &str = "Expected number in radix {0}";
    pub const INVALID_TEMPLATE_ESCAPE: &str = "Invalid escape sequence in template";
    pub const INVALID_REGEXP_FLAG: &str = "Invalid regular expression flag";
    pub const DUPLICATE_REGEXP_FLAG: &str = "Duplicate regular expression flag";

    // ------------------------------------------------------------------------
    // Grammar errors
    // ------------------------------------------------------------------------
    pub const UNEXPECTED_TOKEN: &str = "Unexpected token";
    pub const EXPECTED_TOKEN: &str = "Unexpected token, expected {0}";
    pub const RETURN_OUTSIDE_FUNCTION: &str = "'return' outside of function";
    pub const UNSYNTACTIC: &str = "Unsyntactic {0}";
    pub const LABEL_ALREADY_DECLARED: &str = "Label '{0}' is already declared";
    pub const DECORATORS_NEED_CLASS: &str =
        "Leading decorators must be attached to a class declaration";
    pub const OCTAL_IN_STRICT_MODE: &str = "Octal literal in strict mode";
    pub const DELETE_LOCAL_VARIABLE_STRICT: &str = "Deleting local variable in strict mode";
    pub const SUPER_OUTSIDE: &str = "'super' outside of function or class";
    pub const SUPER_CALL_OUTSIDE_CONSTRUCTOR: &str = "super() outside of class constructor";
    pub const BINDING_RVALUE: &str = "Binding rvalue";
    pub const DUPLICATE_CONSTRUCTOR: &str = "Duplicate constructor in the same class";
    pub const COMPLEX_BINDING_REQUIRES_INIT: &str =
        "Complex binding patterns require an initialization value";
    pub const ILLEGAL_USE_STRICT_NON_SIMPLE: &str =
        "Illegal 'use strict' directive in function with non-simple parameter list";

    // ------------------------------------------------------------------------
    // Lvalue / binding errors
    // ------------------------------------------------------------------------
    pub const ASSIGNING_TO_RVALUE: &str = "Assigning to rvalue";
    pub const BINDING_MEMBER_EXPRESSION: &str = "Binding member expression";
    pub const ONLY_EQ_DEFAULT: &str =
        "Only '=' operator can be used for specifying default value.";
    pub const SHORTHAND_ONLY_DESTRUCTURING: &str =
        "Shorthand property assignments are valid only in destructuring patterns";
    pub const BINDING_IN_STRICT_MODE: &str = "Binding {0} in strict mode";
    pub const ASSIGNING_IN_STRICT_MODE: &str = "Assigning to {0} in strict mode";
    pub const ARGUMENT_NAME_CLASH: &str = "Argument name clash in strict mode";

    // ------------------------------------------------------------------------
    // Object members and patterns
    // ------------------------------------------------------------------------
    pub const GETTER_NO_PARAMS: &str = "getter should have no params";
    pub const SETTER_EXACTLY_ONE_PARAM: &str = "setter should have exactly one param";
    pub const PROTO_REDEFINITION: &str = "Redefinition of __proto__ property";
    pub const PATTERN_NO_ACCESSOR: &str = "Object pattern can't contain getter or setter";
    pub const PATTERN_NO_METHODS: &str = "Object pattern can't contain methods";

    // ------------------------------------------------------------------------
    // Modules
    // ------------------------------------------------------------------------
    pub const ONLY_ONE_DEFAULT_EXPORT: &str = "Only one default export allowed per module.";
    pub const DUPLICATE_EXPORT: &str =
        "`{0}` has already been exported. Exported identifiers must be unique.";
    pub const IMPORT_EXPORT_TOP_LEVEL: &str =
        "'import' and 'export' may only appear at the top level";
    pub const IMPORT_EXPORT_MODULE: &str =
        "'import' and 'export' may appear only with 'sourceType: \"module\"'";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message() {
        assert_eq!(
            format_message(messages::LABEL_ALREADY_DECLARED, &["loop"]),
            "Label 'loop' is already declared"
        );
        assert_eq!(
            format_message(messages::UNEXPECTED_TOKEN, &[]),
            "Unexpected token"
        );
    }

    #[test]
    fn test_syntax_error_display() {
        let err = SyntaxError::new(4, Position::new(1, 4), "Unexpected token");
        assert_eq!(err.to_string(), "Unexpected token (1:4)");
    }
}
