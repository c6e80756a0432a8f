//! esparse_core: Core source-text types for the esparse parser.
//!
//! Provides positions, source locations, node spans, and the comment/token
//! trivia records shared between the lexer, the AST, and diagnostics.

pub mod text;
pub mod trivia;

// Re-export commonly used types
pub use text::{position_at, Position, SourceLocation, Span};
pub use trivia::{Comment, CommentKind, TokenRecord};
