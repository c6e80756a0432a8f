//! Comment and token records collected alongside the AST.
//!
//! The lexer appends these to the state record's buffers as it scans; the
//! finished `File` output carries them so downstream tools can recover the
//! full trivia stream.

use crate::text::{SourceLocation, TextPos};
use serde::Serialize;

/// The flavor of a source comment.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
pub enum CommentKind {
    CommentLine,
    CommentBlock,
}

/// A single source comment with its text (delimiters stripped) and extent.
#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    #[serde(rename = "type")]
    pub kind: CommentKind,
    pub value: String,
    pub start: TextPos,
    pub end: TextPos,
    pub loc: SourceLocation,
}

/// A recorded token, emitted when token recording is enabled in the parse
/// options. The `label` is the token kind's display label; `value` is the
/// token's text payload where one exists (identifier names, literal text).
#[derive(Debug, Clone, Serialize)]
pub struct TokenRecord {
    #[serde(rename = "type")]
    pub label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub start: TextPos,
    pub end: TextPos,
    pub loc: SourceLocation,
}
