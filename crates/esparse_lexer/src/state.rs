//! The parser state record.
//!
//! One `State` exists per parse attempt, plus one temporary clone per
//! speculative attempt. The grammar engine mutates it as it consumes tokens;
//! snapshotting it and restoring the snapshot is how backtracking works.

use crate::context::TokenContext;
use crate::options::Options;
use crate::token::{TokenKind, TokenValue};
use esparse_ast::{Decorator, MethodKind, SourceType};
use esparse_core::{Comment, Position, TokenRecord};
use std::cell::RefCell;
use std::rc::Rc;

bitflags::bitflags! {
    /// Mode flags tracking what kind of construct is being parsed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ScopeFlags: u16 {
        const IN_FUNCTION           = 1 << 0;
        const IN_GENERATOR          = 1 << 1;
        const IN_ASYNC              = 1 << 2;
        const IN_CLASS              = 1 << 3;
        const IN_CLASS_PROPERTY     = 1 << 4;
        const IN_PROPERTY_NAME      = 1 << 5;
        const IN_TYPE               = 1 << 6;
        const NO_ANON_FUNCTION_TYPE = 1 << 7;
    }
}

/// Label-scope kinds, used to validate `break`/`continue` targets.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LabelKind {
    Loop,
    Switch,
}

/// A label in scope: either an anonymous loop/switch marker or a named
/// statement label.
#[derive(Debug, Clone)]
pub struct Label {
    pub kind: Option<LabelKind>,
    pub name: Option<String>,
    pub statement_start: u32,
}

/// An open block frame recorded for comment attachment.
#[derive(Debug, Clone, Copy)]
pub struct CommentFrame {
    pub start: u32,
}

/// The append-only buffers of the state record.
///
/// Each buffer lives in a reference-counted cell so the two snapshot modes
/// of [`State::clone`] become a type-level distinction: a deep clone creates
/// fresh cells with copied contents, a cheap clone shares the cells with the
/// original.
#[derive(Debug, Clone)]
pub struct Buffers {
    /// Consumed tokens, recorded when the `tokens` option is set.
    pub tokens: Rc<RefCell<Vec<TokenRecord>>>,
    /// Every comment seen, in source order.
    pub comments: Rc<RefCell<Vec<Comment>>>,
    /// Comments pending leading attachment to an upcoming node.
    pub leading_comments: Rc<RefCell<Vec<Comment>>>,
    /// Comments pending trailing attachment to the last finished node.
    pub trailing_comments: Rc<RefCell<Vec<Comment>>>,
    /// Open block frames scoping comment attachment.
    pub comment_stack: Rc<RefCell<Vec<CommentFrame>>>,
    /// Labels in scope (loop/switch markers and named labels).
    pub labels: Rc<RefCell<Vec<Label>>>,
    /// Leading decorators awaiting a class declaration.
    pub decorators: Rc<RefCell<Vec<Decorator>>>,
    /// Exported names seen so far; `default` is stored for both
    /// `export default x` and `export { x as default }`.
    pub exported_identifiers: Rc<RefCell<Vec<String>>>,
}

impl Buffers {
    fn fresh() -> Self {
        Self {
            tokens: Rc::new(RefCell::new(Vec::new())),
            comments: Rc::new(RefCell::new(Vec::new())),
            leading_comments: Rc::new(RefCell::new(Vec::new())),
            trailing_comments: Rc::new(RefCell::new(Vec::new())),
            comment_stack: Rc::new(RefCell::new(Vec::new())),
            labels: Rc::new(RefCell::new(Vec::new())),
            decorators: Rc::new(RefCell::new(Vec::new())),
            exported_identifiers: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Independent copies of every buffer, for a full snapshot.
    fn deep_clone(&self) -> Self {
        Self {
            tokens: Rc::new(RefCell::new(self.tokens.borrow().clone())),
            comments: Rc::new(RefCell::new(self.comments.borrow().clone())),
            leading_comments: Rc::new(RefCell::new(self.leading_comments.borrow().clone())),
            trailing_comments: Rc::new(RefCell::new(self.trailing_comments.borrow().clone())),
            comment_stack: Rc::new(RefCell::new(self.comment_stack.borrow().clone())),
            labels: Rc::new(RefCell::new(self.labels.borrow().clone())),
            decorators: Rc::new(RefCell::new(self.decorators.borrow().clone())),
            exported_identifiers: Rc::new(RefCell::new(
                self.exported_identifiers.borrow().clone(),
            )),
        }
    }
}

/// The mutable record of lexer and parser progress.
pub struct State {
    /// Whether strict mode is in force.
    pub strict: bool,

    // ------------------------------------------------------------------
    // Lexer cursor
    // ------------------------------------------------------------------
    /// Current character offset.
    pub pos: usize,
    /// Offset of the start of the current line.
    pub line_start: usize,
    /// Current 1-based line number.
    pub cur_line: u32,

    // ------------------------------------------------------------------
    // Current token
    // ------------------------------------------------------------------
    pub kind: TokenKind,
    pub value: TokenValue,
    pub start: usize,
    pub end: usize,
    pub start_loc: Position,
    pub end_loc: Position,

    // ------------------------------------------------------------------
    // Previous token, for node end-finishing
    // ------------------------------------------------------------------
    pub last_token_start: usize,
    pub last_token_end: usize,
    pub last_token_start_loc: Position,
    pub last_token_end_loc: Position,

    /// Offset at which a potential arrow function's parameters start.
    pub potential_arrow_at: Option<usize>,

    /// Mode flags.
    pub flags: ScopeFlags,
    /// Which method kind is being parsed, when inside one.
    pub in_method: Option<MethodKind>,

    /// The syntactic context stack. Never empty.
    pub context: Vec<TokenContext>,
    /// Whether an expression (and thus a regex literal) may start here.
    pub expr_allowed: bool,

    // ------------------------------------------------------------------
    // Diagnostic markers
    // ------------------------------------------------------------------
    /// The current word token contained an escape sequence (escaped words
    /// must not be interpreted as keywords).
    pub contains_esc: bool,
    /// A string literal contained a legacy octal escape.
    pub contains_octal: bool,
    /// Offset of the first octal escape seen.
    pub octal_position: Option<usize>,
    /// Offset of an invalid escape inside a template, if any.
    pub invalid_template_escape_position: Option<usize>,

    /// Append-only buffers.
    pub buffers: Buffers,
}

impl State {
    /// Create a state positioned at the start of the input.
    pub fn init(options: &Options) -> Self {
        let strict = options
            .strict_mode
            .unwrap_or(options.source_type == SourceType::Module);
        let start_loc = Position::new(options.start_line, 0);
        Self {
            strict,
            pos: 0,
            line_start: 0,
            cur_line: options.start_line,
            kind: TokenKind::Eof,
            value: TokenValue::None,
            start: 0,
            end: 0,
            start_loc,
            end_loc: start_loc,
            last_token_start: 0,
            last_token_end: 0,
            last_token_start_loc: start_loc,
            last_token_end_loc: start_loc,
            potential_arrow_at: None,
            flags: ScopeFlags::empty(),
            in_method: None,
            context: vec![TokenContext::BraceStatement],
            expr_allowed: true,
            contains_esc: false,
            contains_octal: false,
            octal_position: None,
            invalid_template_escape_position: None,
            buffers: Buffers::fresh(),
        }
    }

    /// The line/column position of the cursor.
    pub fn cur_position(&self) -> Position {
        Position::new(self.cur_line, (self.pos - self.line_start) as u32)
    }

    /// The innermost syntactic context. The stack is never empty.
    pub fn cur_context(&self) -> TokenContext {
        *self
            .context
            .last()
            .unwrap_or(&TokenContext::BraceStatement)
    }

    /// Snapshot this record.
    ///
    /// Every scalar field is copied. The context stack is always given a
    /// fresh copy: context mutation is cheap and frequent during speculative
    /// lookahead and must not leak into the original record. The remaining
    /// buffers are deep-copied by default, but shared by reference when
    /// `skip_buffers` is requested — they are append-only during forward
    /// progress and safe to share when the clone exists purely for
    /// cursor-position bookkeeping rather than full backtracking.
    ///
    /// Aliasing hazard, by design: with `skip_buffers`, appends made through
    /// either record remain visible to the other. A caller that keeps the
    /// cheap clone's continuation running past the snapshot point will see
    /// the shared buffers grow past it.
    pub fn clone(&self, skip_buffers: bool) -> State {
        State {
            strict: self.strict,
            pos: self.pos,
            line_start: self.line_start,
            cur_line: self.cur_line,
            kind: self.kind,
            value: self.value.clone(),
            start: self.start,
            end: self.end,
            start_loc: self.start_loc,
            end_loc: self.end_loc,
            last_token_start: self.last_token_start,
            last_token_end: self.last_token_end,
            last_token_start_loc: self.last_token_start_loc,
            last_token_end_loc: self.last_token_end_loc,
            potential_arrow_at: self.potential_arrow_at,
            flags: self.flags,
            in_method: self.in_method,
            context: self.context.clone(),
            expr_allowed: self.expr_allowed,
            contains_esc: self.contains_esc,
            contains_octal: self.contains_octal,
            octal_position: self.octal_position,
            invalid_template_escape_position: self.invalid_template_escape_position,
            buffers: if skip_buffers {
                self.buffers.clone()
            } else {
                self.buffers.deep_clone()
            },
        }
    }
}
