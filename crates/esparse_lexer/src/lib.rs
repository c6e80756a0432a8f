//! esparse_lexer: Tokenizer and parser state record for esparse.
//!
//! The heart of this crate is [`State`]: a single mutable record tracking
//! lexer and parser progress (cursor, current token, syntactic context
//! stack, mode flags, append-only buffers). The grammar engine mutates it as
//! it consumes tokens and snapshots it with [`State::clone`] whenever it
//! must attempt parsing two ways and keep the one that succeeds.

mod char_codes;
mod context;
mod lexer;
mod options;
mod state;
mod token;

pub use context::TokenContext;
pub use lexer::Lexer;
pub use options::Options;
pub use state::{Buffers, CommentFrame, Label, LabelKind, ScopeFlags, State};
pub use token::{is_strict_bind_reserved_word, is_strict_reserved_word, TokenKind, TokenValue};
