//! The grammar engine.
//!
//! A recursive descent parser over the lexer's state record. The engine owns
//! token management, node open/finish primitives, and the productions of the
//! base grammar; at every node-construction or validation juncture it calls
//! through the installed dialect's hook table, so the same productions can
//! emit base-shaped or dialect-shaped nodes.
//!
//! Speculative parsing is sequential clone → attempt → commit-or-discard:
//! the arrow-function disambiguation takes a full state snapshot, attempts
//! the arrow production, and restores the snapshot if the attempt errors.

use crate::hooks::{
    ClassMethodShape, Dialect, LiteralToken, MethodParts, ObjectMemberShape,
};
use crate::precedence::{get_binary_operator_precedence, OperatorPrecedence};
use esparse_ast::*;
use esparse_core::{Position, SourceLocation, Span};
use esparse_diagnostics::{format_message, messages, ParseResult, SyntaxError};
use esparse_lexer::{
    is_strict_bind_reserved_word, is_strict_reserved_word, CommentFrame, Label, LabelKind, Lexer,
    Options, ScopeFlags, TokenKind, TokenValue,
};
use rustc_hash::FxHashMap;
use std::marker::PhantomData;

/// An open node: its start offset and position are recorded, nothing else.
/// Closing it with [`Parser::finish_node`] produces the `Span` every node
/// struct requires, so a node can never be read before it is closed.
#[derive(Debug, Clone, Copy)]
pub struct NodeStart {
    pub start: usize,
    pub loc: Position,
}

/// The parser, generic over the installed dialect.
pub struct Parser<D: Dialect> {
    pub lexer: Lexer,
    /// Offset of a shorthand-property default seen in expression position;
    /// cleared when pattern conversion legitimizes it, raised otherwise.
    shorthand_default_pos: Option<usize>,
    _dialect: PhantomData<D>,
}

impl<D: Dialect> Parser<D> {
    pub fn new(options: Options, input: &str) -> Self {
        Self {
            lexer: Lexer::new(options, input),
            shorthand_default_pos: None,
            _dialect: PhantomData,
        }
    }

    // ========================================================================
    // Token management
    // ========================================================================

    #[inline]
    fn next(&mut self) -> ParseResult<()> {
        self.lexer.next()
    }

    #[inline]
    fn matches(&self, kind: TokenKind) -> bool {
        self.lexer.state.kind == kind
    }

    fn matches_op(&self, kind: TokenKind, op: &str) -> bool {
        self.lexer.state.kind == kind
            && matches!(&self.lexer.state.value, TokenValue::Op(o) if *o == op)
    }

    fn is_contextual(&self, word: &str) -> bool {
        self.matches(TokenKind::Name)
            && matches!(&self.lexer.state.value, TokenValue::Word(w) if w == word)
    }

    fn eat(&mut self, kind: TokenKind) -> ParseResult<bool> {
        if self.matches(kind) {
            self.next()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn eat_contextual(&mut self, word: &str) -> ParseResult<bool> {
        if self.is_contextual(word) {
            self.next()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, kind: TokenKind) -> ParseResult<()> {
        if self.eat(kind)? {
            Ok(())
        } else {
            Err(self.raise(
                self.lexer.state.start,
                &format_message(messages::EXPECTED_TOKEN, &[kind.label()]),
            ))
        }
    }

    fn expect_contextual(&mut self, word: &str) -> ParseResult<()> {
        if self.eat_contextual(word)? {
            Ok(())
        } else {
            self.unexpected()
        }
    }

    pub fn raise(&self, pos: usize, message: &str) -> SyntaxError {
        self.lexer.raise(pos, message)
    }

    pub fn unexpected<T>(&self) -> ParseResult<T> {
        Err(self.raise(self.lexer.state.start, messages::UNEXPECTED_TOKEN))
    }

    fn can_insert_semicolon(&self) -> bool {
        self.matches(TokenKind::Eof)
            || self.matches(TokenKind::BraceR)
            || self.lexer.has_line_break_before_current()
    }

    fn semicolon(&mut self) -> ParseResult<()> {
        if self.eat(TokenKind::Semi)? || self.can_insert_semicolon() {
            Ok(())
        } else {
            self.unexpected()
        }
    }

    // ========================================================================
    // Node construction primitives
    // ========================================================================

    pub fn start_node(&self) -> NodeStart {
        NodeStart {
            start: self.lexer.state.start,
            loc: self.lexer.state.start_loc,
        }
    }

    pub fn start_node_at(&self, start: usize, loc: Position) -> NodeStart {
        NodeStart { start, loc }
    }

    /// Close a node at the end of the previous token.
    pub fn finish_node(&self, start: NodeStart) -> Span {
        Span::new(
            start.start as u32,
            self.lexer.state.last_token_end as u32,
            SourceLocation::new(start.loc, self.lexer.state.last_token_end_loc),
        )
    }

    /// Close a node at an explicit end position.
    pub fn finish_node_at(&self, start: NodeStart, end: u32, end_loc: Position) -> Span {
        Span::new(start.start as u32, end, SourceLocation::new(start.loc, end_loc))
    }

    // ========================================================================
    // Comment attachment
    // ========================================================================

    fn flush_pending_comments(&mut self) {
        let buffers = &self.lexer.state.buffers;
        let mut trailing = buffers.trailing_comments.borrow_mut();
        if !trailing.is_empty() {
            buffers.leading_comments.borrow_mut().append(&mut trailing);
        }
    }

    fn attach_leading_comments(&mut self, span: &mut Span) {
        let pending_cell = self.lexer.state.buffers.leading_comments.clone();
        let mut pending = pending_cell.borrow_mut();
        if pending.is_empty() {
            return;
        }
        let mut claimed = Vec::new();
        let mut kept = Vec::new();
        for comment in pending.drain(..) {
            if comment.end <= span.start {
                claimed.push(comment);
            } else {
                kept.push(comment);
            }
        }
        *pending = kept;
        if !claimed.is_empty() {
            span.leading_comments = Some(claimed);
        }
    }

    fn attach_trailing_comments(&mut self, span: &mut Span) {
        let frame_start = self
            .lexer
            .state
            .buffers
            .comment_stack
            .borrow()
            .last()
            .map(|f| f.start)
            .unwrap_or(0);
        let pending_cell = self.lexer.state.buffers.trailing_comments.clone();
        let mut pending = pending_cell.borrow_mut();
        if pending.is_empty() {
            return;
        }
        let mut claimed = Vec::new();
        let mut kept = Vec::new();
        for comment in pending.drain(..) {
            if comment.start >= span.end && comment.start >= frame_start {
                claimed.push(comment);
            } else {
                kept.push(comment);
            }
        }
        *pending = kept;
        if !claimed.is_empty() {
            span.trailing_comments = Some(claimed);
        }
    }

    // ========================================================================
    // Top level
    // ========================================================================

    /// Parse the whole input into a `File`.
    pub fn parse(mut self) -> ParseResult<File> {
        let source_type = self.lexer.options.source_type;
        let start_loc = Position::new(self.lexer.options.start_line, 0);
        self.next()?;
        self.lexer
            .state
            .buffers
            .comment_stack
            .borrow_mut()
            .push(CommentFrame { start: 0 });
        let (body, directives) = self.parse_block_body_core(true, true, TokenKind::Eof)?;
        self.lexer.state.buffers.comment_stack.borrow_mut().pop();
        let (body, directives) = D::finish_block_body(&mut self, body, directives);
        let end = self.lexer.input_len();
        let end_loc = self.lexer.state.cur_position();
        let span = Span::new(0, end as u32, SourceLocation::new(start_loc, end_loc));
        let program = Program {
            span: span.clone(),
            body,
            directives,
            source_type,
        };
        let comments = std::mem::take(&mut *self.lexer.state.buffers.comments.borrow_mut());
        let tokens = if self.lexer.options.tokens {
            Some(std::mem::take(
                &mut *self.lexer.state.buffers.tokens.borrow_mut(),
            ))
        } else {
            None
        };
        Ok(File {
            span,
            program,
            comments,
            tokens,
        })
    }

    /// Parse statements until `end`, accumulating leading directives in a
    /// separate list. A `"use strict"` directive flips the state's strict
    /// flag for the rest of the body, and retroactively rejects an octal
    /// escape the body already contained.
    fn parse_block_body_core(
        &mut self,
        allow_directives: bool,
        top_level: bool,
        end: TokenKind,
    ) -> ParseResult<(Vec<Statement>, Vec<Directive>)> {
        let old_strict = self.lexer.state.strict;
        let mut body = Vec::new();
        let mut directives = Vec::new();
        let mut parsed_non_directive = false;
        while !self.matches(end) {
            self.flush_pending_comments();
            let mut stmt = self.parse_statement(top_level)?;
            if allow_directives && !parsed_non_directive && D::is_valid_directive(self, &stmt) {
                let directive = D::stmt_to_directive(self, stmt)?;
                let use_strict = directive.value.value == "use strict";
                directives.push(directive);
                if use_strict && !self.lexer.state.strict {
                    if self.lexer.state.contains_octal {
                        let pos = self.lexer.state.octal_position.unwrap_or(0);
                        return Err(self.raise(pos, messages::OCTAL_IN_STRICT_MODE));
                    }
                    self.lexer.state.strict = true;
                }
                continue;
            }
            parsed_non_directive = true;
            self.attach_leading_comments(stmt.span_mut());
            body.push(stmt);
        }
        if let Some(last) = body.last_mut() {
            self.attach_trailing_comments(last.span_mut());
        }
        self.lexer.state.strict = old_strict;
        Ok((body, directives))
    }

    fn parse_block(&mut self, allow_directives: bool) -> ParseResult<BlockStatement> {
        let start = self.start_node();
        self.expect(TokenKind::BraceL)?;
        self.lexer
            .state
            .buffers
            .comment_stack
            .borrow_mut()
            .push(CommentFrame {
                start: start.start as u32,
            });
        let (body, directives) =
            self.parse_block_body_core(allow_directives, false, TokenKind::BraceR)?;
        self.expect(TokenKind::BraceR)?;
        self.lexer.state.buffers.comment_stack.borrow_mut().pop();
        let (body, directives) = D::finish_block_body(self, body, directives);
        Ok(BlockStatement {
            span: self.finish_node(start),
            body,
            directives,
        })
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn parse_statement(&mut self, top_level: bool) -> ParseResult<Statement> {
        match self.lexer.state.kind {
            TokenKind::At => {
                self.parse_decorators()?;
                if !self.matches(TokenKind::Class) && !self.matches(TokenKind::Export) {
                    return Err(
                        self.raise(self.lexer.state.start, messages::DECORATORS_NEED_CLASS)
                    );
                }
                self.parse_statement(top_level)
            }
            TokenKind::Break => self.parse_break_continue(true),
            TokenKind::Continue => self.parse_break_continue(false),
            TokenKind::Function => {
                let start = self.start_node();
                let func = self.parse_function(start, true, false)?;
                Ok(Statement::FunctionDeclaration(func))
            }
            TokenKind::Class => Ok(Statement::ClassDeclaration(self.parse_class_node(true)?)),
            TokenKind::If => self.parse_if(),
            TokenKind::Return => self.parse_return(),
            TokenKind::While => self.parse_while(),
            TokenKind::Var => self.parse_var_statement(VarKind::Var),
            TokenKind::Let => self.parse_var_statement(VarKind::Let),
            TokenKind::Const => self.parse_var_statement(VarKind::Const),
            TokenKind::BraceL => Ok(Statement::BlockStatement(self.parse_block(false)?)),
            TokenKind::Semi => {
                let start = self.start_node();
                self.next()?;
                Ok(Statement::EmptyStatement(EmptyStatement {
                    span: self.finish_node(start),
                }))
            }
            TokenKind::Export => {
                self.check_module_position(top_level)?;
                self.parse_export()
            }
            TokenKind::Import => {
                self.check_module_position(top_level)?;
                self.parse_import()
            }
            _ => self.parse_labeled_or_expression_statement(),
        }
    }

    fn check_module_position(&self, top_level: bool) -> ParseResult<()> {
        if !top_level {
            return Err(self.raise(self.lexer.state.start, messages::IMPORT_EXPORT_TOP_LEVEL));
        }
        if self.lexer.options.source_type != SourceType::Module {
            return Err(self.raise(self.lexer.state.start, messages::IMPORT_EXPORT_MODULE));
        }
        Ok(())
    }

    fn parse_decorators(&mut self) -> ParseResult<()> {
        while self.matches(TokenKind::At) {
            let start = self.start_node();
            self.next()?;
            let expression = self.parse_maybe_assign()?;
            let decorator = Decorator {
                span: self.finish_node(start),
                expression: Box::new(expression),
            };
            self.lexer
                .state
                .buffers
                .decorators
                .borrow_mut()
                .push(decorator);
        }
        Ok(())
    }

    fn take_decorators(&mut self) -> Option<Vec<Decorator>> {
        let taken = std::mem::take(&mut *self.lexer.state.buffers.decorators.borrow_mut());
        if taken.is_empty() {
            None
        } else {
            Some(taken)
        }
    }

    fn parse_labeled_or_expression_statement(&mut self) -> ParseResult<Statement> {
        // An `async function` declaration looks like an expression statement
        // until the second token.
        if self.is_contextual("async") {
            let ahead = self.lexer.lookahead()?;
            if ahead.kind == TokenKind::Function
                && !self.lexer.has_line_break(self.lexer.state.end, ahead.start)
            {
                let start = self.start_node();
                self.next()?;
                let func = self.parse_function(start, true, true)?;
                return Ok(Statement::FunctionDeclaration(func));
            }
        }
        let start = self.start_node();
        let is_name = self.matches(TokenKind::Name);
        let expr = self.parse_expression()?;
        if is_name && self.matches(TokenKind::Colon) && matches!(expr, Expression::Identifier(_)) {
            let Expression::Identifier(label) = expr else {
                return self.unexpected();
            };
            self.next()?;
            return self.parse_labeled_statement(start, label);
        }
        if let Some(pos) = self.shorthand_default_pos.take() {
            return Err(self.raise(pos, messages::SHORTHAND_ONLY_DESTRUCTURING));
        }
        self.semicolon()?;
        Ok(Statement::ExpressionStatement(ExpressionStatement {
            span: self.finish_node(start),
            expression: Box::new(expr),
            directive: None,
        }))
    }

    fn parse_labeled_statement(
        &mut self,
        start: NodeStart,
        label: Identifier,
    ) -> ParseResult<Statement> {
        let duplicate = self
            .lexer
            .state
            .buffers
            .labels
            .borrow()
            .iter()
            .any(|l| l.name.as_deref() == Some(label.name.as_str()));
        if duplicate {
            return Err(self.raise(
                label.span.start as usize,
                &format_message(messages::LABEL_ALREADY_DECLARED, &[&label.name]),
            ));
        }
        let kind = if self.lexer.state.kind.is_loop() {
            Some(LabelKind::Loop)
        } else if self.matches(TokenKind::Switch) {
            Some(LabelKind::Switch)
        } else {
            None
        };
        self.lexer.state.buffers.labels.borrow_mut().push(Label {
            kind,
            name: Some(label.name.clone()),
            statement_start: start.start as u32,
        });
        let body = self.parse_statement(false)?;
        self.lexer.state.buffers.labels.borrow_mut().pop();
        Ok(Statement::LabeledStatement(LabeledStatement {
            span: self.finish_node(start),
            label,
            body: Box::new(body),
        }))
    }

    fn parse_break_continue(&mut self, is_break: bool) -> ParseResult<Statement> {
        let start = self.start_node();
        let keyword = if is_break { "break" } else { "continue" };
        self.next()?;
        let label = if self.eat(TokenKind::Semi)? || self.can_insert_semicolon() {
            None
        } else {
            if !self.matches(TokenKind::Name) {
                return self.unexpected();
            }
            let id = self.parse_identifier(false)?;
            self.semicolon()?;
            Some(id)
        };
        let found = self
            .lexer
            .state
            .buffers
            .labels
            .borrow()
            .iter()
            .any(|lab| match &label {
                Some(id) => lab.name.as_deref() == Some(id.name.as_str()),
                None => {
                    lab.kind == Some(LabelKind::Loop)
                        || (is_break && lab.kind == Some(LabelKind::Switch))
                }
            });
        if !found {
            return Err(self.raise(
                start.start,
                &format_message(messages::UNSYNTACTIC, &[keyword]),
            ));
        }
        let span = self.finish_node(start);
        Ok(if is_break {
            Statement::BreakStatement(BreakStatement { span, label })
        } else {
            Statement::ContinueStatement(ContinueStatement { span, label })
        })
    }

    fn parse_if(&mut self) -> ParseResult<Statement> {
        let start = self.start_node();
        self.next()?;
        self.expect(TokenKind::ParenL)?;
        let test = self.parse_expression()?;
        self.expect(TokenKind::ParenR)?;
        let consequent = self.parse_statement(false)?;
        let alternate = if self.eat(TokenKind::Else)? {
            Some(Box::new(self.parse_statement(false)?))
        } else {
            None
        };
        Ok(Statement::IfStatement(IfStatement {
            span: self.finish_node(start),
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate,
        }))
    }

    fn parse_while(&mut self) -> ParseResult<Statement> {
        let start = self.start_node();
        self.next()?;
        self.expect(TokenKind::ParenL)?;
        let test = self.parse_expression()?;
        self.expect(TokenKind::ParenR)?;
        self.lexer.state.buffers.labels.borrow_mut().push(Label {
            kind: Some(LabelKind::Loop),
            name: None,
            statement_start: start.start as u32,
        });
        let body = self.parse_statement(false)?;
        self.lexer.state.buffers.labels.borrow_mut().pop();
        Ok(Statement::WhileStatement(WhileStatement {
            span: self.finish_node(start),
            test: Box::new(test),
            body: Box::new(body),
        }))
    }

    fn parse_return(&mut self) -> ParseResult<Statement> {
        let start = self.start_node();
        if !self.lexer.state.flags.contains(ScopeFlags::IN_FUNCTION) {
            return Err(self.raise(start.start, messages::RETURN_OUTSIDE_FUNCTION));
        }
        self.next()?;
        let argument = if self.eat(TokenKind::Semi)? || self.can_insert_semicolon() {
            None
        } else {
            let expr = self.parse_expression()?;
            self.semicolon()?;
            Some(Box::new(expr))
        };
        Ok(Statement::ReturnStatement(ReturnStatement {
            span: self.finish_node(start),
            argument,
        }))
    }

    fn parse_var_statement(&mut self, kind: VarKind) -> ParseResult<Statement> {
        let start = self.start_node();
        self.next()?;
        let mut declarations = Vec::new();
        loop {
            let decl_start = self.start_node();
            let id = self.parse_binding_atom()?;
            D::check_lval(self, &id, true, None, "variable declaration")?;
            let init = if self.eat(TokenKind::Eq)? {
                Some(Box::new(self.parse_maybe_assign()?))
            } else {
                if kind == VarKind::Const {
                    return self.unexpected();
                }
                if !id.is_identifier() {
                    return Err(self.raise(
                        self.lexer.state.last_token_end,
                        messages::COMPLEX_BINDING_REQUIRES_INIT,
                    ));
                }
                None
            };
            declarations.push(VariableDeclarator {
                span: self.finish_node(decl_start),
                id: Box::new(id),
                init,
            });
            if !self.eat(TokenKind::Comma)? {
                break;
            }
        }
        self.semicolon()?;
        Ok(Statement::VariableDeclaration(VariableDeclaration {
            span: self.finish_node(start),
            kind,
            declarations,
        }))
    }

    // ========================================================================
    // Modules
    // ========================================================================

    fn parse_module_source(&mut self) -> ParseResult<Expression> {
        if !self.matches(TokenKind::String) {
            return self.unexpected();
        }
        let value = match &self.lexer.state.value {
            TokenValue::Str(s) => s.clone(),
            _ => return self.unexpected(),
        };
        D::parse_literal(self, LiteralToken::String(value))
    }

    fn parse_export(&mut self) -> ParseResult<Statement> {
        let start = self.start_node();
        self.next()?;
        if self.matches(TokenKind::Star) {
            self.next()?;
            self.expect_contextual("from")?;
            let source = self.parse_module_source()?;
            self.semicolon()?;
            return Ok(Statement::ExportAllDeclaration(ExportAllDeclaration {
                span: self.finish_node(start),
                source: Box::new(source),
            }));
        }
        if self.matches(TokenKind::Default) {
            self.next()?;
            self.check_duplicate_exports(start.start, "default")?;
            let declaration = if self.matches(TokenKind::Function) {
                let fstart = self.start_node();
                let func = self.parse_function(fstart, false, false)?;
                ExportDefaultKind::Declaration(Box::new(Statement::FunctionDeclaration(func)))
            } else if self.matches(TokenKind::Class) {
                let class = self.parse_class_node(false)?;
                ExportDefaultKind::Declaration(Box::new(Statement::ClassDeclaration(class)))
            } else {
                let expr = self.parse_maybe_assign()?;
                self.semicolon()?;
                ExportDefaultKind::Expression(Box::new(expr))
            };
            return Ok(Statement::ExportDefaultDeclaration(
                ExportDefaultDeclaration {
                    span: self.finish_node(start),
                    declaration,
                },
            ));
        }
        if matches!(
            self.lexer.state.kind,
            TokenKind::Var
                | TokenKind::Let
                | TokenKind::Const
                | TokenKind::Function
                | TokenKind::Class
        ) || self.is_contextual("async")
        {
            let declaration = self.parse_statement(false)?;
            self.check_exported_declaration(&declaration)?;
            return Ok(Statement::ExportNamedDeclaration(ExportNamedDeclaration {
                span: self.finish_node(start),
                declaration: Some(Box::new(declaration)),
                specifiers: Vec::new(),
                source: None,
            }));
        }
        let mut specifiers = Vec::new();
        self.expect(TokenKind::BraceL)?;
        let mut first = true;
        while !self.eat(TokenKind::BraceR)? {
            if first {
                first = false;
            } else {
                self.expect(TokenKind::Comma)?;
                if self.eat(TokenKind::BraceR)? {
                    break;
                }
            }
            let spec_start = self.start_node();
            let local = self.parse_identifier(true)?;
            let exported = if self.eat_contextual("as")? {
                self.parse_identifier(true)?
            } else {
                local.clone()
            };
            self.check_duplicate_exports(exported.span.start as usize, &exported.name)?;
            specifiers.push(ExportSpecifier {
                span: self.finish_node(spec_start),
                local,
                exported,
            });
        }
        let source = if self.eat_contextual("from")? {
            Some(Box::new(self.parse_module_source()?))
        } else {
            None
        };
        self.semicolon()?;
        Ok(Statement::ExportNamedDeclaration(ExportNamedDeclaration {
            span: self.finish_node(start),
            declaration: None,
            specifiers,
            source,
        }))
    }

    fn check_exported_declaration(&mut self, declaration: &Statement) -> ParseResult<()> {
        match declaration {
            Statement::VariableDeclaration(var) => {
                for decl in &var.declarations {
                    D::check_declaration(self, &decl.id)?;
                }
                Ok(())
            }
            Statement::FunctionDeclaration(func) => {
                if let Some(id) = &func.id {
                    self.check_duplicate_exports(id.span.start as usize, &id.name)?;
                }
                Ok(())
            }
            Statement::ClassDeclaration(class) => {
                if let Some(id) = &class.id {
                    self.check_duplicate_exports(id.span.start as usize, &id.name)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    pub fn check_duplicate_exports(&mut self, pos: usize, name: &str) -> ParseResult<()> {
        let exists = self
            .lexer
            .state
            .buffers
            .exported_identifiers
            .borrow()
            .iter()
            .any(|n| n == name);
        if exists {
            let message = if name == "default" {
                messages::ONLY_ONE_DEFAULT_EXPORT.to_string()
            } else {
                format_message(messages::DUPLICATE_EXPORT, &[name])
            };
            return Err(self.raise(pos, &message));
        }
        self.lexer
            .state
            .buffers
            .exported_identifiers
            .borrow_mut()
            .push(name.to_string());
        Ok(())
    }

    fn parse_import(&mut self) -> ParseResult<Statement> {
        let start = self.start_node();
        self.next()?;
        let mut specifiers = Vec::new();
        if !self.matches(TokenKind::String) {
            if self.matches(TokenKind::Name) {
                let spec_start = self.start_node();
                let local = self.parse_identifier(false)?;
                D::check_lval(
                    self,
                    &Expression::Identifier(local.clone()),
                    true,
                    None,
                    "import specifier",
                )?;
                specifiers.push(ImportSpecifierNode::ImportDefaultSpecifier(
                    ImportDefaultSpecifier {
                        span: self.finish_node(spec_start),
                        local,
                    },
                ));
                if self.eat(TokenKind::Comma)? {
                    self.parse_import_specifier_group(&mut specifiers)?;
                }
            } else {
                self.parse_import_specifier_group(&mut specifiers)?;
            }
            self.expect_contextual("from")?;
        }
        let source = self.parse_module_source()?;
        self.semicolon()?;
        Ok(Statement::ImportDeclaration(ImportDeclaration {
            span: self.finish_node(start),
            specifiers,
            source: Box::new(source),
        }))
    }

    fn parse_import_specifier_group(
        &mut self,
        specifiers: &mut Vec<ImportSpecifierNode>,
    ) -> ParseResult<()> {
        if self.matches(TokenKind::Star) {
            let spec_start = self.start_node();
            self.next()?;
            self.expect_contextual("as")?;
            let local = self.parse_identifier(false)?;
            specifiers.push(ImportSpecifierNode::ImportNamespaceSpecifier(
                ImportNamespaceSpecifier {
                    span: self.finish_node(spec_start),
                    local,
                },
            ));
            return Ok(());
        }
        self.expect(TokenKind::BraceL)?;
        let mut first = true;
        while !self.eat(TokenKind::BraceR)? {
            if first {
                first = false;
            } else {
                self.expect(TokenKind::Comma)?;
                if self.eat(TokenKind::BraceR)? {
                    break;
                }
            }
            let spec_start = self.start_node();
            let imported = self.parse_identifier(true)?;
            let local = if self.eat_contextual("as")? {
                self.parse_identifier(false)?
            } else {
                imported.clone()
            };
            specifiers.push(ImportSpecifierNode::ImportSpecifier(ImportSpecifier {
                span: self.finish_node(spec_start),
                imported,
                local,
            }));
        }
        Ok(())
    }

    // ========================================================================
    // Functions
    // ========================================================================

    /// Parse a function with the `function` keyword as the current token.
    /// `start` may precede the keyword (e.g. `async function`).
    fn parse_function(
        &mut self,
        start: NodeStart,
        id_required: bool,
        is_async: bool,
    ) -> ParseResult<FunctionNode> {
        self.next()?;
        let generator = self.eat(TokenKind::Star)?;
        let id = if self.matches(TokenKind::Name) {
            Some(self.parse_identifier(false)?)
        } else if id_required {
            return self.unexpected();
        } else {
            None
        };
        let old_flags = self.lexer.state.flags;
        let old_in_method = self.lexer.state.in_method;
        self.lexer.state.flags.insert(ScopeFlags::IN_FUNCTION);
        self.lexer
            .state
            .flags
            .set(ScopeFlags::IN_GENERATOR, generator);
        self.lexer.state.flags.set(ScopeFlags::IN_ASYNC, is_async);
        self.lexer.state.in_method = None;
        let params = self.parse_function_params()?;
        let body = self.parse_function_body(start, &params)?;
        self.lexer.state.flags = old_flags;
        self.lexer.state.in_method = old_in_method;
        Ok(FunctionNode {
            span: self.finish_node(start),
            id,
            params,
            body,
            generator,
            is_async,
            type_parameters: None,
        })
    }

    fn parse_function_params(&mut self) -> ParseResult<Vec<Expression>> {
        self.expect(TokenKind::ParenL)?;
        let mut params = Vec::new();
        while !self.matches(TokenKind::ParenR) {
            if self.matches(TokenKind::Ellipsis) {
                let rest_start = self.start_node();
                self.next()?;
                let argument = self.parse_binding_atom()?;
                params.push(Expression::RestElement(RestElement {
                    span: self.finish_node(rest_start),
                    argument: Box::new(argument),
                }));
                break;
            }
            params.push(self.parse_maybe_default()?);
            if !self.eat(TokenKind::Comma)? {
                break;
            }
        }
        self.expect(TokenKind::ParenR)?;
        Ok(params)
    }

    /// Parse a block body for a function and re-validate the parameters if
    /// the body turns out to be strict.
    fn parse_function_body(
        &mut self,
        func_start: NodeStart,
        params: &[Expression],
    ) -> ParseResult<BlockStatement> {
        let saved_labels = std::mem::take(&mut *self.lexer.state.buffers.labels.borrow_mut());
        let block = self.parse_block(true)?;
        *self.lexer.state.buffers.labels.borrow_mut() = saved_labels;

        let own_directive = D::is_strict_body(self, Some(&block), false);
        if own_directive && !params.iter().all(Expression::is_identifier) {
            return Err(self.raise(func_start.start, messages::ILLEGAL_USE_STRICT_NON_SIMPLE));
        }
        if self.lexer.state.strict || own_directive {
            let old_strict = self.lexer.state.strict;
            self.lexer.state.strict = true;
            let mut clashes: FxHashMap<String, bool> = FxHashMap::default();
            let result: ParseResult<()> = params.iter().try_for_each(|param| {
                D::check_lval(
                    self,
                    param,
                    true,
                    Some(&mut clashes),
                    "function parameter list",
                )
            });
            self.lexer.state.strict = old_strict;
            result?;
        }
        Ok(block)
    }

    /// Parse a method's parameter list and body with the method mode flags
    /// in force. Dialects shape the result into their member node.
    fn parse_method_parts(
        &mut self,
        kind: MethodKind,
        generator: bool,
        is_async: bool,
    ) -> ParseResult<MethodParts> {
        let value_start = self.start_node();
        let old_flags = self.lexer.state.flags;
        let old_in_method = self.lexer.state.in_method;
        self.lexer.state.flags.insert(ScopeFlags::IN_FUNCTION);
        self.lexer
            .state
            .flags
            .set(ScopeFlags::IN_GENERATOR, generator);
        self.lexer.state.flags.set(ScopeFlags::IN_ASYNC, is_async);
        self.lexer.state.in_method = Some(kind);
        let params = self.parse_function_params()?;
        let body = self.parse_function_body(value_start, &params)?;
        self.lexer.state.flags = old_flags;
        self.lexer.state.in_method = old_in_method;
        Ok(MethodParts {
            value_start,
            params,
            body,
        })
    }

    // ========================================================================
    // Classes
    // ========================================================================

    fn parse_class_node(&mut self, id_required: bool) -> ParseResult<ClassNode> {
        let start = self.start_node();
        let decorators = self.take_decorators();
        self.next()?;
        let id = if self.matches(TokenKind::Name) {
            Some(self.parse_identifier(false)?)
        } else if id_required {
            return self.unexpected();
        } else {
            None
        };
        // Class bodies are always strict.
        let old_strict = self.lexer.state.strict;
        let old_flags = self.lexer.state.flags;
        self.lexer.state.strict = true;
        self.lexer.state.flags.insert(ScopeFlags::IN_CLASS);
        let super_class = if self.eat(TokenKind::Extends)? {
            Some(Box::new(self.parse_expr_subscripts()?))
        } else {
            None
        };
        let body = self.parse_class_body()?;
        self.lexer.state.strict = old_strict;
        self.lexer.state.flags = old_flags;
        Ok(ClassNode {
            span: self.finish_node(start),
            id,
            super_class,
            body,
            decorators,
        })
    }

    fn parse_class_body(&mut self) -> ParseResult<ClassBody> {
        let start = self.start_node();
        self.expect(TokenKind::BraceL)?;
        let mut members = Vec::new();
        let mut seen_constructor = false;
        while !self.eat(TokenKind::BraceR)? {
            if self.eat(TokenKind::Semi)? {
                continue;
            }
            members.push(self.parse_class_member(&mut seen_constructor)?);
        }
        Ok(ClassBody {
            span: self.finish_node(start),
            body: members,
        })
    }

    fn token_can_start_property_name(&self, kind: TokenKind) -> bool {
        matches!(
            kind,
            TokenKind::Name | TokenKind::String | TokenKind::Num | TokenKind::BracketL
        ) || kind.is_keyword()
    }

    fn parse_class_member(&mut self, seen_constructor: &mut bool) -> ParseResult<ClassMember> {
        let start = self.start_node();
        let mut is_static = false;
        if self.is_contextual("static") {
            let ahead = self.lexer.lookahead()?;
            if !matches!(
                ahead.kind,
                TokenKind::ParenL | TokenKind::Eq | TokenKind::Semi | TokenKind::BraceR
            ) {
                self.next()?;
                is_static = true;
            }
        }
        let mut is_async = false;
        if self.is_contextual("async") {
            let ahead = self.lexer.lookahead()?;
            if (self.token_can_start_property_name(ahead.kind) || ahead.kind == TokenKind::Star)
                && !self.lexer.has_line_break(self.lexer.state.end, ahead.start)
            {
                self.next()?;
                is_async = true;
            }
        }
        let generator = self.eat(TokenKind::Star)?;
        let mut accessor = None;
        if !is_async && !generator && (self.is_contextual("get") || self.is_contextual("set")) {
            let ahead = self.lexer.lookahead()?;
            if self.token_can_start_property_name(ahead.kind) {
                accessor = Some(if self.is_contextual("get") {
                    MethodKind::Get
                } else {
                    MethodKind::Set
                });
                self.next()?;
            }
        }
        let (computed, key) = self.parse_property_name()?;
        let type_parameters = if self.matches_op(TokenKind::Relational, "<") {
            Some(self.parse_type_parameters()?)
        } else {
            None
        };
        if self.matches(TokenKind::ParenL) {
            let kind = accessor.unwrap_or_else(|| {
                if !computed && !is_static && key_is_constructor(&key) {
                    MethodKind::Constructor
                } else {
                    MethodKind::Method
                }
            });
            if kind == MethodKind::Constructor {
                if *seen_constructor {
                    return Err(
                        self.raise(key.start() as usize, messages::DUPLICATE_CONSTRUCTOR)
                    );
                }
                *seen_constructor = true;
            }
            let parts = self.parse_method_parts(kind, generator, is_async)?;
            if matches!(kind, MethodKind::Get | MethodKind::Set) {
                D::check_getter_setter_param_count(self, kind, start.start, &parts.params)?;
            }
            let shape = ClassMethodShape {
                start,
                key,
                computed,
                is_static,
                kind,
                generator,
                is_async,
                type_parameters,
            };
            return D::parse_class_method(self, shape, parts);
        }
        if accessor.is_some() || generator || is_async || type_parameters.is_some() {
            return self.unexpected();
        }
        let had_flag = self
            .lexer
            .state
            .flags
            .contains(ScopeFlags::IN_CLASS_PROPERTY);
        self.lexer.state.flags.insert(ScopeFlags::IN_CLASS_PROPERTY);
        let value = if self.eat(TokenKind::Eq)? {
            Some(Box::new(self.parse_maybe_assign()?))
        } else {
            None
        };
        if !had_flag {
            self.lexer
                .state
                .flags
                .remove(ScopeFlags::IN_CLASS_PROPERTY);
        }
        self.semicolon()?;
        Ok(ClassMember::ClassProperty(ClassProperty {
            span: self.finish_node(start),
            key: Box::new(key),
            value,
            computed,
            is_static,
        }))
    }

    fn parse_type_parameters(&mut self) -> ParseResult<TypeParameterDeclaration> {
        let start = self.start_node();
        let had_in_type = self.lexer.state.flags.contains(ScopeFlags::IN_TYPE);
        self.lexer.state.flags.insert(ScopeFlags::IN_TYPE);
        self.next()?;
        let mut params = Vec::new();
        loop {
            let param_start = self.start_node();
            let id = self.parse_identifier(false)?;
            params.push(TypeParameter {
                span: self.finish_node(param_start),
                name: id.name,
            });
            if !self.eat(TokenKind::Comma)? {
                break;
            }
        }
        if !self.matches_op(TokenKind::Relational, ">") {
            return self.unexpected();
        }
        self.next()?;
        if !had_in_type {
            self.lexer.state.flags.remove(ScopeFlags::IN_TYPE);
        }
        Ok(TypeParameterDeclaration {
            span: self.finish_node(start),
            params,
        })
    }

    // ========================================================================
    // Object literals and patterns
    // ========================================================================

    fn parse_property_name(&mut self) -> ParseResult<(bool, Expression)> {
        if self.eat(TokenKind::BracketL)? {
            let key = self.parse_maybe_assign()?;
            self.expect(TokenKind::BracketR)?;
            return Ok((true, key));
        }
        let had_flag = self
            .lexer
            .state
            .flags
            .contains(ScopeFlags::IN_PROPERTY_NAME);
        self.lexer.state.flags.insert(ScopeFlags::IN_PROPERTY_NAME);
        let key = if self.matches(TokenKind::Num) || self.matches(TokenKind::String) {
            D::parse_expr_atom(self)?
        } else {
            Expression::Identifier(self.parse_identifier(true)?)
        };
        if !had_flag {
            self.lexer
                .state
                .flags
                .remove(ScopeFlags::IN_PROPERTY_NAME);
        }
        Ok((false, key))
    }

    fn parse_obj(&mut self, is_pattern: bool) -> ParseResult<Expression> {
        let start = self.start_node();
        self.expect(TokenKind::BraceL)?;
        let mut properties = Vec::new();
        let mut prop_hash: FxHashMap<String, bool> = FxHashMap::default();
        let mut first = true;
        while !self.eat(TokenKind::BraceR)? {
            if first {
                first = false;
            } else {
                self.expect(TokenKind::Comma)?;
                if self.eat(TokenKind::BraceR)? {
                    break;
                }
            }
            if self.matches(TokenKind::Ellipsis) {
                let spread_start = self.start_node();
                self.next()?;
                if is_pattern {
                    let argument = self.parse_binding_atom()?;
                    properties.push(ObjectMember::RestElement(RestElement {
                        span: self.finish_node(spread_start),
                        argument: Box::new(argument),
                    }));
                } else {
                    let argument = self.parse_maybe_assign()?;
                    properties.push(ObjectMember::SpreadElement(SpreadElement {
                        span: self.finish_node(spread_start),
                        argument: Box::new(argument),
                    }));
                }
                continue;
            }
            let member = self.parse_object_member(is_pattern, &mut prop_hash)?;
            properties.push(member);
        }
        let span = self.finish_node(start);
        Ok(if is_pattern {
            Expression::ObjectPattern(ObjectPattern { span, properties })
        } else {
            Expression::ObjectExpression(ObjectExpression { span, properties })
        })
    }

    fn parse_object_member(
        &mut self,
        is_pattern: bool,
        prop_hash: &mut FxHashMap<String, bool>,
    ) -> ParseResult<ObjectMember> {
        let start = self.start_node();
        let mut is_async = false;
        let mut generator = false;
        let mut accessor = None;
        if !is_pattern {
            if self.is_contextual("async") {
                let ahead = self.lexer.lookahead()?;
                if (self.token_can_start_property_name(ahead.kind)
                    || ahead.kind == TokenKind::Star)
                    && !self.lexer.has_line_break(self.lexer.state.end, ahead.start)
                {
                    self.next()?;
                    is_async = true;
                }
            }
            generator = self.eat(TokenKind::Star)?;
            if !is_async && !generator && (self.is_contextual("get") || self.is_contextual("set"))
            {
                let ahead = self.lexer.lookahead()?;
                if self.token_can_start_property_name(ahead.kind) {
                    accessor = Some(if self.is_contextual("get") {
                        MethodKind::Get
                    } else {
                        MethodKind::Set
                    });
                    self.next()?;
                }
            }
        }
        let (computed, key) = self.parse_property_name()?;

        if !is_pattern && (accessor.is_some() || self.matches(TokenKind::ParenL)) {
            if !self.matches(TokenKind::ParenL) {
                return self.unexpected();
            }
            let kind = accessor.unwrap_or(MethodKind::Method);
            let parts = self.parse_method_parts(kind, generator, is_async)?;
            if matches!(kind, MethodKind::Get | MethodKind::Set) {
                D::check_getter_setter_param_count(self, kind, start.start, &parts.params)?;
            }
            let shape = ObjectMemberShape {
                start,
                key,
                computed,
                shorthand: false,
                kind,
                generator,
                is_async,
            };
            let member = D::parse_object_method(self, shape, parts)?;
            D::check_prop_clash(self, &member, prop_hash)?;
            return Ok(member);
        }
        if generator || is_async {
            return self.unexpected();
        }

        if self.eat(TokenKind::Colon)? {
            let value = if is_pattern {
                self.parse_maybe_default()?
            } else {
                self.parse_maybe_assign()?
            };
            let shape = ObjectMemberShape {
                start,
                key,
                computed,
                shorthand: false,
                kind: MethodKind::Method,
                generator: false,
                is_async: false,
            };
            let member = D::parse_object_property(self, shape, value)?;
            if !is_pattern {
                D::check_prop_clash(self, &member, prop_hash)?;
            }
            return Ok(member);
        }

        // Shorthand member.
        if computed {
            return self.unexpected();
        }
        let Expression::Identifier(id) = &key else {
            return self.unexpected();
        };
        let id = id.clone();
        let value = if is_pattern {
            if self.matches(TokenKind::Eq) {
                self.next()?;
                let right = self.parse_maybe_assign()?;
                Expression::AssignmentPattern(AssignmentPattern {
                    span: self.finish_node(start),
                    left: Box::new(Expression::Identifier(id)),
                    right: Box::new(right),
                })
            } else {
                Expression::Identifier(id)
            }
        } else if self.matches(TokenKind::Eq) {
            if self.shorthand_default_pos.is_none() {
                self.shorthand_default_pos = Some(self.lexer.state.start);
            }
            self.next()?;
            let right = self.parse_maybe_assign()?;
            Expression::AssignmentPattern(AssignmentPattern {
                span: self.finish_node(start),
                left: Box::new(Expression::Identifier(id)),
                right: Box::new(right),
            })
        } else {
            Expression::Identifier(id)
        };
        let shape = ObjectMemberShape {
            start,
            key,
            computed: false,
            shorthand: true,
            kind: MethodKind::Method,
            generator: false,
            is_async: false,
        };
        let member = D::parse_object_property(self, shape, value)?;
        if !is_pattern {
            D::check_prop_clash(self, &member, prop_hash)?;
        }
        Ok(member)
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    pub fn parse_expression(&mut self) -> ParseResult<Expression> {
        let start = self.start_node();
        let expr = self.parse_maybe_assign()?;
        if self.matches(TokenKind::Comma) {
            let mut expressions = vec![expr];
            while self.eat(TokenKind::Comma)? {
                expressions.push(self.parse_maybe_assign()?);
            }
            return Ok(Expression::SequenceExpression(SequenceExpression {
                span: self.finish_node(start),
                expressions,
            }));
        }
        Ok(expr)
    }

    pub fn parse_maybe_assign(&mut self) -> ParseResult<Expression> {
        if self.matches(TokenKind::Yield)
            && self.lexer.state.flags.contains(ScopeFlags::IN_GENERATOR)
        {
            return self.parse_yield();
        }
        if self.matches(TokenKind::Name) || self.matches(TokenKind::ParenL) {
            self.lexer.state.potential_arrow_at = Some(self.lexer.state.start);
        }
        let start = self.start_node();
        let left = self.parse_maybe_conditional()?;
        if self.lexer.state.kind.is_assign() {
            let operator = match &self.lexer.state.value {
                TokenValue::Op(op) => (*op).to_string(),
                _ => "=".to_string(),
            };
            let left = if self.matches(TokenKind::Eq) {
                let converted = D::to_assignable(self, left, false, "assignment expression")?;
                self.shorthand_default_pos = None;
                converted
            } else {
                left
            };
            D::check_lval(self, &left, false, None, "assignment expression")?;
            self.next()?;
            let right = self.parse_maybe_assign()?;
            return Ok(Expression::AssignmentExpression(AssignmentExpression {
                span: self.finish_node(start),
                operator,
                left: Box::new(left),
                right: Box::new(right),
            }));
        }
        Ok(left)
    }

    fn parse_yield(&mut self) -> ParseResult<Expression> {
        let start = self.start_node();
        self.next()?;
        let (delegate, argument) = if self.matches(TokenKind::Semi)
            || self.can_insert_semicolon()
            || (!self.matches(TokenKind::Star) && !self.lexer.state.kind.starts_expr())
        {
            (false, None)
        } else {
            let delegate = self.eat(TokenKind::Star)?;
            (delegate, Some(Box::new(self.parse_maybe_assign()?)))
        };
        Ok(Expression::YieldExpression(YieldExpression {
            span: self.finish_node(start),
            argument,
            delegate,
        }))
    }

    fn parse_maybe_conditional(&mut self) -> ParseResult<Expression> {
        let start = self.start_node();
        let expr = self.parse_expr_ops()?;
        if self.eat(TokenKind::Question)? {
            let consequent = self.parse_maybe_assign()?;
            self.expect(TokenKind::Colon)?;
            let alternate = self.parse_maybe_assign()?;
            return Ok(Expression::ConditionalExpression(ConditionalExpression {
                span: self.finish_node(start),
                test: Box::new(expr),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            }));
        }
        Ok(expr)
    }

    fn parse_expr_ops(&mut self) -> ParseResult<Expression> {
        let start = self.start_node();
        let left = self.parse_maybe_unary()?;
        self.parse_expr_op(left, start, 0)
    }

    fn parse_expr_op(
        &mut self,
        left: Expression,
        left_start: NodeStart,
        min_prec: u8,
    ) -> ParseResult<Expression> {
        let prec_level = get_binary_operator_precedence(self.lexer.state.kind);
        let prec = prec_level as u8;
        if prec_level == OperatorPrecedence::Invalid || prec <= min_prec {
            return Ok(left);
        }
        let kind = self.lexer.state.kind;
        let operator = match &self.lexer.state.value {
            TokenValue::Op(op) => (*op).to_string(),
            _ => kind.label().to_string(),
        };
        let logical = matches!(kind, TokenKind::LogicalOr | TokenKind::LogicalAnd);
        self.next()?;
        let right_start = self.start_node();
        let right_operand = self.parse_maybe_unary()?;
        // Exponentiation is right-associative.
        let right_min = if kind == TokenKind::Exponent {
            prec - 1
        } else {
            prec
        };
        let right = self.parse_expr_op(right_operand, right_start, right_min)?;
        let span = self.finish_node(left_start);
        let node = if logical {
            Expression::LogicalExpression(LogicalExpression {
                span,
                operator,
                left: Box::new(left),
                right: Box::new(right),
            })
        } else {
            Expression::BinaryExpression(BinaryExpression {
                span,
                operator,
                left: Box::new(left),
                right: Box::new(right),
            })
        };
        self.parse_expr_op(node, left_start, min_prec)
    }

    fn parse_maybe_unary(&mut self) -> ParseResult<Expression> {
        if self.is_contextual("await") && self.lexer.state.flags.contains(ScopeFlags::IN_ASYNC) {
            let start = self.start_node();
            self.next()?;
            let argument = self.parse_maybe_unary()?;
            return Ok(Expression::AwaitExpression(AwaitExpression {
                span: self.finish_node(start),
                argument: Box::new(argument),
            }));
        }
        if self.lexer.state.kind.prefix() {
            let start = self.start_node();
            let kind = self.lexer.state.kind;
            let operator = match &self.lexer.state.value {
                TokenValue::Op(op) => (*op).to_string(),
                _ => kind.label().to_string(),
            };
            let update = kind == TokenKind::IncDec;
            self.next()?;
            let argument = self.parse_maybe_unary()?;
            if update {
                D::check_lval(self, &argument, false, None, "prefix operation")?;
            } else if self.lexer.state.strict
                && kind == TokenKind::Delete
                && argument.is_identifier()
            {
                return Err(self.raise(start.start, messages::DELETE_LOCAL_VARIABLE_STRICT));
            }
            let span = self.finish_node(start);
            return Ok(if update {
                Expression::UpdateExpression(UpdateExpression {
                    span,
                    operator,
                    prefix: true,
                    argument: Box::new(argument),
                })
            } else {
                Expression::UnaryExpression(UnaryExpression {
                    span,
                    operator,
                    prefix: true,
                    argument: Box::new(argument),
                })
            });
        }
        let start = self.start_node();
        let mut expr = self.parse_expr_subscripts()?;
        while self.lexer.state.kind.postfix() && !self.can_insert_semicolon() {
            D::check_lval(self, &expr, false, None, "postfix operation")?;
            let operator = match &self.lexer.state.value {
                TokenValue::Op(op) => (*op).to_string(),
                _ => self.lexer.state.kind.label().to_string(),
            };
            self.next()?;
            expr = Expression::UpdateExpression(UpdateExpression {
                span: self.finish_node(start),
                operator,
                prefix: false,
                argument: Box::new(expr),
            });
        }
        Ok(expr)
    }

    fn parse_expr_subscripts(&mut self) -> ParseResult<Expression> {
        let start = self.start_node();
        let atom = D::parse_expr_atom(self)?;
        self.parse_subscripts(atom, start, false)
    }

    fn parse_subscripts(
        &mut self,
        base: Expression,
        start: NodeStart,
        no_calls: bool,
    ) -> ParseResult<Expression> {
        let mut expr = base;
        loop {
            if self.eat(TokenKind::Dot)? {
                let property = Expression::Identifier(self.parse_identifier(true)?);
                expr = Expression::MemberExpression(MemberExpression {
                    span: self.finish_node(start),
                    object: Box::new(expr),
                    property: Box::new(property),
                    computed: false,
                });
            } else if self.eat(TokenKind::BracketL)? {
                let property = self.parse_expression()?;
                self.expect(TokenKind::BracketR)?;
                expr = Expression::MemberExpression(MemberExpression {
                    span: self.finish_node(start),
                    object: Box::new(expr),
                    property: Box::new(property),
                    computed: true,
                });
            } else if !no_calls && self.matches(TokenKind::ParenL) {
                let arguments = self.parse_call_args()?;
                expr = Expression::CallExpression(CallExpression {
                    span: self.finish_node(start),
                    callee: Box::new(expr),
                    arguments,
                });
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_call_args(&mut self) -> ParseResult<Vec<Expression>> {
        self.expect(TokenKind::ParenL)?;
        let mut args = Vec::new();
        let mut first = true;
        while !self.eat(TokenKind::ParenR)? {
            if first {
                first = false;
            } else {
                self.expect(TokenKind::Comma)?;
                if self.eat(TokenKind::ParenR)? {
                    break;
                }
            }
            if self.matches(TokenKind::Ellipsis) {
                let spread_start = self.start_node();
                self.next()?;
                let argument = self.parse_maybe_assign()?;
                args.push(Expression::SpreadElement(SpreadElement {
                    span: self.finish_node(spread_start),
                    argument: Box::new(argument),
                }));
            } else {
                args.push(self.parse_maybe_assign()?);
            }
        }
        Ok(args)
    }

    /// The base expression-atom production; the default body of the
    /// `parse_expr_atom` hook. Literal tokens are routed through the
    /// literal hooks so each dialect shapes its own literal nodes.
    pub fn default_parse_expr_atom(&mut self) -> ParseResult<Expression> {
        let start = self.start_node();
        match self.lexer.state.kind {
            TokenKind::Num => {
                let value = match &self.lexer.state.value {
                    TokenValue::Num(n) => *n,
                    _ => return self.unexpected(),
                };
                D::parse_literal(self, LiteralToken::Number(value))
            }
            TokenKind::String => {
                let value = match &self.lexer.state.value {
                    TokenValue::Str(s) => s.clone(),
                    _ => return self.unexpected(),
                };
                D::parse_literal(self, LiteralToken::String(value))
            }
            TokenKind::True => D::parse_literal(self, LiteralToken::Boolean(true)),
            TokenKind::False => D::parse_literal(self, LiteralToken::Boolean(false)),
            TokenKind::Null => D::parse_literal(self, LiteralToken::Null),
            TokenKind::Regexp => {
                let (pattern, flags) = match &self.lexer.state.value {
                    TokenValue::Regex { pattern, flags } => (pattern.clone(), flags.clone()),
                    _ => return self.unexpected(),
                };
                D::parse_regexp_literal(self, pattern, flags)
            }
            TokenKind::Name => {
                if self.is_contextual("async") {
                    let ahead = self.lexer.lookahead()?;
                    if ahead.kind == TokenKind::Function
                        && !self.lexer.has_line_break(self.lexer.state.end, ahead.start)
                    {
                        self.next()?;
                        let func = self.parse_function(start, false, true)?;
                        return Ok(Expression::FunctionExpression(func));
                    }
                }
                let can_be_arrow =
                    self.lexer.state.potential_arrow_at == Some(self.lexer.state.start);
                let id = self.parse_identifier(false)?;
                if can_be_arrow && !self.can_insert_semicolon() && self.eat(TokenKind::Arrow)? {
                    return self.parse_arrow_body(start, vec![Expression::Identifier(id)]);
                }
                Ok(Expression::Identifier(id))
            }
            TokenKind::This => {
                self.next()?;
                Ok(Expression::ThisExpression(ThisExpression {
                    span: self.finish_node(start),
                }))
            }
            TokenKind::Super => {
                if self.lexer.state.in_method.is_none() {
                    return Err(self.raise(start.start, messages::SUPER_OUTSIDE));
                }
                self.next()?;
                if self.matches(TokenKind::ParenL)
                    && !(self.lexer.state.in_method == Some(MethodKind::Constructor)
                        && self.lexer.state.flags.contains(ScopeFlags::IN_CLASS))
                {
                    return Err(self.raise(start.start, messages::SUPER_CALL_OUTSIDE_CONSTRUCTOR));
                }
                if !self.matches(TokenKind::ParenL)
                    && !self.matches(TokenKind::BracketL)
                    && !self.matches(TokenKind::Dot)
                {
                    return self.unexpected();
                }
                Ok(Expression::Super(Super {
                    span: self.finish_node(start),
                }))
            }
            TokenKind::Function => {
                let func = self.parse_function(start, false, false)?;
                Ok(Expression::FunctionExpression(func))
            }
            TokenKind::Class => Ok(Expression::ClassExpression(self.parse_class_node(false)?)),
            TokenKind::ParenL => {
                let can_be_arrow =
                    self.lexer.state.potential_arrow_at == Some(self.lexer.state.start);
                self.parse_paren_and_distinguish(can_be_arrow)
            }
            TokenKind::BracketL => self.parse_array_literal(),
            TokenKind::BraceL => self.parse_obj(false),
            TokenKind::BackQuote => self.parse_template(),
            TokenKind::New => self.parse_new(),
            _ => self.unexpected(),
        }
    }

    fn parse_array_literal(&mut self) -> ParseResult<Expression> {
        let start = self.start_node();
        self.next()?;
        let mut elements = Vec::new();
        loop {
            if self.eat(TokenKind::BracketR)? {
                break;
            }
            if self.matches(TokenKind::Comma) {
                self.next()?;
                elements.push(None);
                continue;
            }
            let element = if self.matches(TokenKind::Ellipsis) {
                let spread_start = self.start_node();
                self.next()?;
                let argument = self.parse_maybe_assign()?;
                Expression::SpreadElement(SpreadElement {
                    span: self.finish_node(spread_start),
                    argument: Box::new(argument),
                })
            } else {
                self.parse_maybe_assign()?
            };
            elements.push(Some(element));
            if !self.matches(TokenKind::BracketR) {
                self.expect(TokenKind::Comma)?;
            }
        }
        Ok(Expression::ArrayExpression(ArrayExpression {
            span: self.finish_node(start),
            elements,
        }))
    }

    fn parse_new(&mut self) -> ParseResult<Expression> {
        let start = self.start_node();
        self.next()?;
        let callee_start = self.start_node();
        let atom = D::parse_expr_atom(self)?;
        let callee = self.parse_subscripts(atom, callee_start, true)?;
        let arguments = if self.matches(TokenKind::ParenL) {
            self.parse_call_args()?
        } else {
            Vec::new()
        };
        Ok(Expression::NewExpression(NewExpression {
            span: self.finish_node(start),
            callee: Box::new(callee),
            arguments,
        }))
    }

    fn parse_template(&mut self) -> ParseResult<Expression> {
        let start = self.start_node();
        self.next()?;
        let mut quasis = Vec::new();
        let mut expressions = Vec::new();
        loop {
            let element = self.parse_template_element()?;
            let tail = element.tail;
            quasis.push(element);
            if tail {
                break;
            }
            self.expect(TokenKind::DollarBraceL)?;
            expressions.push(self.parse_expression()?);
            self.expect(TokenKind::BraceR)?;
        }
        self.next()?;
        Ok(Expression::TemplateLiteral(TemplateLiteral {
            span: self.finish_node(start),
            quasis,
            expressions,
        }))
    }

    fn parse_template_element(&mut self) -> ParseResult<TemplateElement> {
        let start = self.start_node();
        if !self.matches(TokenKind::Template) {
            return self.unexpected();
        }
        let (cooked, raw) = match &self.lexer.state.value {
            TokenValue::Template { cooked, raw } => (cooked.clone(), raw.clone()),
            _ => return self.unexpected(),
        };
        if cooked.is_none() {
            let pos = self
                .lexer
                .state
                .invalid_template_escape_position
                .unwrap_or(self.lexer.state.start);
            return Err(self.raise(pos, messages::INVALID_TEMPLATE_ESCAPE));
        }
        self.next()?;
        let tail = self.matches(TokenKind::BackQuote);
        Ok(TemplateElement {
            span: self.finish_node(start),
            value: TemplateElementValue { raw, cooked },
            tail,
        })
    }

    /// Distinguish `(a, b) => c` from a parenthesized expression: attempt
    /// the arrow parameter list against a full state snapshot. Reaching the
    /// `=>` commits the attempt — its state becomes the continuing state and
    /// later errors are fatal; failing before it discards the snapshot's
    /// continuation and re-parses as a plain expression.
    fn parse_paren_and_distinguish(&mut self, can_be_arrow: bool) -> ParseResult<Expression> {
        let start = self.start_node();
        if can_be_arrow {
            let snapshot = self.lexer.state.clone(false);
            let saved_shorthand = self.shorthand_default_pos;
            match self.try_parse_arrow_params() {
                Ok(params) => return self.parse_arrow_body(start, params),
                Err(_) => {
                    self.lexer.state = snapshot;
                    self.shorthand_default_pos = saved_shorthand;
                }
            }
        }
        self.expect(TokenKind::ParenL)?;
        let mut expr = self.parse_expression()?;
        self.expect(TokenKind::ParenR)?;
        if let Some(pos) = self.shorthand_default_pos.take() {
            return Err(self.raise(pos, messages::SHORTHAND_ONLY_DESTRUCTURING));
        }
        expr.mark_parenthesized();
        Ok(expr)
    }

    fn try_parse_arrow_params(&mut self) -> ParseResult<Vec<Expression>> {
        self.expect(TokenKind::ParenL)?;
        let mut params = Vec::new();
        if !self.matches(TokenKind::ParenR) {
            loop {
                if self.matches(TokenKind::Ellipsis) {
                    let rest_start = self.start_node();
                    self.next()?;
                    let argument = self.parse_binding_atom()?;
                    params.push(Expression::RestElement(RestElement {
                        span: self.finish_node(rest_start),
                        argument: Box::new(argument),
                    }));
                    break;
                }
                params.push(self.parse_maybe_default()?);
                if !self.eat(TokenKind::Comma)? {
                    break;
                }
            }
        }
        self.expect(TokenKind::ParenR)?;
        if !self.matches(TokenKind::Arrow) || self.lexer.has_line_break_before_current() {
            return self.unexpected();
        }
        self.next()?;
        Ok(params)
    }

    fn parse_arrow_body(
        &mut self,
        start: NodeStart,
        params: Vec<Expression>,
    ) -> ParseResult<Expression> {
        let mut clashes: FxHashMap<String, bool> = FxHashMap::default();
        for param in &params {
            D::check_lval(
                self,
                param,
                true,
                Some(&mut clashes),
                "arrow function parameters",
            )?;
        }
        let old_flags = self.lexer.state.flags;
        self.lexer.state.flags.insert(ScopeFlags::IN_FUNCTION);
        self.lexer.state.flags.remove(ScopeFlags::IN_GENERATOR);
        self.lexer.state.flags.remove(ScopeFlags::IN_ASYNC);
        let (body, expression) = if self.matches(TokenKind::BraceL) {
            let block = self.parse_function_body(start, &params)?;
            (ArrowFunctionBody::Block(block), false)
        } else {
            // An expression body is never scanned for directives and never
            // turns the function strict.
            let expr = self.parse_maybe_assign()?;
            (ArrowFunctionBody::Expression(Box::new(expr)), true)
        };
        self.lexer.state.flags = old_flags;
        Ok(Expression::ArrowFunctionExpression(
            ArrowFunctionExpression {
                span: self.finish_node(start),
                id: None,
                params,
                body,
                expression,
                generator: false,
                is_async: false,
            },
        ))
    }

    pub fn parse_identifier(&mut self, liberal: bool) -> ParseResult<Identifier> {
        let start = self.start_node();
        let name = match self.lexer.state.kind {
            TokenKind::Name => match &self.lexer.state.value {
                TokenValue::Word(w) => w.clone(),
                _ => return self.unexpected(),
            },
            kind if liberal && kind.is_keyword() => match &self.lexer.state.value {
                TokenValue::Word(w) => w.clone(),
                _ => kind.label().to_string(),
            },
            _ => return self.unexpected(),
        };
        self.next()?;
        Ok(Identifier {
            span: self.finish_node(start),
            name,
        })
    }

    // ========================================================================
    // Binding patterns
    // ========================================================================

    fn parse_binding_atom(&mut self) -> ParseResult<Expression> {
        match self.lexer.state.kind {
            TokenKind::Name => Ok(Expression::Identifier(self.parse_identifier(false)?)),
            TokenKind::BracketL => self.parse_array_pattern(),
            TokenKind::BraceL => self.parse_obj(true),
            _ => self.unexpected(),
        }
    }

    fn parse_array_pattern(&mut self) -> ParseResult<Expression> {
        let start = self.start_node();
        self.next()?;
        let mut elements = Vec::new();
        loop {
            if self.eat(TokenKind::BracketR)? {
                break;
            }
            if self.matches(TokenKind::Comma) {
                self.next()?;
                elements.push(None);
                continue;
            }
            if self.matches(TokenKind::Ellipsis) {
                let rest_start = self.start_node();
                self.next()?;
                let argument = self.parse_binding_atom()?;
                elements.push(Some(Expression::RestElement(RestElement {
                    span: self.finish_node(rest_start),
                    argument: Box::new(argument),
                })));
                self.expect(TokenKind::BracketR)?;
                break;
            }
            elements.push(Some(self.parse_maybe_default()?));
            if !self.matches(TokenKind::BracketR) {
                self.expect(TokenKind::Comma)?;
            }
        }
        Ok(Expression::ArrayPattern(ArrayPattern {
            span: self.finish_node(start),
            elements,
        }))
    }

    fn parse_maybe_default(&mut self) -> ParseResult<Expression> {
        let start = self.start_node();
        let left = self.parse_binding_atom()?;
        if self.eat(TokenKind::Eq)? {
            let right = self.parse_maybe_assign()?;
            return Ok(Expression::AssignmentPattern(AssignmentPattern {
                span: self.finish_node(start),
                left: Box::new(left),
                right: Box::new(right),
            }));
        }
        Ok(left)
    }

    // ========================================================================
    // Default hook behavior: literals
    // ========================================================================

    /// The raw source text of the current token.
    pub fn cur_token_raw(&self) -> String {
        self.lexer.slice(self.lexer.state.start, self.lexer.state.end)
    }

    pub fn default_parse_literal(&mut self, token: LiteralToken) -> ParseResult<Expression> {
        let start = self.start_node();
        let raw = self.cur_token_raw();
        self.next()?;
        let span = self.finish_node(start);
        let extra = Some(Extra::raw(raw));
        Ok(match token {
            LiteralToken::Number(value) => Expression::NumericLiteral(NumericLiteral {
                span,
                value,
                extra,
            }),
            LiteralToken::String(value) => Expression::StringLiteral(StringLiteral {
                span,
                value,
                extra,
            }),
            LiteralToken::Boolean(value) => Expression::BooleanLiteral(BooleanLiteral {
                span,
                value,
                extra,
            }),
            LiteralToken::Null => Expression::NullLiteral(NullLiteral { span, extra }),
        })
    }

    pub fn default_parse_regexp_literal(
        &mut self,
        pattern: String,
        flags: String,
    ) -> ParseResult<Expression> {
        let start = self.start_node();
        let raw = self.cur_token_raw();
        self.next()?;
        Ok(Expression::RegExpLiteral(RegExpLiteral {
            span: self.finish_node(start),
            pattern,
            flags,
            extra: Some(Extra::raw(raw)),
        }))
    }

    // ========================================================================
    // Default hook behavior: members
    // ========================================================================

    pub fn default_parse_object_property(
        &mut self,
        shape: ObjectMemberShape,
        value: Expression,
    ) -> ParseResult<ObjectMember> {
        Ok(ObjectMember::ObjectProperty(ObjectProperty {
            span: self.finish_node(shape.start),
            key: Box::new(shape.key),
            value: Box::new(value),
            computed: shape.computed,
            shorthand: shape.shorthand,
        }))
    }

    pub fn default_parse_object_method(
        &mut self,
        shape: ObjectMemberShape,
        parts: MethodParts,
    ) -> ParseResult<ObjectMember> {
        Ok(ObjectMember::ObjectMethod(ObjectMethod {
            span: self.finish_node(shape.start),
            key: Box::new(shape.key),
            kind: shape.kind,
            params: parts.params,
            body: parts.body,
            computed: shape.computed,
            generator: shape.generator,
            is_async: shape.is_async,
        }))
    }

    pub fn default_parse_class_method(
        &mut self,
        shape: ClassMethodShape,
        parts: MethodParts,
    ) -> ParseResult<ClassMember> {
        Ok(ClassMember::ClassMethod(ClassMethod {
            span: self.finish_node(shape.start),
            key: Box::new(shape.key),
            kind: shape.kind,
            params: parts.params,
            body: parts.body,
            computed: shape.computed,
            is_static: shape.is_static,
            generator: shape.generator,
            is_async: shape.is_async,
            type_parameters: shape.type_parameters,
        }))
    }

    // ========================================================================
    // Default hook behavior: validation
    // ========================================================================

    pub fn default_check_getter_setter_param_count(
        &mut self,
        kind: MethodKind,
        member_start: usize,
        params: &[Expression],
    ) -> ParseResult<()> {
        let expected = if kind == MethodKind::Get { 0 } else { 1 };
        if params.len() != expected {
            let message = if kind == MethodKind::Get {
                messages::GETTER_NO_PARAMS
            } else {
                messages::SETTER_EXACTLY_ONE_PARAM
            };
            return Err(self.raise(member_start, message));
        }
        Ok(())
    }

    pub fn default_check_prop_clash(
        &mut self,
        member: &ObjectMember,
        seen: &mut FxHashMap<String, bool>,
    ) -> ParseResult<()> {
        let ObjectMember::ObjectProperty(prop) = member else {
            return Ok(());
        };
        if prop.computed {
            return Ok(());
        }
        self.check_proto_key(&prop.key, seen)
    }

    /// Shared `__proto__` bookkeeping: the key's name (identifier text or
    /// literal value coerced to text) is looked up in the per-object-literal
    /// marker map; a second occurrence raises.
    pub fn check_proto_key(
        &self,
        key: &Expression,
        seen: &mut FxHashMap<String, bool>,
    ) -> ParseResult<()> {
        let Some(name) = object_key_name(key) else {
            return Ok(());
        };
        if name == "__proto__" && seen.insert("proto".to_string(), true).is_some() {
            return Err(self.raise(key.start() as usize, messages::PROTO_REDEFINITION));
        }
        Ok(())
    }

    pub fn default_check_lval(
        &mut self,
        expr: &Expression,
        is_binding: bool,
        mut clashes: Option<&mut FxHashMap<String, bool>>,
        context: &'static str,
    ) -> ParseResult<()> {
        match expr {
            Expression::Identifier(id) => {
                if self.lexer.state.strict
                    && (is_strict_reserved_word(&id.name) || is_strict_bind_reserved_word(&id.name))
                {
                    let template = if is_binding {
                        messages::BINDING_IN_STRICT_MODE
                    } else {
                        messages::ASSIGNING_IN_STRICT_MODE
                    };
                    return Err(self.raise(
                        id.span.start as usize,
                        &format_message(template, &[&id.name]),
                    ));
                }
                if let Some(clashes) = clashes {
                    let key = format!("_{}", id.name);
                    if clashes.insert(key, true).is_some() {
                        return Err(
                            self.raise(id.span.start as usize, messages::ARGUMENT_NAME_CLASH)
                        );
                    }
                }
                Ok(())
            }
            Expression::MemberExpression(member) => {
                if is_binding {
                    Err(self.raise(member.span.start as usize, messages::BINDING_MEMBER_EXPRESSION))
                } else {
                    Ok(())
                }
            }
            Expression::ObjectPattern(obj) => {
                for member in &obj.properties {
                    let target: &Expression = match member {
                        ObjectMember::ObjectProperty(p) => &p.value,
                        ObjectMember::Property(p) => &p.value,
                        ObjectMember::RestElement(r) => &r.argument,
                        ObjectMember::SpreadElement(s) => &s.argument,
                        ObjectMember::ObjectMethod(_) => continue,
                    };
                    D::check_lval(
                        self,
                        target,
                        is_binding,
                        clashes.as_mut().map(|c| &mut **c),
                        "object destructuring pattern",
                    )?;
                }
                Ok(())
            }
            Expression::ArrayPattern(arr) => {
                for element in arr.elements.iter().flatten() {
                    D::check_lval(
                        self,
                        element,
                        is_binding,
                        clashes.as_mut().map(|c| &mut **c),
                        "array destructuring pattern",
                    )?;
                }
                Ok(())
            }
            Expression::AssignmentPattern(pat) => {
                D::check_lval(self, &pat.left, is_binding, clashes, context)
            }
            Expression::RestElement(rest) => {
                D::check_lval(self, &rest.argument, is_binding, clashes, context)
            }
            _ => {
                let message = if is_binding {
                    messages::BINDING_RVALUE
                } else {
                    messages::ASSIGNING_TO_RVALUE
                };
                Err(self.raise(expr.start() as usize, message))
            }
        }
    }

    pub fn default_check_declaration(&mut self, expr: &Expression) -> ParseResult<()> {
        match expr {
            Expression::Identifier(id) => {
                self.check_duplicate_exports(id.span.start as usize, &id.name)
            }
            Expression::ObjectPattern(obj) => {
                for member in &obj.properties {
                    match member {
                        ObjectMember::ObjectProperty(p) => D::check_declaration(self, &p.value)?,
                        ObjectMember::Property(p) => D::check_declaration(self, &p.value)?,
                        ObjectMember::RestElement(r) => D::check_declaration(self, &r.argument)?,
                        ObjectMember::SpreadElement(_) | ObjectMember::ObjectMethod(_) => {}
                    }
                }
                Ok(())
            }
            Expression::ArrayPattern(arr) => {
                for element in arr.elements.iter().flatten() {
                    D::check_declaration(self, element)?;
                }
                Ok(())
            }
            Expression::AssignmentPattern(pat) => D::check_declaration(self, &pat.left),
            Expression::RestElement(rest) => D::check_declaration(self, &rest.argument),
            _ => Ok(()),
        }
    }

    // ========================================================================
    // Default hook behavior: directives and strictness
    // ========================================================================

    pub fn default_is_strict_body(
        &mut self,
        body: Option<&BlockStatement>,
        is_expression: bool,
    ) -> bool {
        if is_expression {
            return false;
        }
        let Some(block) = body else {
            return false;
        };
        match &block.directives {
            Some(directives) => directives.iter().any(|d| d.value.value == "use strict"),
            None => false,
        }
    }

    pub fn default_is_valid_directive(&mut self, stmt: &Statement) -> bool {
        let Statement::ExpressionStatement(es) = stmt else {
            return false;
        };
        if es.directive.is_some() {
            return false;
        }
        match es.expression.as_ref() {
            Expression::StringLiteral(lit) => !lit
                .extra
                .as_ref()
                .and_then(|e| e.parenthesized)
                .unwrap_or(false),
            _ => false,
        }
    }

    pub fn default_stmt_to_directive(&mut self, stmt: Statement) -> ParseResult<Directive> {
        let es = match stmt {
            Statement::ExpressionStatement(es) => es,
            other => return Err(self.raise(other.start() as usize, messages::UNEXPECTED_TOKEN)),
        };
        let (literal_span, raw) = match *es.expression {
            Expression::StringLiteral(lit) => {
                let raw = lit.extra.and_then(|e| e.raw).unwrap_or_default();
                (lit.span, raw)
            }
            Expression::Literal(lit) => (lit.span, lit.raw),
            other => return Err(self.raise(other.start() as usize, messages::UNEXPECTED_TOKEN)),
        };
        let unquoted = if raw.len() >= 2 {
            raw[1..raw.len() - 1].to_string()
        } else {
            String::new()
        };
        Ok(Directive {
            span: es.span,
            value: DirectiveLiteral {
                span: literal_span,
                value: unquoted,
                extra: Some(Extra::raw(raw)),
            },
        })
    }

    pub fn default_finish_block_body(
        &mut self,
        body: Vec<Statement>,
        directives: Vec<Directive>,
    ) -> (Vec<Statement>, Option<Vec<Directive>>) {
        (body, Some(directives))
    }

    // ========================================================================
    // Default hook behavior: pattern conversion
    // ========================================================================

    pub fn default_to_assignable(
        &mut self,
        expr: Expression,
        is_binding: bool,
        context: &'static str,
    ) -> ParseResult<Expression> {
        match expr {
            Expression::Identifier(_)
            | Expression::ObjectPattern(_)
            | Expression::ArrayPattern(_)
            | Expression::AssignmentPattern(_)
            | Expression::RestElement(_) => Ok(expr),
            Expression::MemberExpression(_) if !is_binding => Ok(expr),
            Expression::ObjectExpression(obj) => {
                let mut properties = Vec::with_capacity(obj.properties.len());
                for member in obj.properties {
                    properties.push(self.object_member_to_assignable(member, is_binding)?);
                }
                Ok(Expression::ObjectPattern(ObjectPattern {
                    span: obj.span,
                    properties,
                }))
            }
            Expression::ArrayExpression(arr) => {
                let mut elements = Vec::with_capacity(arr.elements.len());
                for element in arr.elements {
                    elements.push(match element {
                        None => None,
                        Some(Expression::SpreadElement(spread)) => {
                            let argument =
                                D::to_assignable(self, *spread.argument, is_binding, context)?;
                            Some(Expression::RestElement(RestElement {
                                span: spread.span,
                                argument: Box::new(argument),
                            }))
                        }
                        Some(el) => Some(D::to_assignable(self, el, is_binding, context)?),
                    });
                }
                Ok(Expression::ArrayPattern(ArrayPattern {
                    span: arr.span,
                    elements,
                }))
            }
            Expression::AssignmentExpression(assign) => {
                if assign.operator != "=" {
                    return Err(
                        self.raise(assign.left.end() as usize, messages::ONLY_EQ_DEFAULT)
                    );
                }
                let left = D::to_assignable(self, *assign.left, is_binding, context)?;
                Ok(Expression::AssignmentPattern(AssignmentPattern {
                    span: assign.span,
                    left: Box::new(left),
                    right: assign.right,
                }))
            }
            other => Err(self.raise(other.start() as usize, messages::ASSIGNING_TO_RVALUE)),
        }
    }

    pub(crate) fn object_member_to_assignable(
        &mut self,
        member: ObjectMember,
        is_binding: bool,
    ) -> ParseResult<ObjectMember> {
        match member {
            ObjectMember::ObjectProperty(mut prop) => {
                let value =
                    D::to_assignable(self, *prop.value, is_binding, "object destructuring pattern")?;
                prop.value = Box::new(value);
                Ok(ObjectMember::ObjectProperty(prop))
            }
            ObjectMember::Property(mut prop) => {
                let value =
                    D::to_assignable(self, *prop.value, is_binding, "object destructuring pattern")?;
                prop.value = Box::new(value);
                Ok(ObjectMember::Property(prop))
            }
            ObjectMember::ObjectMethod(method) => {
                let message = if matches!(method.kind, MethodKind::Get | MethodKind::Set) {
                    messages::PATTERN_NO_ACCESSOR
                } else {
                    messages::PATTERN_NO_METHODS
                };
                Err(self.raise(method.key.start() as usize, message))
            }
            ObjectMember::SpreadElement(spread) => {
                let argument = D::to_assignable(
                    self,
                    *spread.argument,
                    is_binding,
                    "object destructuring pattern",
                )?;
                Ok(ObjectMember::RestElement(RestElement {
                    span: spread.span,
                    argument: Box::new(argument),
                }))
            }
            ObjectMember::RestElement(rest) => Ok(ObjectMember::RestElement(rest)),
        }
    }
}

/// Whether a non-computed key names the class constructor.
fn key_is_constructor(key: &Expression) -> bool {
    match key {
        Expression::Identifier(id) => id.name == "constructor",
        Expression::StringLiteral(lit) => lit.value == "constructor",
        Expression::Literal(lit) => {
            matches!(&lit.value, LiteralValue::String(s) if s == "constructor")
        }
        _ => false,
    }
}

/// The text a non-computed object key contributes for `__proto__`
/// detection: an identifier's name, or a literal value coerced to text.
pub fn object_key_name(key: &Expression) -> Option<String> {
    match key {
        Expression::Identifier(id) => Some(id.name.clone()),
        Expression::StringLiteral(lit) => Some(lit.value.clone()),
        Expression::NumericLiteral(lit) => Some(lit.value.to_string()),
        Expression::Literal(lit) => match &lit.value {
            LiteralValue::String(s) => Some(s.clone()),
            LiteralValue::Number(n) => Some(n.to_string()),
            LiteralValue::Boolean(b) => Some(b.to_string()),
            LiteralValue::Null => Some("null".to_string()),
            LiteralValue::Regex(_) => None,
        },
        _ => None,
    }
}
