//! AST node definitions.
//!
//! Every node carries a `Span` (inclusive start / exclusive end offsets plus
//! a line/column location pair) stamped when the node is finished. A node
//! struct cannot be constructed without its span, so an "open" node is never
//! observable — openness lives in the parser's `NodeStart` marker, not here.
//!
//! Dialect families coexist as distinct variants rather than one mutable
//! record with fields added and removed: a base `ClassMethod` and the ESTree
//! `MethodDefinition` that replaces it are different types related by a
//! conversion step in the dialect layer.

use esparse_core::{Comment, Span, TokenRecord};
use serde::ser::SerializeMap;
use serde::Serialize;

// ============================================================================
// Shared pieces
// ============================================================================

/// Raw-text metadata recorded by the base grammar.
///
/// The base dialect keeps `raw` on every literal; the ESTree dialect copies
/// it onto the node proper and discards the rest. `parenthesized` is set on
/// an expression that was wrapped in parentheses in the source; directive
/// validation consults it.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Extra {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parenthesized: Option<bool>,
}

impl Extra {
    pub fn raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Some(raw.into()),
            parenthesized: None,
        }
    }
}

/// Script vs module parse goal.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Script,
    Module,
}

/// `var` / `let` / `const`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VarKind {
    Var,
    Let,
    Const,
}

/// Method kinds used by base `ObjectMethod`/`ClassMethod` members and by the
/// ESTree `MethodDefinition` node.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodKind {
    Constructor,
    Method,
    Get,
    Set,
}

/// Property kinds on the normalized ESTree `Property` node.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    Init,
    Get,
    Set,
}

/// The `pattern`/`flags` source pair of a regex literal, recorded on the
/// ESTree `Literal` node unconditionally, whether or not the host engine
/// could compile it.
#[derive(Debug, Clone, Serialize)]
pub struct RegexSource {
    pub pattern: String,
    pub flags: String,
}

/// A regular expression compiled by the host engine.
///
/// Serializes as an empty object, matching how a host regex value appears in
/// the standard JSON form.
#[derive(Debug, Clone)]
pub struct CompiledRegex(pub regex::Regex);

impl Serialize for CompiledRegex {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_map(Some(0))?.end()
    }
}

/// The value of an ESTree `Literal` node.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum LiteralValue {
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Regex(CompiledRegex),
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Expression {
    Identifier(Identifier),
    // Base literal shapes
    StringLiteral(StringLiteral),
    NumericLiteral(NumericLiteral),
    BooleanLiteral(BooleanLiteral),
    NullLiteral(NullLiteral),
    RegExpLiteral(RegExpLiteral),
    // Normalized ESTree literal shape
    Literal(Literal),
    TemplateLiteral(TemplateLiteral),
    ThisExpression(ThisExpression),
    Super(Super),
    ObjectExpression(ObjectExpression),
    ArrayExpression(ArrayExpression),
    FunctionExpression(FunctionNode),
    ArrowFunctionExpression(ArrowFunctionExpression),
    ClassExpression(ClassNode),
    AssignmentExpression(AssignmentExpression),
    ConditionalExpression(ConditionalExpression),
    LogicalExpression(LogicalExpression),
    BinaryExpression(BinaryExpression),
    UnaryExpression(UnaryExpression),
    UpdateExpression(UpdateExpression),
    CallExpression(CallExpression),
    NewExpression(NewExpression),
    MemberExpression(MemberExpression),
    SequenceExpression(SequenceExpression),
    AwaitExpression(AwaitExpression),
    YieldExpression(YieldExpression),
    // Assignment-target shapes produced by pattern conversion
    ObjectPattern(ObjectPattern),
    ArrayPattern(ArrayPattern),
    AssignmentPattern(AssignmentPattern),
    RestElement(RestElement),
    SpreadElement(SpreadElement),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identifier {
    #[serde(flatten)]
    pub span: Span,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StringLiteral {
    #[serde(flatten)]
    pub span: Span,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<Extra>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericLiteral {
    #[serde(flatten)]
    pub span: Span,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<Extra>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BooleanLiteral {
    #[serde(flatten)]
    pub span: Span,
    pub value: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<Extra>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NullLiteral {
    #[serde(flatten)]
    pub span: Span,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<Extra>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegExpLiteral {
    #[serde(flatten)]
    pub span: Span,
    pub pattern: String,
    pub flags: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<Extra>,
}

/// The one normalized literal shape of the ESTree dialect: every literal
/// kind carries a `value` and the `raw` source text; regex literals also
/// carry the `regex` source pair.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Literal {
    #[serde(flatten)]
    pub span: Span,
    pub value: LiteralValue,
    pub raw: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex: Option<RegexSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<Extra>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateLiteral {
    #[serde(flatten)]
    pub span: Span,
    pub quasis: Vec<TemplateElement>,
    pub expressions: Vec<Expression>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateElement {
    #[serde(flatten)]
    pub span: Span,
    pub value: TemplateElementValue,
    pub tail: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateElementValue {
    pub raw: String,
    /// `None` when the raw text contains an invalid escape sequence.
    pub cooked: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThisExpression {
    #[serde(flatten)]
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub struct Super {
    #[serde(flatten)]
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub struct ObjectExpression {
    #[serde(flatten)]
    pub span: Span,
    pub properties: Vec<ObjectMember>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ObjectPattern {
    #[serde(flatten)]
    pub span: Span,
    pub properties: Vec<ObjectMember>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArrayExpression {
    #[serde(flatten)]
    pub span: Span,
    pub elements: Vec<Option<Expression>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArrayPattern {
    #[serde(flatten)]
    pub span: Span,
    pub elements: Vec<Option<Expression>>,
}

/// Function declaration/expression body and parameters. Shared by the
/// `FunctionDeclaration` statement and `FunctionExpression` expression
/// variants, which differ only in their type tag.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionNode {
    #[serde(flatten)]
    pub span: Span,
    pub id: Option<Identifier>,
    pub params: Vec<Expression>,
    pub body: BlockStatement,
    pub generator: bool,
    #[serde(rename = "async")]
    pub is_async: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_parameters: Option<TypeParameterDeclaration>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ArrowFunctionBody {
    Block(BlockStatement),
    Expression(Box<Expression>),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrowFunctionExpression {
    #[serde(flatten)]
    pub span: Span,
    pub id: Option<Identifier>,
    pub params: Vec<Expression>,
    pub body: ArrowFunctionBody,
    /// Whether the body is a bare expression rather than a block.
    pub expression: bool,
    pub generator: bool,
    #[serde(rename = "async")]
    pub is_async: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentExpression {
    #[serde(flatten)]
    pub span: Span,
    pub operator: String,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConditionalExpression {
    #[serde(flatten)]
    pub span: Span,
    pub test: Box<Expression>,
    pub consequent: Box<Expression>,
    pub alternate: Box<Expression>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogicalExpression {
    #[serde(flatten)]
    pub span: Span,
    pub operator: String,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BinaryExpression {
    #[serde(flatten)]
    pub span: Span,
    pub operator: String,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnaryExpression {
    #[serde(flatten)]
    pub span: Span,
    pub operator: String,
    pub prefix: bool,
    pub argument: Box<Expression>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateExpression {
    #[serde(flatten)]
    pub span: Span,
    pub operator: String,
    pub prefix: bool,
    pub argument: Box<Expression>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CallExpression {
    #[serde(flatten)]
    pub span: Span,
    pub callee: Box<Expression>,
    pub arguments: Vec<Expression>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewExpression {
    #[serde(flatten)]
    pub span: Span,
    pub callee: Box<Expression>,
    pub arguments: Vec<Expression>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberExpression {
    #[serde(flatten)]
    pub span: Span,
    pub object: Box<Expression>,
    pub property: Box<Expression>,
    pub computed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SequenceExpression {
    #[serde(flatten)]
    pub span: Span,
    pub expressions: Vec<Expression>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AwaitExpression {
    #[serde(flatten)]
    pub span: Span,
    pub argument: Box<Expression>,
}

#[derive(Debug, Clone, Serialize)]
pub struct YieldExpression {
    #[serde(flatten)]
    pub span: Span,
    pub argument: Option<Box<Expression>>,
    pub delegate: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignmentPattern {
    #[serde(flatten)]
    pub span: Span,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RestElement {
    #[serde(flatten)]
    pub span: Span,
    pub argument: Box<Expression>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpreadElement {
    #[serde(flatten)]
    pub span: Span,
    pub argument: Box<Expression>,
}

// ============================================================================
// Object and class members
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ObjectMember {
    /// Base shape: a plain `key: value` (or shorthand) member.
    ObjectProperty(ObjectProperty),
    /// Base shape: a method or accessor member.
    ObjectMethod(ObjectMethod),
    /// Normalized ESTree shape covering both of the above.
    Property(Property),
    /// Spread member inside an object literal.
    SpreadElement(SpreadElement),
    /// Rest member inside an object pattern.
    RestElement(RestElement),
}

#[derive(Debug, Clone, Serialize)]
pub struct ObjectProperty {
    #[serde(flatten)]
    pub span: Span,
    pub key: Box<Expression>,
    pub value: Box<Expression>,
    pub computed: bool,
    pub shorthand: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMethod {
    #[serde(flatten)]
    pub span: Span,
    pub key: Box<Expression>,
    pub kind: MethodKind,
    pub params: Vec<Expression>,
    pub body: BlockStatement,
    pub computed: bool,
    pub generator: bool,
    #[serde(rename = "async")]
    pub is_async: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Property {
    #[serde(flatten)]
    pub span: Span,
    pub key: Box<Expression>,
    pub value: Box<Expression>,
    pub kind: PropertyKind,
    pub method: bool,
    pub shorthand: bool,
    pub computed: bool,
}

impl Property {
    /// A "simple" property: non-computed, `init` kind, not a method. The
    /// only member shape that destructuring conversion recurses into.
    pub fn is_simple(&self) -> bool {
        self.kind == PropertyKind::Init && !self.method && !self.computed
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ClassMember {
    /// Base shape: params and body live directly on the member.
    ClassMethod(ClassMethod),
    /// Normalized ESTree shape: the member wraps a function-expression value.
    MethodDefinition(MethodDefinition),
    ClassProperty(ClassProperty),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassMethod {
    #[serde(flatten)]
    pub span: Span,
    pub key: Box<Expression>,
    pub kind: MethodKind,
    pub params: Vec<Expression>,
    pub body: BlockStatement,
    pub computed: bool,
    #[serde(rename = "static")]
    pub is_static: bool,
    pub generator: bool,
    #[serde(rename = "async")]
    pub is_async: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_parameters: Option<TypeParameterDeclaration>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodDefinition {
    #[serde(flatten)]
    pub span: Span,
    pub key: Box<Expression>,
    pub kind: MethodKind,
    /// Always a `FunctionExpression`.
    pub value: Box<Expression>,
    pub computed: bool,
    #[serde(rename = "static")]
    pub is_static: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassProperty {
    #[serde(flatten)]
    pub span: Span,
    pub key: Box<Expression>,
    pub value: Option<Box<Expression>>,
    pub computed: bool,
    #[serde(rename = "static")]
    pub is_static: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassBody {
    #[serde(flatten)]
    pub span: Span,
    pub body: Vec<ClassMember>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassNode {
    #[serde(flatten)]
    pub span: Span,
    pub id: Option<Identifier>,
    pub super_class: Option<Box<Expression>>,
    pub body: ClassBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decorators: Option<Vec<Decorator>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Decorator {
    #[serde(flatten)]
    pub span: Span,
    pub expression: Box<Expression>,
}

/// Generic parameter list attached to a method by the base grammar. The
/// ESTree dialect relocates it onto the method's function value.
#[derive(Debug, Clone, Serialize)]
pub struct TypeParameterDeclaration {
    #[serde(flatten)]
    pub span: Span,
    pub params: Vec<TypeParameter>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TypeParameter {
    #[serde(flatten)]
    pub span: Span,
    pub name: String,
}

// ============================================================================
// Directives
// ============================================================================

/// A leading string-literal statement, tracked separately from the ordinary
/// statement list until dialect post-processing keeps it as a directive or
/// converts it back into an expression statement.
#[derive(Debug, Clone, Serialize)]
pub struct Directive {
    #[serde(flatten)]
    pub span: Span,
    pub value: DirectiveLiteral,
}

#[derive(Debug, Clone, Serialize)]
pub struct DirectiveLiteral {
    #[serde(flatten)]
    pub span: Span,
    /// The directive text with the surrounding quotes stripped. Escape
    /// sequences are left as written, so `"use\x20strict"` does not match
    /// the `"use strict"` pragma.
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<Extra>,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Statement {
    ExpressionStatement(ExpressionStatement),
    BlockStatement(BlockStatement),
    EmptyStatement(EmptyStatement),
    VariableDeclaration(VariableDeclaration),
    FunctionDeclaration(FunctionNode),
    ClassDeclaration(ClassNode),
    ReturnStatement(ReturnStatement),
    IfStatement(IfStatement),
    WhileStatement(WhileStatement),
    BreakStatement(BreakStatement),
    ContinueStatement(ContinueStatement),
    LabeledStatement(LabeledStatement),
    ImportDeclaration(ImportDeclaration),
    ExportNamedDeclaration(ExportNamedDeclaration),
    ExportDefaultDeclaration(ExportDefaultDeclaration),
    ExportAllDeclaration(ExportAllDeclaration),
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpressionStatement {
    #[serde(flatten)]
    pub span: Span,
    pub expression: Box<Expression>,
    /// Present only on statements the ESTree dialect converted back from the
    /// directive list: the unquoted raw directive text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directive: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockStatement {
    #[serde(flatten)]
    pub span: Span,
    pub body: Vec<Statement>,
    /// Base dialect: the accumulated leading directives. Removed (and folded
    /// into `body`) by the ESTree dialect's block post-processing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directives: Option<Vec<Directive>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmptyStatement {
    #[serde(flatten)]
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub struct VariableDeclaration {
    #[serde(flatten)]
    pub span: Span,
    pub kind: VarKind,
    pub declarations: Vec<VariableDeclarator>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VariableDeclarator {
    #[serde(flatten)]
    pub span: Span,
    pub id: Box<Expression>,
    pub init: Option<Box<Expression>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReturnStatement {
    #[serde(flatten)]
    pub span: Span,
    pub argument: Option<Box<Expression>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IfStatement {
    #[serde(flatten)]
    pub span: Span,
    pub test: Box<Expression>,
    pub consequent: Box<Statement>,
    pub alternate: Option<Box<Statement>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WhileStatement {
    #[serde(flatten)]
    pub span: Span,
    pub test: Box<Expression>,
    pub body: Box<Statement>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BreakStatement {
    #[serde(flatten)]
    pub span: Span,
    pub label: Option<Identifier>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContinueStatement {
    #[serde(flatten)]
    pub span: Span,
    pub label: Option<Identifier>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LabeledStatement {
    #[serde(flatten)]
    pub span: Span,
    pub label: Identifier,
    pub body: Box<Statement>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ImportSpecifierNode {
    ImportSpecifier(ImportSpecifier),
    ImportDefaultSpecifier(ImportDefaultSpecifier),
    ImportNamespaceSpecifier(ImportNamespaceSpecifier),
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportSpecifier {
    #[serde(flatten)]
    pub span: Span,
    pub imported: Identifier,
    pub local: Identifier,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportDefaultSpecifier {
    #[serde(flatten)]
    pub span: Span,
    pub local: Identifier,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportNamespaceSpecifier {
    #[serde(flatten)]
    pub span: Span,
    pub local: Identifier,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportDeclaration {
    #[serde(flatten)]
    pub span: Span,
    pub specifiers: Vec<ImportSpecifierNode>,
    /// Always a string literal node.
    pub source: Box<Expression>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportSpecifier {
    #[serde(flatten)]
    pub span: Span,
    pub local: Identifier,
    pub exported: Identifier,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportNamedDeclaration {
    #[serde(flatten)]
    pub span: Span,
    pub declaration: Option<Box<Statement>>,
    pub specifiers: Vec<ExportSpecifier>,
    pub source: Option<Box<Expression>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ExportDefaultKind {
    Declaration(Box<Statement>),
    Expression(Box<Expression>),
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportDefaultDeclaration {
    #[serde(flatten)]
    pub span: Span,
    pub declaration: ExportDefaultKind,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportAllDeclaration {
    #[serde(flatten)]
    pub span: Span,
    /// Always a string literal node.
    pub source: Box<Expression>,
}

// ============================================================================
// Top level
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    #[serde(flatten)]
    pub span: Span,
    pub body: Vec<Statement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directives: Option<Vec<Directive>>,
    pub source_type: SourceType,
}

/// The complete parse result: the program, the comment stream, and (when
/// token recording was requested) the token stream.
#[derive(Debug, Clone, Serialize)]
pub struct File {
    #[serde(flatten)]
    pub span: Span,
    pub program: Program,
    pub comments: Vec<Comment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<Vec<TokenRecord>>,
}

// ============================================================================
// Span access
// ============================================================================

macro_rules! impl_spanned {
    ($name:ident { $($variant:ident),+ $(,)? }) => {
        impl $name {
            pub fn span(&self) -> &Span {
                match self {
                    $(Self::$variant(n) => &n.span,)+
                }
            }

            pub fn span_mut(&mut self) -> &mut Span {
                match self {
                    $(Self::$variant(n) => &mut n.span,)+
                }
            }

            #[inline]
            pub fn start(&self) -> u32 {
                self.span().start
            }

            #[inline]
            pub fn end(&self) -> u32 {
                self.span().end
            }
        }
    };
}

impl_spanned!(Expression {
    Identifier,
    StringLiteral,
    NumericLiteral,
    BooleanLiteral,
    NullLiteral,
    RegExpLiteral,
    Literal,
    TemplateLiteral,
    ThisExpression,
    Super,
    ObjectExpression,
    ArrayExpression,
    FunctionExpression,
    ArrowFunctionExpression,
    ClassExpression,
    AssignmentExpression,
    ConditionalExpression,
    LogicalExpression,
    BinaryExpression,
    UnaryExpression,
    UpdateExpression,
    CallExpression,
    NewExpression,
    MemberExpression,
    SequenceExpression,
    AwaitExpression,
    YieldExpression,
    ObjectPattern,
    ArrayPattern,
    AssignmentPattern,
    RestElement,
    SpreadElement,
});

impl_spanned!(Statement {
    ExpressionStatement,
    BlockStatement,
    EmptyStatement,
    VariableDeclaration,
    FunctionDeclaration,
    ClassDeclaration,
    ReturnStatement,
    IfStatement,
    WhileStatement,
    BreakStatement,
    ContinueStatement,
    LabeledStatement,
    ImportDeclaration,
    ExportNamedDeclaration,
    ExportDefaultDeclaration,
    ExportAllDeclaration,
});

impl_spanned!(ObjectMember {
    ObjectProperty,
    ObjectMethod,
    Property,
    SpreadElement,
    RestElement,
});

impl_spanned!(ClassMember {
    ClassMethod,
    MethodDefinition,
    ClassProperty,
});

impl Expression {
    /// Mark this expression as having been wrapped in parentheses. Only
    /// shapes consulted by directive validation record the flag; everything
    /// else ignores it.
    pub fn mark_parenthesized(&mut self) {
        let extra = match self {
            Expression::StringLiteral(n) => &mut n.extra,
            Expression::NumericLiteral(n) => &mut n.extra,
            Expression::RegExpLiteral(n) => &mut n.extra,
            Expression::Literal(n) => &mut n.extra,
            _ => return,
        };
        extra.get_or_insert_with(Extra::default).parenthesized = Some(true);
    }

    pub fn is_identifier(&self) -> bool {
        matches!(self, Expression::Identifier(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use esparse_core::{Position, SourceLocation};

    fn span(start: u32, end: u32) -> Span {
        Span::new(
            start,
            end,
            SourceLocation::new(Position::new(1, start), Position::new(1, end)),
        )
    }

    #[test]
    fn test_expression_type_tag() {
        let expr = Expression::Identifier(Identifier {
            span: span(0, 3),
            name: "foo".to_string(),
        });
        let json = serde_json::to_value(&expr).unwrap();
        assert_eq!(json["type"], "Identifier");
        assert_eq!(json["name"], "foo");
        assert_eq!(json["start"], 0);
        assert_eq!(json["end"], 3);
    }

    #[test]
    fn test_literal_value_serialization() {
        let lit = Expression::Literal(Literal {
            span: span(0, 3),
            value: LiteralValue::Number(123.0),
            raw: "123".to_string(),
            regex: None,
            extra: None,
        });
        let json = serde_json::to_value(&lit).unwrap();
        assert_eq!(json["type"], "Literal");
        assert_eq!(json["value"], 123.0);
        assert_eq!(json["raw"], "123");
        assert!(json.get("regex").is_none());
    }

    #[test]
    fn test_null_literal_value_serializes_as_null() {
        let lit = Literal {
            span: span(0, 4),
            value: LiteralValue::Null,
            raw: "null".to_string(),
            regex: None,
            extra: None,
        };
        let json = serde_json::to_value(&lit).unwrap();
        assert!(json["value"].is_null());
    }

    #[test]
    fn test_compiled_regex_serializes_as_empty_object() {
        let value = LiteralValue::Regex(CompiledRegex(regex::Regex::new("ab").unwrap()));
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }

    #[test]
    fn test_renamed_flags() {
        let json = serde_json::to_value(ClassMember::MethodDefinition(MethodDefinition {
            span: span(0, 10),
            key: Box::new(Expression::Identifier(Identifier {
                span: span(0, 1),
                name: "m".to_string(),
            })),
            kind: MethodKind::Method,
            value: Box::new(Expression::Identifier(Identifier {
                span: span(1, 2),
                name: "x".to_string(),
            })),
            computed: false,
            is_static: true,
        }))
        .unwrap();
        assert_eq!(json["type"], "MethodDefinition");
        assert_eq!(json["kind"], "method");
        assert_eq!(json["static"], true);
    }

    #[test]
    fn test_mark_parenthesized() {
        let mut expr = Expression::StringLiteral(StringLiteral {
            span: span(1, 13),
            value: "use strict".to_string(),
            extra: Some(Extra::raw("\"use strict\"")),
        });
        expr.mark_parenthesized();
        match expr {
            Expression::StringLiteral(n) => {
                let extra = n.extra.unwrap();
                assert_eq!(extra.parenthesized, Some(true));
                assert_eq!(extra.raw.as_deref(), Some("\"use strict\""));
            }
            _ => unreachable!(),
        }
    }
}
