//! Fluent syntax tree.
//!
//! Every node carries an optional [`Span`]. Derived equality compares spans
//! too; use [`Node::equals`] with [`SpanMode::Ignore`] for structural
//! comparison.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::unicode::{escape, unescape};

/// Byte range `[start, end)` into the parsed source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanMode {
    Compare,
    Ignore,
}

pub trait Node: Clone + PartialEq {
    fn span(&self) -> Option<Span>;

    fn set_span(&mut self, span: Span);

    /// Remove the span of this node and of every node below it.
    fn clear_spans(&mut self);

    fn without_spans(&self) -> Self {
        let mut node = self.clone();
        node.clear_spans();
        node
    }

    fn equals(&self, other: &Self, spans: SpanMode) -> bool {
        match spans {
            SpanMode::Compare => self == other,
            SpanMode::Ignore => self.without_spans() == other.without_spans(),
        }
    }
}

macro_rules! leaf_node {
    ($ty:ty) => {
        impl Node for $ty {
            fn span(&self) -> Option<Span> {
                self.span
            }

            fn set_span(&mut self, span: Span) {
                self.span = Some(span);
            }

            fn clear_spans(&mut self) {
                self.span = None;
            }
        }
    };
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Resource {
    pub body: Vec<Entry>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub span: Option<Span>,
}

impl Resource {
    pub fn new(body: Vec<Entry>) -> Self {
        Self { body, span: None }
    }

    pub fn junk(&self) -> impl Iterator<Item = &Junk> {
        self.body.iter().filter_map(|entry| match entry {
            Entry::Junk(junk) => Some(junk),
            _ => None,
        })
    }
}

impl Node for Resource {
    fn span(&self) -> Option<Span> {
        self.span
    }

    fn set_span(&mut self, span: Span) {
        self.span = Some(span);
    }

    fn clear_spans(&mut self) {
        self.span = None;
        self.body.iter_mut().for_each(Entry::clear_spans);
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type"))]
pub enum Entry {
    Message(Message),
    Term(Term),
    Comment(Comment),
    GroupComment(Comment),
    ResourceComment(Comment),
    Junk(Junk),
}

impl Entry {
    pub fn is_junk(&self) -> bool {
        matches!(self, Entry::Junk(_))
    }
}

impl Node for Entry {
    fn span(&self) -> Option<Span> {
        match self {
            Entry::Message(message) => message.span,
            Entry::Term(term) => term.span,
            Entry::Comment(comment)
            | Entry::GroupComment(comment)
            | Entry::ResourceComment(comment) => comment.span,
            Entry::Junk(junk) => junk.span,
        }
    }

    fn set_span(&mut self, span: Span) {
        match self {
            Entry::Message(message) => message.set_span(span),
            Entry::Term(term) => term.set_span(span),
            Entry::Comment(comment)
            | Entry::GroupComment(comment)
            | Entry::ResourceComment(comment) => comment.set_span(span),
            Entry::Junk(junk) => junk.set_span(span),
        }
    }

    fn clear_spans(&mut self) {
        match self {
            Entry::Message(message) => message.clear_spans(),
            Entry::Term(term) => term.clear_spans(),
            Entry::Comment(comment)
            | Entry::GroupComment(comment)
            | Entry::ResourceComment(comment) => comment.clear_spans(),
            Entry::Junk(junk) => junk.clear_spans(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Message {
    pub id: Identifier,
    pub value: Option<Pattern>,
    pub attributes: Vec<Attribute>,
    pub comment: Option<Comment>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub span: Option<Span>,
}

impl Node for Message {
    fn span(&self) -> Option<Span> {
        self.span
    }

    fn set_span(&mut self, span: Span) {
        self.span = Some(span);
    }

    fn clear_spans(&mut self) {
        self.span = None;
        self.id.clear_spans();
        if let Some(value) = &mut self.value {
            value.clear_spans();
        }
        self.attributes.iter_mut().for_each(Attribute::clear_spans);
        if let Some(comment) = &mut self.comment {
            comment.clear_spans();
        }
    }
}

/// A term. `id` holds the name without the leading `-`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Term {
    pub id: Identifier,
    pub value: Pattern,
    pub attributes: Vec<Attribute>,
    pub comment: Option<Comment>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub span: Option<Span>,
}

impl Node for Term {
    fn span(&self) -> Option<Span> {
        self.span
    }

    fn set_span(&mut self, span: Span) {
        self.span = Some(span);
    }

    fn clear_spans(&mut self) {
        self.span = None;
        self.id.clear_spans();
        self.value.clear_spans();
        self.attributes.iter_mut().for_each(Attribute::clear_spans);
        if let Some(comment) = &mut self.comment {
            comment.clear_spans();
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Attribute {
    pub id: Identifier,
    pub value: Pattern,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub span: Option<Span>,
}

impl Node for Attribute {
    fn span(&self) -> Option<Span> {
        self.span
    }

    fn set_span(&mut self, span: Span) {
        self.span = Some(span);
    }

    fn clear_spans(&mut self) {
        self.span = None;
        self.id.clear_spans();
        self.value.clear_spans();
    }
}

/// Text and placeables of a value, already dedented. Adjacent text elements
/// are always merged.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Pattern {
    pub elements: Vec<PatternElement>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub span: Option<Span>,
}

impl Pattern {
    pub fn new(elements: Vec<PatternElement>) -> Self {
        Self {
            elements,
            span: None,
        }
    }
}

impl Node for Pattern {
    fn span(&self) -> Option<Span> {
        self.span
    }

    fn set_span(&mut self, span: Span) {
        self.span = Some(span);
    }

    fn clear_spans(&mut self) {
        self.span = None;
        self.elements
            .iter_mut()
            .for_each(PatternElement::clear_spans);
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type"))]
pub enum PatternElement {
    TextElement(TextElement),
    Placeable(Placeable),
}

impl Node for PatternElement {
    fn span(&self) -> Option<Span> {
        match self {
            PatternElement::TextElement(text) => text.span,
            PatternElement::Placeable(placeable) => placeable.span,
        }
    }

    fn set_span(&mut self, span: Span) {
        match self {
            PatternElement::TextElement(text) => text.set_span(span),
            PatternElement::Placeable(placeable) => placeable.set_span(span),
        }
    }

    fn clear_spans(&mut self) {
        match self {
            PatternElement::TextElement(text) => text.clear_spans(),
            PatternElement::Placeable(placeable) => placeable.clear_spans(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct TextElement {
    pub value: String,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub span: Option<Span>,
}

impl TextElement {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            span: None,
        }
    }
}

leaf_node!(TextElement);

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Placeable {
    pub expression: Box<Expression>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub span: Option<Span>,
}

impl Placeable {
    pub fn new(expression: Expression) -> Self {
        Self {
            expression: Box::new(expression),
            span: None,
        }
    }
}

impl Node for Placeable {
    fn span(&self) -> Option<Span> {
        self.span
    }

    fn set_span(&mut self, span: Span) {
        self.span = Some(span);
    }

    fn clear_spans(&mut self) {
        self.span = None;
        self.expression.clear_spans();
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type"))]
pub enum Expression {
    StringLiteral(StringLiteral),
    NumberLiteral(NumberLiteral),
    MessageReference(MessageReference),
    TermReference(TermReference),
    VariableReference(VariableReference),
    FunctionReference(FunctionReference),
    SelectExpression(SelectExpression),
    Placeable(Placeable),
}

impl Node for Expression {
    fn span(&self) -> Option<Span> {
        match self {
            Expression::StringLiteral(literal) => literal.span,
            Expression::NumberLiteral(literal) => literal.span,
            Expression::MessageReference(reference) => reference.span,
            Expression::TermReference(reference) => reference.span,
            Expression::VariableReference(reference) => reference.span,
            Expression::FunctionReference(reference) => reference.span,
            Expression::SelectExpression(select) => select.span,
            Expression::Placeable(placeable) => placeable.span,
        }
    }

    fn set_span(&mut self, span: Span) {
        match self {
            Expression::StringLiteral(literal) => literal.set_span(span),
            Expression::NumberLiteral(literal) => literal.set_span(span),
            Expression::MessageReference(reference) => reference.set_span(span),
            Expression::TermReference(reference) => reference.set_span(span),
            Expression::VariableReference(reference) => reference.set_span(span),
            Expression::FunctionReference(reference) => reference.set_span(span),
            Expression::SelectExpression(select) => select.set_span(span),
            Expression::Placeable(placeable) => placeable.set_span(span),
        }
    }

    fn clear_spans(&mut self) {
        match self {
            Expression::StringLiteral(literal) => literal.clear_spans(),
            Expression::NumberLiteral(literal) => literal.clear_spans(),
            Expression::MessageReference(reference) => reference.clear_spans(),
            Expression::TermReference(reference) => reference.clear_spans(),
            Expression::VariableReference(reference) => reference.clear_spans(),
            Expression::FunctionReference(reference) => reference.clear_spans(),
            Expression::SelectExpression(select) => select.clear_spans(),
            Expression::Placeable(placeable) => placeable.clear_spans(),
        }
    }
}

/// A quoted string. `raw` is the source text between the quotes with escape
/// sequences intact; `value` is the decoded text.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct StringLiteral {
    pub raw: String,
    pub value: String,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub span: Option<Span>,
}

impl StringLiteral {
    pub fn from_raw(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let value = unescape(&raw).into_owned();
        Self {
            raw,
            value,
            span: None,
        }
    }

    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            raw: escape(&value),
            value,
            span: None,
        }
    }
}

leaf_node!(StringLiteral);

/// A number literal. `precision` counts the digits after the decimal point
/// and drives downstream formatting, so `3.140` has precision 3.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct NumberLiteral {
    pub raw: String,
    pub value: f64,
    pub precision: usize,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub span: Option<Span>,
}

impl NumberLiteral {
    pub fn from_raw(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let value = raw.parse::<f64>().unwrap_or(f64::NAN);
        let precision = match raw.find('.') {
            Some(pos) if pos > 0 => raw.len() - pos - 1,
            _ => 0,
        };
        Self {
            raw,
            value,
            precision,
            span: None,
        }
    }
}

leaf_node!(NumberLiteral);

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type"))]
pub enum Literal {
    StringLiteral(StringLiteral),
    NumberLiteral(NumberLiteral),
}

impl Node for Literal {
    fn span(&self) -> Option<Span> {
        match self {
            Literal::StringLiteral(literal) => literal.span,
            Literal::NumberLiteral(literal) => literal.span,
        }
    }

    fn set_span(&mut self, span: Span) {
        match self {
            Literal::StringLiteral(literal) => literal.set_span(span),
            Literal::NumberLiteral(literal) => literal.set_span(span),
        }
    }

    fn clear_spans(&mut self) {
        match self {
            Literal::StringLiteral(literal) => literal.clear_spans(),
            Literal::NumberLiteral(literal) => literal.clear_spans(),
        }
    }
}

impl From<Literal> for Expression {
    fn from(literal: Literal) -> Self {
        match literal {
            Literal::StringLiteral(literal) => Expression::StringLiteral(literal),
            Literal::NumberLiteral(literal) => Expression::NumberLiteral(literal),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MessageReference {
    pub id: Identifier,
    pub attribute: Option<Identifier>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub span: Option<Span>,
}

impl Node for MessageReference {
    fn span(&self) -> Option<Span> {
        self.span
    }

    fn set_span(&mut self, span: Span) {
        self.span = Some(span);
    }

    fn clear_spans(&mut self) {
        self.span = None;
        self.id.clear_spans();
        if let Some(attribute) = &mut self.attribute {
            attribute.clear_spans();
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct TermReference {
    pub id: Identifier,
    pub attribute: Option<Identifier>,
    pub arguments: Option<CallArguments>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub span: Option<Span>,
}

impl Node for TermReference {
    fn span(&self) -> Option<Span> {
        self.span
    }

    fn set_span(&mut self, span: Span) {
        self.span = Some(span);
    }

    fn clear_spans(&mut self) {
        self.span = None;
        self.id.clear_spans();
        if let Some(attribute) = &mut self.attribute {
            attribute.clear_spans();
        }
        if let Some(arguments) = &mut self.arguments {
            arguments.clear_spans();
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct VariableReference {
    pub id: Identifier,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub span: Option<Span>,
}

impl Node for VariableReference {
    fn span(&self) -> Option<Span> {
        self.span
    }

    fn set_span(&mut self, span: Span) {
        self.span = Some(span);
    }

    fn clear_spans(&mut self) {
        self.span = None;
        self.id.clear_spans();
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct FunctionReference {
    pub id: Identifier,
    pub arguments: CallArguments,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub span: Option<Span>,
}

impl Node for FunctionReference {
    fn span(&self) -> Option<Span> {
        self.span
    }

    fn set_span(&mut self, span: Span) {
        self.span = Some(span);
    }

    fn clear_spans(&mut self) {
        self.span = None;
        self.id.clear_spans();
        self.arguments.clear_spans();
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SelectExpression {
    pub selector: Box<Expression>,
    pub variants: Vec<Variant>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub span: Option<Span>,
}

impl SelectExpression {
    pub fn default_variant(&self) -> Option<&Variant> {
        self.variants.iter().find(|variant| variant.default)
    }
}

impl Node for SelectExpression {
    fn span(&self) -> Option<Span> {
        self.span
    }

    fn set_span(&mut self, span: Span) {
        self.span = Some(span);
    }

    fn clear_spans(&mut self) {
        self.span = None;
        self.selector.clear_spans();
        self.variants.iter_mut().for_each(Variant::clear_spans);
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CallArguments {
    pub positional: Vec<Expression>,
    pub named: Vec<NamedArgument>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub span: Option<Span>,
}

impl Node for CallArguments {
    fn span(&self) -> Option<Span> {
        self.span
    }

    fn set_span(&mut self, span: Span) {
        self.span = Some(span);
    }

    fn clear_spans(&mut self) {
        self.span = None;
        self.positional.iter_mut().for_each(Expression::clear_spans);
        self.named.iter_mut().for_each(NamedArgument::clear_spans);
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct NamedArgument {
    pub name: Identifier,
    pub value: Literal,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub span: Option<Span>,
}

impl Node for NamedArgument {
    fn span(&self) -> Option<Span> {
        self.span
    }

    fn set_span(&mut self, span: Span) {
        self.span = Some(span);
    }

    fn clear_spans(&mut self) {
        self.span = None;
        self.name.clear_spans();
        self.value.clear_spans();
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Variant {
    pub key: VariantKey,
    pub value: Pattern,
    pub default: bool,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub span: Option<Span>,
}

impl Node for Variant {
    fn span(&self) -> Option<Span> {
        self.span
    }

    fn set_span(&mut self, span: Span) {
        self.span = Some(span);
    }

    fn clear_spans(&mut self) {
        self.span = None;
        self.key.clear_spans();
        self.value.clear_spans();
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type"))]
pub enum VariantKey {
    Identifier(Identifier),
    NumberLiteral(NumberLiteral),
}

impl Node for VariantKey {
    fn span(&self) -> Option<Span> {
        match self {
            VariantKey::Identifier(id) => id.span,
            VariantKey::NumberLiteral(literal) => literal.span,
        }
    }

    fn set_span(&mut self, span: Span) {
        match self {
            VariantKey::Identifier(id) => id.set_span(span),
            VariantKey::NumberLiteral(literal) => literal.set_span(span),
        }
    }

    fn clear_spans(&mut self) {
        match self {
            VariantKey::Identifier(id) => id.clear_spans(),
            VariantKey::NumberLiteral(literal) => literal.clear_spans(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Identifier {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub span: Option<Span>,
}

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            span: None,
        }
    }
}

leaf_node!(Identifier);

/// Comment text with the `#` markers removed; lines are joined with `\n`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Comment {
    pub content: String,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub span: Option<Span>,
}

impl Comment {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            span: None,
        }
    }
}

leaf_node!(Comment);

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Junk {
    pub content: String,
    pub annotations: Vec<Annotation>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub span: Option<Span>,
}

impl Node for Junk {
    fn span(&self) -> Option<Span> {
        self.span
    }

    fn set_span(&mut self, span: Span) {
        self.span = Some(span);
    }

    fn clear_spans(&mut self) {
        self.span = None;
        self.annotations.iter_mut().for_each(Annotation::clear_spans);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Annotation {
    pub code: String,
    pub arguments: Vec<String>,
    pub message: String,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub span: Option<Span>,
}

leaf_node!(Annotation);
