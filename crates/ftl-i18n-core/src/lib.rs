#![no_std]
#![forbid(unsafe_code)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod ast;
mod error;
mod parser;
mod serializer;
mod stream;
mod unicode;

pub use ast::{
    Annotation, Attribute, CallArguments, Comment, Entry, Expression, FunctionReference,
    Identifier, Junk, Literal, Message, MessageReference, NamedArgument, Node, NumberLiteral,
    Pattern, PatternElement, Placeable, Resource, SelectExpression, Span, SpanMode, StringLiteral,
    Term, TermReference, TextElement, VariableReference, Variant, VariantKey,
};
pub use error::{ErrorKind, ParseError, ParseResult};
pub use parser::{DEFAULT_MAX_DEPTH, FluentParser, ParserOptions, parse, parse_with_options};
pub use serializer::{
    FluentSerializer, SerializerOptions, serialize, serialize_expression, serialize_variant_key,
};
pub use stream::{ParserStream, is_char_id_start};
pub use unicode::{decode_code_point, escape, unescape};
