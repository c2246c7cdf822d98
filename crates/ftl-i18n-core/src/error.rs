use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

/// The closed set of Fluent syntax error codes. `Generic`,
/// `ForbiddenWhitespace` and `ForbiddenVariantAccessor` keep their codes
/// reserved for tooling but are not raised by this parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    Generic,
    ExpectedEntry,
    ExpectedToken(char),
    ExpectedCharRange(&'static str),
    ExpectedMessageField(String),
    ExpectedTermField(String),
    ForbiddenWhitespace,
    ForbiddenCallee,
    ForbiddenKey,
    MissingDefaultVariant,
    MissingVariants,
    MissingValue,
    MissingVariantKey,
    MissingLiteral,
    MultipleDefaultVariants,
    MessageReferenceAsSelector,
    TermReferenceAsSelector,
    MessageAttributeAsSelector,
    TermAttributeAsPlaceable,
    UnterminatedStringExpression,
    PositionalArgumentFollowsNamed,
    DuplicatedNamedArgument(String),
    ForbiddenVariantAccessor,
    UnknownEscapeSequence(char),
    InvalidUnicodeEscapeSequence(String),
    UnbalancedClosingBrace,
    ExpectedInlineExpression,
    ExpectedSimpleExpressionAsSelector,
    MaximumDepthExceeded(usize),
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Generic => "E0001",
            ErrorKind::ExpectedEntry => "E0002",
            ErrorKind::ExpectedToken(_) => "E0003",
            ErrorKind::ExpectedCharRange(_) => "E0004",
            ErrorKind::ExpectedMessageField(_) => "E0005",
            ErrorKind::ExpectedTermField(_) => "E0006",
            ErrorKind::ForbiddenWhitespace => "E0007",
            ErrorKind::ForbiddenCallee => "E0008",
            ErrorKind::ForbiddenKey => "E0009",
            ErrorKind::MissingDefaultVariant => "E0010",
            ErrorKind::MissingVariants => "E0011",
            ErrorKind::MissingValue => "E0012",
            ErrorKind::MissingVariantKey => "E0013",
            ErrorKind::MissingLiteral => "E0014",
            ErrorKind::MultipleDefaultVariants => "E0015",
            ErrorKind::MessageReferenceAsSelector => "E0016",
            ErrorKind::TermReferenceAsSelector => "E0017",
            ErrorKind::MessageAttributeAsSelector => "E0018",
            ErrorKind::TermAttributeAsPlaceable => "E0019",
            ErrorKind::UnterminatedStringExpression => "E0020",
            ErrorKind::PositionalArgumentFollowsNamed => "E0021",
            ErrorKind::DuplicatedNamedArgument(_) => "E0022",
            ErrorKind::ForbiddenVariantAccessor => "E0024",
            ErrorKind::UnknownEscapeSequence(_) => "E0025",
            ErrorKind::InvalidUnicodeEscapeSequence(_) => "E0026",
            ErrorKind::UnbalancedClosingBrace => "E0027",
            ErrorKind::ExpectedInlineExpression => "E0028",
            ErrorKind::ExpectedSimpleExpressionAsSelector => "E0029",
            ErrorKind::MaximumDepthExceeded(_) => "E0030",
        }
    }

    /// Positional arguments used to build the message.
    pub fn args(&self) -> Vec<String> {
        match self {
            ErrorKind::ExpectedToken(token) => vec![token.to_string()],
            ErrorKind::ExpectedCharRange(range) => vec![range.to_string()],
            ErrorKind::ExpectedMessageField(id) | ErrorKind::ExpectedTermField(id) => {
                vec![id.clone()]
            }
            ErrorKind::DuplicatedNamedArgument(name) => vec![name.clone()],
            ErrorKind::UnknownEscapeSequence(ch) => vec![ch.to_string()],
            ErrorKind::InvalidUnicodeEscapeSequence(sequence) => vec![sequence.clone()],
            ErrorKind::MaximumDepthExceeded(max) => vec![max.to_string()],
            _ => Vec::new(),
        }
    }

    pub fn message(&self) -> String {
        match self {
            ErrorKind::Generic => "Generic error".to_string(),
            ErrorKind::ExpectedEntry => "Expected an entry start".to_string(),
            ErrorKind::ExpectedToken(token) => format!("Expected token: \"{token}\""),
            ErrorKind::ExpectedCharRange(range) => {
                format!("Expected a character from range: \"{range}\"")
            }
            ErrorKind::ExpectedMessageField(id) => {
                format!("Expected message \"{id}\" to have a value or attributes")
            }
            ErrorKind::ExpectedTermField(id) => format!("Expected term \"-{id}\" to have a value"),
            ErrorKind::ForbiddenWhitespace => "Keyword cannot end with a whitespace".to_string(),
            ErrorKind::ForbiddenCallee => {
                "The callee has to be an upper-case identifier or a term".to_string()
            }
            ErrorKind::ForbiddenKey => "The argument name has to be a simple identifier".to_string(),
            ErrorKind::MissingDefaultVariant => {
                "Expected one of the variants to be marked as default (*)".to_string()
            }
            ErrorKind::MissingVariants => "Expected at least one variant after \"->\"".to_string(),
            ErrorKind::MissingValue => "Expected value".to_string(),
            ErrorKind::MissingVariantKey => "Expected variant key".to_string(),
            ErrorKind::MissingLiteral => "Expected literal".to_string(),
            ErrorKind::MultipleDefaultVariants => {
                "Only one variant can be marked as default (*)".to_string()
            }
            ErrorKind::MessageReferenceAsSelector => {
                "Message references cannot be used as selectors".to_string()
            }
            ErrorKind::TermReferenceAsSelector => "Terms cannot be used as selectors".to_string(),
            ErrorKind::MessageAttributeAsSelector => {
                "Attributes of messages cannot be used as selectors".to_string()
            }
            ErrorKind::TermAttributeAsPlaceable => {
                "Attributes of terms cannot be used as placeables".to_string()
            }
            ErrorKind::UnterminatedStringExpression => "Unterminated string expression".to_string(),
            ErrorKind::PositionalArgumentFollowsNamed => {
                "Positional arguments must not follow named arguments".to_string()
            }
            ErrorKind::DuplicatedNamedArgument(name) => {
                format!("Named arguments must be unique: \"{name}\"")
            }
            ErrorKind::ForbiddenVariantAccessor => "Cannot access variants of a message.".to_string(),
            ErrorKind::UnknownEscapeSequence(ch) => format!("Unknown escape sequence: \\{ch}."),
            ErrorKind::InvalidUnicodeEscapeSequence(sequence) => {
                format!("Invalid Unicode escape sequence: {sequence}.")
            }
            ErrorKind::UnbalancedClosingBrace => "Unbalanced closing brace in TextElement.".to_string(),
            ErrorKind::ExpectedInlineExpression => "Expected an inline expression".to_string(),
            ErrorKind::ExpectedSimpleExpressionAsSelector => {
                "Expected simple expression as selector".to_string()
            }
            ErrorKind::MaximumDepthExceeded(max) => {
                format!("Placeables nested deeper than {max} levels")
            }
        }
    }
}

/// A syntax error raised inside one entry, pinned to the byte offset where
/// the parser gave up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ErrorKind,
    pub pos: usize,
}

pub type ParseResult<T> = Result<T, ParseError>;

impl ParseError {
    pub fn new(kind: ErrorKind, pos: usize) -> Self {
        Self { kind, pos }
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn message(&self) -> String {
        self.kind.message()
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.kind.code(), self.pos, self.kind.message())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseError {}
