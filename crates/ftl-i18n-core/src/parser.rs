use alloc::collections::BTreeSet;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;

use crate::ast::{
    Annotation, Attribute, CallArguments, Comment, Entry, Expression, FunctionReference,
    Identifier, Junk, Literal, Message, MessageReference, NamedArgument, Node, NumberLiteral,
    Pattern, PatternElement, Placeable, Resource, SelectExpression, Span, StringLiteral, Term,
    TermReference, TextElement, VariableReference, Variant, VariantKey,
};
use crate::error::{ErrorKind, ParseError, ParseResult};
use crate::stream::ParserStream;

pub const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Record byte spans on every node.
    pub with_spans: bool,
    /// Deepest allowed nesting of placeables and call arguments. Deeper
    /// input becomes Junk with `E0030`.
    pub max_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            with_spans: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FluentParser {
    options: ParserOptions,
}

impl FluentParser {
    pub fn new(options: ParserOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> ParserOptions {
        self.options
    }

    /// Parse a whole resource. Malformed entries are recovered as
    /// [`Junk`]; this never fails.
    pub fn parse(&self, source: &str) -> Resource {
        let mut parser = Parser::new(source, self.options);
        parser.ps.skip_blank_block();

        let mut body = Vec::new();
        let mut last_comment: Option<Comment> = None;

        while parser.ps.current_char().is_some() {
            let entry = parser.get_entry_or_junk();
            let blank_lines = parser.ps.skip_blank_block();

            // A comment directly above a message or term belongs to it, but
            // that is only known once the next entry parsed cleanly.
            let mut entry = match entry {
                Entry::Comment(comment)
                    if blank_lines.is_empty() && parser.ps.current_char().is_some() =>
                {
                    last_comment = Some(comment);
                    continue;
                }
                entry => entry,
            };

            if let Some(comment) = last_comment.take() {
                match &mut entry {
                    Entry::Message(Message {
                        comment: slot, span, ..
                    })
                    | Entry::Term(Term {
                        comment: slot, span, ..
                    }) => {
                        if let (Some(span), Some(comment_span)) = (span.as_mut(), comment.span) {
                            span.start = comment_span.start;
                        }
                        *slot = Some(comment);
                    }
                    _ => body.push(Entry::Comment(comment)),
                }
            }

            body.push(entry);
        }

        let mut resource = Resource::new(body);
        if self.options.with_spans {
            resource.set_span(Span::new(0, parser.ps.index()));
        }
        resource
    }

    /// Parse the first message or term of `source`, skipping any comments
    /// before it. A malformed comment is returned as Junk.
    pub fn parse_entry(&self, source: &str) -> Entry {
        let mut parser = Parser::new(source, self.options);
        parser.ps.skip_blank_block();

        while parser.ps.current_char() == Some('#') {
            let skipped = parser.get_entry_or_junk();
            if skipped.is_junk() {
                return skipped;
            }
            parser.ps.skip_blank_block();
        }

        parser.get_entry_or_junk()
    }
}

pub fn parse(source: &str) -> Resource {
    FluentParser::default().parse(source)
}

pub fn parse_with_options(source: &str, options: ParserOptions) -> Resource {
    FluentParser::new(options).parse(source)
}

/// Pattern content before dedenting. Indents are folded into the
/// surrounding text once the common indent of the pattern is known.
enum PatternToken {
    Text(TextElement),
    Placeable(Placeable),
    Indent(String, Span),
}

enum CallArgument {
    Positional(Expression),
    Named(NamedArgument),
}

struct Parser<'s> {
    ps: ParserStream<'s>,
    options: ParserOptions,
    depth: usize,
}

impl<'s> Parser<'s> {
    fn new(source: &'s str, options: ParserOptions) -> Self {
        Self {
            ps: ParserStream::new(source),
            options,
            depth: 0,
        }
    }

    fn error(&self, kind: ErrorKind) -> ParseError {
        ParseError::new(kind, self.ps.index())
    }

    /// Run `f` and record the consumed range on its result, unless the node
    /// already carries a span from an inner production.
    fn spanned<T: Node>(
        &mut self,
        f: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        let start = self.ps.index();
        let mut node = f(self)?;
        if self.options.with_spans && node.span().is_none() {
            node.set_span(Span::new(start, self.ps.index()));
        }
        Ok(node)
    }

    /// Placeables and call arguments share one nesting budget.
    fn enter_nesting(&mut self) -> ParseResult<()> {
        self.depth += 1;
        if self.depth > self.options.max_depth {
            return Err(self.error(ErrorKind::MaximumDepthExceeded(self.options.max_depth)));
        }
        Ok(())
    }

    fn get_entry_or_junk(&mut self) -> Entry {
        let entry_start = self.ps.index();
        self.depth = 0;

        let err = match self.get_entry_line() {
            Ok(entry) => return entry,
            Err(err) => err,
        };

        let mut error_index = err.pos;
        self.ps.skip_to_next_entry_start(entry_start);
        let next_entry_start = self.ps.index();
        if next_entry_start < error_index {
            error_index = next_entry_start;
        }

        let annotation = Annotation {
            code: err.code().to_string(),
            arguments: err.kind.args(),
            message: err.message(),
            span: Some(Span::new(error_index, error_index)),
        };
        Entry::Junk(Junk {
            content: self.ps.slice(entry_start, next_entry_start).to_string(),
            annotations: vec![annotation],
            span: self
                .options
                .with_spans
                .then(|| Span::new(entry_start, next_entry_start)),
        })
    }

    fn get_entry_line(&mut self) -> ParseResult<Entry> {
        let entry = self.get_entry()?;
        self.ps.expect_line_end()?;
        Ok(entry)
    }

    fn get_entry(&mut self) -> ParseResult<Entry> {
        match self.ps.current_char() {
            Some('#') => self.get_comment(),
            Some('-') => self.get_term().map(Entry::Term),
            _ if self.ps.is_identifier_start() => self.get_message().map(Entry::Message),
            _ => Err(self.error(ErrorKind::ExpectedEntry)),
        }
    }

    fn get_comment(&mut self) -> ParseResult<Entry> {
        self.spanned(|p| {
            // 0 for `#`, 1 for `##`, 2 for `###`
            let mut level: Option<usize> = None;
            let mut content = String::new();

            loop {
                let limit = level.map_or(3, |level| level + 1);
                let mut hashes = 0;
                while p.ps.current_char() == Some('#') && hashes < limit {
                    p.ps.next();
                    hashes += 1;
                }
                let line_level = *level.get_or_insert(hashes.saturating_sub(1));

                if p.ps.current_char() != Some('\n') {
                    p.ps.expect_char(' ')?;
                    while let Some(ch) = p.ps.take_char(|ch| ch != '\n') {
                        content.push(ch);
                    }
                }

                if p.ps.is_next_line_comment(line_level) {
                    content.push('\n');
                    p.ps.next();
                } else {
                    break;
                }
            }

            let comment = Comment::new(content);
            Ok(match level {
                Some(0) => Entry::Comment(comment),
                Some(1) => Entry::GroupComment(comment),
                _ => Entry::ResourceComment(comment),
            })
        })
    }

    fn get_message(&mut self) -> ParseResult<Message> {
        self.spanned(|p| {
            let id = p.get_identifier()?;
            p.ps.skip_blank_inline();
            p.ps.expect_char('=')?;

            let value = p.maybe_get_pattern()?;
            let attributes = p.get_attributes()?;
            if value.is_none() && attributes.is_empty() {
                return Err(p.error(ErrorKind::ExpectedMessageField(id.name)));
            }

            Ok(Message {
                id,
                value,
                attributes,
                comment: None,
                span: None,
            })
        })
    }

    fn get_term(&mut self) -> ParseResult<Term> {
        self.spanned(|p| {
            p.ps.expect_char('-')?;
            let id = p.get_identifier()?;
            p.ps.skip_blank_inline();
            p.ps.expect_char('=')?;

            let Some(value) = p.maybe_get_pattern()? else {
                return Err(p.error(ErrorKind::ExpectedTermField(id.name)));
            };
            let attributes = p.get_attributes()?;

            Ok(Term {
                id,
                value,
                attributes,
                comment: None,
                span: None,
            })
        })
    }

    fn get_attribute(&mut self) -> ParseResult<Attribute> {
        self.spanned(|p| {
            p.ps.expect_char('.')?;
            let id = p.get_identifier()?;
            p.ps.skip_blank_inline();
            p.ps.expect_char('=')?;

            match p.maybe_get_pattern()? {
                Some(value) => Ok(Attribute {
                    id,
                    value,
                    span: None,
                }),
                None => Err(p.error(ErrorKind::MissingValue)),
            }
        })
    }

    fn get_attributes(&mut self) -> ParseResult<Vec<Attribute>> {
        let mut attributes = Vec::new();
        self.ps.peek_blank();
        while self.ps.is_attribute_start() {
            self.ps.skip_to_peek();
            attributes.push(self.get_attribute()?);
            self.ps.peek_blank();
        }
        Ok(attributes)
    }

    fn get_identifier(&mut self) -> ParseResult<Identifier> {
        self.spanned(|p| {
            let mut name = String::new();
            name.push(p.ps.take_id_start()?);
            while let Some(ch) = p.ps.take_id_char() {
                name.push(ch);
            }
            Ok(Identifier::new(name))
        })
    }

    fn get_variant_key(&mut self) -> ParseResult<VariantKey> {
        match self.ps.current_char() {
            None => Err(self.error(ErrorKind::MissingVariantKey)),
            Some(ch) if ch.is_ascii_digit() || ch == '-' => {
                self.get_number().map(VariantKey::NumberLiteral)
            }
            Some(_) => self.get_identifier().map(VariantKey::Identifier),
        }
    }

    fn get_variant(&mut self, has_default: bool) -> ParseResult<Variant> {
        self.spanned(|p| {
            let mut default = false;
            if p.ps.current_char() == Some('*') {
                if has_default {
                    return Err(p.error(ErrorKind::MultipleDefaultVariants));
                }
                p.ps.next();
                default = true;
            }

            p.ps.expect_char('[')?;
            p.ps.skip_blank();
            let key = p.get_variant_key()?;
            p.ps.skip_blank();
            p.ps.expect_char(']')?;

            match p.maybe_get_pattern()? {
                Some(value) => Ok(Variant {
                    key,
                    value,
                    default,
                    span: None,
                }),
                None => Err(p.error(ErrorKind::MissingValue)),
            }
        })
    }

    fn get_variants(&mut self) -> ParseResult<Vec<Variant>> {
        let mut variants = Vec::new();
        let mut has_default = false;
        self.ps.skip_blank();

        while self.ps.is_variant_start() {
            let variant = self.get_variant(has_default)?;
            has_default |= variant.default;
            variants.push(variant);
            self.ps.expect_line_end()?;
            self.ps.skip_blank();
        }

        if variants.is_empty() {
            return Err(self.error(ErrorKind::MissingVariants));
        }
        if !has_default {
            return Err(self.error(ErrorKind::MissingDefaultVariant));
        }
        Ok(variants)
    }

    fn get_digits(&mut self) -> ParseResult<()> {
        let mut count = 0;
        while self.ps.take_digit().is_some() {
            count += 1;
        }
        if count == 0 {
            return Err(self.error(ErrorKind::ExpectedCharRange("0-9")));
        }
        Ok(())
    }

    fn get_number(&mut self) -> ParseResult<NumberLiteral> {
        self.spanned(|p| {
            let start = p.ps.index();
            if p.ps.current_char() == Some('-') {
                p.ps.next();
            }
            p.get_digits()?;
            if p.ps.current_char() == Some('.') {
                p.ps.next();
                p.get_digits()?;
            }
            Ok(NumberLiteral::from_raw(p.ps.slice(start, p.ps.index())))
        })
    }

    /// Inline patterns start on the line of the `=`; block patterns start on
    /// the next line and their first indent counts toward the common indent.
    fn maybe_get_pattern(&mut self) -> ParseResult<Option<Pattern>> {
        self.ps.peek_blank_inline();
        if self.ps.is_value_start() {
            self.ps.skip_to_peek();
            return self.get_pattern(false).map(Some);
        }

        self.ps.peek_blank_block();
        if self.ps.is_value_continuation() {
            self.ps.skip_to_peek();
            return self.get_pattern(true).map(Some);
        }

        Ok(None)
    }

    fn get_pattern(&mut self, is_block: bool) -> ParseResult<Pattern> {
        self.spanned(|p| {
            let mut tokens = Vec::new();
            let mut common_indent = usize::MAX;

            if is_block {
                let blank_start = p.ps.index();
                let first_indent = p.ps.skip_blank_inline();
                tokens.push(PatternToken::Indent(
                    first_indent.to_string(),
                    Span::new(blank_start, p.ps.index()),
                ));
                common_indent = first_indent.len();
            }

            while let Some(ch) = p.ps.current_char() {
                match ch {
                    '\n' => {
                        let blank_start = p.ps.index();
                        let blank_lines = p.ps.peek_blank_block();
                        if p.ps.is_value_continuation() {
                            p.ps.skip_to_peek();
                            let indent = p.ps.skip_blank_inline();
                            common_indent = common_indent.min(indent.len());
                            tokens.push(PatternToken::Indent(
                                blank_lines + indent,
                                Span::new(blank_start, p.ps.index()),
                            ));
                            continue;
                        }
                        p.ps.reset_peek(0);
                        break;
                    }
                    '{' => tokens.push(PatternToken::Placeable(p.get_placeable()?)),
                    '}' => return Err(p.error(ErrorKind::UnbalancedClosingBrace)),
                    _ => tokens.push(PatternToken::Text(p.get_text_element()?)),
                }
            }

            Ok(Pattern::new(p.dedent(tokens, common_indent)))
        })
    }

    /// Strip the common indent from every indent token, merge adjacent text
    /// and trim trailing whitespace off the last element.
    fn dedent(&self, tokens: Vec<PatternToken>, common_indent: usize) -> Vec<PatternElement> {
        let mut elements: Vec<PatternElement> = Vec::new();

        for token in tokens {
            let text = match token {
                PatternToken::Placeable(placeable) => {
                    elements.push(PatternElement::Placeable(placeable));
                    continue;
                }
                PatternToken::Text(text) => text,
                PatternToken::Indent(mut value, span) => {
                    value.truncate(value.len().saturating_sub(common_indent));
                    if value.is_empty() {
                        continue;
                    }
                    TextElement {
                        value,
                        span: self.options.with_spans.then_some(span),
                    }
                }
            };

            if let Some(PatternElement::TextElement(prev)) = elements.last_mut() {
                prev.value.push_str(&text.value);
                if let (Some(prev_span), Some(span)) = (prev.span.as_mut(), text.span) {
                    prev_span.end = span.end;
                }
                continue;
            }
            elements.push(PatternElement::TextElement(text));
        }

        if let Some(PatternElement::TextElement(last)) = elements.last_mut() {
            let trimmed = last.value.trim_end_matches([' ', '\t', '\n', '\r']).len();
            last.value.truncate(trimmed);
            if last.value.is_empty() {
                elements.pop();
            }
        }

        elements
    }

    fn get_text_element(&mut self) -> ParseResult<TextElement> {
        self.spanned(|p| {
            let start = p.ps.index();
            while let Some(ch) = p.ps.current_char() {
                if matches!(ch, '{' | '}' | '\n') {
                    break;
                }
                p.ps.next();
            }
            Ok(TextElement::new(p.ps.slice(start, p.ps.index())))
        })
    }

    fn get_escape_sequence(&mut self) -> ParseResult<()> {
        match self.ps.current_char() {
            Some('\\' | '"') => {
                self.ps.next();
                Ok(())
            }
            Some('u') => self.get_unicode_escape_sequence('u', 4),
            Some('U') => self.get_unicode_escape_sequence('U', 6),
            Some(ch) => Err(self.error(ErrorKind::UnknownEscapeSequence(ch))),
            None => Err(self.error(ErrorKind::UnterminatedStringExpression)),
        }
    }

    fn get_unicode_escape_sequence(&mut self, marker: char, digits: usize) -> ParseResult<()> {
        self.ps.expect_char(marker)?;
        let mut sequence = String::new();
        for _ in 0..digits {
            match self.ps.take_hex_digit() {
                Some(ch) => sequence.push(ch),
                None => {
                    let mut invalid = format!("\\{marker}{sequence}");
                    if let Some(ch) = self.ps.current_char() {
                        invalid.push(ch);
                    }
                    return Err(self.error(ErrorKind::InvalidUnicodeEscapeSequence(invalid)));
                }
            }
        }
        Ok(())
    }

    fn get_placeable(&mut self) -> ParseResult<Placeable> {
        self.spanned(|p| {
            p.ps.expect_char('{')?;
            p.enter_nesting()?;
            p.ps.skip_blank();
            let expression = p.get_expression()?;
            p.ps.expect_char('}')?;
            p.depth -= 1;
            Ok(Placeable::new(expression))
        })
    }

    fn get_expression(&mut self) -> ParseResult<Expression> {
        self.spanned(|p| {
            let selector = p.get_inline_expression()?;
            p.ps.skip_blank();

            if p.ps.current_char() == Some('-') {
                if p.ps.peek() != Some('>') {
                    p.ps.reset_peek(0);
                    return Ok(selector);
                }

                match &selector {
                    Expression::MessageReference(reference) => {
                        return Err(p.error(if reference.attribute.is_none() {
                            ErrorKind::MessageReferenceAsSelector
                        } else {
                            ErrorKind::MessageAttributeAsSelector
                        }));
                    }
                    Expression::TermReference(reference) if reference.attribute.is_none() => {
                        return Err(p.error(ErrorKind::TermReferenceAsSelector));
                    }
                    Expression::Placeable(_) => {
                        return Err(p.error(ErrorKind::ExpectedSimpleExpressionAsSelector));
                    }
                    _ => {}
                }

                p.ps.next();
                p.ps.next();
                p.ps.skip_blank_inline();
                p.ps.expect_line_end()?;

                let variants = p.get_variants()?;
                return Ok(Expression::SelectExpression(SelectExpression {
                    selector: selector.into(),
                    variants,
                    span: None,
                }));
            }

            if let Expression::TermReference(TermReference {
                attribute: Some(_),
                ..
            }) = selector
            {
                return Err(p.error(ErrorKind::TermAttributeAsPlaceable));
            }

            Ok(selector)
        })
    }

    fn get_inline_expression(&mut self) -> ParseResult<Expression> {
        self.spanned(|p| {
            if p.ps.current_char() == Some('{') {
                return p.get_placeable().map(Expression::Placeable);
            }

            if p.ps.is_number_start() {
                return p.get_number().map(Expression::NumberLiteral);
            }

            match p.ps.current_char() {
                Some('"') => p.get_string().map(Expression::StringLiteral),
                Some('$') => {
                    p.ps.next();
                    let id = p.get_identifier()?;
                    Ok(Expression::VariableReference(VariableReference { id, span: None }))
                }
                Some('-') => {
                    p.ps.next();
                    if !p.ps.is_identifier_start() {
                        return Err(p.error(ErrorKind::ExpectedInlineExpression));
                    }
                    let id = p.get_identifier()?;
                    let attribute = p.maybe_get_attribute_accessor()?;

                    p.ps.peek_blank();
                    let arguments = if p.ps.current_peek() == Some('(') {
                        p.ps.skip_to_peek();
                        Some(p.get_call_arguments()?)
                    } else {
                        p.ps.reset_peek(0);
                        None
                    };

                    Ok(Expression::TermReference(TermReference {
                        id,
                        attribute,
                        arguments,
                        span: None,
                    }))
                }
                _ if p.ps.is_identifier_start() => {
                    let id = p.get_identifier()?;

                    p.ps.peek_blank();
                    if p.ps.current_peek() == Some('(') {
                        if !is_function_name(&id.name) {
                            return Err(p.error(ErrorKind::ForbiddenCallee));
                        }
                        p.ps.skip_to_peek();
                        let arguments = p.get_call_arguments()?;
                        return Ok(Expression::FunctionReference(FunctionReference {
                            id,
                            arguments,
                            span: None,
                        }));
                    }
                    p.ps.reset_peek(0);

                    let attribute = p.maybe_get_attribute_accessor()?;
                    Ok(Expression::MessageReference(MessageReference {
                        id,
                        attribute,
                        span: None,
                    }))
                }
                _ => Err(p.error(ErrorKind::ExpectedInlineExpression)),
            }
        })
    }

    fn maybe_get_attribute_accessor(&mut self) -> ParseResult<Option<Identifier>> {
        if self.ps.current_char() != Some('.') {
            return Ok(None);
        }
        self.ps.next();
        self.get_identifier().map(Some)
    }

    fn get_call_argument(&mut self) -> ParseResult<CallArgument> {
        let start = self.ps.index();
        let expression = self.get_inline_expression()?;
        self.ps.skip_blank();

        if self.ps.current_char() != Some(':') {
            return Ok(CallArgument::Positional(expression));
        }

        match expression {
            Expression::MessageReference(MessageReference {
                id,
                attribute: None,
                ..
            }) => {
                self.ps.next();
                self.ps.skip_blank();
                let value = self.get_literal()?;
                Ok(CallArgument::Named(NamedArgument {
                    name: id,
                    value,
                    span: self
                        .options
                        .with_spans
                        .then(|| Span::new(start, self.ps.index())),
                }))
            }
            _ => Err(self.error(ErrorKind::ForbiddenKey)),
        }
    }

    fn get_call_arguments(&mut self) -> ParseResult<CallArguments> {
        self.spanned(|p| {
            let mut positional = Vec::new();
            let mut named = Vec::new();
            let mut names = BTreeSet::new();

            p.ps.expect_char('(')?;
            p.enter_nesting()?;
            p.ps.skip_blank();

            while p.ps.current_char() != Some(')') {
                match p.get_call_argument()? {
                    CallArgument::Named(argument) => {
                        if !names.insert(argument.name.name.clone()) {
                            return Err(p.error(ErrorKind::DuplicatedNamedArgument(
                                argument.name.name,
                            )));
                        }
                        named.push(argument);
                    }
                    CallArgument::Positional(_) if !names.is_empty() => {
                        return Err(p.error(ErrorKind::PositionalArgumentFollowsNamed));
                    }
                    CallArgument::Positional(expression) => positional.push(expression),
                }

                p.ps.skip_blank();
                if p.ps.current_char() != Some(',') {
                    break;
                }
                p.ps.next();
                p.ps.skip_blank();
            }

            p.ps.expect_char(')')?;
            p.depth -= 1;
            Ok(CallArguments {
                positional,
                named,
                span: None,
            })
        })
    }

    fn get_string(&mut self) -> ParseResult<StringLiteral> {
        self.spanned(|p| {
            p.ps.expect_char('"')?;
            let start = p.ps.index();
            while let Some(ch) = p.ps.take_char(|ch| ch != '"' && ch != '\n') {
                if ch == '\\' {
                    p.get_escape_sequence()?;
                }
            }

            if p.ps.current_char() == Some('\n') {
                return Err(p.error(ErrorKind::UnterminatedStringExpression));
            }

            let raw = p.ps.slice(start, p.ps.index());
            p.ps.expect_char('"')?;
            Ok(StringLiteral::from_raw(raw))
        })
    }

    fn get_literal(&mut self) -> ParseResult<Literal> {
        if self.ps.is_number_start() {
            return self.get_number().map(Literal::NumberLiteral);
        }
        if self.ps.current_char() == Some('"') {
            return self.get_string().map(Literal::StringLiteral);
        }
        Err(self.error(ErrorKind::MissingLiteral))
    }
}

/// `^[A-Z][A-Z0-9_-]*$`
fn is_function_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(ch) if ch.is_ascii_uppercase())
        && chars.all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit() || ch == '_' || ch == '-')
}

#[cfg(test)]
mod tests {
    use super::{FluentParser, ParserOptions, parse};
    use crate::ast::{
        Entry, Expression, Literal, Node, PatternElement, Resource, Span, SpanMode, VariantKey,
    };
    use alloc::format;
    use alloc::string::{String, ToString};
    use alloc::vec::Vec;

    fn unspanned(source: &str) -> Resource {
        FluentParser::new(ParserOptions {
            with_spans: false,
            ..ParserOptions::default()
        })
        .parse(source)
    }

    fn junk_codes(resource: &Resource) -> Vec<String> {
        resource
            .junk()
            .flat_map(|junk| junk.annotations.iter().map(|a| a.code.clone()))
            .collect()
    }

    fn text_of(entry: &Entry) -> String {
        let Entry::Message(message) = entry else {
            panic!("expected message, got {entry:?}");
        };
        let value = message.value.as_ref().expect("value");
        value
            .elements
            .iter()
            .map(|element| match element {
                PatternElement::TextElement(text) => text.value.clone(),
                PatternElement::Placeable(_) => "{}".to_string(),
            })
            .collect()
    }

    fn first_expression(entry: &Entry) -> &Expression {
        let Entry::Message(message) = entry else {
            panic!("expected message, got {entry:?}");
        };
        let value = message.value.as_ref().expect("value");
        match &value.elements[0] {
            PatternElement::Placeable(placeable) => &placeable.expression,
            other => panic!("expected placeable, got {other:?}"),
        }
    }

    #[test]
    fn parses_simple_messages() {
        let resource = parse("hello = Hello, world!\nbye = Bye\n");
        assert_eq!(resource.body.len(), 2);
        assert_eq!(text_of(&resource.body[0]), "Hello, world!");
        assert_eq!(text_of(&resource.body[1]), "Bye");
        assert_eq!(resource.span, Some(Span::new(0, 32)));
        assert_eq!(resource.body[0].span(), Some(Span::new(0, 21)));
    }

    #[test]
    fn broken_entry_becomes_junk_without_hurting_neighbours() {
        let source = "foo = Hello\nbar = { -$lo";
        let resource = parse(source);
        assert_eq!(resource.body.len(), 2);
        assert_eq!(text_of(&resource.body[0]), "Hello");

        let Entry::Junk(junk) = &resource.body[1] else {
            panic!("expected junk");
        };
        assert_eq!(junk.content, "bar = { -$lo");
        assert_eq!(junk.span, Some(Span::new(12, source.len())));
        assert_eq!(junk.annotations.len(), 1);
        assert_eq!(junk.annotations[0].code, "E0028");
        assert_eq!(junk.annotations[0].span, Some(Span::new(21, 21)));
    }

    #[test]
    fn recovery_resumes_at_next_entry() {
        let resource = unspanned("a = {\nb = ok\n");
        assert_eq!(resource.body.len(), 2);
        let Entry::Junk(junk) = &resource.body[0] else {
            panic!("expected junk");
        };
        assert_eq!(junk.content, "a = {\n");
        assert_eq!(text_of(&resource.body[1]), "ok");
    }

    #[test]
    fn message_needs_value_or_attributes() {
        let resource = unspanned("empty =\n");
        assert_eq!(junk_codes(&resource), ["E0005"]);

        let resource = unspanned("login =\n    .placeholder = Email\n");
        assert!(junk_codes(&resource).is_empty());
        let Entry::Message(message) = &resource.body[0] else {
            panic!("expected message");
        };
        assert!(message.value.is_none());
        assert_eq!(message.attributes[0].id.name, "placeholder");
    }

    #[test]
    fn term_needs_value() {
        let resource = unspanned("-brand =\n    .gender = x\n");
        assert_eq!(junk_codes(&resource), ["E0006"]);

        let resource = unspanned("-brand = Firefox\n");
        let Entry::Term(term) = &resource.body[0] else {
            panic!("expected term");
        };
        assert_eq!(term.id.name, "brand");
    }

    #[test]
    fn block_patterns_are_dedented() {
        let resource = unspanned("foo =\n    line one\n      line two\n    line three\n");
        assert_eq!(text_of(&resource.body[0]), "line one\n  line two\nline three");

        let resource = unspanned("foo = first\n        second\n    third\n");
        assert_eq!(text_of(&resource.body[0]), "first\n    second\nthird");
    }

    #[test]
    fn blank_lines_inside_patterns_are_kept() {
        let resource = unspanned("foo =\n    one\n\n    two\n\n\nbar = x\n");
        assert_eq!(text_of(&resource.body[0]), "one\n\ntwo");
        assert_eq!(text_of(&resource.body[1]), "x");
    }

    #[test]
    fn attributes_follow_the_value() {
        let resource = unspanned("foo = Value\n    .title = Title\n    .aria = Aria\n");
        let Entry::Message(message) = &resource.body[0] else {
            panic!("expected message");
        };
        let names: Vec<_> = message.attributes.iter().map(|a| a.id.name.as_str()).collect();
        assert_eq!(names, ["title", "aria"]);
    }

    #[test]
    fn comments_attach_only_when_adjacent() {
        let resource = unspanned("# about foo\nfoo = Foo\n\n# standalone\n\nbar = Bar\n");
        assert_eq!(resource.body.len(), 3);
        let Entry::Message(foo) = &resource.body[0] else {
            panic!("expected message");
        };
        assert_eq!(foo.comment.as_ref().map(|c| c.content.as_str()), Some("about foo"));
        assert!(matches!(&resource.body[1], Entry::Comment(c) if c.content == "standalone"));
    }

    #[test]
    fn attached_comment_extends_message_span() {
        let resource = parse("# note\nfoo = Foo\n");
        assert_eq!(resource.body.len(), 1);
        assert_eq!(resource.body[0].span(), Some(Span::new(0, 16)));
    }

    #[test]
    fn comment_levels_and_multiline_content() {
        let resource = unspanned("### Resource\n\n## Group\n## more\n\n# one\n#\n# two\n");
        assert!(matches!(&resource.body[0], Entry::ResourceComment(c) if c.content == "Resource"));
        assert!(matches!(&resource.body[1], Entry::GroupComment(c) if c.content == "Group\nmore"));
        assert!(matches!(&resource.body[2], Entry::Comment(c) if c.content == "one\n\ntwo"));
    }

    #[test]
    fn comment_before_junk_stays_standalone() {
        let resource = unspanned("# note\n= broken\n");
        assert_eq!(resource.body.len(), 2);
        assert!(matches!(&resource.body[0], Entry::Comment(_)));
        assert!(resource.body[1].is_junk());
    }

    #[test]
    fn select_expressions_need_exactly_one_default() {
        let source = "emails = { $count ->\n    [one] One email\n   *[other] { $count } emails\n}\n";
        let resource = unspanned(source);
        let Expression::SelectExpression(select) = first_expression(&resource.body[0]) else {
            panic!("expected select");
        };
        assert_eq!(select.variants.len(), 2);
        assert_eq!(select.variants.iter().filter(|v| v.default).count(), 1);
        assert!(matches!(&select.variants[0].key, VariantKey::Identifier(id) if id.name == "one"));

        let none = unspanned("x = { $n ->\n    [one] One\n}\n");
        assert_eq!(junk_codes(&none), ["E0010"]);
        let two = unspanned("x = { $n ->\n   *[one] One\n   *[other] Other\n}\n");
        assert_eq!(junk_codes(&two), ["E0015"]);
        let empty = unspanned("x = { $n ->\n}\n");
        assert_eq!(junk_codes(&empty), ["E0011"]);
    }

    #[test]
    fn invalid_selectors_are_rejected() {
        let cases = [
            ("x = { msg ->\n *[a] A\n}\n", "E0016"),
            ("x = { -term ->\n *[a] A\n}\n", "E0017"),
            ("x = { msg.attr ->\n *[a] A\n}\n", "E0018"),
            ("x = { { $n } ->\n *[a] A\n}\n", "E0029"),
            ("x = { -term.attr }\n", "E0019"),
        ];
        for (source, code) in cases {
            assert_eq!(junk_codes(&unspanned(source)), [code], "{source}");
        }

        let ok = unspanned("x = { -term.attr ->\n *[a] A\n}\n");
        assert!(junk_codes(&ok).is_empty());
    }

    #[test]
    fn string_literals_decode_escapes() {
        let resource = unspanned("a = { \"a\\u0041b\" }\nb = { \"\\uD800\" }\n");
        let Expression::StringLiteral(literal) = first_expression(&resource.body[0]) else {
            panic!("expected string");
        };
        assert_eq!(literal.value, "aAb");
        assert_eq!(literal.raw, "a\\u0041b");
        let Expression::StringLiteral(surrogate) = first_expression(&resource.body[1]) else {
            panic!("expected string");
        };
        assert_eq!(surrogate.value, "\u{FFFD}");
    }

    #[test]
    fn string_literal_errors() {
        assert_eq!(junk_codes(&unspanned("a = { \"\\q\" }\n")), ["E0025"]);
        assert_eq!(junk_codes(&unspanned("a = { \"\\u00G1\" }\n")), ["E0026"]);
        assert_eq!(junk_codes(&unspanned("a = { \"open\n}\n")), ["E0020"]);
    }

    #[test]
    fn number_literals_keep_precision() {
        let resource = unspanned("a = { 3.140 }\nb = { -7 }\n");
        let Expression::NumberLiteral(number) = first_expression(&resource.body[0]) else {
            panic!("expected number");
        };
        assert_eq!(number.value, 3.14);
        assert_eq!(number.precision, 3);
        assert_eq!(number.raw, "3.140");
        let Expression::NumberLiteral(negative) = first_expression(&resource.body[1]) else {
            panic!("expected number");
        };
        assert_eq!(negative.value, -7.0);
        assert_eq!(negative.precision, 0);
    }

    #[test]
    fn call_arguments() {
        let resource =
            unspanned("a = { NUMBER($n, minimumFractionDigits: 2, style: \"percent\") }\n");
        let Expression::FunctionReference(function) = first_expression(&resource.body[0]) else {
            panic!("expected function");
        };
        assert_eq!(function.id.name, "NUMBER");
        assert_eq!(function.arguments.positional.len(), 1);
        assert_eq!(function.arguments.named.len(), 2);
        assert!(matches!(
            &function.arguments.named[1].value,
            Literal::StringLiteral(s) if s.value == "percent"
        ));

        assert_eq!(junk_codes(&unspanned("a = { number($n) }\n")), ["E0008"]);
        assert_eq!(junk_codes(&unspanned("a = { FN(a: 1, $n) }\n")), ["E0021"]);
        assert_eq!(junk_codes(&unspanned("a = { FN(a: 1, a: 2) }\n")), ["E0022"]);
        assert_eq!(junk_codes(&unspanned("a = { FN($x: 1) }\n")), ["E0009"]);
        assert_eq!(junk_codes(&unspanned("a = { FN(a: $x) }\n")), ["E0014"]);
    }

    #[test]
    fn term_references_with_arguments() {
        let resource = unspanned("a = { -brand(case: \"gen\") }\n");
        let Expression::TermReference(term) = first_expression(&resource.body[0]) else {
            panic!("expected term reference");
        };
        assert_eq!(term.id.name, "brand");
        assert_eq!(term.arguments.as_ref().map(|a| a.named.len()), Some(1));
    }

    #[test]
    fn stray_closing_brace_is_an_error() {
        assert_eq!(junk_codes(&unspanned("a = oops }\n")), ["E0027"]);
    }

    #[test]
    fn depth_is_bounded() {
        let parser = FluentParser::new(ParserOptions {
            with_spans: false,
            max_depth: 3,
        });
        let ok = parser.parse("a = {{{ 1 }}}\n");
        assert!(ok.junk().next().is_none());
        let deep = parser.parse("a = {{{{ 1 }}}}\nb = fine\n");
        assert_eq!(junk_codes(&deep), ["E0030"]);
        assert_eq!(text_of(&deep.body[1]), "fine");
    }

    #[test]
    fn call_arguments_count_toward_depth() {
        let parser = FluentParser::new(ParserOptions {
            with_spans: false,
            max_depth: 3,
        });
        let ok = parser.parse("a = { F(G(1)) }\n");
        assert!(ok.junk().next().is_none());
        let deep = parser.parse("a = { F(G(H(1))) }\nb = fine\n");
        assert_eq!(junk_codes(&deep), ["E0030"]);
        assert_eq!(text_of(&deep.body[1]), "fine");

        let nested = "F(".repeat(5000);
        let closing = ")".repeat(5000);
        let calls = parse(&format!("a = {{ {nested}1{closing} }}\nb = fine\n"));
        assert_eq!(junk_codes(&calls), ["E0030"]);

        let terms = parse(&format!("a = {{ {}1{closing} }}\n", "-t(".repeat(5000)));
        assert_eq!(junk_codes(&terms), ["E0030"]);
    }

    #[test]
    fn crlf_sources_parse_like_lf() {
        let lf = unspanned("foo =\n    one\n    two\n.bar = x\n");
        let crlf = unspanned("foo =\r\n    one\r\n    two\r\n.bar = x\r\n");
        assert!(lf.equals(&crlf, SpanMode::Ignore));
    }

    #[test]
    fn parse_entry_skips_comments() {
        let parser = FluentParser::default();
        let entry = parser.parse_entry("# comment\n\nfoo = Foo\nbar = Bar\n");
        assert!(matches!(&entry, Entry::Message(m) if m.id.name == "foo"));

        let junk = parser.parse_entry("#broken\nfoo = Foo\n");
        assert!(junk.is_junk());
    }

    #[test]
    fn lone_hash_at_end_of_input_is_junk() {
        let resource = unspanned("foo = Foo\n#");
        assert_eq!(junk_codes(&resource), ["E0003"]);
        assert!(matches!(&resource.body[1], Entry::Junk(junk) if junk.content == "#"));

        let resource = unspanned("# one\n#\n");
        assert!(matches!(&resource.body[0], Entry::Comment(c) if c.content == "one\n"));
    }

    #[test]
    fn valid_input_produces_no_junk() {
        let source = "\
### Resource comment

## Group

-brand = Firefox
    .gender = masculine
# Shown on the welcome page
welcome = Welcome to { -brand }, { $user }!
    .title = { welcome }
emails =
    { $unread ->
        [0] No new emails
        [one] One new email
       *[other] { NUMBER($unread) } new emails
    }
quoted = { \"{\" } literal braces { \"}\" }
";
        let resource = parse(source);
        assert_eq!(junk_codes(&resource), Vec::<String>::new());
        assert_eq!(resource.body.len(), 6);
    }
}
