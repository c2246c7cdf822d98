use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::ast::{
    Attribute, CallArguments, Comment, Entry, Expression, Literal, Message, NamedArgument, Pattern,
    PatternElement, Placeable, Resource, Term, Variant, VariantKey,
};

const INDENT: &str = "    ";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerializerOptions {
    /// Re-emit Junk verbatim instead of dropping it.
    pub with_junk: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FluentSerializer {
    options: SerializerOptions,
}

impl FluentSerializer {
    pub fn new(options: SerializerOptions) -> Self {
        Self { options }
    }

    pub fn serialize(&self, resource: &Resource) -> String {
        let mut out = String::new();
        let mut has_entries = false;
        for entry in &resource.body {
            if entry.is_junk() && !self.options.with_junk {
                continue;
            }
            out.push_str(&self.serialize_entry(entry, has_entries));
            has_entries = true;
        }
        out
    }

    /// Serialize one entry. `has_entries` tells whether anything was emitted
    /// before it; standalone comments are then preceded by a blank line.
    pub fn serialize_entry(&self, entry: &Entry, has_entries: bool) -> String {
        let separator = if has_entries { "\n" } else { "" };
        match entry {
            Entry::Message(message) => serialize_message(message),
            Entry::Term(term) => serialize_term(term),
            Entry::Comment(comment) => {
                format!("{separator}{}\n", serialize_comment(comment, "#"))
            }
            Entry::GroupComment(comment) => {
                format!("{separator}{}\n", serialize_comment(comment, "##"))
            }
            Entry::ResourceComment(comment) => {
                format!("{separator}{}\n", serialize_comment(comment, "###"))
            }
            Entry::Junk(junk) => junk.content.clone(),
        }
    }
}

pub fn serialize(resource: &Resource) -> String {
    FluentSerializer::default().serialize(resource)
}

fn serialize_comment(comment: &Comment, prefix: &str) -> String {
    let mut out = String::new();
    for line in comment.content.split('\n') {
        out.push_str(prefix);
        if !line.is_empty() {
            out.push(' ');
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}

fn serialize_message(message: &Message) -> String {
    let mut out = String::new();
    if let Some(comment) = &message.comment {
        out.push_str(&serialize_comment(comment, "#"));
    }
    out.push_str(&message.id.name);
    out.push_str(" =");
    if let Some(value) = &message.value {
        out.push_str(&serialize_pattern(value));
    }
    for attribute in &message.attributes {
        out.push_str(&serialize_attribute(attribute));
    }
    out.push('\n');
    out
}

fn serialize_term(term: &Term) -> String {
    let mut out = String::new();
    if let Some(comment) = &term.comment {
        out.push_str(&serialize_comment(comment, "#"));
    }
    out.push('-');
    out.push_str(&term.id.name);
    out.push_str(" =");
    out.push_str(&serialize_pattern(&term.value));
    for attribute in &term.attributes {
        out.push_str(&serialize_attribute(attribute));
    }
    out.push('\n');
    out
}

fn serialize_attribute(attribute: &Attribute) -> String {
    let value = indent_except_first_line(&serialize_pattern(&attribute.value));
    format!("\n{INDENT}.{} ={value}", attribute.id.name)
}

fn serialize_pattern(pattern: &Pattern) -> String {
    let content: String = pattern.elements.iter().map(serialize_element).collect();
    let content = indent_except_first_line(&content);
    if should_start_on_new_line(pattern) {
        format!("\n{INDENT}{content}")
    } else {
        format!(" {content}")
    }
}

/// Multi-line patterns go on their own block, unless the first character
/// would read as an attribute, a variant or a default-variant marker there.
fn should_start_on_new_line(pattern: &Pattern) -> bool {
    let is_multiline = pattern.elements.iter().any(|element| match element {
        PatternElement::Placeable(placeable) => {
            matches!(*placeable.expression, Expression::SelectExpression(_))
        }
        PatternElement::TextElement(text) => text.value.contains('\n'),
    });
    if !is_multiline {
        return false;
    }

    match pattern.elements.first() {
        Some(PatternElement::TextElement(text)) => {
            !matches!(text.value.chars().next(), Some('[' | '.' | '*'))
        }
        _ => true,
    }
}

fn indent_except_first_line(content: &str) -> String {
    content.replace('\n', "\n    ")
}

fn serialize_element(element: &PatternElement) -> String {
    match element {
        PatternElement::TextElement(text) => text.value.clone(),
        PatternElement::Placeable(placeable) => serialize_placeable(placeable),
    }
}

fn serialize_placeable(placeable: &Placeable) -> String {
    match placeable.expression.as_ref() {
        Expression::Placeable(inner) => format!("{{{}}}", serialize_placeable(inner)),
        // Select expressions end with a newline of their own.
        expression @ Expression::SelectExpression(_) => {
            format!("{{ {}}}", serialize_expression(expression))
        }
        expression => format!("{{ {} }}", serialize_expression(expression)),
    }
}

pub fn serialize_expression(expression: &Expression) -> String {
    match expression {
        Expression::StringLiteral(literal) => format!("\"{}\"", literal.raw),
        Expression::NumberLiteral(literal) => literal.raw.clone(),
        Expression::VariableReference(reference) => format!("${}", reference.id.name),
        Expression::MessageReference(reference) => match &reference.attribute {
            Some(attribute) => format!("{}.{}", reference.id.name, attribute.name),
            None => reference.id.name.clone(),
        },
        Expression::TermReference(reference) => {
            let mut out = format!("-{}", reference.id.name);
            if let Some(attribute) = &reference.attribute {
                out.push('.');
                out.push_str(&attribute.name);
            }
            if let Some(arguments) = &reference.arguments {
                out.push_str(&serialize_call_arguments(arguments));
            }
            out
        }
        Expression::FunctionReference(reference) => format!(
            "{}{}",
            reference.id.name,
            serialize_call_arguments(&reference.arguments)
        ),
        Expression::SelectExpression(select) => {
            let mut out = format!("{} ->", serialize_expression(&select.selector));
            for variant in &select.variants {
                out.push_str(&serialize_variant(variant));
            }
            out.push('\n');
            out
        }
        Expression::Placeable(placeable) => serialize_placeable(placeable),
    }
}

fn serialize_variant(variant: &Variant) -> String {
    let key = serialize_variant_key(&variant.key);
    let value = indent_except_first_line(&serialize_pattern(&variant.value));
    if variant.default {
        format!("\n   *[{key}]{value}")
    } else {
        format!("\n    [{key}]{value}")
    }
}

fn serialize_call_arguments(arguments: &CallArguments) -> String {
    let parts: Vec<String> = arguments
        .positional
        .iter()
        .map(serialize_expression)
        .chain(arguments.named.iter().map(serialize_named_argument))
        .collect();
    format!("({})", parts.join(", "))
}

fn serialize_named_argument(argument: &NamedArgument) -> String {
    let value = match &argument.value {
        Literal::StringLiteral(literal) => format!("\"{}\"", literal.raw),
        Literal::NumberLiteral(literal) => literal.raw.clone(),
    };
    format!("{}: {value}", argument.name.name)
}

pub fn serialize_variant_key(key: &VariantKey) -> String {
    match key {
        VariantKey::Identifier(id) => id.name.clone(),
        VariantKey::NumberLiteral(literal) => literal.raw.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::{FluentSerializer, SerializerOptions, serialize};
    use crate::ast::{Node, SpanMode};
    use crate::parser::parse;

    fn round_trip(source: &str) {
        let first = parse(source);
        let text = serialize(&first);
        let second = parse(&text);
        assert!(
            first.equals(&second, SpanMode::Ignore),
            "round trip changed the tree:\n{source}\n---\n{text}"
        );
    }

    #[test]
    fn canonical_text_is_stable() {
        let source = "\
### Resource


## Group

# Attached
-brand = Firefox
    .gender = masculine
hello = Hello, { $name }!
login =
    .placeholder = Email
emails =
    { $unread ->
        [0] No new emails
        [one] One new email
       *[other] { NUMBER($unread, type: \"ordinal\") } new emails
    }
";
        assert_eq!(serialize(&parse(source)), source);
    }

    #[test]
    fn standalone_comments_get_blank_lines() {
        let resource = parse("# one\n\nfoo = Foo\n# two\n\n");
        assert_eq!(serialize(&resource), "# one\n\nfoo = Foo\n\n# two\n\n");
    }

    #[test]
    fn multiline_text_moves_to_its_own_block() {
        let resource = parse("foo = one\n    two\n");
        assert_eq!(serialize(&resource), "foo =\n    one\n    two\n");
    }

    #[test]
    fn special_first_char_stays_inline() {
        let source = "foo = [one]\n    two\n";
        assert_eq!(serialize(&parse(source)), source);
        round_trip(source);
    }

    #[test]
    fn nested_placeables_and_literals() {
        let source = "foo = {{ \"a\\u0041\" }} { -term(x: 1.50) } { msg.attr }\n";
        let resource = parse(source);
        assert!(resource.junk().next().is_none());
        assert_eq!(serialize(&resource), source);
    }

    #[test]
    fn junk_is_dropped_unless_requested() {
        let resource = parse("foo = Foo\nbar = {\n");
        assert_eq!(serialize(&resource), "foo = Foo\n");
        let with_junk = FluentSerializer::new(SerializerOptions { with_junk: true });
        assert_eq!(with_junk.serialize(&resource), "foo = Foo\nbar = {\n");
    }

    #[test]
    fn round_trips_preserve_structure() {
        round_trip("foo =\n    line one\n      line two\n    line three\n");
        round_trip("foo = { $sel ->\n   *[a] A\n        multi\n    [b] { $x }\n}\n");
        round_trip("a = x\n\n\n# c\nb = y\n    .z = { $n ->\n       *[1] one\n    }\n");
        round_trip("q = { \"\\\\\" } { \"\\\"\" } { \"\\U01F602\" }\n");
        round_trip("x =\n    {\"\"}    indented\n");
    }
}
