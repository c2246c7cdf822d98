use std::collections::{BTreeMap, BTreeSet};

use ftl_i18n_core::{
    Attribute, Comment, DEFAULT_MAX_DEPTH, Entry, Expression, FluentParser, FunctionReference, Junk,
    Literal, ParserOptions, Pattern, PatternElement, Resource, SelectExpression, TermReference,
    is_char_id_start, serialize_expression, serialize_variant_key,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::FlattenError;

const RESERVED_KEYS: [&str; 2] = ["val", "comment"];

/// Flat translation table keyed by message id, or `-id` for terms.
pub type FlatResource = BTreeMap<String, FlatEntry>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlatEntry {
    Text(String),
    Record(FlatRecord),
}

impl FlatEntry {
    pub fn value(&self) -> Option<&str> {
        match self {
            FlatEntry::Text(text) => Some(text),
            FlatEntry::Record(record) => record.val.as_deref(),
        }
    }
}

/// An entry that carries more than its value. Attributes are stored next to
/// `val` and `comment` under their own names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub val: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenOptions {
    /// Keep comments attached to messages and terms.
    pub respect_comments: bool,
    /// Recover `key = value` pairs from entries that failed to parse.
    pub salvage_junk: bool,
    pub interpolation_prefix: String,
    pub interpolation_suffix: String,
    /// Nesting limit handed to the parser by [`ftl_to_flat`].
    pub max_depth: usize,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            respect_comments: true,
            salvage_junk: true,
            interpolation_prefix: "{{".to_string(),
            interpolation_suffix: "}}".to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Parse `source` without spans and flatten the result.
pub fn ftl_to_flat(source: &str, options: &FlattenOptions) -> Result<FlatResource, FlattenError> {
    let parser = FluentParser::new(ParserOptions {
        with_spans: false,
        max_depth: options.max_depth,
    });
    flatten(&parser.parse(source), options)
}

pub fn flatten(resource: &Resource, options: &FlattenOptions) -> Result<FlatResource, FlattenError> {
    let mut out = FlatResource::new();
    let mut salvaged = 0usize;
    // Keys that only exist because junk was salvaged; a real entry replaces them.
    let mut salvaged_keys = BTreeSet::new();

    for entry in &resource.body {
        let (key, flat) = match entry {
            Entry::Message(message) => {
                let key = message.id.name.clone();
                let renderer = Renderer::new(&key, options);
                let value = message
                    .value
                    .as_ref()
                    .map(|value| renderer.pattern(value))
                    .transpose()?;
                let flat = build_entry(
                    &renderer,
                    value,
                    message.comment.as_ref(),
                    &message.attributes,
                )?;
                (key, flat)
            }
            Entry::Term(term) => {
                let key = format!("-{}", term.id.name);
                let renderer = Renderer::new(&key, options);
                let value = renderer.pattern(&term.value)?;
                let flat =
                    build_entry(&renderer, Some(value), term.comment.as_ref(), &term.attributes)?;
                (key, flat)
            }
            Entry::Junk(junk) if options.salvage_junk => {
                let Some((key, value)) = salvage(junk) else {
                    warn!(content = %junk.content, "skipping junk without a usable key");
                    continue;
                };
                if out.contains_key(&key) {
                    warn!(%key, "skipping junk that repeats an existing key");
                    continue;
                }
                salvaged += 1;
                salvaged_keys.insert(key.clone());
                out.insert(key, FlatEntry::Text(value));
                continue;
            }
            Entry::Comment(_)
            | Entry::GroupComment(_)
            | Entry::ResourceComment(_)
            | Entry::Junk(_) => continue,
        };

        let replaces_salvage = salvaged_keys.remove(&key);
        if out.insert(key.clone(), flat).is_some() && !replaces_salvage {
            warn!(%key, "duplicate key, keeping the last definition");
        }
    }

    debug!(entries = out.len(), salvaged, "flattened resource");
    Ok(out)
}

fn build_entry(
    renderer: &Renderer<'_>,
    value: Option<String>,
    comment: Option<&Comment>,
    attributes: &[Attribute],
) -> Result<FlatEntry, FlattenError> {
    let comment = comment
        .filter(|_| renderer.options.respect_comments)
        .map(|comment| comment.content.clone());

    if attributes.is_empty() && comment.is_none() {
        if let Some(value) = value {
            return Ok(FlatEntry::Text(value));
        }
    }

    let mut record = FlatRecord {
        val: value,
        comment,
        attributes: BTreeMap::new(),
    };
    for attribute in attributes {
        let name = attribute.id.name.clone();
        if RESERVED_KEYS.contains(&name.as_str()) {
            return Err(FlattenError::DuplicateKey(format!("{}.{name}", renderer.key)));
        }
        let value = renderer.pattern(&attribute.value)?;
        if record.attributes.insert(name.clone(), value).is_some() {
            return Err(FlattenError::DuplicateKey(format!("{}.{name}", renderer.key)));
        }
    }
    Ok(FlatEntry::Record(record))
}

/// Split `key = value` out of the raw text of a broken entry.
fn salvage(junk: &Junk) -> Option<(String, String)> {
    let (key, value) = junk
        .content
        .split_once('=')
        .unwrap_or((junk.content.as_str(), ""));
    let key = key.trim();
    if !is_flat_key(key) {
        return None;
    }
    let value = value
        .trim()
        .replace("\n   ", "\n ")
        .replace("\n  }", "\n}");
    Some((key.to_string(), value))
}

fn is_flat_key(key: &str) -> bool {
    let name = key.strip_prefix('-').unwrap_or(key);
    is_char_id_start(name.chars().next())
        && name
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
}

struct Renderer<'a> {
    key: &'a str,
    options: &'a FlattenOptions,
}

impl<'a> Renderer<'a> {
    fn new(key: &'a str, options: &'a FlattenOptions) -> Self {
        Self { key, options }
    }

    fn unsupported(&self, detail: impl Into<String>) -> FlattenError {
        FlattenError::UnsupportedExpression {
            key: self.key.to_string(),
            detail: detail.into(),
        }
    }

    fn placeholder(&self, inner: &str) -> String {
        format!(
            "{}{inner}{}",
            self.options.interpolation_prefix, self.options.interpolation_suffix
        )
    }

    fn pattern(&self, pattern: &Pattern) -> Result<String, FlattenError> {
        let mut out = String::new();
        for element in &pattern.elements {
            match element {
                PatternElement::TextElement(text) => out.push_str(&text.value),
                PatternElement::Placeable(placeable) => {
                    out.push_str(&self.expression(&placeable.expression)?)
                }
            }
        }
        Ok(out)
    }

    fn expression(&self, expression: &Expression) -> Result<String, FlattenError> {
        match expression {
            Expression::StringLiteral(literal) => Ok(literal.value.clone()),
            Expression::NumberLiteral(literal) => Ok(literal.raw.clone()),
            Expression::VariableReference(reference) => Ok(self.placeholder(&reference.id.name)),
            Expression::MessageReference(reference) => Ok(match &reference.attribute {
                Some(attribute) => format!("$t({}.{})", reference.id.name, attribute.name),
                None => format!("$t({})", reference.id.name),
            }),
            Expression::TermReference(reference) => self.term_reference(reference),
            Expression::FunctionReference(function) => self.function(function),
            Expression::SelectExpression(select) => self.select(select),
            Expression::Placeable(placeable) => self.expression(&placeable.expression),
        }
    }

    fn term_reference(&self, reference: &TermReference) -> Result<String, FlattenError> {
        if reference.arguments.is_some() {
            return Err(self.unsupported(format!(
                "term -{} called with arguments",
                reference.id.name
            )));
        }
        Ok(match &reference.attribute {
            Some(attribute) => format!("$t(-{}.{})", reference.id.name, attribute.name),
            None => format!("$t(-{})", reference.id.name),
        })
    }

    fn function(&self, function: &FunctionReference) -> Result<String, FlattenError> {
        let mut args = Vec::new();
        for argument in &function.arguments.positional {
            let rendered = match argument {
                Expression::VariableReference(reference) => reference.id.name.clone(),
                Expression::StringLiteral(literal) => format!("\"{}\"", literal.value),
                Expression::NumberLiteral(literal) => literal.raw.clone(),
                other => {
                    return Err(self.unsupported(format!(
                        "argument {} of {}",
                        serialize_expression(other),
                        function.id.name
                    )));
                }
            };
            args.push(rendered);
        }
        for named in &function.arguments.named {
            let value = match &named.value {
                Literal::StringLiteral(literal) => literal.value.as_str(),
                Literal::NumberLiteral(literal) => literal.raw.as_str(),
            };
            args.push(format!("{}: \"{value}\"", named.name.name));
        }
        Ok(self.placeholder(&format!("{}({})", function.id.name, args.join(", "))))
    }

    fn select(&self, select: &SelectExpression) -> Result<String, FlattenError> {
        let mut out = format!("{{ {} ->", serialize_expression(&select.selector));
        for variant in &select.variants {
            let marker = if variant.default { " *" } else { "  " };
            out.push('\n');
            out.push_str(marker);
            out.push('[');
            out.push_str(&serialize_variant_key(&variant.key));
            out.push_str("] ");
            out.push_str(&self.pattern(&variant.value)?);
        }
        out.push_str("\n}");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::{FlatEntry, FlatRecord, FlattenOptions, ftl_to_flat};
    use crate::error::FlattenError;
    use std::collections::{BTreeMap, BTreeSet};

    fn flat(source: &str) -> BTreeMap<String, FlatEntry> {
        ftl_to_flat(source, &FlattenOptions::default()).expect("flatten")
    }

    fn text(value: &str) -> FlatEntry {
        FlatEntry::Text(value.to_string())
    }

    #[test]
    fn variables_become_placeholders() {
        let out = flat("welcome = Hi { $name }!\n");
        assert_eq!(out.get("welcome"), Some(&text("Hi {{name}}!")));
    }

    #[test]
    fn custom_delimiters() {
        let options = FlattenOptions {
            interpolation_prefix: "%(".to_string(),
            interpolation_suffix: ")s".to_string(),
            ..FlattenOptions::default()
        };
        let out = ftl_to_flat("a = { $n } items\n", &options).expect("flatten");
        assert_eq!(out.get("a"), Some(&text("%(n)s items")));
    }

    #[test]
    fn references_render_as_nested_lookups() {
        let out = flat(
            "-brand = Acme\n    .short = A\nabout = About { -brand } and { home.title }\n",
        );
        assert_eq!(out.get("about"), Some(&text("About $t(-brand) and $t(home.title)")));
        assert!(matches!(out.get("-brand"), Some(FlatEntry::Record(_))));
    }

    #[test]
    fn attributes_and_comments_make_records() {
        let out = flat("# Sign in form\nlogin = Log in\n    .title = Sign in\nbare =\n    .aria = Only\n");
        let expected = FlatRecord {
            val: Some("Log in".to_string()),
            comment: Some("Sign in form".to_string()),
            attributes: BTreeMap::from([("title".to_string(), "Sign in".to_string())]),
        };
        assert_eq!(out.get("login"), Some(&FlatEntry::Record(expected)));

        let Some(FlatEntry::Record(bare)) = out.get("bare") else {
            panic!("expected record");
        };
        assert_eq!(bare.val, None);
        assert_eq!(bare.attributes.get("aria").map(String::as_str), Some("Only"));
    }

    #[test]
    fn comments_can_be_ignored() {
        let options = FlattenOptions {
            respect_comments: false,
            ..FlattenOptions::default()
        };
        let out = ftl_to_flat("# note\nhello = Hello\n", &options).expect("flatten");
        assert_eq!(out.get("hello"), Some(&text("Hello")));
    }

    #[test]
    fn functions_and_selects() {
        let source = "\
price = { NUMBER($amount, style: \"currency\", digits: 2) }
emails = { $count ->
    [one] One email
   *[other] { $count } emails
}
";
        let out = flat(source);
        assert_eq!(
            out.get("price"),
            Some(&text("{{NUMBER(amount, style: \"currency\", digits: \"2\")}}"))
        );
        assert_eq!(
            out.get("emails"),
            Some(&text("{ $count ->\n  [one] One email\n *[other] {{count}} emails\n}"))
        );
    }

    #[test]
    fn literals_render_their_values() {
        let out = flat("a = { \"x\\u0041\" } { 1.50 } {{ $n }}\n");
        assert_eq!(out.get("a"), Some(&text("xA 1.50 {{n}}")));
    }

    #[test]
    fn unsupported_expressions_are_errors() {
        let err = ftl_to_flat(
            "a = { -term(case: \"x\") }\n",
            &FlattenOptions::default(),
        )
        .expect_err("term args");
        assert!(matches!(err, FlattenError::UnsupportedExpression { ref key, .. } if key == "a"));

        let err = ftl_to_flat("a = { FN(msg) }\n", &FlattenOptions::default())
            .expect_err("message argument");
        assert!(matches!(err, FlattenError::UnsupportedExpression { .. }));
    }

    #[test]
    fn duplicate_entries_keep_the_last_definition() {
        let out = flat("a = 1\na = 2\nb = fine\n-t = x\n-t = y\n");
        assert_eq!(out.get("a"), Some(&text("2")));
        assert_eq!(out.get("b"), Some(&text("fine")));
        assert_eq!(out.get("-t"), Some(&text("y")));
    }

    #[test]
    fn real_entries_replace_salvaged_junk() {
        let out = flat("a = { -$x }\na = ok\nb = fine\n");
        assert_eq!(out.get("a"), Some(&text("ok")));
        assert_eq!(out.get("b"), Some(&text("fine")));

        let out = flat("a = ok\na = { -$x }\n");
        assert_eq!(out.get("a"), Some(&text("ok")));
    }

    #[test]
    fn reserved_attribute_names_are_errors() {
        let err =
            ftl_to_flat("a = 1\n    .val = 2\n", &FlattenOptions::default()).expect_err("reserved");
        assert!(matches!(err, FlattenError::DuplicateKey(ref key) if key == "a.val"));
    }

    #[test]
    fn junk_is_salvaged_when_enabled() {
        let source = "!!! nonsense\nok = Fine\nbroken = { -$x }\n";
        let out = flat(source);
        assert_eq!(out.get("ok"), Some(&text("Fine")));
        assert_eq!(out.get("broken"), Some(&text("{ -$x }")));
        assert_eq!(out.len(), 2);

        let options = FlattenOptions {
            salvage_junk: false,
            ..FlattenOptions::default()
        };
        let out = ftl_to_flat(source, &options).expect("flatten");
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn parser_depth_follows_options() {
        let options = FlattenOptions {
            max_depth: 1,
            ..FlattenOptions::default()
        };
        let out = ftl_to_flat("a = { F($n) }\nb = { $n }\n", &options).expect("flatten");
        assert_eq!(out.get("a"), Some(&text("{ F($n) }")));
        assert_eq!(out.get("b"), Some(&text("{{n}}")));
    }

    #[test]
    fn records_serialize_as_flat_objects() {
        let out = flat("login = Log in\n    .title = Sign in\nplain = Text\n");
        let json = serde_json::to_value(&out).expect("json");
        assert_eq!(
            json,
            serde_json::json!({
                "login": { "val": "Log in", "title": "Sign in" },
                "plain": "Text"
            })
        );
        let back: BTreeMap<String, FlatEntry> = serde_json::from_value(json).expect("decode");
        assert_eq!(back, out);
    }
}
