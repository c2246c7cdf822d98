use std::fmt;

use ftl_i18n_core::{Annotation, Resource};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: String,
    pub message: String,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
}

impl Diagnostic {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            file: None,
            line: None,
            column: None,
        }
    }

    pub fn with_span(mut self, file: impl Into<String>, line: u32, column: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    pub fn from_annotation(annotation: &Annotation, file: &str, source: &str) -> Self {
        let diagnostic = Self::new(annotation.code.clone(), annotation.message.clone());
        let offset = annotation.span.map(|span| span.start).unwrap_or_default();
        let (line, column) = line_column(source, offset);
        diagnostic.with_span(file, line, column)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.file, self.line, self.column) {
            (Some(file), Some(line), Some(column)) => {
                write!(f, "{file}:{line}:{column} {} {}", self.code, self.message)
            }
            _ => write!(f, "{} {}", self.code, self.message),
        }
    }
}

/// Every annotation of every Junk entry in `resource`, in source order.
pub fn collect_diagnostics(resource: &Resource, file: &str, source: &str) -> Vec<Diagnostic> {
    resource
        .junk()
        .flat_map(|junk| junk.annotations.iter())
        .map(|annotation| Diagnostic::from_annotation(annotation, file, source))
        .collect()
}

/// 1-based line and column (in chars) of a byte offset.
pub fn line_column(source: &str, offset: usize) -> (u32, u32) {
    let mut offset = offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|index| index + 1).unwrap_or(0);
    let column = before[line_start..].chars().count() + 1;
    (line as u32, column as u32)
}
