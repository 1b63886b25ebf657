use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::error::EntryError;
use crate::fields::FieldMap;

/// Format applied when the user gives none. Leaves every name unchanged.
pub const DEFAULT_FORMAT: &str = "{name}{ext}";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unterminated placeholder starting at offset {0}")]
    Unterminated(usize),

    #[error("empty placeholder at offset {0}")]
    EmptyPlaceholder(usize),

    #[error("unmatched '}}' at offset {0} (use '}}}}' for a literal brace)")]
    UnmatchedClose(usize),

    #[error("'{{' inside placeholder at offset {0}")]
    NestedOpen(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A parsed format string: literal text interleaved with `{field}`
/// placeholders. `{{` and `}}` stand for literal braces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            source: DEFAULT_FORMAT.to_string(),
            segments: vec![
                Segment::Placeholder("name".to_string()),
                Segment::Placeholder("ext".to_string()),
            ],
        }
    }
}

impl Template {
    pub fn parse(format: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = format.char_indices().peekable();

        while let Some((offset, c)) = chars.next() {
            match c {
                '{' => {
                    if chars.peek().is_some_and(|&(_, next)| next == '{') {
                        chars.next();
                        literal.push('{');
                        continue;
                    }

                    let mut name = String::new();
                    let mut closed = false;
                    for (inner_offset, inner) in chars.by_ref() {
                        match inner {
                            '}' => {
                                closed = true;
                                break;
                            },
                            '{' => return Err(TemplateError::NestedOpen(inner_offset)),
                            _ => name.push(inner),
                        }
                    }

                    if !closed {
                        return Err(TemplateError::Unterminated(offset));
                    }
                    if name.is_empty() {
                        return Err(TemplateError::EmptyPlaceholder(offset));
                    }

                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(name));
                },
                '}' => {
                    if chars.peek().is_some_and(|&(_, next)| next == '}') {
                        chars.next();
                        literal.push('}');
                    } else {
                        return Err(TemplateError::UnmatchedClose(offset));
                    }
                },
                _ => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: format.to_string(),
            segments,
        })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Field names referenced by the template, in order of first use.
    pub fn fields(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for segment in &self.segments {
            if let Segment::Placeholder(name) = segment {
                if !seen.contains(&name.as_str()) {
                    seen.push(name.as_str());
                }
            }
        }
        seen
    }

    pub fn render(&self, fields: &FieldMap) -> Result<String, EntryError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => {
                    let value = fields
                        .get(name)
                        .ok_or_else(|| EntryError::MissingField(name.clone()))?;
                    out.push_str(value);
                },
            }
        }
        Ok(out)
    }
}

impl std::str::FromStr for Template {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> FieldMap {
        let mut map = FieldMap::new();
        for (k, v) in pairs {
            map.insert(*k, *v);
        }
        map
    }

    #[test]
    fn test_parse_literals_and_placeholders() {
        let template = Template::parse("Cool Stuff {name}.jpg").unwrap();
        assert_eq!(
            template.segments(),
            &[
                Segment::Literal("Cool Stuff ".to_string()),
                Segment::Placeholder("name".to_string()),
                Segment::Literal(".jpg".to_string()),
            ]
        );
    }

    #[test]
    fn test_default_matches_parsed_default_format() {
        assert_eq!(Template::default(), Template::parse(DEFAULT_FORMAT).unwrap());
    }

    #[test]
    fn test_escaped_braces_are_literal() {
        let template = Template::parse("{{{name}}}").unwrap();
        let rendered = template.render(&fields(&[("name", "x")])).unwrap();
        assert_eq!(rendered, "{x}");
        assert_eq!(template.fields(), vec!["name"]);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            Template::parse("abc{name"),
            Err(TemplateError::Unterminated(3))
        );
        assert_eq!(
            Template::parse("a{}b"),
            Err(TemplateError::EmptyPlaceholder(1))
        );
        assert_eq!(
            Template::parse("a}b"),
            Err(TemplateError::UnmatchedClose(1))
        );
        assert_eq!(
            Template::parse("{a{b}"),
            Err(TemplateError::NestedOpen(2))
        );
    }

    #[test]
    fn test_fields_deduplicated_in_order() {
        let template = Template::parse("{number}-{name}-{number}{ext}").unwrap();
        assert_eq!(template.fields(), vec!["number", "name", "ext"]);
    }

    #[test]
    fn test_render_missing_field() {
        let template = Template::parse("{capture}").unwrap();
        let err = template.render(&fields(&[("name", "a")])).unwrap_err();
        assert_eq!(err, EntryError::MissingField("capture".to_string()));
    }

    #[test]
    fn test_parse_is_deterministic() {
        let a = Template::parse("{hash}_{name}{ext}").unwrap();
        let b = Template::parse("{hash}_{name}{ext}").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "{hash}_{name}{ext}");
    }

    #[test]
    fn test_empty_format_has_no_segments() {
        let template = Template::parse("").unwrap();
        assert!(template.segments().is_empty());
        assert_eq!(template.render(&FieldMap::new()).unwrap(), "");
    }
}
