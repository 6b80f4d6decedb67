//! Substitution-token grammar.
//!
//! Parameterized text is plain text interleaved with tokens:
//!
//! ```text
//! token   := "{{" ws* body ws* "}}"
//! body    := field [ ws* "|" ws* "default" ws+ literal ]
//!          | literal
//! field   := one of the ParamField names
//! literal := '"' ( char | '\"' | '\\' )* '"'
//! ```
//!
//! A body that is only a literal emits the literal, so `{{ "{{" }}` yields a
//! literal `{{`. A `{{` run longer than two braces keeps the extra leading
//! braces as text: `{{{ PluginName }}}` renders to `{helm3}`. There are no
//! conditionals, loops or filters.
//!
//! Parsing borrows from the input; nothing is copied until rendering.

use std::borrow::Cow;

use crate::domain::{
    entities::parameters::ParameterSet, error::DomainError, value_objects::ParamField,
};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";
const DEFAULT_KEYWORD: &str = "default";

/// A parsed substitution token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub field: ParamField,
    /// Applied when the field's value is empty.
    pub default: Option<Cow<'a, str>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Text outside any token, passed through verbatim.
    Text(&'a str),
    /// A quoted literal token body.
    Literal(Cow<'a, str>),
    Token(Token<'a>),
}

/// Parameterized text split into segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateText<'a> {
    segments: Vec<Segment<'a>>,
}

impl<'a> TemplateText<'a> {
    /// Parse `input`. `origin` names the entry in error messages.
    pub fn parse(input: &'a str, origin: &str) -> Result<Self, DomainError> {
        let mut segments = Vec::new();
        let mut rest = input;

        while let Some(mut start) = rest.find(OPEN) {
            while rest[start + OPEN.len()..].starts_with('{') {
                start += 1;
            }
            if start > 0 {
                segments.push(Segment::Text(&rest[..start]));
            }

            let body_start = start + OPEN.len();
            let offset = input.len() - rest.len() + start;
            let body_len = find_close(&rest[body_start..]).ok_or_else(|| {
                malformed(origin, format!("unterminated token at line {}", line_of(input, offset)))
            })?;

            let body = &rest[body_start..body_start + body_len];
            segments.push(parse_body(body, origin, line_of(input, offset))?);
            rest = &rest[body_start + body_len + CLOSE.len()..];
        }

        if !rest.is_empty() {
            segments.push(Segment::Text(rest));
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment<'a>] {
        &self.segments
    }

    /// Fields referenced by tokens, in order of appearance.
    pub fn fields(&self) -> impl Iterator<Item = ParamField> + '_ {
        self.segments.iter().filter_map(|s| match s {
            Segment::Token(t) => Some(t.field),
            _ => None,
        })
    }

    /// Substitute every token.
    ///
    /// # Errors
    ///
    /// `UnresolvedToken` when a field's value is empty and the token has no
    /// default.
    pub fn render(&self, params: &ParameterSet, origin: &str) -> Result<String, DomainError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Literal(lit) => out.push_str(lit),
                Segment::Token(token) => {
                    let value = params.get(token.field);
                    if !value.is_empty() {
                        out.push_str(value);
                    } else if let Some(default) = &token.default {
                        out.push_str(default);
                    } else {
                        return Err(DomainError::UnresolvedToken {
                            token: token.field.to_string(),
                            path: origin.to_string(),
                        });
                    }
                }
            }
        }
        Ok(out)
    }
}

/// Parse and render in one step.
pub fn render_str(input: &str, params: &ParameterSet, origin: &str) -> Result<String, DomainError> {
    if !input.contains(OPEN) {
        return Ok(input.to_string());
    }
    TemplateText::parse(input, origin)?.render(params, origin)
}

/// Quick check used by loaders and the CLI listing; not a parse.
pub fn contains_token(input: &str) -> bool {
    input.contains(OPEN) && input.contains(CLOSE)
}

/// Byte length of the token body: the distance to the first `}}` that is not
/// inside a quoted literal.
fn find_close(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut in_quote = false;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if in_quote => i += 1,
            b'"' => in_quote = !in_quote,
            b'}' if !in_quote && bytes.get(i + 1) == Some(&b'}') => return Some(i),
            _ => {}
        }
        i += 1;
    }
    None
}

fn parse_body<'a>(body: &'a str, origin: &str, line: usize) -> Result<Segment<'a>, DomainError> {
    let body = body.trim();

    if body.starts_with('"') {
        let (lit, rest) = parse_literal(body, origin, line)?;
        if !rest.trim().is_empty() {
            return Err(malformed(origin, format!("unexpected '{}' after literal at line {line}", rest.trim())));
        }
        return Ok(Segment::Literal(lit));
    }

    let ident_len = body
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(body.len());
    let (ident, rest) = body.split_at(ident_len);

    if ident.is_empty() {
        return Err(malformed(origin, format!("expected a field name at line {line}")));
    }

    let field: ParamField = ident.parse().map_err(|_| DomainError::UnknownField {
        field: ident.to_string(),
        path: origin.to_string(),
    })?;

    let rest = rest.trim_start();
    if rest.is_empty() {
        return Ok(Segment::Token(Token {
            field,
            default: None,
        }));
    }

    let Some(after_pipe) = rest.strip_prefix('|') else {
        return Err(malformed(origin, format!("unexpected '{rest}' after {ident} at line {line}")));
    };
    let after_pipe = after_pipe.trim_start();
    let Some(after_kw) = after_pipe.strip_prefix(DEFAULT_KEYWORD) else {
        return Err(malformed(origin, format!("only 'default' may follow '|' at line {line}")));
    };
    if !after_kw.starts_with(char::is_whitespace) {
        return Err(malformed(origin, format!("expected a quoted default at line {line}")));
    }

    let (default, tail) = parse_literal(after_kw.trim_start(), origin, line)?;
    if !tail.trim().is_empty() {
        return Err(malformed(origin, format!("unexpected '{}' after default at line {line}", tail.trim())));
    }

    Ok(Segment::Token(Token {
        field,
        default: Some(default),
    }))
}

/// Parse a leading `"..."` literal, returning its value and the remainder.
fn parse_literal<'a>(s: &'a str, origin: &str, line: usize) -> Result<(Cow<'a, str>, &'a str), DomainError> {
    let Some(inner) = s.strip_prefix('"') else {
        return Err(malformed(origin, format!("expected '\"' at line {line}")));
    };

    let mut owned: Option<String> = None;
    let mut chars = inner.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => {
                let value = match owned {
                    Some(s) => Cow::Owned(s),
                    None => Cow::Borrowed(&inner[..i]),
                };
                return Ok((value, &inner[i + 1..]));
            }
            '\\' => {
                let escaped = match chars.next() {
                    Some((_, e @ ('"' | '\\'))) => e,
                    Some((_, other)) => {
                        return Err(malformed(origin, format!("unsupported escape '\\{other}' at line {line}")));
                    }
                    None => break,
                };
                owned.get_or_insert_with(|| inner[..i].to_string()).push(escaped);
            }
            other => {
                if let Some(buf) = owned.as_mut() {
                    buf.push(other);
                }
            }
        }
    }

    Err(malformed(origin, format!("unterminated string at line {line}")))
}

fn line_of(input: &str, offset: usize) -> usize {
    input[..offset].bytes().filter(|b| *b == b'\n').count() + 1
}

fn malformed(origin: &str, reason: String) -> DomainError {
    DomainError::MalformedTemplate {
        path: origin.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::parameters::RawParameters;

    fn params() -> ParameterSet {
        ParameterSet::validate(
            &RawParameters::new()
                .with("PluginName", "helm3")
                .with("ModulePath", "get.porter.sh/mixin/helm3")
                .with("AuthorName", "Acme"),
        )
        .unwrap()
    }

    fn render(s: &str) -> Result<String, DomainError> {
        render_str(s, &params(), "test.tmpl")
    }

    #[test]
    fn substitutes_fields_with_and_without_spaces() {
        assert_eq!(render("{{PluginName}}/{{ PluginNameCap }}").unwrap(), "helm3/Helm3");
    }

    #[test]
    fn default_applies_only_when_empty() {
        assert_eq!(
            render(r#"{{ AuthorEmail | default "security@example.com" }}"#).unwrap(),
            "security@example.com"
        );
        assert_eq!(render(r#"{{ AuthorName | default "Nobody" }}"#).unwrap(), "Acme");
    }

    #[test]
    fn empty_default_is_allowed() {
        assert_eq!(render(r#"[{{ Description | default "" }}]"#).unwrap(), "[]");
    }

    #[test]
    fn empty_value_without_default_fails() {
        assert_eq!(
            render("{{ AuthorEmail }}"),
            Err(DomainError::UnresolvedToken {
                token: "AuthorEmail".into(),
                path: "test.tmpl".into()
            })
        );
    }

    #[test]
    fn unknown_field_fails() {
        assert!(matches!(
            render("{{ Version }}"),
            Err(DomainError::UnknownField { field, .. }) if field == "Version"
        ));
    }

    #[test]
    fn unterminated_token_reports_line() {
        let err = render("line one\nline two {{ PluginName").unwrap_err();
        match err {
            DomainError::MalformedTemplate { reason, .. } => assert!(reason.contains("line 2")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejects_other_pipes_and_trailing_text() {
        assert!(matches!(render("{{ PluginName | upper }}"), Err(DomainError::MalformedTemplate { .. })));
        assert!(matches!(render("{{ PluginName extra }}"), Err(DomainError::MalformedTemplate { .. })));
        assert!(matches!(render(r#"{{ PluginName | default"x" }}"#), Err(DomainError::MalformedTemplate { .. })));
        assert!(matches!(render("{{ }}"), Err(DomainError::MalformedTemplate { .. })));
    }

    #[test]
    fn default_literal_escapes() {
        assert_eq!(
            render(r#"{{ AuthorEmail | default "say \"hi\" \\ bye" }}"#).unwrap(),
            r#"say "hi" \ bye"#
        );
        assert_eq!(render(r#"{{ AuthorEmail | default "a}}b" }}"#).unwrap(), "a}}b");
    }

    #[test]
    fn literal_body_escapes_delimiters() {
        assert_eq!(render(r#"{{ "{{" }} .Name {{ "}}" }}"#).unwrap(), "{{ .Name }}");
    }

    #[test]
    fn extra_braces_stay_as_text() {
        assert_eq!(render("{{{ PluginName }}}").unwrap(), "{helm3}");
    }

    #[test]
    fn non_token_text_passes_through() {
        let text = "// comment }} with a lone close\n\tindent  ";
        assert_eq!(render(text).unwrap(), text);
    }

    #[test]
    fn rendering_is_idempotent() {
        let once = render("package {{ PluginName }} // {{ ModulePath }}").unwrap();
        assert_eq!(render(&once).unwrap(), once);
    }

    #[test]
    fn fields_are_listed_in_order() {
        let text = TemplateText::parse("{{ ModulePath }} {{ PluginName }}", "x").unwrap();
        let fields: Vec<_> = text.fields().collect();
        assert_eq!(fields, vec![ParamField::ModulePath, ParamField::PluginName]);
    }

    #[test]
    fn detects_tokens() {
        assert!(contains_token("a {{ PluginName }}"));
        assert!(!contains_token("plain"));
    }
}
