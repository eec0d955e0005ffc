//! Tag parser and evaluator
//!
//! Supported tags, after [`crate::preprocess`]:
//!
//! | Tag                          | Meaning                                  |
//! |------------------------------|------------------------------------------|
//! | `{{ NAME }}`                 | plain text, XML-escaped                  |
//! | `{{ item.field }}`           | field of the current loop record         |
//! | `{{r NAME #n }}`             | rich block, one run per line             |
//! | `{% for item in NAME %}`     | repeat the body for every list record    |
//! | `{% endfor %}`               | end of loop body                         |

use crate::error::RenderError;
use crate::preprocess::prepare;
use crate::value::{RecordValue, RenderContext, RichText, TemplateValue};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{\{(.*?)\}\}|\{%(.*?)%\}").expect("valid tag pattern"));

static IDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{L}_][\p{L}\p{N}_]*$").expect("valid identifier pattern"));

const LINE_BREAK: &str = r#"</w:t><w:br/><w:t xml:space="preserve">"#;

/// Variable reference, optionally into a record field
#[derive(Debug, Clone, PartialEq, Eq)]
struct Path {
    var: String,
    field: Option<String>,
}

impl Path {
    fn parse(part: &str, raw: &str) -> Result<Self, RenderError> {
        let (var, field) = match raw.split_once('.') {
            Some((var, field)) => (var, Some(field)),
            None => (raw, None),
        };
        let valid = IDENT.is_match(var) && field.map_or(true, |f| IDENT.is_match(f));
        if !valid {
            return Err(RenderError::syntax(
                part,
                format!("unsupported expression '{raw}'"),
            ));
        }
        Ok(Self {
            var: var.to_string(),
            field: field.map(str::to_string),
        })
    }

    fn display(&self) -> String {
        match &self.field {
            Some(field) => format!("{}.{}", self.var, field),
            None => self.var.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Raw(String),
    Print(Path),
    Rich { path: Path, props: Option<usize> },
    For { var: String, iterable: String, body: Vec<Node> },
}

enum Statement {
    For { var: String, iterable: String },
    EndFor,
}

fn parse_expression(part: &str, raw: &str) -> Result<Node, RenderError> {
    let raw = raw.trim();
    if let Some(rest) = raw.strip_prefix("r ") {
        let mut words = rest.split_whitespace();
        let path = Path::parse(part, words.next().unwrap_or_default())?;
        let props = words
            .next()
            .and_then(|w| w.strip_prefix('#'))
            .and_then(|n| n.parse().ok());
        return Ok(Node::Rich { path, props });
    }
    Path::parse(part, raw).map(Node::Print)
}

fn parse_statement(part: &str, raw: &str) -> Result<Statement, RenderError> {
    let words: Vec<&str> = raw.split_whitespace().collect();
    match words.as_slice() {
        ["for", var, "in", iterable] if IDENT.is_match(var) && IDENT.is_match(iterable) => {
            Ok(Statement::For {
                var: (*var).to_string(),
                iterable: (*iterable).to_string(),
            })
        }
        ["endfor"] => Ok(Statement::EndFor),
        _ => Err(RenderError::syntax(
            part,
            format!("unsupported statement '{}'", raw.trim()),
        )),
    }
}

fn push_raw(part: &str, nodes: &mut Vec<Node>, raw: &str) -> Result<(), RenderError> {
    if raw.contains("{{") || raw.contains("{%") {
        return Err(RenderError::syntax(part, "unterminated tag"));
    }
    if !raw.is_empty() {
        nodes.push(Node::Raw(raw.to_string()));
    }
    Ok(())
}

fn parse(part: &str, xml: &str) -> Result<Vec<Node>, RenderError> {
    struct Frame {
        header: Option<(String, String)>,
        nodes: Vec<Node>,
    }

    let mut stack = vec![Frame {
        header: None,
        nodes: Vec::new(),
    }];
    let mut last = 0;

    for caps in TAG.captures_iter(xml) {
        let Some(whole) = caps.get(0) else { continue };
        let Some(frame) = stack.last_mut() else {
            return Err(RenderError::syntax(part, "unbalanced endfor"));
        };
        push_raw(part, &mut frame.nodes, &xml[last..whole.start()])?;
        last = whole.end();

        if let Some(expr) = caps.get(1) {
            frame.nodes.push(parse_expression(part, expr.as_str())?);
            continue;
        }
        let Some(stmt) = caps.get(2) else { continue };
        match parse_statement(part, stmt.as_str())? {
            Statement::For { var, iterable } => stack.push(Frame {
                header: Some((var, iterable)),
                nodes: Vec::new(),
            }),
            Statement::EndFor => {
                let closed = stack.pop();
                let (Some(Frame { header: Some((var, iterable)), nodes: body }), Some(parent)) =
                    (closed, stack.last_mut())
                else {
                    return Err(RenderError::syntax(part, "endfor without for"));
                };
                parent.nodes.push(Node::For { var, iterable, body });
            }
        }
    }

    let Some(mut root) = stack.pop() else {
        return Err(RenderError::syntax(part, "unbalanced endfor"));
    };
    if !stack.is_empty() || root.header.is_some() {
        return Err(RenderError::syntax(part, "for loop is never closed"));
    }
    push_raw(part, &mut root.nodes, &xml[last..])?;
    Ok(root.nodes)
}

enum Resolved<'a> {
    Value(&'a TemplateValue),
    Record(&'a RecordValue),
    Field(Option<&'a str>),
    Undefined,
}

struct Scope<'a> {
    context: &'a RenderContext,
    locals: Vec<(&'a str, &'a RecordValue)>,
}

impl<'a> Scope<'a> {
    fn resolve(&self, path: &Path) -> Result<Resolved<'a>, RenderError> {
        if let Some(&(_, record)) = self.locals.iter().rev().find(|(name, _)| *name == path.var) {
            return Ok(match &path.field {
                Some(field) => Resolved::Field(record.get(field)),
                None => Resolved::Record(record),
            });
        }
        match (self.context.get(&path.var), &path.field) {
            (Some(value), None) => Ok(Resolved::Value(value)),
            (Some(value), Some(_)) => Err(RenderError::type_mismatch(
                path.display(),
                "record",
                value.kind(),
            )),
            (None, _) => Ok(Resolved::Undefined),
        }
    }
}

fn escape(text: &str) -> String {
    html_escape::encode_text(&text.replace("\r\n", "\n")).into_owned()
}

fn plain_text(text: &str) -> String {
    escape(text).replace('\n', LINE_BREAK)
}

/// One run per line; newlines inside a line also become breaks
fn rich_runs(lines: &[String], props: &str) -> String {
    let mut out = String::new();
    let lines = lines
        .iter()
        .flat_map(|l| l.split('\n'))
        .map(|l| l.trim_end_matches('\r'));
    for (i, line) in lines.enumerate() {
        if i > 0 {
            out.push_str(&format!("<w:r>{props}<w:br/></w:r>"));
        }
        out.push_str(&format!(
            r#"<w:r>{props}<w:t xml:space="preserve">{}</w:t></w:r>"#,
            escape(line)
        ));
    }
    out
}

fn undefined(path: &Path) {
    tracing::warn!("placeholder '{}' is not bound, rendering empty", path.display());
}

fn evaluate<'a>(
    nodes: &'a [Node],
    scope: &mut Scope<'a>,
    run_props: &[String],
    out: &mut String,
) -> Result<(), RenderError> {
    for node in nodes {
        match node {
            Node::Raw(raw) => out.push_str(raw),
            Node::Print(path) => match scope.resolve(path)? {
                Resolved::Value(TemplateValue::Text(text)) => out.push_str(&plain_text(text)),
                Resolved::Value(other) => {
                    return Err(RenderError::type_mismatch(path.display(), "text", other.kind()))
                }
                Resolved::Record(_) => {
                    return Err(RenderError::type_mismatch(path.display(), "text", "record"))
                }
                Resolved::Field(Some(text)) => out.push_str(&plain_text(text)),
                Resolved::Field(None) | Resolved::Undefined => undefined(path),
            },
            Node::Rich { path, props } => {
                let props = props
                    .and_then(|i| run_props.get(i))
                    .map_or("", String::as_str);
                match scope.resolve(path)? {
                    Resolved::Value(TemplateValue::Rich(rich)) => {
                        out.push_str(&rich_runs(rich.lines(), props));
                    }
                    Resolved::Value(TemplateValue::Text(text)) => {
                        out.push_str(&rich_runs(RichText::new(text).lines(), props));
                    }
                    Resolved::Field(Some(text)) => {
                        out.push_str(&rich_runs(RichText::new(text).lines(), props));
                    }
                    Resolved::Value(other) => {
                        return Err(RenderError::type_mismatch(
                            path.display(),
                            "rich text",
                            other.kind(),
                        ))
                    }
                    Resolved::Record(_) => {
                        return Err(RenderError::type_mismatch(
                            path.display(),
                            "rich text",
                            "record",
                        ))
                    }
                    Resolved::Field(None) | Resolved::Undefined => undefined(path),
                }
            }
            Node::For { var, iterable, body } => {
                let source = Path {
                    var: iterable.clone(),
                    field: None,
                };
                match scope.resolve(&source)? {
                    Resolved::Value(TemplateValue::List(items)) => {
                        for item in items {
                            scope.locals.push((var.as_str(), item));
                            let result = evaluate(body, scope, run_props, out);
                            scope.locals.pop();
                            result?;
                        }
                    }
                    Resolved::Value(other) => {
                        return Err(RenderError::type_mismatch(iterable.clone(), "list", other.kind()))
                    }
                    Resolved::Record(_) => {
                        return Err(RenderError::type_mismatch(iterable.clone(), "list", "record"))
                    }
                    Resolved::Field(_) => {
                        return Err(RenderError::type_mismatch(iterable.clone(), "list", "text"))
                    }
                    Resolved::Undefined => undefined(&source),
                }
            }
        }
    }
    Ok(())
}

/// Render one XML part of the package
pub(crate) fn render_part(
    part: &str,
    xml: &str,
    context: &RenderContext,
) -> Result<String, RenderError> {
    let prepared = prepare(xml);
    let nodes = parse(part, &prepared.xml)?;
    let mut scope = Scope {
        context,
        locals: Vec::new(),
    };
    let mut out = String::with_capacity(prepared.xml.len());
    evaluate(&nodes, &mut scope, &prepared.run_props, &mut out)?;
    Ok(out)
}

/// Context names a part refers to, loop variables excluded
pub(crate) fn placeholders(part: &str, xml: &str) -> Result<BTreeSet<String>, RenderError> {
    fn collect(nodes: &[Node], locals: &mut Vec<String>, names: &mut BTreeSet<String>) {
        for node in nodes {
            match node {
                Node::Raw(_) => {}
                Node::Print(path) | Node::Rich { path, .. } => {
                    if !locals.contains(&path.var) {
                        names.insert(path.var.clone());
                    }
                }
                Node::For { var, iterable, body } => {
                    if !locals.contains(iterable) {
                        names.insert(iterable.clone());
                    }
                    locals.push(var.clone());
                    collect(body, locals, names);
                    locals.pop();
                }
            }
        }
    }

    let nodes = parse(part, &prepare(xml).xml)?;
    let mut names = BTreeSet::new();
    collect(&nodes, &mut Vec::new(), &mut names);
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PART: &str = "word/document.xml";

    fn para(text: &str) -> String {
        format!("<w:p><w:r><w:t>{text}</w:t></w:r></w:p>")
    }

    #[test]
    fn plain_substitution_escapes_and_breaks() {
        let ctx = RenderContext::new().with("OBJECT", "School <No 5> & Co\nBlock B");
        let out = render_part(PART, &para("{{ OBJECT }}"), &ctx).unwrap();
        assert_eq!(
            out,
            para(r#"School &lt;No 5&gt; &amp; Co</w:t><w:br/><w:t xml:space="preserve">Block B"#)
        );
    }

    #[test]
    fn rich_block_becomes_runs() {
        let ctx = RenderContext::new().with("FIRE", RichText::new("1. Text X\n2. Text Y"));
        let xml = r#"<w:p><w:r><w:rPr><w:b/></w:rPr><w:t>{{r FIRE }}</w:t></w:r></w:p>"#;
        let out = render_part(PART, xml, &ctx).unwrap();
        assert_eq!(
            out,
            concat!(
                r#"<w:p><w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">1. Text X</w:t></w:r>"#,
                r#"<w:r><w:rPr><w:b/></w:rPr><w:br/></w:r>"#,
                r#"<w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">2. Text Y</w:t></w:r></w:p>"#
            )
        );
    }

    #[test]
    fn newline_inside_rich_line_becomes_break() {
        let ctx = RenderContext::new().with(
            "FIRE",
            RichText::from_lines(["1. Line one\nLine two", "2. Other"]),
        );
        let out = render_part(PART, &para("{{r FIRE }}"), &ctx).unwrap();
        assert_eq!(
            out,
            concat!(
                r#"<w:p><w:r><w:t xml:space="preserve">1. Line one</w:t></w:r>"#,
                r#"<w:r><w:br/></w:r>"#,
                r#"<w:r><w:t xml:space="preserve">Line two</w:t></w:r>"#,
                r#"<w:r><w:br/></w:r>"#,
                r#"<w:r><w:t xml:space="preserve">2. Other</w:t></w:r></w:p>"#
            )
        );
    }

    #[test]
    fn rich_tag_keeps_surrounding_text_in_run() {
        let ctx = RenderContext::new()
            .with("OBJECT", "School")
            .with("FIRE", RichText::new("1. X"));
        let xml = r#"<w:p><w:r><w:rPr><w:b/></w:rPr><w:t>Object: {{ OBJECT }}; defects: {{r FIRE }} end</w:t></w:r></w:p>"#;
        let out = render_part(PART, xml, &ctx).unwrap();
        assert_eq!(
            out,
            concat!(
                r#"<w:p><w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">Object: School; defects: </w:t></w:r>"#,
                r#"<w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">1. X</w:t></w:r>"#,
                r#"<w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve"> end</w:t></w:r></w:p>"#
            )
        );
    }

    #[test]
    fn dash_text_fills_rich_slot() {
        let ctx = RenderContext::new().with("SMOKE", "—");
        let out = render_part(PART, &para("{{r SMOKE }}"), &ctx).unwrap();
        assert_eq!(
            out,
            r#"<w:p><w:r><w:t xml:space="preserve">—</w:t></w:r></w:p>"#
        );
    }

    #[test]
    fn paragraph_loop_repeats_for_each_record() {
        let ctx = RenderContext::new().with(
            "dsns_list",
            vec![
                RecordValue::new().with("pos", "Inspector").with("name", "Ivanenko"),
                RecordValue::new().with("pos", "Chief").with("name", "Petrenko"),
            ],
        );
        let xml = format!(
            "{}{}{}",
            para("{%p for d in dsns_list %}"),
            para("{{ d.pos }} {{ d.name }}"),
            para("{%p endfor %}")
        );
        let out = render_part(PART, &xml, &ctx).unwrap();
        assert_eq!(
            out,
            format!("{}{}", para("Inspector Ivanenko"), para("Chief Petrenko"))
        );
    }

    #[test]
    fn empty_list_removes_loop_body() {
        let ctx = RenderContext::new().with("dsns_list", Vec::<RecordValue>::new());
        let xml = format!(
            "{}{}{}{}",
            para("before"),
            para("{%p for d in dsns_list %}"),
            para("{{ d.name }}"),
            para("{%p endfor %}")
        );
        assert_eq!(render_part(PART, &xml, &ctx).unwrap(), para("before"));
    }

    #[test]
    fn undefined_placeholder_renders_empty() {
        let out = render_part(PART, &para("[{{ MISSING }}]"), &RenderContext::new()).unwrap();
        assert_eq!(out, para("[]"));
    }

    #[test]
    fn rich_value_in_plain_slot_is_mismatch() {
        let ctx = RenderContext::new().with("FIRE", RichText::new("1. x"));
        let err = render_part(PART, &para("{{ FIRE }}"), &ctx).unwrap_err();
        assert!(matches!(
            err,
            RenderError::TypeMismatch { expected: "text", actual: "rich text", .. }
        ));
    }

    #[test]
    fn list_in_scalar_slots_is_mismatch() {
        let ctx = RenderContext::new().with("dsns_list", vec![RecordValue::new()]);
        assert!(matches!(
            render_part(PART, &para("{{ dsns_list }}"), &ctx),
            Err(RenderError::TypeMismatch { .. })
        ));
        assert!(matches!(
            render_part(PART, &para("{{r dsns_list }}"), &ctx),
            Err(RenderError::TypeMismatch { expected: "rich text", .. })
        ));
    }

    #[test]
    fn looping_over_text_is_mismatch() {
        let ctx = RenderContext::new().with("OBJECT", "School");
        let xml = format!("{}{}", para("{%p for o in OBJECT %}"), para("{%p endfor %}"));
        assert!(matches!(
            render_part(PART, &xml, &ctx),
            Err(RenderError::TypeMismatch { expected: "list", actual: "text", .. })
        ));
    }

    #[test]
    fn record_printed_as_scalar_is_mismatch() {
        let ctx = RenderContext::new().with("dsns_list", vec![RecordValue::new()]);
        let xml = format!(
            "{}{}{}",
            para("{%p for d in dsns_list %}"),
            para("{{ d }}"),
            para("{%p endfor %}")
        );
        assert!(matches!(
            render_part(PART, &xml, &ctx),
            Err(RenderError::TypeMismatch { actual: "record", .. })
        ));
    }

    #[test]
    fn unbalanced_tags_are_syntax_errors() {
        let ctx = RenderContext::new();
        for xml in [
            para("{% for d in dsns_list %}"),
            para("{% endfor %}"),
            para("{{ OBJECT"),
            para("{{ OBJECT|upper }}"),
            para("{% if OBJECT %}"),
        ] {
            assert!(
                matches!(render_part(PART, &xml, &ctx), Err(RenderError::Syntax { .. })),
                "expected syntax error for {xml}"
            );
        }
    }

    #[test]
    fn placeholders_exclude_loop_variables() {
        let xml = format!(
            "{}{}{}{}",
            para("{{ OBJECT }} {{r FIRE }}"),
            para("{%p for d in dsns_list %}"),
            para("{{ d.name }}"),
            para("{%p endfor %}")
        );
        let names: Vec<_> = placeholders(PART, &xml).unwrap().into_iter().collect();
        assert_eq!(names, vec!["FIRE", "OBJECT", "dsns_list"]);
    }

    #[test]
    fn cyrillic_placeholder_names() {
        let ctx = RenderContext::new().with("ОБ_ЄКТ", "Школа");
        let out = render_part(PART, &para("{{ ОБ_ЄКТ }}"), &ctx).unwrap();
        assert_eq!(out, para("Школа"));
    }
}
