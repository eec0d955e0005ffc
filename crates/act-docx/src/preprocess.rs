//! WordprocessingML clean-up ahead of tag parsing
//!
//! Word freely splits typed text into several runs, so `{{ OBJECT }}` can
//! arrive as `{{</w:t></w:r><w:r><w:t> OBJECT }}`. Before parsing, every tag
//! is stitched back into one piece of text. Block-level tags (`{%p`, `{%tr`,
//! `{%r`) then replace the paragraph, table row or run that holds them, and
//! every `{{r NAME }}` is cut out of its run, remembering the run's
//! formatting.

/// XML ready for tag parsing plus the run properties of rich placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Prepared {
    pub(crate) xml: String,
    pub(crate) run_props: Vec<String>,
}

/// Merge split tags, unwrap block tags, isolate rich placeholders
pub(crate) fn prepare(xml: &str) -> Prepared {
    let mut xml = merge_split_tags(xml);
    for (marker, element) in [("{%p ", "w:p"), ("{%tr ", "w:tr"), ("{%r ", "w:r")] {
        xml = unwrap_block_tags(&xml, marker, element);
    }
    isolate_rich_runs(&xml)
}

/// Stitch tags split across runs back into plain text
///
/// Only markup strictly inside a tag is dropped. A tag that would have to
/// swallow a paragraph boundary is left alone and later reported as a
/// syntax error.
pub(crate) fn merge_split_tags(xml: &str) -> String {
    let mut text: Vec<(usize, char)> = Vec::new();
    let mut in_markup = false;
    for (i, c) in xml.char_indices() {
        match c {
            '<' => in_markup = true,
            '>' if in_markup => in_markup = false,
            _ if !in_markup => text.push((i, c)),
            _ => {}
        }
    }

    let mut out = String::with_capacity(xml.len());
    let mut copied = 0;
    let mut k = 0;
    while k + 1 < text.len() {
        let closer = match (text[k].1, text[k + 1].1) {
            ('{', '{') => '}',
            ('{', '%') => '%',
            _ => {
                k += 1;
                continue;
            }
        };
        let Some(end) = (k + 2..text.len().saturating_sub(1))
            .find(|&j| text[j].1 == closer && text[j + 1].1 == '}')
            .map(|j| j + 1)
        else {
            break;
        };

        let start_at = text[k].0;
        let end_at = text[end].0 + 1;
        let segment = &xml[start_at..end_at];
        if segment.contains('<') && !segment.contains("</w:p>") {
            out.push_str(&xml[copied..start_at]);
            out.extend(text[k..=end].iter().map(|(_, c)| *c));
            copied = end_at;
        }
        k = end + 1;
    }
    out.push_str(&xml[copied..]);
    out
}

/// Start offset of the innermost `<element>` / `<element ...>` before `pos`
fn open_tag_before(xml: &str, pos: usize, element: &str) -> Option<usize> {
    let head = &xml[..pos];
    let bare = head.rfind(&format!("<{element}>"));
    let with_attrs = head.rfind(&format!("<{element} "));
    bare.max(with_attrs)
}

/// End offset of the first `</element>` after `pos`
fn close_tag_after(xml: &str, pos: usize, element: &str) -> Option<usize> {
    let closing = format!("</{element}>");
    xml[pos..].find(&closing).map(|i| pos + i + closing.len())
}

/// Replace each element holding a block tag by the bare `{% ... %}` tag
fn unwrap_block_tags(xml: &str, marker: &str, element: &str) -> String {
    let mut xml = xml.to_string();
    let mut from = 0;
    while let Some(found) = xml[from..].find(marker) {
        let at = from + found;
        let Some(tag_end) = xml[at..].find("%}").map(|i| at + i + 2) else {
            break;
        };
        let statement = xml[at + marker.len()..tag_end - 2].trim().to_string();
        let bare = format!("{{% {statement} %}}");

        match (
            open_tag_before(&xml, at, element),
            close_tag_after(&xml, tag_end, element),
        ) {
            (Some(start), Some(end)) => {
                xml.replace_range(start..end, &bare);
                from = start + bare.len();
            }
            _ => {
                xml.replace_range(at..tag_end, &bare);
                from = at + bare.len();
            }
        }
    }
    xml
}

/// Replace the run around every `{{r NAME }}` by `{{r NAME #n }}`
///
/// `n` indexes the run properties captured from the replaced run. Text
/// sharing the run with the tag is kept in runs of its own before and after
/// the marker, with the same properties.
fn isolate_rich_runs(xml: &str) -> Prepared {
    let mut xml = xml.to_string();
    let mut run_props = Vec::new();
    let mut from = 0;
    while let Some(found) = xml[from..].find("{{r ") {
        let at = from + found;
        let Some(tag_end) = xml[at..].find("}}").map(|i| at + i + 2) else {
            break;
        };
        let name = xml[at + 4..tag_end - 2].trim().to_string();
        let marker = format!("{{{{r {name} #{} }}}}", run_props.len());

        let run = open_tag_before(&xml, at, "w:r").zip(close_tag_after(&xml, tag_end, "w:r"));
        match run {
            Some((start, end)) => {
                let props = extract_run_props(&xml[start..end]);
                let (head, tail) =
                    split_run(&xml, start, end, at, tag_end, &props).unwrap_or_default();
                run_props.push(props);
                xml.replace_range(start..end, &format!("{head}{marker}{tail}"));
                from = start + head.len() + marker.len();
            }
            None => {
                run_props.push(String::new());
                xml.replace_range(at..tag_end, &marker);
                from = at + marker.len();
            }
        }
    }
    Prepared { xml, run_props }
}

/// Runs holding what precedes and follows a tag inside its run
///
/// Either side is empty when it carries nothing besides run properties.
/// `None` when the tag does not sit in a `<w:t>` of the run.
fn split_run(
    xml: &str,
    start: usize,
    end: usize,
    at: usize,
    tag_end: usize,
    props: &str,
) -> Option<(String, String)> {
    let run_open_end = start + xml[start..at].find('>')? + 1;
    let text_open = open_tag_before(xml, at, "w:t").filter(|&t| t >= run_open_end)?;
    let text_open_end = text_open + xml[text_open..at].find('>')? + 1;
    let text_close = tag_end + xml[tag_end..end].find("</w:t>")?;
    let close_end = text_close + "</w:t>".len();

    let before = &xml[text_open_end..at];
    let leading = xml[run_open_end..text_open].replacen(props, "", 1);
    let head = if before.is_empty() && leading.trim().is_empty() {
        String::new()
    } else {
        format!(
            r#"{}<w:t xml:space="preserve">{before}</w:t></w:r>"#,
            &xml[start..text_open]
        )
    };

    let after = &xml[tag_end..text_close];
    let trailing = &xml[close_end..end - "</w:r>".len()];
    let tail = if after.is_empty() && trailing.trim().is_empty() {
        String::new()
    } else {
        format!(
            r#"{}{props}<w:t xml:space="preserve">{after}{}"#,
            &xml[start..run_open_end],
            &xml[text_close..end]
        )
    };
    Some((head, tail))
}

fn extract_run_props(run: &str) -> String {
    let Some(start) = run.find("<w:rPr") else {
        return String::new();
    };
    run[start..]
        .find("</w:rPr>")
        .map(|i| run[start..start + i + "</w:rPr>".len()].to_string())
        .unwrap_or_default()
}
