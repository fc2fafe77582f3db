use std::borrow::Cow;
use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Which rule decided the outcome for a diagram line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagramRule {
    /// Structural keyword, comment or style/class directive (never rewritten)
    Directive,
    /// `Id[(...)]` or `Id([...])` node declaration (never rewritten)
    ShapedNode,
    /// Edge with a multi-word bare reference, rewritten to `Id[Text]`
    MultiWordEdge,
    /// `Id    some text` rewritten to `Id[some text]`
    BareNode,
    /// `(fragment)` inside a node label rewritten to ` - fragment`
    LabelParentheses,
    /// No rule applied
    Unchanged,
}

impl DiagramRule {
    pub fn is_rewrite(&self) -> bool {
        matches!(
            self,
            DiagramRule::MultiWordEdge | DiagramRule::BareNode | DiagramRule::LabelParentheses
        )
    }
}

/// Matched as raw prefixes: any line starting with these is left alone
const DIRECTIVE_PREFIXES: &[&str] = &[
    "%%", "subgraph", "end", "graph", "flowchart", "style", "classDef", "class", "linkStyle",
    "click", "direction", "sequenceDiagram",
];

/// Sequence-diagram keywords, matched only as a whole leading word
const DIRECTIVE_KEYWORDS: &[&str] = &[
    "participant", "actor", "Note", "loop", "alt", "else", "opt", "par", "and", "rect",
    "critical", "break", "autonumber", "activate", "deactivate",
];

const BRACKET_CHARS: &[char] = &['[', ']', '(', ')', '{', '}'];
const QUOTE_CHARS: &[char] = &['"', '\'', '`'];

fn shaped_node_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^[\w-]+(?:\[\(|\(\[)").expect("Invalid regex"))
}

fn edge_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(
            r"^(?P<src>.+?)\s*(?P<arrow><?(?:-\.+->|-\.+-|={2,}>|={3,}|-{2,}>|-{3,}))(?P<label>\|[^|]*\|)?\s*(?P<dst>.+?)$",
        )
        .expect("Invalid regex")
    })
}

fn bare_node_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^(?P<id>[\w-]+)\s{2,}(?P<text>\S.*)$").expect("Invalid regex"))
}

fn label_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"\[([^\[\]]*)\]").expect("Invalid regex"))
}

fn label_fragment_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"\s*\(([^()]*)\)").expect("Invalid regex"))
}

/// Rewrite one line from inside a diagram block
///
/// Rules are tried in order and the first match wins. Unchanged lines come
/// back borrowed and byte-identical; rewritten lines keep their indentation.
pub fn normalize_line(line: &str) -> (Cow<'_, str>, DiagramRule) {
    let content = line.trim();
    if content.is_empty() {
        return (Cow::Borrowed(line), DiagramRule::Unchanged);
    }

    if is_directive(content) {
        return (Cow::Borrowed(line), DiagramRule::Directive);
    }

    if shaped_node_regex().is_match(content) {
        return (Cow::Borrowed(line), DiagramRule::ShapedNode);
    }

    let indent = &line[..line.len() - line.trim_start().len()];

    if let Some(rewritten) = rewrite_multi_word_edge(content) {
        return (Cow::Owned(format!("{}{}", indent, rewritten)), DiagramRule::MultiWordEdge);
    }

    if let Some(rewritten) = rewrite_bare_node(content) {
        return (Cow::Owned(format!("{}{}", indent, rewritten)), DiagramRule::BareNode);
    }

    if let Some(rewritten) = rewrite_label_parentheses(content) {
        return (Cow::Owned(format!("{}{}", indent, rewritten)), DiagramRule::LabelParentheses);
    }

    (Cow::Borrowed(line), DiagramRule::Unchanged)
}

fn is_directive(content: &str) -> bool {
    if DIRECTIVE_PREFIXES.iter().any(|p| content.starts_with(p)) {
        return true;
    }

    let first_word = content
        .split(|c: char| c.is_whitespace() || c == ':')
        .next()
        .unwrap_or("");
    DIRECTIVE_KEYWORDS.contains(&first_word)
}

/// `Load Balancer --> Web Servers` becomes
/// `LoadBalancer[Load Balancer] --> WebServers[Web Servers]`
fn rewrite_multi_word_edge(content: &str) -> Option<String> {
    let caps = edge_regex().captures(content)?;
    let src = caps["src"].trim();
    let dst = caps["dst"].trim();

    if !is_plain_reference(src) || !is_plain_reference(dst) {
        return None;
    }
    if !has_multi_word_name(src) && !has_multi_word_name(dst) {
        return None;
    }

    let label = caps.name("label").map_or("", |m| m.as_str());

    Some(format!(
        "{} {}{} {}",
        declare_reference(src),
        &caps["arrow"],
        label,
        declare_reference(dst)
    ))
}

/// A reference with no declaration brackets and no edge syntax of its own
fn is_plain_reference(reference: &str) -> bool {
    if reference.contains(BRACKET_CHARS)
        || reference.contains(['&', '<', '>'])
        || reference.contains("--")
        || reference.contains("==")
    {
        return false;
    }

    let (name, class) = split_class_suffix(reference);
    !name.is_empty() && class.is_none_or(|c| !c.is_empty() && !c.contains(char::is_whitespace))
}

/// `Big Box:::hot` splits into `Big Box` and `hot`
fn split_class_suffix(reference: &str) -> (&str, Option<&str>) {
    match reference.split_once(":::") {
        Some((name, class)) => (name.trim_end(), Some(class)),
        None => (reference, None),
    }
}

fn has_multi_word_name(reference: &str) -> bool {
    split_class_suffix(reference).0.contains(char::is_whitespace)
}

fn declare_reference(reference: &str) -> String {
    let (name, class) = split_class_suffix(reference);
    if !name.contains(char::is_whitespace) {
        return reference.to_string();
    }

    let id: String = name.split_whitespace().collect();
    match class {
        Some(class) => format!("{}[{}]:::{}", id, name, class),
        None => format!("{}[{}]", id, name),
    }
}

/// `SProvider    Core Backend Microservice` becomes
/// `SProvider[Core Backend Microservice]`
fn rewrite_bare_node(content: &str) -> Option<String> {
    if content.contains(BRACKET_CHARS) || edge_regex().is_match(content) {
        return None;
    }

    let caps = bare_node_regex().captures(content)?;
    let label: String = caps["text"].chars().filter(|c| !QUOTE_CHARS.contains(c)).collect();
    let label = label.split_whitespace().collect::<Vec<_>>().join(" ");

    if label.is_empty() {
        return None;
    }

    Some(format!("{}[{}]", &caps["id"], label))
}

/// `WebApp[Web Application (React)]` becomes `WebApp[Web Application - React]`
///
/// A label wrapped whole in parentheses is a database shape; only its inner
/// text is repaired.
fn rewrite_label_parentheses(content: &str) -> Option<String> {
    if !content.contains('[') {
        return None;
    }

    let rewritten = label_regex().replace_all(content, |caps: &Captures| {
        let label = &caps[1];
        match label
            .strip_prefix('(')
            .and_then(|inner| inner.strip_suffix(')'))
        {
            Some(inner) => format!("[({})]", flatten_parentheses(inner)),
            None => format!("[{}]", flatten_parentheses(label)),
        }
    });

    (rewritten != content).then(|| rewritten.into_owned())
}

fn flatten_parentheses(label: &str) -> String {
    let mut current = label.to_string();
    loop {
        let next = label_fragment_regex()
            .replace_all(&current, |caps: &Captures| format!(" - {}", &caps[1]))
            .into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}
