//! Tolerant HTML parsing into a flat node arena
//!
//! Nodes live in a `Vec` and refer to each other by [`NodeId`].
//! The parser never fails. Unknown closing tags are ignored, unclosed
//! elements are closed at end of input, and the contents of
//! script-like elements are dropped.

/// Index of a node in a [`Document`]
pub type NodeId = usize;

/// Elements that never have children
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose contents are skipped entirely
const SKIP_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "iframe", "svg", "template", "object",
];

/// Elements that implicitly close an open element of the same name
const SELF_NESTING_CLOSERS: &[&str] = &["p", "li", "dt", "dd", "tr", "td", "th", "option"];

/// Block elements that implicitly close an open `<p>`
const P_CLOSERS: &[&str] = &[
    "address", "article", "aside", "blockquote", "div", "dl", "fieldset", "footer", "form", "h1",
    "h2", "h3", "h4", "h5", "h6", "header", "hr", "main", "nav", "ol", "pre", "section", "table",
    "ul",
];

/// Attributes kept when serializing back to markup
const KEPT_ATTRIBUTES: &[&str] = &["href", "src", "alt"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element {
        name: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Parsed HTML document
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Synthetic root holding the top-level nodes
    pub const ROOT: NodeId = 0;

    /// Parse HTML. Never fails; malformed input yields a best-effort tree.
    pub fn parse(html: &str) -> Self {
        let mut builder = TreeBuilder::new();
        let mut pos = 0;

        while pos < html.len() {
            let rest = &html[pos..];
            let Some(offset) = rest.find('<') else {
                builder.text(rest);
                break;
            };
            if offset > 0 {
                builder.text(&rest[..offset]);
            }
            pos += offset;
            let rest = &html[pos..];

            if rest.starts_with("<!--") {
                pos += rest.find("-->").map(|end| end + 3).unwrap_or(rest.len());
                continue;
            }
            if rest.starts_with("<!") || rest.starts_with("<?") {
                pos += rest.find('>').map(|end| end + 1).unwrap_or(rest.len());
                continue;
            }

            let Some(tag) = read_tag(rest) else {
                // A bare '<' in text, e.g. "a < b"
                builder.text("<");
                pos += 1;
                continue;
            };
            pos += tag.len;

            if tag.closing {
                builder.close(&tag.name);
            } else if SKIP_ELEMENTS.contains(&tag.name.as_str()) {
                if !tag.self_closing {
                    pos = skip_element_body(html, pos, &tag.name);
                }
            } else {
                let is_void = tag.self_closing || VOID_ELEMENTS.contains(&tag.name.as_str());
                builder.open(tag.name, tag.attrs, is_void);
            }
        }

        builder.finish()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Lowercase element name, `None` for text nodes
    pub fn name(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id].kind {
            NodeKind::Element { name, .. } => Some(name.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    pub fn is_element(&self, id: NodeId, tag: &str) -> bool {
        self.name(id) == Some(tag)
    }

    pub fn attr(&self, id: NodeId, attr: &str) -> Option<&str> {
        match &self.nodes[id].kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(name, _)| name == attr)
                .map(|(_, value)| value.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    /// All nodes below `id` in document order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[id].children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.nodes[next].children.iter().rev());
        }
        out
    }

    /// First element named `tag` below `id`, in document order
    pub fn find_first(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        self.descendants(id)
            .into_iter()
            .find(|&node| self.is_element(node, tag))
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id].kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element { .. } => {
                for &child in &self.nodes[id].children {
                    self.collect_text(child, out);
                }
            }
        }
    }

    /// Text of the first `<title>`, whitespace-normalized
    pub fn title(&self) -> Option<String> {
        let title = self.find_first(Self::ROOT, "title")?;
        let text = normalize_space(&self.text_content(title));
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Remove `id` from its parent. The subtree stays in the arena but is unreachable.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id].parent.take() {
            self.nodes[parent].children.retain(|&child| child != id);
        }
    }

    /// Serialize `id` and its subtree as minimal markup
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    /// Serialize the children of `id`
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in &self.nodes[id].children {
            self.write_html(child, &mut out);
        }
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id].kind {
            NodeKind::Text(text) => out.push_str(&escape_text(text)),
            NodeKind::Element { name, attrs } => {
                if id == Self::ROOT {
                    for &child in &self.nodes[id].children {
                        self.write_html(child, out);
                    }
                    return;
                }
                out.push('<');
                out.push_str(name);
                for (attr, value) in attrs {
                    if KEPT_ATTRIBUTES.contains(&attr.as_str()) {
                        out.push_str(&format!(" {}=\"{}\"", attr, escape_attribute(value)));
                    }
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&name.as_str()) {
                    return;
                }
                for &child in &self.nodes[id].children {
                    self.write_html(child, out);
                }
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
        }
    }
}

/// Builds the arena while tracking the open-element stack
struct TreeBuilder {
    nodes: Vec<Node>,
    open: Vec<NodeId>,
}

impl TreeBuilder {
    fn new() -> Self {
        let root = Node {
            kind: NodeKind::Element {
                name: "#document".to_string(),
                attrs: Vec::new(),
            },
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![root],
            open: vec![Document::ROOT],
        }
    }

    fn current(&self) -> NodeId {
        *self.open.last().unwrap_or(&Document::ROOT)
    }

    fn current_name(&self) -> Option<&str> {
        match &self.nodes[self.current()].kind {
            NodeKind::Element { name, .. } => Some(name.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let parent = self.current();
        let id = self.nodes.len();
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(id);
        id
    }

    fn text(&mut self, raw: &str) {
        let decoded = decode_entities(raw);
        if decoded.is_empty() {
            return;
        }
        // Merge with a preceding text sibling
        let parent = self.current();
        if let Some(&last) = self.nodes[parent].children.last() {
            if let NodeKind::Text(existing) = &mut self.nodes[last].kind {
                existing.push_str(&decoded);
                return;
            }
        }
        self.push(NodeKind::Text(decoded));
    }

    fn open(&mut self, name: String, attrs: Vec<(String, String)>, is_void: bool) {
        let current = self.current_name();
        if SELF_NESTING_CLOSERS.contains(&name.as_str()) && current == Some(name.as_str()) {
            self.open.pop();
        } else if P_CLOSERS.contains(&name.as_str()) && current == Some("p") {
            self.open.pop();
        }

        let id = self.push(NodeKind::Element { name, attrs });
        if !is_void {
            self.open.push(id);
        }
    }

    fn close(&mut self, name: &str) {
        // Index 0 is the root and never closes
        let position = self.open.iter().skip(1).rposition(|&id| {
            matches!(&self.nodes[id].kind, NodeKind::Element { name: open, .. } if open == name)
        });
        if let Some(position) = position {
            self.open.truncate(position + 1);
        }
    }

    fn finish(self) -> Document {
        Document { nodes: self.nodes }
    }
}

/// A parsed start or end tag
struct Tag {
    name: String,
    attrs: Vec<(String, String)>,
    closing: bool,
    self_closing: bool,
    /// Bytes consumed, including `<` and `>`
    len: usize,
}

/// Parse a tag at the start of `input` (which begins with `<`)
fn read_tag(input: &str) -> Option<Tag> {
    let after = &input[1..];
    let closing = after.starts_with('/');
    let name_start = if closing { 1 } else { 0 };
    if !after[name_start..]
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic())
    {
        return None;
    }

    // Find the closing '>' outside of quoted attribute values
    let mut quote: Option<char> = None;
    let mut end = None;
    for (idx, c) in after.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '>' => {
                end = Some(idx);
                break;
            }
            None => {}
        }
    }
    let end = end?;
    let inner = &after[name_start..end];

    let name_len = inner
        .find(|c: char| c.is_whitespace() || c == '/')
        .unwrap_or(inner.len());
    let name = inner[..name_len].to_ascii_lowercase();
    let remainder = &inner[name_len..];

    let (attrs, self_closing) = if closing {
        (Vec::new(), false)
    } else {
        (
            parse_attributes(remainder),
            remainder.trim_end().ends_with('/'),
        )
    };

    Some(Tag {
        name,
        attrs,
        closing,
        self_closing,
        len: end + 2,
    })
}

/// Parse `name="value"` pairs; names are lowercased, values entity-decoded
fn parse_attributes(input: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    let mut rest = input;

    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == '/');
        if rest.is_empty() {
            break;
        }

        let name_len = rest
            .find(|c: char| c.is_whitespace() || c == '=' || c == '/')
            .unwrap_or(rest.len());
        let name = rest[..name_len].to_ascii_lowercase();
        rest = rest[name_len..].trim_start();

        let mut value = String::new();
        if let Some(after_eq) = rest.strip_prefix('=') {
            let after_eq = after_eq.trim_start();
            let quote = after_eq.chars().next().filter(|&c| c == '"' || c == '\'');
            if let Some(q) = quote {
                let body = &after_eq[1..];
                let close = body.find(q).unwrap_or(body.len());
                value = decode_entities(&body[..close]);
                rest = body.get(close + 1..).unwrap_or("");
            } else {
                let close = after_eq
                    .find(char::is_whitespace)
                    .unwrap_or(after_eq.len());
                value = decode_entities(&after_eq[..close]);
                rest = &after_eq[close..];
            }
        }

        if !name.is_empty() {
            attrs.push((name, value));
        }
    }

    attrs
}

/// Return the position just past `</name>`, or end of input
fn skip_element_body(html: &str, from: usize, name: &str) -> usize {
    let needle = format!("</{}", name);
    let haystack = html[from..].to_ascii_lowercase();
    match haystack.find(&needle) {
        Some(start) => {
            let after = from + start;
            html[after..]
                .find('>')
                .map(|end| after + end + 1)
                .unwrap_or(html.len())
        }
        None => html.len(),
    }
}

/// Decode character references in text
pub fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest[1..]
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_entity(&rest[1..=semi]).map(|c| (c, semi + 2)));

        match decoded {
            Some((c, consumed)) => {
                out.push(c);
                rest = &rest[consumed..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    let named = match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        "mdash" => Some('—'),
        "ndash" => Some('–'),
        "hellip" => Some('…'),
        "rsquo" => Some('’'),
        "lsquo" => Some('‘'),
        "rdquo" => Some('”'),
        "ldquo" => Some('“'),
        "bull" => Some('•'),
        "middot" => Some('·'),
        "euro" => Some('€'),
        "copy" => Some('©'),
        "reg" => Some('®'),
        _ => None,
    };
    if named.is_some() {
        return named;
    }

    let num = entity.strip_prefix('#')?;
    let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => num.parse::<u32>().ok()?,
    };
    char::from_u32(code)
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

/// Collapse runs of whitespace to single spaces and trim
pub fn normalize_space(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Check if content is HTML based on content type and body
pub fn is_html(content_type: Option<&str>, body: &str) -> bool {
    if let Some(ct) = content_type {
        let ct_lower = ct.to_lowercase();
        if ct_lower.contains("text/html") || ct_lower.contains("application/xhtml") {
            return true;
        }
    }

    let head: String = body.trim_start().chars().take(16).collect();
    let head = head.to_ascii_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element_names(doc: &Document, id: NodeId) -> Vec<String> {
        doc.children(id)
            .iter()
            .filter_map(|&child| doc.name(child).map(str::to_string))
            .collect()
    }

    #[test]
    fn test_parse_nested_elements() {
        let doc = Document::parse("<div><p>Hello <b>bold</b></p><p>World</p></div>");
        let div = doc.find_first(Document::ROOT, "div").unwrap();
        assert_eq!(element_names(&doc, div), vec!["p", "p"]);
        assert_eq!(doc.text_content(div), "Hello boldWorld");
    }

    #[test]
    fn test_parse_skips_script_and_comments() {
        let doc = Document::parse(
            "<p>Before</p><!-- note --><script>if (a < b) { alert('x'); }</script><p>After</p>",
        );
        let text = doc.text_content(Document::ROOT);
        assert_eq!(text, "BeforeAfter");
    }

    #[test]
    fn test_parse_void_and_self_closing() {
        let doc = Document::parse("<p>one<br>two<img src=\"a.png\"/>three</p>");
        let p = doc.find_first(Document::ROOT, "p").unwrap();
        assert_eq!(doc.text_content(p), "onetwothree");
        let img = doc.find_first(p, "img").unwrap();
        assert_eq!(doc.attr(img, "src"), Some("a.png"));
        assert!(doc.children(img).is_empty());
    }

    #[test]
    fn test_parse_implicit_paragraph_close() {
        let doc = Document::parse("<body><p>First<p>Second<div>Block</div></body>");
        let body = doc.find_first(Document::ROOT, "body").unwrap();
        assert_eq!(element_names(&doc, body), vec!["p", "p", "div"]);
    }

    #[test]
    fn test_parse_unmatched_close_ignored() {
        let doc = Document::parse("<div>text</span> more</div>");
        let div = doc.find_first(Document::ROOT, "div").unwrap();
        assert_eq!(doc.text_content(div), "text more");
    }

    #[test]
    fn test_parse_bare_less_than() {
        let doc = Document::parse("<p>1 < 2</p>");
        assert_eq!(doc.text_content(Document::ROOT), "1 < 2");
    }

    #[test]
    fn test_attributes() {
        let doc = Document::parse(
            "<a HREF='https://example.com/?a=1&amp;b=2' class=link data-x=\"a > b\">x</a>",
        );
        let a = doc.find_first(Document::ROOT, "a").unwrap();
        assert_eq!(doc.attr(a, "href"), Some("https://example.com/?a=1&b=2"));
        assert_eq!(doc.attr(a, "class"), Some("link"));
        assert_eq!(doc.attr(a, "data-x"), Some("a > b"));
        assert_eq!(doc.text_content(a), "x");
    }

    #[test]
    fn test_title() {
        let doc = Document::parse("<html><head><title>\n  Senior  Engineer </title></head></html>");
        assert_eq!(doc.title(), Some("Senior Engineer".to_string()));
        assert_eq!(Document::parse("<p>none</p>").title(), None);
    }

    #[test]
    fn test_detach() {
        let mut doc = Document::parse("<div><nav>menu</nav><p>body</p></div>");
        let nav = doc.find_first(Document::ROOT, "nav").unwrap();
        doc.detach(nav);
        assert_eq!(doc.text_content(Document::ROOT), "body");
        assert!(doc.find_first(Document::ROOT, "nav").is_none());
    }

    #[test]
    fn test_outer_html_keeps_only_link_attributes() {
        let doc = Document::parse(
            "<p class=\"intro\" style=\"x\">Tom &amp; Jerry <a href=\"/x\" onclick=\"y\">go</a><br></p>",
        );
        let p = doc.find_first(Document::ROOT, "p").unwrap();
        assert_eq!(
            doc.outer_html(p),
            "<p>Tom &amp; Jerry <a href=\"/x\">go</a><br></p>"
        );
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(
            decode_entities("&amp; &lt; &gt; &quot; &apos; &nbsp;&mdash;&#39;&#x41;"),
            "& < > \" '  —'A"
        );
        assert_eq!(decode_entities("AT&T"), "AT&T");
        assert_eq!(decode_entities("&unknown;"), "&unknown;");
        assert_eq!(decode_entities("a & b; c"), "a & b; c");
    }

    #[test]
    fn test_normalize_space() {
        assert_eq!(normalize_space("  hello \n\t world  "), "hello world");
        assert_eq!(normalize_space(""), "");
    }

    #[test]
    fn test_is_html_by_content_type() {
        assert!(is_html(Some("text/html"), ""));
        assert!(is_html(Some("text/html; charset=utf-8"), ""));
        assert!(is_html(Some("application/xhtml+xml"), ""));
        assert!(!is_html(Some("text/plain"), ""));
        assert!(!is_html(Some("application/json"), ""));
    }

    #[test]
    fn test_is_html_by_body() {
        assert!(is_html(None, "<!DOCTYPE html><html>"));
        assert!(is_html(None, "  <!doctype html>"));
        assert!(is_html(None, "<html><body>"));
        assert!(!is_html(None, "Hello world"));
        assert!(!is_html(None, "{\"json\": true}"));
    }
}
