//! HTML conversion utilities
//!
//! Renders a parsed [`Document`] as markdown or plain text. Used to turn the
//! readability markup into a lighter prompt format.

use crate::html::{Document, NodeId, NodeKind};

/// Elements rendered as separate blocks
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "section", "article", "main", "header", "footer", "aside", "nav", "table", "form",
    "dl", "dt", "dd", "figure", "figcaption", "address",
];

/// Convert HTML to markdown
pub fn html_to_markdown(html: &str) -> String {
    let doc = Document::parse(html);
    let mut renderer = MarkdownRenderer {
        doc: &doc,
        out: String::new(),
        lists: Vec::new(),
        in_pre: false,
    };
    renderer.render_children(Document::ROOT);
    collapse_lines(&renderer.out, true)
}

/// Convert HTML to plain text
pub fn html_to_text(html: &str) -> String {
    let doc = Document::parse(html);
    let mut out = String::new();
    render_text(&doc, Document::ROOT, &mut out);
    clean_whitespace(&out)
}

struct MarkdownRenderer<'a> {
    doc: &'a Document,
    out: String,
    /// One entry per open list: `None` for `ul`, next item number for `ol`
    lists: Vec<Option<usize>>,
    in_pre: bool,
}

impl MarkdownRenderer<'_> {
    fn render_children(&mut self, id: NodeId) {
        let doc = self.doc;
        for &child in doc.children(id) {
            self.render(child);
        }
    }

    /// Render children into a detached buffer
    fn capture(&mut self, id: NodeId) -> String {
        let saved = std::mem::take(&mut self.out);
        self.render_children(id);
        std::mem::replace(&mut self.out, saved)
    }

    fn render(&mut self, id: NodeId) {
        let doc = self.doc;
        let name = match &doc.node(id).kind {
            NodeKind::Text(text) => {
                self.out.push_str(text);
                return;
            }
            NodeKind::Element { name, .. } => name.as_str(),
        };

        match name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = name[1..].parse::<usize>().unwrap_or(1);
                self.out.push('\n');
                self.out.push_str(&"#".repeat(level));
                self.out.push(' ');
                self.render_children(id);
                self.out.push_str("\n\n");
            }
            "br" => self.out.push('\n'),
            "hr" => self.out.push_str("\n---\n"),
            "ul" | "ol" => {
                self.lists.push(if name == "ol" { Some(1) } else { None });
                self.render_children(id);
                self.lists.pop();
                if self.lists.is_empty() {
                    self.out.push('\n');
                }
            }
            "li" => {
                self.out.push('\n');
                for _ in 0..self.lists.len().saturating_sub(1) {
                    self.out.push_str("  ");
                }
                match self.lists.last_mut() {
                    Some(Some(number)) => {
                        self.out.push_str(&format!("{}. ", number));
                        *number += 1;
                    }
                    _ => self.out.push_str("- "),
                }
                self.render_children(id);
            }
            "strong" | "b" => {
                self.out.push_str("**");
                self.render_children(id);
                self.out.push_str("**");
            }
            "em" | "i" => {
                self.out.push('*');
                self.render_children(id);
                self.out.push('*');
            }
            "pre" => {
                self.out.push_str("\n```\n");
                self.in_pre = true;
                self.render_children(id);
                self.in_pre = false;
                self.out.push_str("\n```\n");
            }
            "code" => {
                if self.in_pre {
                    self.render_children(id);
                } else {
                    self.out.push('`');
                    self.render_children(id);
                    self.out.push('`');
                }
            }
            "blockquote" => {
                let inner = self.capture(id);
                self.out.push('\n');
                for line in inner.trim().lines() {
                    self.out.push_str("> ");
                    self.out.push_str(line);
                    self.out.push('\n');
                }
            }
            "a" => match doc.attr(id, "href") {
                Some(href) if !href.is_empty() => {
                    let label = self.capture(id);
                    self.out.push_str(&format!("[{}]({})", label.trim(), href));
                }
                _ => self.render_children(id),
            },
            "img" => {
                if let Some(src) = doc.attr(id, "src") {
                    let alt = doc.attr(id, "alt").unwrap_or("");
                    self.out.push_str(&format!("![{}]({})", alt, src));
                }
            }
            "td" | "th" => {
                self.render_children(id);
                self.out.push_str(" | ");
            }
            "tr" => {
                self.out.push('\n');
                self.render_children(id);
            }
            _ if BLOCK_ELEMENTS.contains(&name) => {
                self.render_children(id);
                self.out.push_str("\n\n");
            }
            _ => self.render_children(id),
        }
    }
}

fn render_text(doc: &Document, id: NodeId, out: &mut String) {
    let name = match &doc.node(id).kind {
        NodeKind::Text(text) => {
            out.push_str(text);
            return;
        }
        NodeKind::Element { name, .. } => name.as_str(),
    };

    match name {
        "br" => out.push('\n'),
        "td" | "th" => {
            render_children_text(doc, id, out);
            out.push(' ');
        }
        "li" | "tr" => {
            out.push('\n');
            render_children_text(doc, id, out);
        }
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "pre" | "blockquote" | "ul" | "ol" => {
            out.push('\n');
            render_children_text(doc, id, out);
            out.push('\n');
        }
        _ if BLOCK_ELEMENTS.contains(&name) => {
            out.push('\n');
            render_children_text(doc, id, out);
            out.push('\n');
        }
        _ => render_children_text(doc, id, out),
    }
}

fn render_children_text(doc: &Document, id: NodeId, out: &mut String) {
    for &child in doc.children(id) {
        render_text(doc, child, out);
    }
}

/// Clean whitespace: collapse runs within lines, trim lines, keep at most one blank line
pub fn clean_whitespace(s: &str) -> String {
    collapse_lines(s, false)
}

/// Line-wise collapse; with `keep_list_indent`, list item lines keep their leading indent
fn collapse_lines(s: &str, keep_list_indent: bool) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut blank_run = 0;

    for line in s.lines() {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
            lines.push(collapsed);
            continue;
        }
        blank_run = 0;

        if keep_list_indent && is_list_item(&collapsed) {
            let indent = &line[..line.len() - line.trim_start().len()];
            lines.push(format!("{}{}", indent, collapsed));
        } else {
            lines.push(collapsed);
        }
    }

    lines.join("\n").trim_matches('\n').to_string()
}

/// `- item` or `12. item`
fn is_list_item(line: &str) -> bool {
    if line.starts_with("- ") {
        return true;
    }
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    digits > 0 && line[digits..].starts_with(". ")
}
