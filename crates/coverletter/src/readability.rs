//! Main-content extraction for job posting pages
//!
//! Heuristic in the style of Arc90 readability: strip boilerplate, score
//! paragraph-like elements, propagate scores to their ancestors, then keep
//! the best-scoring container together with its related siblings.

use crate::html::{normalize_space, Document, NodeId};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Elements removed before scoring
const BOILERPLATE_TAGS: &[&str] = &[
    "nav", "aside", "form", "button", "select", "input", "textarea", "label", "dialog", "menu",
];

/// Page chrome, removed unless it sits inside the content itself
const SECTIONING_TAGS: &[&str] = &["header", "footer"];

/// Ancestors marking an element as part of the content
const CONTENT_ROOTS: &[&str] = &["article", "main"];

/// Elements never removed by class/id heuristics
const PROTECTED_TAGS: &[&str] = &["html", "body", "article", "main"];

/// class/id fragments that mark probable boilerplate
const UNLIKELY_CANDIDATES: &[&str] = &[
    "ad-break",
    "agegate",
    "banner",
    "breadcrumb",
    "combx",
    "comment",
    "community",
    "cookie",
    "cover-wrap",
    "disqus",
    "extra",
    "footer",
    "gdpr",
    "header",
    "legends",
    "menu",
    "pager",
    "pagination",
    "popup",
    "related",
    "remark",
    "replies",
    "rss",
    "share",
    "shoutbox",
    "sidebar",
    "skyscraper",
    "social",
    "sponsor",
    "supplemental",
];

/// class/id fragments that rescue an otherwise unlikely element
const MAYBE_CANDIDATES: &[&str] = &[
    "and",
    "article",
    "body",
    "column",
    "content",
    "description",
    "job",
    "main",
    "posting",
    "shadow",
];

const POSITIVE_HINTS: &[&str] = &[
    "article",
    "body",
    "content",
    "description",
    "entry",
    "job",
    "main",
    "page",
    "post",
    "posting",
    "story",
    "text",
    "vacancy",
];

const NEGATIVE_HINTS: &[&str] = &[
    "banner", "combx", "comment", "contact", "foot", "footnote", "hidden", "masthead", "media",
    "meta", "promo", "related", "scroll", "share", "shopping", "sidebar", "skyscraper", "sponsor",
    "tags", "tool", "widget",
];

/// Elements whose presence keeps a `div` from being scored like a paragraph
const BLOCK_CHILDREN: &[&str] = &[
    "a", "blockquote", "dl", "div", "img", "ol", "p", "pre", "table", "ul", "section", "article",
    "h1", "h2", "h3", "h4", "h5", "h6",
];

/// Paragraphs shorter than this are ignored when scoring
const MIN_PARAGRAPH_LEN: usize = 25;

/// Content extracted from a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    /// Page `<title>`, if any
    pub title: Option<String>,
    /// Main content as minimal markup wrapped in a `<div>`
    pub content: String,
}

/// Extract the main readable content from an HTML page
pub fn extract(html: &str) -> Article {
    let mut doc = Document::parse(html);
    let title = doc.title();
    let body = doc.find_first(Document::ROOT, "body").unwrap_or(Document::ROOT);

    strip_boilerplate(&mut doc, body);

    let scores = score_candidates(&doc, body);
    let top = scores
        .iter()
        .fold(None::<(NodeId, f64)>, |best, (&id, &score)| match best {
            Some((_, best_score)) if best_score >= score => best,
            _ => Some((id, score)),
        });

    let content = match top {
        Some((top_id, top_score)) => {
            debug!(
                node = doc.name(top_id).unwrap_or(""),
                score = top_score,
                candidates = scores.len(),
                "Selected readability candidate"
            );
            let mut out = String::from("<div>");
            for id in collect_with_siblings(&doc, &scores, top_id, top_score) {
                out.push_str(&doc.outer_html(id));
            }
            out.push_str("</div>");
            out
        }
        None => {
            warn!("No readability candidate found, using whole body");
            format!("<div>{}</div>", doc.inner_html(body))
        }
    };

    Article { title, content }
}

fn strip_boilerplate(doc: &mut Document, body: NodeId) {
    for id in doc.descendants(body) {
        let Some(name) = doc.name(id) else {
            continue;
        };
        let remove = BOILERPLATE_TAGS.contains(&name)
            || (SECTIONING_TAGS.contains(&name) && !has_ancestor(doc, id, CONTENT_ROOTS))
            || (!PROTECTED_TAGS.contains(&name) && is_unlikely(&class_and_id(doc, id)));
        if remove {
            doc.detach(id);
        }
    }
}

fn has_ancestor(doc: &Document, id: NodeId, tags: &[&str]) -> bool {
    let mut current = doc.parent(id);
    while let Some(ancestor) = current {
        if doc.name(ancestor).is_some_and(|name| tags.contains(&name)) {
            return true;
        }
        current = doc.parent(ancestor);
    }
    false
}

fn is_unlikely(class_and_id: &str) -> bool {
    !class_and_id.is_empty()
        && UNLIKELY_CANDIDATES
            .iter()
            .any(|hint| class_and_id.contains(hint))
        && !MAYBE_CANDIDATES
            .iter()
            .any(|hint| class_and_id.contains(hint))
}

fn class_and_id(doc: &Document, id: NodeId) -> String {
    let class = doc.attr(id, "class").unwrap_or("");
    let ident = doc.attr(id, "id").unwrap_or("");
    format!("{} {}", class, ident).trim().to_lowercase()
}

/// Score ancestors of paragraph-like elements. Keys are in document order.
fn score_candidates(doc: &Document, body: NodeId) -> BTreeMap<NodeId, f64> {
    let mut scores: BTreeMap<NodeId, f64> = BTreeMap::new();

    for id in doc.descendants(body) {
        if !is_paragraph_like(doc, id) {
            continue;
        }
        let text = normalize_space(&doc.text_content(id));
        let len = text.chars().count();
        if len < MIN_PARAGRAPH_LEN {
            continue;
        }

        let Some(parent) = doc.parent(id) else {
            continue;
        };
        let score = 1.0 + text.matches(',').count() as f64 + (len / 100).min(3) as f64;

        *scores
            .entry(parent)
            .or_insert_with(|| initial_score(doc, parent)) += score;

        if let Some(grandparent) = doc.parent(parent).filter(|&gp| gp != Document::ROOT) {
            *scores
                .entry(grandparent)
                .or_insert_with(|| initial_score(doc, grandparent)) += score / 2.0;
        }
    }

    for (&id, score) in scores.iter_mut() {
        *score *= 1.0 - link_density(doc, id);
    }

    scores
}

fn is_paragraph_like(doc: &Document, id: NodeId) -> bool {
    match doc.name(id) {
        Some("p") | Some("pre") | Some("td") => true,
        Some("div") => !doc
            .descendants(id)
            .iter()
            .any(|&child| doc.name(child).is_some_and(|n| BLOCK_CHILDREN.contains(&n))),
        _ => false,
    }
}

fn initial_score(doc: &Document, id: NodeId) -> f64 {
    let tag_score = match doc.name(id).unwrap_or("") {
        "div" => 5.0,
        "pre" | "td" | "blockquote" => 3.0,
        "address" | "ol" | "ul" | "dl" | "dd" | "dt" | "li" | "form" => -3.0,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "th" => -5.0,
        _ => 0.0,
    };
    tag_score + class_weight(doc, id)
}

fn class_weight(doc: &Document, id: NodeId) -> f64 {
    let mut weight = 0.0;
    for attr in ["class", "id"] {
        let Some(value) = doc.attr(id, attr) else {
            continue;
        };
        let value = value.to_lowercase();
        if value.is_empty() {
            continue;
        }
        if NEGATIVE_HINTS.iter().any(|hint| value.contains(hint)) {
            weight -= 25.0;
        }
        if POSITIVE_HINTS.iter().any(|hint| value.contains(hint)) {
            weight += 25.0;
        }
    }
    weight
}

/// Share of an element's text that sits inside links
fn link_density(doc: &Document, id: NodeId) -> f64 {
    let total = normalize_space(&doc.text_content(id)).chars().count();
    if total == 0 {
        return 0.0;
    }
    let linked: usize = doc
        .descendants(id)
        .into_iter()
        .filter(|&child| doc.is_element(child, "a"))
        .map(|link| normalize_space(&doc.text_content(link)).chars().count())
        .sum();
    (linked as f64 / total as f64).min(1.0)
}

/// The top candidate plus siblings that look like part of the same content
fn collect_with_siblings(
    doc: &Document,
    scores: &BTreeMap<NodeId, f64>,
    top: NodeId,
    top_score: f64,
) -> Vec<NodeId> {
    let parent = match doc.parent(top) {
        Some(parent) if parent != Document::ROOT => parent,
        _ => return vec![top],
    };

    let threshold = (top_score * 0.2).max(10.0);
    doc.children(parent)
        .iter()
        .copied()
        .filter(|&sibling| {
            if sibling == top {
                return true;
            }
            if doc.name(sibling).is_none() {
                return false;
            }
            if scores.get(&sibling).is_some_and(|&score| score >= threshold) {
                return true;
            }
            doc.is_element(sibling, "p") && is_related_paragraph(doc, sibling)
        })
        .collect()
}

fn is_related_paragraph(doc: &Document, id: NodeId) -> bool {
    let text = normalize_space(&doc.text_content(id));
    let len = text.chars().count();
    let density = link_density(doc, id);
    if len > 80 {
        density < 0.25
    } else {
        len > 0 && density == 0.0 && (text.contains(". ") || text.ends_with('.'))
    }
}
