use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use std::sync::LazyLock;

/// Markup removed before the document is parsed
static NOISE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?is)<head\b[^>]*>.*?</head\s*>",
        r"(?is)<script\b[^>]*>.*?</script\s*>",
        r"(?is)<style\b[^>]*>.*?</style\s*>",
        r"(?is)<noscript\b[^>]*>.*?</noscript\s*>",
        // Anchors pointing straight at an image file
        r#"(?is)<a\b[^>]*href\s*=\s*["'][^"']*\.(?:jpg|jpeg|png|gif|bmp|svg|webp)(?:\?[^"']*)?["'][^>]*>.*?</a\s*>"#,
        r"(?is)<img\b[^>]*>",
        r#"data:image/[^;"']+;base64,[^"'\s)]*"#,
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

static BODY_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").unwrap());

/// Elements whose subtree never carries readable content
const SKIPPED: &[&str] = &[
    "head", "script", "style", "noscript", "img", "svg", "picture", "video", "audio", "iframe",
    "template", "canvas", "object",
];

/// Elements rendered as their own paragraph
const PARAGRAPHS: &[&str] = &[
    "p", "ul", "ol", "table", "blockquote", "pre", "section", "article", "header", "footer",
    "nav", "main", "aside",
];

/// Elements rendered on their own line
const LINES: &[&str] = &["div", "tr", "dt", "dd", "form", "figure", "figcaption", "address"];

/// Removes non-content markup and renders the rest as link-annotated plain text.
///
/// Links are kept as `[text](href)`. Pure and infallible: malformed markup is
/// rendered as far as the parser recovers it.
pub fn normalize(markup: &str) -> String {
    let cleaned = strip_noise(markup);
    let doc = Html::parse_document(&cleaned);

    let mut renderer = Renderer::default();
    match doc.select(&BODY_SELECTOR).next() {
        Some(body) => renderer.children(body),
        None => renderer.children(doc.root_element()),
    }

    tidy(&renderer.out)
}

/// Apply the noise patterns to raw markup
pub fn strip_noise(markup: &str) -> String {
    NOISE_PATTERNS
        .iter()
        .fold(markup.to_string(), |acc, regex| regex.replace_all(&acc, "").into_owned())
}

#[derive(Default)]
struct Renderer {
    out: String,
}

impl Renderer {
    fn children(&mut self, element: ElementRef<'_>) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => self.text(text),
                Node::Element(_) => {
                    if let Some(child_element) = ElementRef::wrap(child) {
                        self.element(child_element);
                    }
                }
                _ => {}
            }
        }
    }

    fn element(&mut self, element: ElementRef<'_>) {
        let name = element.value().name();
        if SKIPPED.contains(&name) {
            return;
        }

        match name {
            "br" => self.break_lines(1),
            "hr" => self.break_lines(2),
            "a" => self.anchor(element),
            "li" => {
                self.break_lines(1);
                self.out.push_str("- ");
                self.children(element);
                self.break_lines(1);
            }
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = name[1..].parse::<usize>().unwrap_or(1);
                self.break_lines(2);
                self.out.push_str(&"#".repeat(level));
                self.out.push(' ');
                self.children(element);
                self.break_lines(2);
            }
            _ if PARAGRAPHS.contains(&name) => {
                self.break_lines(2);
                self.children(element);
                self.break_lines(2);
            }
            _ if LINES.contains(&name) => {
                self.break_lines(1);
                self.children(element);
                self.break_lines(1);
            }
            _ => self.children(element),
        }
    }

    fn anchor(&mut self, element: ElementRef<'_>) {
        let mut inner = Renderer::default();
        inner.children(element);
        let label = inner
            .out
            .replace(['[', ']'], "")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        let href = element.value().attr("href").map(str::trim).unwrap_or_default();
        if href.is_empty() || href.to_ascii_lowercase().starts_with("javascript:") {
            self.text(&label);
            return;
        }

        let target = escape_href(href);
        let label = if label.is_empty() { target.clone() } else { label };
        self.space();
        self.out.push_str(&format!("[{label}]({target})"));
    }

    fn text(&mut self, text: &str) {
        let words = text.split_whitespace().collect::<Vec<_>>();
        if words.is_empty() {
            if !text.is_empty() {
                self.space();
            }
            return;
        }
        if text.starts_with(char::is_whitespace) {
            self.space();
        }
        self.out.push_str(&words.join(" "));
        if text.ends_with(char::is_whitespace) {
            self.space();
        }
    }

    fn space(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with([' ', '\n']) {
            self.out.push(' ');
        }
    }

    fn break_lines(&mut self, count: usize) {
        let trimmed_len = self.out.trim_end_matches(' ').len();
        self.out.truncate(trimmed_len);
        if self.out.is_empty() {
            return;
        }
        let existing = self.out.len() - self.out.trim_end_matches('\n').len();
        for _ in existing..count {
            self.out.push('\n');
        }
    }
}

/// Keep hrefs recoverable from the `[text](href)` form
fn escape_href(href: &str) -> String {
    href.chars()
        .filter(|c| *c != '\n' && *c != '\r')
        .map(|c| match c {
            ' ' => "%20".to_string(),
            '(' => "%28".to_string(),
            ')' => "%29".to_string(),
            other => other.to_string(),
        })
        .collect()
}

/// Trim lines and collapse runs of blank lines
fn tidy(rendered: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    for line in rendered.lines().map(str::trim) {
        if line.is_empty() && lines.last().is_none_or(|last| last.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|last| last.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}
