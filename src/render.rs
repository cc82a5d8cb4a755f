//! Per-node-kind rendering.
//!
//! [`Node`] is the closed set of Markdown constructs the parser adapter can
//! report. A [`Renderer`] supplies one handler per kind; [`Node::render_with`]
//! dispatches exhaustively so a new kind cannot be forgotten.

use crate::config::Config;
use crate::languages::jira_language;
use regex::Regex;
use std::sync::LazyLock;

/// Adjacent `* *` bullets left by nesting one unordered list inside another.
static RE_NESTED_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\*+) \* ").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node<'a> {
    Paragraph { text: &'a str },
    Html { html: &'a str },
    Heading { level: u8, text: &'a str },
    Strong { text: &'a str },
    Emphasis { text: &'a str },
    Strikethrough { text: &'a str },
    CodeSpan { text: &'a str },
    Blockquote { text: &'a str },
    LineBreak,
    Rule,
    Link { href: &'a str, text: Option<&'a str> },
    List { body: &'a str, ordered: bool },
    ListItem { text: &'a str },
    Image { href: &'a str },
    Table { header: &'a str, body: &'a str },
    TableRow { content: &'a str },
    TableCell { content: &'a str, header: bool },
    CodeBlock { code: &'a str, lang: Option<&'a str> },
    Text { text: &'a str },
    Checkbox { checked: bool },
}

impl<'a> Node<'a> {
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Paragraph { .. } => "paragraph",
            Node::Html { .. } => "html",
            Node::Heading { .. } => "heading",
            Node::Strong { .. } => "strong",
            Node::Emphasis { .. } => "em",
            Node::Strikethrough { .. } => "del",
            Node::CodeSpan { .. } => "codespan",
            Node::Blockquote { .. } => "blockquote",
            Node::LineBreak => "br",
            Node::Rule => "hr",
            Node::Link { .. } => "link",
            Node::List { .. } => "list",
            Node::ListItem { .. } => "listitem",
            Node::Image { .. } => "image",
            Node::Table { .. } => "table",
            Node::TableRow { .. } => "tablerow",
            Node::TableCell { .. } => "tablecell",
            Node::CodeBlock { .. } => "code",
            Node::Text { .. } => "text",
            Node::Checkbox { .. } => "checkbox",
        }
    }

    /// Every text part the handler receives, for tracing.
    pub fn payload(&self) -> Vec<&'a str> {
        match *self {
            Node::Paragraph { text }
            | Node::Heading { text, .. }
            | Node::Strong { text }
            | Node::Emphasis { text }
            | Node::Strikethrough { text }
            | Node::CodeSpan { text }
            | Node::Blockquote { text }
            | Node::ListItem { text }
            | Node::Text { text } => vec![text],
            Node::Html { html } => vec![html],
            Node::Link { href, text } => std::iter::once(href).chain(text).collect(),
            Node::Image { href } => vec![href],
            Node::List { body, .. } => vec![body],
            Node::Table { header, body } => vec![header, body],
            Node::TableRow { content } | Node::TableCell { content, .. } => vec![content],
            Node::CodeBlock { code, lang } => std::iter::once(code).chain(lang).collect(),
            Node::LineBreak | Node::Rule | Node::Checkbox { .. } => Vec::new(),
        }
    }

    pub fn render_with<R: Renderer + ?Sized>(&self, r: &R) -> String {
        match *self {
            Node::Paragraph { text } => r.paragraph(text),
            Node::Html { html } => r.html(html),
            Node::Heading { level, text } => r.heading(level, text),
            Node::Strong { text } => r.strong(text),
            Node::Emphasis { text } => r.emphasis(text),
            Node::Strikethrough { text } => r.strikethrough(text),
            Node::CodeSpan { text } => r.codespan(text),
            Node::Blockquote { text } => r.blockquote(text),
            Node::LineBreak => r.line_break(),
            Node::Rule => r.rule(),
            Node::Link { href, text } => r.link(href, text),
            Node::List { body, ordered } => r.list(body, ordered),
            Node::ListItem { text } => r.list_item(text),
            Node::Image { href } => r.image(href),
            Node::Table { header, body } => r.table(header, body),
            Node::TableRow { content } => r.table_row(content),
            Node::TableCell { content, header } => r.table_cell(content, header),
            Node::CodeBlock { code, lang } => r.code_block(code, lang),
            Node::Text { text } => r.text(text),
            Node::Checkbox { checked } => r.checkbox(checked),
        }
    }
}

/// One handler per [`Node`] kind. Handlers receive already-rendered child
/// output and must be pure.
pub trait Renderer {
    fn paragraph(&self, text: &str) -> String;
    fn html(&self, html: &str) -> String;
    fn heading(&self, level: u8, text: &str) -> String;
    fn strong(&self, text: &str) -> String;
    fn emphasis(&self, text: &str) -> String;
    fn strikethrough(&self, text: &str) -> String;
    fn codespan(&self, text: &str) -> String;
    fn blockquote(&self, text: &str) -> String;
    fn line_break(&self) -> String;
    fn rule(&self) -> String;
    fn link(&self, href: &str, text: Option<&str>) -> String;
    fn list(&self, body: &str, ordered: bool) -> String;
    fn list_item(&self, text: &str) -> String;
    fn image(&self, href: &str) -> String;
    fn table(&self, header: &str, body: &str) -> String;
    fn table_row(&self, content: &str) -> String;
    fn table_cell(&self, content: &str, header: bool) -> String;
    fn code_block(&self, code: &str, lang: Option<&str>) -> String;
    fn text(&self, text: &str) -> String;
    fn checkbox(&self, checked: bool) -> String;
}

/// Jira wiki markup.
#[derive(Debug, Clone)]
pub struct JiraRenderer<'c> {
    config: &'c Config,
}

impl<'c> JiraRenderer<'c> {
    pub fn new(config: &'c Config) -> Self {
        JiraRenderer { config }
    }
}

fn collapse_nested_markers(line: &str) -> String {
    let mut line = line.to_string();
    while let Some(caps) = RE_NESTED_BULLET.captures(&line) {
        let merged = format!("{}* ", &caps[1]);
        let end = caps[0].len();
        line.replace_range(..end, &merged);
    }
    line
}

impl Renderer for JiraRenderer<'_> {
    fn paragraph(&self, text: &str) -> String {
        format!("{}\n\n", text)
    }

    fn html(&self, html: &str) -> String {
        html.to_string()
    }

    fn heading(&self, level: u8, text: &str) -> String {
        format!("h{}. {}\n\n", level.clamp(1, 6), text)
    }

    fn strong(&self, text: &str) -> String {
        format!("*{}*", text)
    }

    fn emphasis(&self, text: &str) -> String {
        format!("_{}_", text)
    }

    fn strikethrough(&self, text: &str) -> String {
        format!("-{}-", text)
    }

    fn codespan(&self, text: &str) -> String {
        format!("{{{{{}}}}}", text)
    }

    fn blockquote(&self, text: &str) -> String {
        format!("{{quote}}{}{{quote}}", text)
    }

    fn line_break(&self) -> String {
        "\n".to_string()
    }

    fn rule(&self) -> String {
        "\n----\n\n".to_string()
    }

    fn link(&self, href: &str, text: Option<&str>) -> String {
        match text {
            Some(text) => format!("[{}|{}]", text, href),
            None => format!("[{}]", href),
        }
    }

    fn list(&self, body: &str, ordered: bool) -> String {
        let marker = if ordered { '#' } else { '*' };
        let lines: Vec<String> = body
            .trim()
            .split('\n')
            .filter(|l| !l.is_empty())
            .map(|l| collapse_nested_markers(&format!("{} {}", marker, l)))
            .collect();
        format!("\n{}\n\n", lines.join("\n"))
    }

    fn list_item(&self, text: &str) -> String {
        format!("{}\n", text)
    }

    fn image(&self, href: &str) -> String {
        format!("!{}!", href)
    }

    fn table(&self, header: &str, body: &str) -> String {
        format!("{}{}\n", header, body)
    }

    fn table_row(&self, content: &str) -> String {
        format!("{}\n", content)
    }

    fn table_cell(&self, content: &str, header: bool) -> String {
        let sep = if header { "||" } else { "|" };
        format!("{}{}", sep, content)
    }

    fn code_block(&self, code: &str, lang: Option<&str>) -> String {
        let line_count = code.split('\n').count();
        format!(
            "{{code:language={}|borderStyle={}|theme={}|linenumbers={}|collapse={}}}\n{}\n{{code}}\n\n",
            jira_language(lang),
            self.config.border_style,
            self.config.theme,
            self.config.line_numbers,
            line_count > self.config.collapse_threshold,
            code
        )
    }

    fn text(&self, text: &str) -> String {
        text.to_string()
    }

    fn checkbox(&self, checked: bool) -> String {
        let mark = if checked { "[x]" } else { "[-]" };
        mark.to_string()
    }
}
