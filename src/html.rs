//! Markdown to HTML for previews. Only code blocks differ from
//! `pulldown-cmark`'s stock writer: they are highlighted with `syntect` and
//! wrapped as `<pre><code class="hljs language-…">`.

use crate::walk::parser_options;
use pulldown_cmark::{html::push_html, CodeBlockKind, CowStr, Event, Parser, Tag, TagEnd};
use std::sync::LazyLock;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;
use tracing::{debug, warn};

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

pub const MARKER_CLASS: &str = "hljs";
pub const FALLBACK_LANGUAGE: &str = "plaintext";

pub fn render(markdown: &str, verbose: bool) -> String {
    let mut out = String::new();
    push_html(
        &mut out,
        HighlightCode {
            inner: Parser::new_ext(markdown, parser_options()),
            verbose,
        },
    );
    out
}

/// Resolve a fence tag to a syntax and the class label to emit.
pub fn resolve_language(tag: Option<&str>) -> (&'static SyntaxReference, &str) {
    match tag.and_then(|t| SYNTAX_SET.find_syntax_by_token(t).map(|s| (s, t))) {
        Some(found) => found,
        None => (SYNTAX_SET.find_syntax_plain_text(), FALLBACK_LANGUAGE),
    }
}

fn highlight(code: &str, syntax: &SyntaxReference) -> Result<String, syntect::Error> {
    let mut generator =
        ClassedHTMLGenerator::new_with_class_style(syntax, &SYNTAX_SET, ClassStyle::Spaced);
    for line in LinesWithEndings::from(code) {
        generator.parse_html_for_line_which_includes_newline(line)?;
    }
    Ok(generator.finalize())
}

pub fn code_block(code: &str, tag: Option<&str>) -> String {
    let (syntax, label) = resolve_language(tag);
    let body = highlight(code, syntax).unwrap_or_else(|e| {
        warn!("highlighting {} failed: {}", label, e);
        html_escape::encode_text(code).into_owned()
    });
    format!(
        "<pre><code class=\"{} language-{}\">{}</code></pre>\n",
        MARKER_CLASS,
        html_escape::encode_double_quoted_attribute(label),
        body
    )
}

/// Replaces each code block's events with one pre-rendered HTML event.
struct HighlightCode<I> {
    inner: I,
    verbose: bool,
}

impl<'a, I: Iterator<Item = Event<'a>>> Iterator for HighlightCode<I> {
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Event<'a>> {
        match self.inner.next()? {
            Event::Start(Tag::CodeBlock(kind)) => {
                let tag = match &kind {
                    CodeBlockKind::Fenced(info) => info.split_whitespace().next().map(str::to_string),
                    CodeBlockKind::Indented => None,
                };
                let mut code = String::new();
                for event in self.inner.by_ref() {
                    match event {
                        Event::Text(text) => code.push_str(&text),
                        Event::End(TagEnd::CodeBlock) => break,
                        _ => {}
                    }
                }
                if self.verbose {
                    debug!("code: {:?} {:?}", code, tag);
                }
                Some(Event::Html(CowStr::from(code_block(&code, tag.as_deref()))))
            }
            other => Some(other),
        }
    }
}
