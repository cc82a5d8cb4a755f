//! Adapter between `pulldown-cmark`'s event stream and a [`Renderer`].
//!
//! Every `Start` pushes a frame that collects rendered child output; the
//! matching `End` pops it, turns it into a [`Node`] and appends the rendered
//! string to the parent frame. Leaf events render directly into the current
//! frame.

use crate::render::{Node, Renderer};
use pulldown_cmark::{CodeBlockKind, Event, LinkType, Options, Parser, Tag};
use tracing::debug;

pub(crate) fn parser_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

struct Frame<'e> {
    /// `None` for the document root.
    tag: Option<Tag<'e>>,
    buf: String,
    /// Rendered head row; only filled for tables.
    head: String,
}

impl<'e> Frame<'e> {
    fn new(tag: Option<Tag<'e>>) -> Self {
        Frame {
            tag,
            buf: String::new(),
            head: String::new(),
        }
    }
}

struct Walker<'r, 'e, R: ?Sized> {
    renderer: &'r R,
    verbose: bool,
    stack: Vec<Frame<'e>>,
    in_table_head: bool,
}

/// Parse `source` and render it with `renderer` in document order.
pub fn walk<R: Renderer + ?Sized>(source: &str, renderer: &R, verbose: bool) -> String {
    let mut walker = Walker {
        renderer,
        verbose,
        stack: vec![Frame::new(None)],
        in_table_head: false,
    };
    for event in Parser::new_ext(source, parser_options()) {
        walker.event(event);
    }
    walker.finish()
}

impl<'e, R: Renderer + ?Sized> Walker<'_, 'e, R> {
    fn emit(&self, node: Node<'_>) -> String {
        if self.verbose {
            debug!("{}: {:?}", node.kind(), node.payload());
        }
        node.render_with(self.renderer)
    }

    fn push(&mut self, s: &str) {
        if let Some(frame) = self.stack.last_mut() {
            frame.buf.push_str(s);
        }
    }

    fn emit_push(&mut self, node: Node<'_>) {
        let out = self.emit(node);
        self.push(&out);
    }

    fn in_code_block(&self) -> bool {
        matches!(
            self.stack.last().and_then(|f| f.tag.as_ref()),
            Some(Tag::CodeBlock(_))
        )
    }

    fn event(&mut self, event: Event<'e>) {
        match event {
            Event::Start(tag) => {
                if matches!(tag, Tag::TableHead) {
                    self.in_table_head = true;
                }
                self.stack.push(Frame::new(Some(tag)));
            }
            Event::End(_) => {
                if self.stack.len() > 1 {
                    if let Some(frame) = self.stack.pop() {
                        self.close(frame);
                    }
                }
            }
            Event::Text(text) => {
                if self.in_code_block() {
                    self.push(&text);
                } else {
                    self.emit_push(Node::Text { text: &text });
                }
            }
            Event::Code(text) => self.emit_push(Node::CodeSpan { text: &text }),
            // Block HTML arrives in pieces inside an HtmlBlock frame.
            Event::Html(html) => self.push(&html),
            Event::InlineHtml(html) => self.emit_push(Node::Html { html: &html }),
            Event::SoftBreak => self.emit_push(Node::Text { text: "\n" }),
            Event::HardBreak => self.emit_push(Node::LineBreak),
            Event::Rule => self.emit_push(Node::Rule),
            Event::TaskListMarker(checked) => {
                let mark = self.emit(Node::Checkbox { checked });
                self.push(&mark);
                self.push(" ");
            }
            Event::InlineMath(text) | Event::DisplayMath(text) | Event::FootnoteReference(text) => {
                self.push(&text)
            }
        }
    }

    fn close(&mut self, frame: Frame<'e>) {
        let Frame { tag, buf, head } = frame;
        let Some(tag) = tag else {
            return;
        };
        let out = match tag {
            Tag::Paragraph => self.emit(Node::Paragraph { text: &buf }),
            Tag::Heading { level, .. } => self.emit(Node::Heading {
                level: level as u8,
                text: &buf,
            }),
            Tag::BlockQuote(_) => self.emit(Node::Blockquote { text: &buf }),
            Tag::CodeBlock(kind) => {
                let lang = match &kind {
                    CodeBlockKind::Fenced(info) => info.split_whitespace().next(),
                    CodeBlockKind::Indented => None,
                };
                let code = buf.strip_suffix('\n').unwrap_or(&buf);
                self.emit(Node::CodeBlock { code, lang })
            }
            Tag::HtmlBlock => self.emit(Node::Html { html: &buf }),
            Tag::List(start) => self.emit(Node::List {
                body: &buf,
                ordered: start.is_some(),
            }),
            Tag::Item => self.emit(Node::ListItem { text: &buf }),
            Tag::Table(_) => self.emit(Node::Table {
                header: &head,
                body: &buf,
            }),
            Tag::TableHead => {
                self.in_table_head = false;
                let row = self.emit(Node::TableRow { content: &buf });
                if let Some(parent) = self.stack.last_mut() {
                    parent.head.push_str(&row);
                }
                return;
            }
            Tag::TableRow => self.emit(Node::TableRow { content: &buf }),
            Tag::TableCell => self.emit(Node::TableCell {
                content: &buf,
                header: self.in_table_head,
            }),
            Tag::Emphasis => self.emit(Node::Emphasis { text: &buf }),
            Tag::Strong => self.emit(Node::Strong { text: &buf }),
            Tag::Strikethrough => self.emit(Node::Strikethrough { text: &buf }),
            Tag::Link {
                link_type,
                dest_url,
                ..
            } => {
                let bare = buf.is_empty()
                    || (matches!(link_type, LinkType::Autolink | LinkType::Email)
                        && buf == *dest_url);
                let text = if bare { None } else { Some(buf.as_str()) };
                self.emit(Node::Link {
                    href: &dest_url,
                    text,
                })
            }
            // Alt text has no Jira equivalent.
            Tag::Image { dest_url, .. } => self.emit(Node::Image { href: &dest_url }),
            // Footnotes, definition lists, metadata, super/subscript.
            _ => buf,
        };
        self.push(&out);
    }

    fn finish(mut self) -> String {
        while self.stack.len() > 1 {
            if let Some(frame) = self.stack.pop() {
                self.close(frame);
            }
        }
        self.stack.pop().map(|f| f.buf).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::render::JiraRenderer;
    use std::io;
    use std::sync::{Arc, Mutex};

    fn jira(md: &str) -> String {
        let config = Config::default();
        walk(md, &JiraRenderer::new(&config), false)
    }

    #[test]
    fn test_paragraph_and_inline() {
        assert_eq!(jira("hello **big** _small_ ~~gone~~"), "hello *big* _small_ -gone-\n\n");
    }

    #[test]
    fn test_heading_levels() {
        assert_eq!(jira("# One"), "h1. One\n\n");
        assert_eq!(jira("###### Six"), "h6. Six\n\n");
    }

    #[test]
    fn test_soft_and_hard_breaks() {
        assert_eq!(jira("a\nb"), "a\nb\n\n");
        assert_eq!(jira("a  \nb"), "a\nb\n\n");
    }

    #[test]
    fn test_link_variants() {
        assert_eq!(jira("[site](http://x.io)"), "[site|http://x.io]\n\n");
        assert_eq!(jira("<http://x.io>"), "[http://x.io]\n\n");
        assert_eq!(jira("[](http://x.io)"), "[http://x.io]\n\n");
    }

    #[test]
    fn test_image_drops_alt() {
        assert_eq!(jira("![alt text](pic.png)"), "!pic.png!\n\n");
    }

    #[test]
    fn test_tight_list() {
        assert_eq!(jira("- a\n- b"), "\n* a\n* b\n\n");
        assert_eq!(jira("1. a\n2. b"), "\n# a\n# b\n\n");
    }

    #[test]
    fn test_nested_list() {
        assert_eq!(jira("- a\n  - b\n- c"), "\n* a\n** b\n* c\n\n");
    }

    #[test]
    fn test_task_list() {
        assert_eq!(jira("- [x] done\n- [ ] todo"), "\n* [x] done\n* [-] todo\n\n");
    }

    #[test]
    fn test_table() {
        let md = "| A | B |\n| --- | --- |\n| 1 | 2 |";
        assert_eq!(jira(md), "||A||B\n|1|2\n\n");
    }

    #[test]
    fn test_blockquote() {
        assert_eq!(jira("> quoted"), "{quote}quoted\n\n{quote}");
    }

    #[test]
    fn test_rule() {
        assert_eq!(jira("a\n\n---\n\nb"), "a\n\n\n----\n\nb\n\n");
    }

    #[test]
    fn test_code_block_is_raw() {
        let out = jira("```js\nconst a = **b**;\n```");
        assert_eq!(
            out,
            "{code:language=javascript|borderStyle=solid|theme=RDark|linenumbers=true|collapse=false}\nconst a = **b**;\n{code}\n\n"
        );
    }

    #[test]
    fn test_info_string_first_word() {
        let out = jira("```python title=x\npass\n```");
        assert!(out.starts_with("{code:language=python|"));
    }

    #[test]
    fn test_indented_code_block() {
        let out = jira("    indented\n");
        assert!(out.starts_with("{code:language=|"));
        assert!(out.contains("\nindented\n{code}"));
    }

    #[test]
    fn test_html_passthrough() {
        assert_eq!(jira("<div>raw</div>\n"), "<div>raw</div>\n");
        assert_eq!(jira("a <b>c</b>"), "a <b>c</b>\n\n");
    }

    #[test]
    fn test_inline_code() {
        assert_eq!(jira("use `x*y`"), "use {{x*y}}\n\n");
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn walk_logged(md: &str, verbose: bool) -> (String, String) {
        let logs = Captured::default();
        let sink = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish();
        let config = Config::default();
        let out = tracing::subscriber::with_default(subscriber, || {
            walk(md, &JiraRenderer::new(&config), verbose)
        });
        let logged = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        (out, logged)
    }

    #[test]
    fn test_verbose_does_not_change_output() {
        let md = "# T\n\n- a\n- b\n\n```sh\n# c\n```";
        let (quiet, quiet_log) = walk_logged(md, false);
        let (loud, loud_log) = walk_logged(md, true);
        assert_eq!(quiet, loud);
        assert!(quiet_log.is_empty());
        assert!(loud_log.contains("heading: [\"T\"]"));
        assert!(loud_log.contains("code: [\"# c\", \"sh\"]"));
    }

    #[test]
    fn test_verbose_table_logs_header() {
        let (_, logged) = walk_logged("| A |\n| --- |\n| 1 |", true);
        assert!(logged.contains("table: [\"||A\\n\", \"|1\\n\"]"));
    }
}
