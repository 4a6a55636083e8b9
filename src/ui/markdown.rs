//! Markdown to ratatui lines
//!
//! Assistant replies are parsed with pulldown-cmark and flattened into styled
//! [`Line`]s. Rendering never fails; when nothing renders the raw text is
//! returned line by line.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::ui::theme::Theme;

const CODE_INDENT: &str = "  ";
const QUOTE_PREFIX: &str = "│ ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Style fenced and inline code and label fenced blocks with their language.
    pub code: bool,
    /// Append the target URL after link text.
    pub show_links: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            code: true,
            show_links: true,
        }
    }
}

/// Turns raw text into terminal lines. Implementations must be pure.
pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, text: &str, options: RenderOptions) -> Vec<Line<'static>>;
}

/// [`MarkdownRenderer`] backed by [`render_markdown`].
#[derive(Debug, Clone, Default)]
pub struct TerminalMarkdown {
    theme: Theme,
}

impl TerminalMarkdown {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }
}

impl MarkdownRenderer for TerminalMarkdown {
    fn render(&self, text: &str, options: RenderOptions) -> Vec<Line<'static>> {
        render_markdown(text, options, &self.theme)
    }
}

#[derive(Clone, Debug)]
enum ListKind {
    Unordered,
    Ordered(u64),
}

struct MarkdownWriter<'t> {
    theme: &'t Theme,
    options: RenderOptions,
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    style_stack: Vec<Style>,
    list_stack: Vec<ListKind>,
    quote_depth: usize,
    link_stack: Vec<String>,
    code_block: Option<Vec<String>>,
    code_language: Option<String>,
}

impl<'t> MarkdownWriter<'t> {
    fn new(theme: &'t Theme, options: RenderOptions) -> Self {
        Self {
            theme,
            options,
            lines: Vec::new(),
            spans: Vec::new(),
            style_stack: vec![theme.assistant_text_style],
            list_stack: Vec::new(),
            quote_depth: 0,
            link_stack: Vec::new(),
            code_block: None,
            code_language: None,
        }
    }

    fn current_style(&self) -> Style {
        self.style_stack.last().copied().unwrap_or_default()
    }

    fn push_modifier(&mut self, modifier: Modifier) {
        let style = self.current_style().add_modifier(modifier);
        self.style_stack.push(style);
    }

    fn pop_style(&mut self) {
        if self.style_stack.len() > 1 {
            self.style_stack.pop();
        }
    }

    fn line_prefix(&self) -> Vec<Span<'static>> {
        let mut prefix = Vec::new();
        for _ in 0..self.quote_depth {
            prefix.push(Span::styled(QUOTE_PREFIX, self.theme.md_quote_style));
        }
        prefix
    }

    fn flush_line(&mut self) {
        if self.spans.is_empty() {
            return;
        }
        let mut spans = self.line_prefix();
        spans.append(&mut self.spans);
        self.lines.push(Line::from(spans));
    }

    fn push_blank(&mut self) {
        self.flush_line();
        if self.lines.last().is_some_and(|l| !l.spans.is_empty()) {
            self.lines.push(Line::default());
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(block) = self.code_block.as_mut() {
            block.push_str_lines(text);
            return;
        }
        let style = self.current_style();
        self.spans.push(Span::styled(text.replace('\t', "    "), style));
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { .. } => {
                self.flush_line();
                self.style_stack.push(self.theme.md_heading_style);
            }
            Tag::BlockQuote(_) => {
                self.flush_line();
                self.quote_depth += 1;
                self.style_stack.push(self.theme.md_quote_style);
            }
            Tag::List(start) => {
                self.flush_line();
                self.list_stack.push(match start {
                    Some(n) => ListKind::Ordered(n),
                    None => ListKind::Unordered,
                });
            }
            Tag::Item => {
                self.flush_line();
                let depth = self.list_stack.len().saturating_sub(1);
                let marker = match self.list_stack.last_mut() {
                    Some(ListKind::Ordered(n)) => {
                        let marker = format!("{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.spans.push(Span::raw("  ".repeat(depth)));
                self.spans
                    .push(Span::styled(marker, self.theme.md_list_marker_style));
            }
            Tag::CodeBlock(kind) => {
                self.flush_line();
                self.code_language = match kind {
                    CodeBlockKind::Fenced(lang) => {
                        let lang = lang.split_whitespace().next().unwrap_or("").to_string();
                        (!lang.is_empty()).then_some(lang)
                    }
                    CodeBlockKind::Indented => None,
                };
                self.code_block = Some(Vec::new());
            }
            Tag::Emphasis => self.push_modifier(Modifier::ITALIC),
            Tag::Strong => self.push_modifier(Modifier::BOLD),
            Tag::Strikethrough => self.push_modifier(Modifier::CROSSED_OUT),
            Tag::Link { dest_url, .. } | Tag::Image { dest_url, .. } => {
                self.style_stack.push(self.theme.md_link_style);
                self.link_stack.push(dest_url.to_string());
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                if self.list_stack.is_empty() {
                    self.push_blank();
                } else {
                    self.flush_line();
                }
            }
            TagEnd::Heading(_) => {
                self.pop_style();
                self.push_blank();
            }
            TagEnd::BlockQuote(_) => {
                self.flush_line();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.pop_style();
            }
            TagEnd::List(_) => {
                self.flush_line();
                self.list_stack.pop();
                if self.list_stack.is_empty() {
                    self.push_blank();
                }
            }
            TagEnd::Item => self.flush_line(),
            TagEnd::CodeBlock => self.finish_code_block(),
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => self.pop_style(),
            TagEnd::Link | TagEnd::Image => {
                self.pop_style();
                if let Some(url) = self.link_stack.pop() {
                    if self.options.show_links && !url.is_empty() {
                        let style = self.current_style();
                        self.spans.push(Span::styled(format!(" ({url})"), style));
                    }
                }
            }
            _ => {}
        }
    }

    fn finish_code_block(&mut self) {
        let Some(block) = self.code_block.take() else {
            return;
        };
        let language = self.code_language.take();
        let (code_style, indent) = if self.options.code {
            (self.theme.md_code_style, CODE_INDENT)
        } else {
            (self.current_style(), "")
        };

        if self.options.code {
            if let Some(lang) = language {
                let mut spans = self.line_prefix();
                spans.push(Span::styled(lang, self.theme.md_code_label_style));
                self.lines.push(Line::from(spans));
            }
        }
        for code_line in block {
            let mut spans = self.line_prefix();
            spans.push(Span::styled(format!("{indent}{code_line}"), code_style));
            self.lines.push(Line::from(spans));
        }
        self.push_blank();
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.push_text(&text),
            Event::Code(code) => {
                let style = if self.options.code {
                    self.theme.md_code_style
                } else {
                    self.current_style()
                };
                self.spans.push(Span::styled(code.to_string(), style));
            }
            Event::SoftBreak | Event::HardBreak => self.flush_line(),
            Event::Rule => {
                self.flush_line();
                self.lines
                    .push(Line::from(Span::styled("─".repeat(24), self.theme.separator_style)));
                self.push_blank();
            }
            Event::TaskListMarker(checked) => {
                let marker = if checked { "[x] " } else { "[ ] " };
                self.spans
                    .push(Span::styled(marker, self.theme.md_list_marker_style));
            }
            Event::Html(html) | Event::InlineHtml(html) => self.push_text(&html),
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        if self.code_block.is_some() {
            self.finish_code_block();
        }
        self.flush_line();
        while self.lines.last().is_some_and(|l| l.spans.is_empty()) {
            self.lines.pop();
        }
        self.lines
    }
}

trait PushLines {
    fn push_str_lines(&mut self, text: &str);
}

impl PushLines for Vec<String> {
    /// Code block text arrives in chunks that end with a newline.
    fn push_str_lines(&mut self, text: &str) {
        for line in text.split_inclusive('\n') {
            self.push(line.trim_end_matches('\n').replace('\t', "    "));
        }
    }
}

/// Render `text` as markdown into styled lines.
pub fn render_markdown(text: &str, options: RenderOptions, theme: &Theme) -> Vec<Line<'static>> {
    let mut parser_options = Options::empty();
    parser_options.insert(Options::ENABLE_STRIKETHROUGH);
    parser_options.insert(Options::ENABLE_TASKLISTS);

    let mut writer = MarkdownWriter::new(theme, options);
    for event in Parser::new_ext(text, parser_options) {
        writer.handle(event);
    }
    let lines = writer.finish();

    if lines.is_empty() && !text.trim().is_empty() {
        return text
            .lines()
            .map(|l| Line::styled(l.to_string(), theme.assistant_text_style))
            .collect();
    }
    lines
}
