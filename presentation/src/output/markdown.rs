//! Markdown to terminal text
//!
//! Answers come back as Markdown. [`MarkdownRenderer`] walks the
//! `pulldown-cmark` event stream and turns it into plain lines styled with
//! `colored`: headings, emphasis, lists, code, quotes, tables and links.
//! With colors disabled the result is readable plain text.

use colored::Colorize;
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

const RULE_WIDTH: usize = 40;

/// Renders Markdown for the terminal
pub struct MarkdownRenderer;

impl MarkdownRenderer {
    /// Render `markdown` into terminal text (no trailing newline)
    pub fn render(markdown: &str) -> String {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS;
        let mut writer = Writer::default();
        for event in Parser::new_ext(markdown, options) {
            writer.event(event);
        }
        writer.finish()
    }
}

#[derive(Default)]
struct Table {
    rows: Vec<Vec<String>>,
    row: Vec<String>,
    cell: String,
    has_header: bool,
}

impl Table {
    fn render(&self) -> Vec<String> {
        let columns = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut widths = vec![0; columns];
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        for (index, row) in self.rows.iter().enumerate() {
            let cells: Vec<String> = widths
                .iter()
                .enumerate()
                .map(|(i, width)| {
                    let cell = row.get(i).map(String::as_str).unwrap_or("");
                    let padding = width - cell.chars().count();
                    format!("{}{}", cell, " ".repeat(padding))
                })
                .collect();
            let line = cells.join(" │ ");

            if index == 0 && self.has_header {
                lines.push(line.bold().to_string());
                let separator: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
                lines.push(separator.join("─┼─"));
            } else {
                lines.push(line);
            }
        }
        lines
    }
}

/// Rendering state while walking the event stream
#[derive(Default)]
struct Writer {
    out: String,
    line: String,
    strong: usize,
    emphasis: usize,
    strikethrough: usize,
    heading: Option<HeadingLevel>,
    quote_depth: usize,
    /// One entry per open list: the next number for ordered lists
    lists: Vec<Option<u64>>,
    in_code_block: bool,
    links: Vec<String>,
    table: Option<Table>,
}

impl Writer {
    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                if let Some(table) = self.table.as_mut() {
                    table.cell.push_str(&code);
                } else {
                    self.line.push_str(&code.yellow().to_string());
                }
            }
            Event::SoftBreak => self.text(" "),
            Event::HardBreak => self.flush_line(),
            Event::Rule => {
                self.flush_line();
                self.line.push_str(&"─".repeat(RULE_WIDTH).dimmed().to_string());
                self.flush_line();
                self.blank_line();
            }
            Event::TaskListMarker(checked) => {
                self.line.push_str(if checked { "[x] " } else { "[ ] " });
            }
            Event::Html(html) | Event::InlineHtml(html) => self.text(&html),
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush_line();
                self.heading = Some(level);
            }
            Tag::BlockQuote(_) => {
                self.flush_line();
                self.quote_depth += 1;
            }
            Tag::List(start) => {
                self.flush_line();
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush_line();
                let depth = self.lists.len().saturating_sub(1);
                let marker = match self.lists.last_mut() {
                    Some(Some(number)) => {
                        let marker = format!("{}. ", number);
                        *number += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.line.push_str(&"  ".repeat(depth));
                self.line.push_str(&marker);
            }
            Tag::CodeBlock(_) => {
                self.flush_line();
                self.in_code_block = true;
            }
            Tag::Emphasis => self.emphasis += 1,
            Tag::Strong => self.strong += 1,
            Tag::Strikethrough => self.strikethrough += 1,
            Tag::Link { dest_url, .. } | Tag::Image { dest_url, .. } => {
                self.links.push(dest_url.to_string());
            }
            Tag::Table(_) => {
                self.flush_line();
                self.table = Some(Table::default());
            }
            Tag::TableHead | Tag::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    table.row.clear();
                }
            }
            Tag::TableCell => {
                if let Some(table) = self.table.as_mut() {
                    table.cell.clear();
                }
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.flush_line();
                if self.lists.is_empty() {
                    self.blank_line();
                }
            }
            TagEnd::Heading(_) => {
                self.flush_line();
                self.heading = None;
                self.blank_line();
            }
            TagEnd::BlockQuote(_) => {
                self.flush_line();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                if self.quote_depth == 0 {
                    self.blank_line();
                }
            }
            TagEnd::List(_) => {
                self.flush_line();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank_line();
                }
            }
            TagEnd::Item => self.flush_line(),
            TagEnd::CodeBlock => {
                self.flush_line();
                self.in_code_block = false;
                self.blank_line();
            }
            TagEnd::Emphasis => self.emphasis = self.emphasis.saturating_sub(1),
            TagEnd::Strong => self.strong = self.strong.saturating_sub(1),
            TagEnd::Strikethrough => {
                self.strikethrough = self.strikethrough.saturating_sub(1)
            }
            TagEnd::Link | TagEnd::Image => {
                if let Some(url) = self.links.pop()
                    && !url.is_empty()
                    && !self.line.ends_with(url.as_str())
                {
                    self.line
                        .push_str(&format!(" ({})", url).dimmed().to_string());
                }
            }
            TagEnd::TableCell => {
                if let Some(table) = self.table.as_mut() {
                    let cell = std::mem::take(&mut table.cell);
                    table.row.push(cell.trim().to_string());
                }
            }
            TagEnd::TableHead => {
                if let Some(table) = self.table.as_mut() {
                    let row = std::mem::take(&mut table.row);
                    table.rows.push(row);
                    table.has_header = true;
                }
            }
            TagEnd::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    let row = std::mem::take(&mut table.row);
                    table.rows.push(row);
                }
            }
            TagEnd::Table => {
                if let Some(table) = self.table.take() {
                    for line in table.render() {
                        self.line = line;
                        self.flush_line();
                    }
                }
                self.blank_line();
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(table) = self.table.as_mut() {
            table.cell.push_str(text);
            return;
        }

        if self.in_code_block {
            for line in text.lines() {
                self.line.push_str("    ");
                self.line.push_str(&line.yellow().to_string());
                self.flush_line();
            }
            return;
        }

        let styled = self.style(text);
        self.line.push_str(&styled);
    }

    fn style(&self, text: &str) -> String {
        let mut styled = text.normal();
        if let Some(level) = self.heading {
            styled = styled.bold().cyan();
            if level == HeadingLevel::H1 {
                styled = styled.underline();
            }
        }
        if self.strong > 0 {
            styled = styled.bold();
        }
        if self.emphasis > 0 {
            styled = styled.italic();
        }
        if self.strikethrough > 0 {
            styled = styled.strikethrough();
        }
        if self.quote_depth > 0 {
            styled = styled.dimmed();
        }
        styled.to_string()
    }

    fn flush_line(&mut self) {
        if self.line.is_empty() {
            return;
        }
        for _ in 0..self.quote_depth {
            self.out.push_str(&"│ ".dimmed().to_string());
        }
        self.out.push_str(&self.line);
        self.out.push('\n');
        self.line.clear();
    }

    fn blank_line(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }

    fn finish(mut self) -> String {
        self.flush_line();
        self.out.trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(markdown: &str) -> String {
        colored::control::set_override(false);
        MarkdownRenderer::render(markdown)
    }

    #[test]
    fn test_plain_paragraphs() {
        let text = render("Đoạn một\ntiếp tục.\n\nĐoạn hai.");
        assert_eq!(text, "Đoạn một tiếp tục.\n\nĐoạn hai.");
    }

    #[test]
    fn test_heading_and_emphasis_lose_markup() {
        let text = render("## Khái niệm\n\nMột **giai cấp** và *sứ mệnh* ~~cũ~~.");
        assert_eq!(text, "Khái niệm\n\nMột giai cấp và sứ mệnh cũ.");
    }

    #[test]
    fn test_lists() {
        let text = render("- một\n- hai\n  1. a\n  2. b\n\n3. ba\n4. bốn");
        assert_eq!(
            text,
            "• một\n• hai\n  1. a\n  2. b\n\n3. ba\n4. bốn"
        );
    }

    #[test]
    fn test_task_list() {
        let text = render("- [x] xong\n- [ ] chưa");
        assert_eq!(text, "• [x] xong\n• [ ] chưa");
    }

    #[test]
    fn test_code_block_is_indented() {
        let text = render("Ví dụ:\n\n```rust\nfn main() {}\nlet x = 1;\n```\n\nHết.");
        assert_eq!(text, "Ví dụ:\n\n    fn main() {}\n    let x = 1;\n\nHết.");
    }

    #[test]
    fn test_inline_code() {
        assert_eq!(render("Gọi `send()` trước."), "Gọi send() trước.");
    }

    #[test]
    fn test_block_quote_is_prefixed() {
        let text = render("> Vô sản tất cả các nước\n> đoàn kết lại!\n\nSau.");
        assert_eq!(text, "│ Vô sản tất cả các nước đoàn kết lại!\n\nSau.");
    }

    #[test]
    fn test_link_shows_url() {
        let text = render("Xem [giáo trình](https://example.com/gt).");
        assert_eq!(text, "Xem giáo trình (https://example.com/gt).");
    }

    #[test]
    fn test_autolink_does_not_repeat_url() {
        let text = render("<https://example.com>");
        assert_eq!(text, "https://example.com");
    }

    #[test]
    fn test_table_is_aligned() {
        let text = render("| Giai cấp | Vai trò |\n|---|---|\n| Công nhân | Lãnh đạo |\n| Nông dân | Đồng minh |");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Giai cấp  │ Vai trò  ");
        assert_eq!(lines[1], "──────────┼──────────");
        assert_eq!(lines[2], "Công nhân │ Lãnh đạo ");
        assert_eq!(lines[3], "Nông dân  │ Đồng minh");
    }

    #[test]
    fn test_rule() {
        let text = render("trên\n\n---\n\ndưới");
        assert_eq!(text, format!("trên\n\n{}\n\ndưới", "─".repeat(RULE_WIDTH)));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(render(""), "");
    }
}
