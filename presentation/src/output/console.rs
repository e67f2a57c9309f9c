//! Console output formatter for conversations

use crate::output::markdown::MarkdownRenderer;
use colored::Colorize;
use cnxh_domain::{Conversation, Message, Sender};

/// Formats conversation messages for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Banner shown when the chat starts
    pub fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    /// Label printed before a message body
    pub fn sender_label(sender: Sender) -> String {
        match sender {
            Sender::User => "Bạn:".green().bold().to_string(),
            Sender::Assistant => "Trợ lý:".cyan().bold().to_string(),
        }
    }

    /// Body of an answer, rendered as Markdown when enabled
    pub fn answer(text: &str, render_markdown: bool) -> String {
        if render_markdown {
            MarkdownRenderer::render(text)
        } else {
            text.trim_end().to_string()
        }
    }

    /// A single message with its label
    pub fn message(message: &Message, render_markdown: bool) -> String {
        let body = match message.sender() {
            Sender::User => message.text().to_string(),
            Sender::Assistant => Self::answer(message.text(), render_markdown),
        };
        format!(
            "{}\n{}\n",
            Self::sender_label(message.sender()),
            Self::indent(&body, "  ")
        )
    }

    /// The whole conversation log
    pub fn history(conversation: &Conversation, render_markdown: bool) -> String {
        if conversation.is_empty() {
            return format!("{}\n", "(Chưa có tin nhắn nào)".dimmed());
        }

        let mut output = Self::section_header(&format!(
            "Lịch sử hội thoại ({} tin nhắn)",
            conversation.len()
        ));
        for message in conversation.messages() {
            output.push('\n');
            output.push_str(&Self::message(message, render_markdown));
        }
        output.push_str(&Self::footer());
        output
    }

    /// A user-facing error line
    pub fn error(message: &str) -> String {
        format!("{} {}", "x".red().bold(), message.red())
    }

    /// A dimmed status line
    pub fn notice(message: &str) -> String {
        message.dimmed().to_string()
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("{}\n", "-".repeat(40))
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| {
                if line.is_empty() {
                    String::new()
                } else {
                    format!("{}{}", prefix, line)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_indent_skips_blank_lines() {
        assert_eq!(ConsoleFormatter::indent("a\n\nb", "  "), "  a\n\n  b");
    }

    #[test]
    fn test_message_labels_sender() {
        plain();
        let mut conversation = Conversation::new();
        let id = conversation.append_user("Xin chào");
        let text = ConsoleFormatter::message(conversation.get(id).unwrap(), true);
        assert_eq!(text, "Bạn:\n  Xin chào\n");
    }

    #[test]
    fn test_assistant_message_renders_markdown() {
        plain();
        let conversation = Conversation::with_greeting("**Chào** bạn");
        let message = conversation.last().unwrap();

        assert_eq!(
            ConsoleFormatter::message(message, true),
            "Trợ lý:\n  Chào bạn\n"
        );
        assert_eq!(
            ConsoleFormatter::message(message, false),
            "Trợ lý:\n  **Chào** bạn\n"
        );
    }

    #[test]
    fn test_history_lists_messages_in_order() {
        plain();
        let mut conversation = Conversation::with_greeting("Chào");
        conversation.append_user("Hỏi");

        let text = ConsoleFormatter::history(&conversation, false);
        assert!(text.contains("2 tin nhắn"));
        let greeting = text.find("Chào").unwrap();
        let question = text.find("Hỏi").unwrap();
        assert!(greeting < question);
    }

    #[test]
    fn test_empty_history() {
        plain();
        let text = ConsoleFormatter::history(&Conversation::new(), true);
        assert!(text.contains("Chưa có tin nhắn"));
    }

    #[test]
    fn test_error_contains_message() {
        plain();
        assert_eq!(ConsoleFormatter::error("lỗi"), "x lỗi");
    }
}
