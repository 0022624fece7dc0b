//! Append-only chat transcript.

use crate::models::{Message, Sender};
use chrono::Local;
use std::cell::Cell;

/// Ordered log of user and bot messages.
///
/// Entries can only be appended. The viewport follows the newest entry
/// after every append, even if the user had scrolled back.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    /// Rendered lines between the bottom of the viewport and the tail
    scroll_back: usize,
    /// Furthest scroll back that still moves the view, as of the last render
    max_scroll_back: Cell<usize>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn display_user_message(&mut self, text: impl Into<String>) {
        self.push(Sender::User, text.into(), None);
    }

    pub fn display_bot_message(&mut self, text: impl Into<String>, fragment: Option<String>) {
        self.push(Sender::Bot, text.into(), fragment);
    }

    fn push(&mut self, sender: Sender, text: String, fragment: Option<String>) {
        self.messages.push(Message {
            text,
            sender,
            fragment,
            sent_at: Local::now(),
        });
        self.scroll_to_bottom();
    }

    /// Pin the viewport to the newest entry.
    pub fn scroll_to_bottom(&mut self) {
        self.scroll_back = 0;
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_back = self
            .scroll_back
            .saturating_add(lines)
            .min(self.max_scroll_back.get());
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_back = self.scroll_back.saturating_sub(lines);
    }

    pub fn follows_tail(&self) -> bool {
        self.scroll_back == 0
    }

    /// First line to draw for a transcript of `total_lines` in a `viewport`.
    ///
    /// Also records how far back scrolling can go for the next `scroll_up`.
    pub fn first_visible_line(&self, total_lines: usize, viewport: usize) -> usize {
        let tail = tail_offset(total_lines, viewport);
        self.max_scroll_back.set(tail);
        tail.saturating_sub(self.scroll_back)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[cfg(test)]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// First line index to show so the last `viewport` lines stay visible.
pub fn tail_offset(total_lines: usize, viewport: usize) -> usize {
    total_lines.saturating_sub(viewport)
}
