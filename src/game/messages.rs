//! # Message Log
//!
//! Player-facing messages, kept in order with the color they are drawn in.

use crate::{config, Color};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One line of the message log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub color: Color,
}

/// Bounded, ordered message log. The oldest entry goes first when full.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageLog {
    messages: VecDeque<Message>,
    capacity: usize,
}

impl MessageLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            messages: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Appends a message.
    pub fn add(&mut self, text: impl Into<String>, color: Color) {
        if self.messages.len() == self.capacity {
            self.messages.pop_front();
        }
        self.messages.push_back(Message {
            text: text.into(),
            color,
        });
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Messages from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    /// The newest message, if any.
    pub fn last(&self) -> Option<&Message> {
        self.messages.back()
    }

    /// The `count` newest messages, oldest first.
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &Message> {
        let skip = self.messages.len().saturating_sub(count);
        self.messages.iter().skip(skip)
    }

    /// Whether any message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.messages.iter().any(|m| m.text.contains(needle))
    }
}

/// Uppercases the first character, for names that open a sentence.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new(config::MESSAGE_LOG_CAPACITY)
    }
}
