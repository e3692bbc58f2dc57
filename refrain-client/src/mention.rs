//! `@name` mentions while composing a comment.
//!
//! All offsets are byte offsets into the composed text. A cursor that does not
//! fall on a char boundary never has a mention in progress.

use crate::{api::Member, config::DEFAULT_SUGGESTION_LIMIT};

/// An `@query` token ending at the cursor
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ActiveMention {
    /// Offset of the `@`
    pub start: usize,
    /// Text typed after the `@`, possibly empty
    pub query: String,
}

/// Finds the mention being typed at `cursor`, if any.
///
/// The `@` must be at the start of the text or right after whitespace, and
/// everything between it and the cursor must be neither whitespace nor `@`.
pub fn detect(text: &str, cursor: usize) -> Option<ActiveMention> {
    let before = text.get(..cursor)?;
    let at = before.rfind(|c: char| c.is_whitespace() || c == '@')?;
    if !before[at..].starts_with('@') {
        return None;
    }
    if !before[..at].chars().next_back().map_or(true, char::is_whitespace) {
        return None;
    }
    Some(ActiveMention {
        start: at,
        query: String::from(&before[at + 1..]),
    })
}

/// Members whose display name contains `query`, ignoring case, in source order
pub fn suggest<'a>(members: &'a [Member], query: &str, limit: usize) -> Vec<&'a Member> {
    let query = query.to_lowercase();
    members
        .iter()
        .filter(|m| m.name.to_lowercase().contains(&query))
        .take(limit)
        .collect()
}

/// Keeps the pending mentions whose `@Name` is still in the submitted text
pub fn verify(pending: &[Member], text: &str) -> Vec<Member> {
    pending
        .iter()
        .filter(|m| {
            let kept = text.contains(&format!("@{}", m.name));
            if !kept {
                tracing::warn!(email = %m.email, "dropping mention removed before submit");
            }
            kept
        })
        .cloned()
        .collect()
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Key {
    Up,
    Down,
    Enter,
    Tab,
    Escape,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum KeyOutcome {
    /// Nothing to do with mentions: the input should handle the key as usual
    Ignored,
    Highlighted(usize),
    Inserted(Member),
    Dismissed,
}

/// State of one free-text input that supports mentions
#[derive(Clone, Debug)]
pub struct MentionComposer {
    members: Vec<Member>,
    limit: usize,
    text: String,
    cursor: usize,
    highlighted: usize,
    // offset of the `@` the user escaped out of
    dismissed: Option<usize>,
    pending: Vec<Member>,
}

impl MentionComposer {
    pub fn new(members: Vec<Member>) -> MentionComposer {
        MentionComposer::with_limit(members, DEFAULT_SUGGESTION_LIMIT)
    }

    pub fn with_limit(members: Vec<Member>, limit: usize) -> MentionComposer {
        MentionComposer {
            members,
            limit,
            text: String::new(),
            cursor: 0,
            highlighted: 0,
            dismissed: None,
            pending: Vec::new(),
        }
    }

    pub fn set_members(&mut self, members: Vec<Member>) {
        self.members = members;
        self.highlighted = 0;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    pub fn pending(&self) -> &[Member] {
        &self.pending
    }

    /// Records what the input currently holds
    pub fn set_input(&mut self, text: &str, cursor: usize) {
        let before = self.active().map(|m| m.query);
        self.text = String::from(text);
        self.cursor = cursor.min(self.text.len());
        let raw = detect(&self.text, self.cursor);
        if self.dismissed != raw.as_ref().map(|m| m.start) {
            self.dismissed = None;
        }
        if self.active().map(|m| m.query) != before {
            self.highlighted = 0;
        }
    }

    pub fn active(&self) -> Option<ActiveMention> {
        detect(&self.text, self.cursor).filter(|m| Some(m.start) != self.dismissed)
    }

    pub fn suggestions(&self) -> Vec<&Member> {
        match self.active() {
            Some(m) => suggest(&self.members, &m.query, self.limit),
            None => Vec::new(),
        }
    }

    pub fn handle_key(&mut self, key: Key) -> KeyOutcome {
        let Some(active) = self.active() else {
            return KeyOutcome::Ignored;
        };
        let count = self.suggestions().len();
        match key {
            Key::Escape => {
                self.dismissed = Some(active.start);
                self.highlighted = 0;
                KeyOutcome::Dismissed
            }
            _ if count == 0 => KeyOutcome::Ignored,
            Key::Up => {
                self.highlighted = self.highlighted.saturating_sub(1);
                KeyOutcome::Highlighted(self.highlighted)
            }
            Key::Down => {
                self.highlighted = (self.highlighted + 1).min(count - 1);
                KeyOutcome::Highlighted(self.highlighted)
            }
            Key::Enter | Key::Tab => match self.insert(self.highlighted) {
                Some(member) => KeyOutcome::Inserted(member),
                None => KeyOutcome::Ignored,
            },
        }
    }

    /// Replaces the `@query` being typed with `@Name ` for suggestion `index`
    /// and remembers the member as mentioned
    pub fn insert(&mut self, index: usize) -> Option<Member> {
        let active = self.active()?;
        let member = self.suggestions().get(index).map(|m| (*m).clone())?;
        let inserted = format!("@{} ", member.name);
        self.text.replace_range(active.start..self.cursor, &inserted);
        self.cursor = active.start + inserted.len();
        self.highlighted = 0;
        if !self.pending.iter().any(|m| m.email == member.email) {
            self.pending.push(member.clone());
        }
        Some(member)
    }

    /// Hands out the text to submit along with the mentions it still contains,
    /// and resets the composer
    pub fn take_submission(&mut self) -> (String, Vec<Member>) {
        let mentions = verify(&self.pending, &self.text);
        let text = std::mem::take(&mut self.text);
        self.cursor = 0;
        self.highlighted = 0;
        self.dismissed = None;
        self.pending.clear();
        (text, mentions)
    }
}
