use crate::{Comment, Reactions, UserEmail};

/// Per-user emoji toggling over a reaction map.
///
/// The same toggle runs optimistically on the client and authoritatively in
/// the remote store, so both sides agree on what a toggle means.
pub trait ReactionsExt {
    /// Adds `user` to `emoji` if absent, removes it otherwise. Empty emoji
    /// entries are dropped.
    fn toggle(&mut self, emoji: &str, user: &UserEmail);

    fn has_reacted(&self, emoji: &str, user: &UserEmail) -> bool;

    fn count(&self, emoji: &str) -> usize;
}

impl ReactionsExt for Reactions {
    fn toggle(&mut self, emoji: &str, user: &UserEmail) {
        match self.get_mut(emoji) {
            Some(users) if users.contains(user) => {
                users.remove(user);
                if users.is_empty() {
                    self.remove(emoji);
                }
            }
            Some(users) => {
                users.insert(user.clone());
            }
            None => {
                self.insert(String::from(emoji), [user.clone()].into_iter().collect());
            }
        }
    }

    fn has_reacted(&self, emoji: &str, user: &UserEmail) -> bool {
        self.get(emoji).map_or(false, |users| users.contains(user))
    }

    fn count(&self, emoji: &str) -> usize {
        self.get(emoji).map_or(0, |users| users.len())
    }
}

impl Comment {
    pub fn toggle_reaction(&mut self, emoji: &str, user: &UserEmail) {
        self.reactions.toggle(emoji, user)
    }
}
