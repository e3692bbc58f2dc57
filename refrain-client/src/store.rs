use std::{cmp::Reverse, collections::HashMap};

use chrono::Utc;

use crate::api::{Comment, CommentId, ScopeKey, Time};

/// A top-level comment along with its direct replies
#[derive(Clone, Debug, PartialEq)]
pub struct Thread<'a> {
    pub comment: &'a Comment,
    pub replies: Vec<&'a Comment>,
}

/// All the comments of one entity, kept flat.
///
/// Parent/child relationships are derived on demand from `parent_id`, so a
/// refresh is just swapping the list.
#[derive(Clone, Debug)]
pub struct CommentStore {
    scope: ScopeKey,
    comments: Vec<Comment>,
    index: HashMap<CommentId, usize>,
    stale: bool,
    last_loaded: Option<Time>,
}

impl CommentStore {
    pub fn new(scope: ScopeKey) -> CommentStore {
        CommentStore {
            scope,
            comments: Vec::new(),
            index: HashMap::new(),
            stale: false,
            last_loaded: None,
        }
    }

    pub fn scope(&self) -> &ScopeKey {
        &self.scope
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    /// Comments in store order
    pub fn iter(&self) -> impl Iterator<Item = &Comment> {
        self.comments.iter()
    }

    pub fn get(&self, id: &CommentId) -> Option<&Comment> {
        self.index.get(id).map(|&i| &self.comments[i])
    }

    pub fn get_mut(&mut self, id: &CommentId) -> Option<&mut Comment> {
        self.index.get(id).map(|&i| &mut self.comments[i])
    }

    /// Whether the last refresh attempt failed
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn last_loaded(&self) -> Option<Time> {
        self.last_loaded
    }

    pub fn mark_stale(&mut self) {
        self.stale = true;
    }

    /// Swaps in a freshly fetched list.
    ///
    /// Entries the remote store never acknowledged (placeholder ids) are kept
    /// after the fetched ones, so optimistic creations stay visible.
    pub fn replace_all(&mut self, fetched: Vec<Comment>) {
        let pending = self
            .comments
            .drain(..)
            .filter(|c| c.id.is_placeholder())
            .collect::<Vec<_>>();
        self.comments = fetched;
        self.comments.extend(pending);
        self.reindex();
        self.stale = false;
        self.last_loaded = Some(Utc::now());
    }

    /// Inserts `comment`, or replaces the comment with the same id
    pub fn apply(&mut self, comment: Comment) {
        match self.index.get(&comment.id) {
            Some(&i) => self.comments[i] = comment,
            None => {
                self.index.insert(comment.id.clone(), self.comments.len());
                self.comments.push(comment);
            }
        }
    }

    /// Replaces the entry stored under `old` (usually a placeholder) with
    /// `comment`, keeping its position. Replies pointing to `old` follow.
    pub fn replace_id(&mut self, old: &CommentId, comment: Comment) {
        let Some(i) = self.index.remove(old) else {
            self.apply(comment);
            return;
        };
        if let Some(&dup) = self.index.get(&comment.id) {
            // a refresh already brought the acknowledged row in
            self.comments.remove(i.max(dup));
            self.comments.remove(i.min(dup));
            self.comments.insert(i.min(dup), comment.clone());
        } else {
            self.comments[i] = comment.clone();
        }
        for c in self.comments.iter_mut() {
            if c.parent_id.as_ref() == Some(old) {
                c.parent_id = Some(comment.id.clone());
            }
        }
        self.reindex();
    }

    /// Top-level comments, newest first
    pub fn top_level(&self) -> Vec<&Comment> {
        let mut res = self
            .comments
            .iter()
            .filter(|c| c.parent_id.is_none())
            .collect::<Vec<_>>();
        // stable: equal timestamps keep store order
        res.sort_by_key(|c| Reverse(c.timestamp));
        res
    }

    /// Direct replies to `parent`, in store order
    pub fn replies_of(&self, parent: &CommentId) -> Vec<&Comment> {
        self.comments
            .iter()
            .filter(|c| c.parent_id.as_ref() == Some(parent))
            .collect()
    }

    /// The threaded view rendered by the comment section
    pub fn thread(&self) -> Vec<Thread<'_>> {
        self.top_level()
            .into_iter()
            .map(|comment| Thread {
                comment,
                replies: self.replies_of(&comment.id),
            })
            .collect()
    }

    fn reindex(&mut self) {
        self.index = self
            .comments
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();
    }
}
