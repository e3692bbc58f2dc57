use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};

use async_trait::async_trait;
use parking_lot::Mutex;
use refrain_api::{
    Collaborator, Comment, CommentEdit, CommentId, Error, Member, NewComment, NewNotification,
    Notification, NotificationId, ScopeKey, UserEmail,
};
use tokio::sync::Semaphore;

/// Remote calls that can be counted, failed or held back
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Op {
    FetchComments,
    CreateComment,
    UpdateComment,
    ToggleReaction,
    CreateNotification,
    CreateNotifications,
    FetchMembers,
    FetchNotifications,
    MarkNotificationRead,
}

/// Initial contents of a mock dataset, as written by `generate-test-data`
#[derive(Clone, Debug, Default, serde::Deserialize, serde::Serialize)]
pub struct Seed {
    pub dataset: String,
    pub members: Vec<Member>,
    pub comments: Vec<(ScopeKey, Comment)>,
    #[serde(default)]
    pub notifications: Vec<Notification>,
}

#[derive(Default)]
struct State {
    next_id: u64,
    members: HashMap<String, Vec<Member>>,
    // Vec keeps rows in arrival order, like the real store
    comments: HashMap<ScopeKey, Vec<Comment>>,
    notifications: HashMap<String, Vec<Notification>>,
    calls: HashMap<Op, usize>,
    fail_next: HashMap<Op, VecDeque<Error>>,
    fail_all: HashMap<Op, Error>,
    holds: HashMap<Op, Arc<Semaphore>>,
}

impl State {
    fn fresh_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }

    fn comment_mut(&mut self, scope: &ScopeKey, id: &CommentId) -> Result<&mut Comment, Error> {
        self.comments
            .get_mut(scope)
            .and_then(|comments| comments.iter_mut().find(|c| c.id == *id))
            .ok_or_else(|| Error::NotFound(format!("comment {id} in {scope}")))
    }
}

/// In-memory stand-in for the remote row store.
///
/// Every call is counted, can be made to fail (once or until cleared), and can
/// be held back until the test releases it.
#[derive(Default)]
pub struct MockServer(Mutex<State>);

impl MockServer {
    pub fn new() -> MockServer {
        MockServer::default()
    }

    pub fn from_seed(seed: Seed) -> MockServer {
        let server = MockServer::new();
        {
            let mut state = server.0.lock();
            state
                .members
                .insert(seed.dataset.clone(), seed.members);
            for (scope, comment) in seed.comments {
                state.comments.entry(scope).or_default().push(comment);
            }
            state
                .notifications
                .insert(seed.dataset, seed.notifications);
        }
        server
    }

    pub fn add_member(&self, dataset: &str, member: Member) {
        self.0
            .lock()
            .members
            .entry(String::from(dataset))
            .or_default()
            .push(member);
    }

    /// Writes a comment as if another session had created it
    pub fn insert_comment(&self, scope: &ScopeKey, draft: NewComment) -> Comment {
        let mut state = self.0.lock();
        let id = CommentId(state.fresh_id("rec"));
        let comment = Comment::from_draft(id, draft);
        state
            .comments
            .entry(scope.clone())
            .or_default()
            .push(comment.clone());
        comment
    }

    pub fn test_comments(&self, scope: &ScopeKey) -> Vec<Comment> {
        self.0
            .lock()
            .comments
            .get(scope)
            .cloned()
            .unwrap_or_default()
    }

    pub fn test_notifications(&self, dataset: &str) -> Vec<Notification> {
        self.0
            .lock()
            .notifications
            .get(dataset)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of times `op` was attempted, failures included
    pub fn test_calls(&self, op: Op) -> usize {
        self.0.lock().calls.get(&op).copied().unwrap_or(0)
    }

    /// Makes the next call of `op` fail with `err`
    pub fn fail_next(&self, op: Op, err: Error) {
        self.0.lock().fail_next.entry(op).or_default().push_back(err);
    }

    /// Makes every call of `op` fail until `recover` is called
    pub fn fail_all(&self, op: Op, err: Error) {
        self.0.lock().fail_all.insert(op, err);
    }

    pub fn recover(&self, op: Op) {
        let mut state = self.0.lock();
        state.fail_all.remove(&op);
        state.fail_next.remove(&op);
    }

    /// Calls of `op` made from now on wait until `release(op)`
    pub fn hold(&self, op: Op) {
        self.0.lock().holds.insert(op, Arc::new(Semaphore::new(0)));
    }

    pub fn release(&self, op: Op) {
        if let Some(gate) = self.0.lock().holds.remove(&op) {
            gate.close();
        }
    }

    async fn enter(&self, op: Op) -> Result<(), Error> {
        let gate = {
            let mut state = self.0.lock();
            *state.calls.entry(op).or_insert(0) += 1;
            state.holds.get(&op).cloned()
        };
        if let Some(gate) = gate {
            // a closed semaphore is the release signal
            let _ = gate.acquire().await;
        }
        let mut state = self.0.lock();
        if let Some(err) = state.fail_next.get_mut(&op).and_then(|q| q.pop_front()) {
            tracing::debug!(?op, %err, "mock server failing call");
            return Err(err);
        }
        if let Some(err) = state.fail_all.get(&op) {
            return Err(err.clone());
        }
        Ok(())
    }

    fn store_notification(&self, draft: NewNotification, dataset: &str) -> Notification {
        let mut state = self.0.lock();
        let id = NotificationId(state.fresh_id("ntf"));
        let notification = Notification::from_draft(id, draft);
        state
            .notifications
            .entry(String::from(dataset))
            .or_default()
            .push(notification.clone());
        notification
    }
}

#[async_trait]
impl Collaborator for MockServer {
    async fn fetch_comments(&self, scope: &ScopeKey) -> Result<Vec<Comment>, Error> {
        self.enter(Op::FetchComments).await?;
        Ok(self.test_comments(scope))
    }

    async fn create_comment(&self, scope: &ScopeKey, draft: NewComment) -> Result<Comment, Error> {
        self.enter(Op::CreateComment).await?;
        draft.validate()?;
        Ok(self.insert_comment(scope, draft))
    }

    async fn update_comment(
        &self,
        scope: &ScopeKey,
        comment: &CommentId,
        edit: &CommentEdit,
    ) -> Result<(), Error> {
        self.enter(Op::UpdateComment).await?;
        refrain_api::validate_text(&edit.text)?;
        let mut state = self.0.lock();
        state.comment_mut(scope, comment)?.apply_edit(edit);
        Ok(())
    }

    async fn toggle_reaction(
        &self,
        scope: &ScopeKey,
        comment: &CommentId,
        emoji: &str,
        user: &UserEmail,
    ) -> Result<Comment, Error> {
        self.enter(Op::ToggleReaction).await?;
        refrain_api::validate_string(emoji)?;
        let mut state = self.0.lock();
        let stored = state.comment_mut(scope, comment)?;
        stored.toggle_reaction(emoji, user);
        Ok(stored.clone())
    }

    async fn create_notification(
        &self,
        scope: &ScopeKey,
        draft: NewNotification,
    ) -> Result<Notification, Error> {
        self.enter(Op::CreateNotification).await?;
        Ok(self.store_notification(draft, &scope.dataset))
    }

    async fn create_notifications(
        &self,
        scope: &ScopeKey,
        drafts: Vec<NewNotification>,
    ) -> Result<Vec<Notification>, Error> {
        self.enter(Op::CreateNotifications).await?;
        Ok(drafts
            .into_iter()
            .map(|d| self.store_notification(d, &scope.dataset))
            .collect())
    }

    async fn fetch_members(&self, dataset: &str) -> Result<Vec<Member>, Error> {
        self.enter(Op::FetchMembers).await?;
        Ok(self
            .0
            .lock()
            .members
            .get(dataset)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_notifications(
        &self,
        dataset: &str,
        recipient: &UserEmail,
    ) -> Result<Vec<Notification>, Error> {
        self.enter(Op::FetchNotifications).await?;
        Ok(self
            .test_notifications(dataset)
            .into_iter()
            .filter(|n| n.recipient_email == *recipient)
            .collect())
    }

    async fn mark_notification_read(
        &self,
        dataset: &str,
        id: &NotificationId,
    ) -> Result<(), Error> {
        self.enter(Op::MarkNotificationRead).await?;
        let mut state = self.0.lock();
        let notification = state
            .notifications
            .get_mut(dataset)
            .and_then(|ns| ns.iter_mut().find(|n| n.id == *id))
            .ok_or_else(|| Error::NotFound(format!("notification {id}")))?;
        notification.read = true;
        Ok(())
    }
}
