use async_trait::async_trait;

use crate::{
    Comment, CommentEdit, CommentId, Error, Member, NewComment, NewNotification, Notification, NotificationId,
    ScopeKey, UserEmail,
};

/// The remote row store: durable source of truth across sessions.
///
/// It offers no transactions and no locking. Concurrent writers get
/// last-write-wins per field: edits only touch the text, and reaction toggles
/// are applied to the current row contents.
#[async_trait]
pub trait Collaborator: Send + Sync {
    async fn fetch_comments(&self, scope: &ScopeKey) -> Result<Vec<Comment>, Error>;

    /// The returned comment carries the store-assigned id
    async fn create_comment(&self, scope: &ScopeKey, draft: NewComment) -> Result<Comment, Error>;

    async fn update_comment(
        &self,
        scope: &ScopeKey,
        comment: &CommentId,
        edit: &CommentEdit,
    ) -> Result<(), Error>;

    /// Returns the authoritative comment after the toggle
    async fn toggle_reaction(
        &self,
        scope: &ScopeKey,
        comment: &CommentId,
        emoji: &str,
        user: &UserEmail,
    ) -> Result<Comment, Error>;

    async fn create_notification(
        &self,
        scope: &ScopeKey,
        draft: NewNotification,
    ) -> Result<Notification, Error>;

    async fn create_notifications(
        &self,
        scope: &ScopeKey,
        drafts: Vec<NewNotification>,
    ) -> Result<Vec<Notification>, Error>;

    async fn fetch_members(&self, dataset: &str) -> Result<Vec<Member>, Error>;

    async fn fetch_notifications(
        &self,
        dataset: &str,
        recipient: &UserEmail,
    ) -> Result<Vec<Notification>, Error>;

    async fn mark_notification_read(&self, dataset: &str, id: &NotificationId)
        -> Result<(), Error>;
}
