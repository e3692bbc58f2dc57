use chrono::Utc;

pub use uuid::Uuid;
pub type Time = chrono::DateTime<Utc>;

mod collaborator;
pub use collaborator::Collaborator;

mod comment;
pub use comment::{Comment, CommentEdit, CommentId, NewComment, Reactions};

mod entity;
pub use entity::{EntityId, EntityType, ScopeKey};

mod error;
pub use error::Error;

mod notification;
pub use notification::{NewNotification, Notification, NotificationId, NotificationType};

mod reaction;
pub use reaction::ReactionsExt;

mod user;
pub use user::{Member, UserEmail};

// The remote store keeps rows as text, so refuse anything it would silently
// truncate. Every free-form string crossing the collaborator boundary goes
// through here.
pub fn validate_string(s: &str) -> Result<(), Error> {
    if s.contains('\0') {
        return Err(Error::NullByteInString(s.to_string()));
    }
    Ok(())
}

/// Like `validate_string`, but also rejects bodies that are only whitespace
pub fn validate_text(s: &str) -> Result<(), Error> {
    validate_string(s)?;
    if s.trim().is_empty() {
        return Err(Error::EmptyText);
    }
    Ok(())
}
