use std::fmt;

use crate::api::{self, CommentId, NewNotification, ScopeKey, UserEmail};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WriteOp {
    CreateComment,
    CreateReply,
    EditComment,
    ToggleReaction,
    MarkNotificationRead,
}

impl fmt::Display for WriteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WriteOp::CreateComment => "create comment",
            WriteOp::CreateReply => "create reply",
            WriteOp::EditComment => "edit comment",
            WriteOp::ToggleReaction => "toggle reaction",
            WriteOp::MarkNotificationRead => "mark notification read",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Refresh failed; the view keeps showing what it had
    #[error("failed to fetch comments for {scope}")]
    Fetch {
        scope: ScopeKey,
        #[source]
        source: api::Error,
    },

    #[error("failed to fetch notifications for {recipient}")]
    FetchNotifications {
        recipient: UserEmail,
        #[source]
        source: api::Error,
    },

    /// The message is what the user gets to see
    #[error("failed to save, please try again")]
    Write {
        op: WriteOp,
        #[source]
        source: api::Error,
    },

    #[error("no comment {0} in this view")]
    UnknownComment(CommentId),

    /// The parent is still being saved; its final id is not known yet
    #[error("comment {0} is not saved yet, it cannot be replied to")]
    UnsavedParent(CommentId),

    #[error(transparent)]
    Invalid(#[from] api::Error),
}

impl Error {
    pub fn write(op: WriteOp, source: api::Error) -> Error {
        Error::Write { op, source }
    }

    /// Whether the caller should offer the user to retry
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Write { .. } | Error::Fetch { .. } | Error::FetchNotifications { .. }
        )
    }
}

/// A notification that could not be created.
///
/// These never reach the user: they are logged and, if someone listens,
/// forwarded on the view's delivery error channel.
#[derive(Clone, Debug, thiserror::Error)]
#[error("failed to deliver {} notification(s) for comment {reference}: {source}", .drafts.len())]
pub struct NotificationDeliveryError {
    pub reference: CommentId,
    pub drafts: Vec<NewNotification>,
    #[source]
    pub source: api::Error,
}
