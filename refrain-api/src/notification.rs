use std::fmt;

use crate::{CommentId, EntityId, EntityType, Time, UserEmail};

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize)]
pub struct NotificationId(pub String);

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationType {
    CommentOnSong,
    ReplyToComment,
    ReactionOnComment,
    MentionInComment,

    // Raised by the submission and assignment subsystems, never by comment fan-out
    SongSubmitted,
    AssignmentPosted,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub recipient_email: UserEmail,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub trigger_user_email: UserEmail,
    pub trigger_user_name: String,
    pub entity_type: EntityType,
    pub entity_id: EntityId,

    /// Comment that caused this notification
    pub reference_id: CommentId,

    pub message: String,
    pub read: bool,
    pub created_at: Time,
}

impl Notification {
    pub fn from_draft(id: NotificationId, draft: NewNotification) -> Notification {
        Notification {
            id,
            recipient_email: draft.recipient_email,
            kind: draft.kind,
            trigger_user_email: draft.trigger_user_email,
            trigger_user_name: draft.trigger_user_name,
            entity_type: draft.entity_type,
            entity_id: draft.entity_id,
            reference_id: draft.reference_id,
            message: draft.message,
            read: false,
            created_at: draft.created_at,
        }
    }
}

/// A notification creation request, as produced by fan-out
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    pub recipient_email: UserEmail,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub trigger_user_email: UserEmail,
    pub trigger_user_name: String,
    pub entity_type: EntityType,
    pub entity_id: EntityId,
    pub reference_id: CommentId,
    pub message: String,
    pub created_at: Time,
}
