use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use crate::{EntityId, EntityType, Time, UserEmail, Uuid};

const PLACEHOLDER_PREFIX: &str = "local-";

/// Emoji -> set of users who reacted with it
pub type Reactions = BTreeMap<String, BTreeSet<UserEmail>>;

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize)]
pub struct CommentId(pub String);

impl CommentId {
    /// Id given to a comment that the remote store has not acknowledged yet
    pub fn placeholder() -> CommentId {
        CommentId(format!("{PLACEHOLDER_PREFIX}{}", Uuid::new_v4()))
    }

    pub fn is_placeholder(&self) -> bool {
        self.0.starts_with(PLACEHOLDER_PREFIX)
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub entity_type: EntityType,
    pub entity_id: EntityId,

    /// None for a top-level comment
    pub parent_id: Option<CommentId>,

    /// Display name of the writer
    pub author: String,
    pub author_email: UserEmail,

    pub text: String,
    pub timestamp: Time,

    #[serde(default)]
    pub reactions: Reactions,

    pub edited_at: Option<Time>,
}

impl Comment {
    /// Builds the comment the remote store would return for `draft`
    pub fn from_draft(id: CommentId, draft: NewComment) -> Comment {
        Comment {
            id,
            entity_type: draft.entity_type,
            entity_id: draft.entity_id,
            parent_id: draft.parent_id,
            author: draft.author,
            author_email: draft.author_email,
            text: draft.text,
            timestamp: draft.timestamp,
            reactions: Reactions::new(),
            edited_at: None,
        }
    }

    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Overwrites the edited fields only, leaving reactions alone
    pub fn apply_edit(&mut self, edit: &CommentEdit) {
        self.text = edit.text.clone();
        self.edited_at = Some(edit.edited_at);
    }
}

/// What an edit changes on a stored comment
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentEdit {
    pub text: String,
    pub edited_at: Time,
}

/// A comment before the remote store assigned it an id
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub entity_type: EntityType,
    pub entity_id: EntityId,
    pub parent_id: Option<CommentId>,
    pub author: String,
    pub author_email: UserEmail,
    pub text: String,
    pub timestamp: Time,
}

impl NewComment {
    // See comments on `validate_string`
    pub fn validate(&self) -> Result<(), crate::Error> {
        crate::validate_string(&self.author)?;
        crate::validate_text(&self.text)
    }
}
