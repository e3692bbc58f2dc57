use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::{
    api::{
        self, Collaborator, Comment, CommentEdit, CommentId, Member, NewComment, ReactionsExt,
        ScopeKey,
    },
    config::ClientConfig,
    dispatch::Dispatcher,
    error::{Error, NotificationDeliveryError, WriteOp},
    fanout::{fan_out, EntityInfo, Trigger},
    mention::MentionComposer,
    store::CommentStore,
};

/// The comment section of one entity, as seen by one member.
///
/// Owns the local store for the lifetime of the view. Every mutation is
/// applied locally first, then written remotely: failed edits and reaction
/// toggles are rolled back, failed creations are kept.
pub struct CommentView {
    collaborator: Arc<dyn Collaborator>,
    scope: ScopeKey,
    actor: Member,
    entity: EntityInfo,
    suggestion_limit: usize,
    store: Mutex<CommentStore>,
    members: Mutex<Vec<Member>>,
    dispatcher: Dispatcher,
}

impl CommentView {
    pub fn new(
        collaborator: Arc<dyn Collaborator>,
        config: &ClientConfig,
        actor: Member,
        entity: EntityInfo,
    ) -> CommentView {
        let scope = ScopeKey {
            dataset: config.dataset.clone(),
            entity_type: entity.entity_type,
            entity_id: entity.entity_id.clone(),
        };
        CommentView {
            dispatcher: Dispatcher::new(collaborator.clone(), scope.clone()),
            store: Mutex::new(CommentStore::new(scope.clone())),
            members: Mutex::new(Vec::new()),
            suggestion_limit: config.suggestion_limit,
            collaborator,
            scope,
            actor,
            entity,
        }
    }

    /// Forwards notification delivery failures to `errors`
    pub fn with_delivery_errors(
        mut self,
        errors: mpsc::UnboundedSender<NotificationDeliveryError>,
    ) -> CommentView {
        self.dispatcher.set_error_channel(errors);
        self
    }

    pub fn scope(&self) -> &ScopeKey {
        &self.scope
    }

    pub fn actor(&self) -> &Member {
        &self.actor
    }

    /// Runs `f` against the current local state
    pub fn read<R>(&self, f: impl FnOnce(&CommentStore) -> R) -> R {
        f(&self.store.lock())
    }

    pub fn comment(&self, id: &CommentId) -> Option<Comment> {
        self.store.lock().get(id).cloned()
    }

    /// Top-level comments, newest first, each with its replies
    pub fn threads(&self) -> Vec<(Comment, Vec<Comment>)> {
        self.store
            .lock()
            .thread()
            .into_iter()
            .map(|t| (t.comment.clone(), t.replies.into_iter().cloned().collect()))
            .collect()
    }

    /// Replaces the local comments with the remote ones.
    ///
    /// On failure the previous comments stay visible and are marked stale.
    pub async fn load(&self) -> Result<usize, Error> {
        match self.collaborator.fetch_comments(&self.scope).await {
            Ok(comments) => {
                let num = comments.len();
                self.store.lock().replace_all(comments);
                tracing::info!(scope = %self.scope, num_comments = num, "loaded comments");
                Ok(num)
            }
            Err(source) => {
                self.store.lock().mark_stale();
                tracing::warn!(scope = %self.scope, err = %source, "failed loading comments, keeping stale view");
                Err(Error::Fetch {
                    scope: self.scope.clone(),
                    source,
                })
            }
        }
    }

    pub async fn load_members(&self) -> Result<(), Error> {
        let members = self
            .collaborator
            .fetch_members(&self.scope.dataset)
            .await
            .map_err(|source| Error::Fetch {
                scope: self.scope.clone(),
                source,
            })?;
        *self.members.lock() = members;
        Ok(())
    }

    /// A composer for a new comment or reply, suggesting the loaded members
    pub fn composer(&self) -> MentionComposer {
        MentionComposer::with_limit(self.members.lock().clone(), self.suggestion_limit)
    }

    /// Only authors may edit their comments. `edit_comment` does not check
    /// this: callers must.
    pub fn can_edit(&self, id: &CommentId) -> bool {
        self.store
            .lock()
            .get(id)
            .map_or(false, |c| c.author_email == self.actor.email)
    }

    pub async fn post_comment(&self, text: &str, mentions: &[Member]) -> Result<Comment, Error> {
        self.create(None, text, mentions).await
    }

    pub async fn post_reply(
        &self,
        parent: &CommentId,
        text: &str,
        mentions: &[Member],
    ) -> Result<Comment, Error> {
        self.create(Some(parent), text, mentions).await
    }

    /// Returns the stored comment, or the local placeholder if the remote
    /// write failed. Such a placeholder stays in the view.
    async fn create(
        &self,
        parent: Option<&CommentId>,
        text: &str,
        mentions: &[Member],
    ) -> Result<Comment, Error> {
        api::validate_text(text)?;
        let parent = match parent {
            None => None,
            // the remote store would keep pointing at the placeholder
            Some(id) if id.is_placeholder() => return Err(Error::UnsavedParent(id.clone())),
            Some(id) => Some(
                self.comment(id)
                    .ok_or_else(|| Error::UnknownComment(id.clone()))?,
            ),
        };
        let op = match parent {
            None => WriteOp::CreateComment,
            Some(_) => WriteOp::CreateReply,
        };
        let draft = NewComment {
            entity_type: self.entity.entity_type,
            entity_id: self.entity.entity_id.clone(),
            parent_id: parent.as_ref().map(|p| p.id.clone()),
            author: self.actor.name.clone(),
            author_email: self.actor.email.clone(),
            text: String::from(text),
            timestamp: Utc::now(),
        };
        let placeholder = Comment::from_draft(CommentId::placeholder(), draft.clone());
        self.store.lock().apply(placeholder.clone());

        let stored = match self.collaborator.create_comment(&self.scope, draft).await {
            Ok(stored) => stored,
            Err(err) => {
                tracing::error!(%op, comment_id = %placeholder.id, %err, "remote write failed, keeping local comment");
                return Ok(placeholder);
            }
        };
        self.store.lock().replace_id(&placeholder.id, stored.clone());

        let trigger = match &parent {
            None => Trigger::NewComment {
                comment: &stored,
                mentions,
            },
            Some(parent) => Trigger::Reply {
                reply: &stored,
                parent,
                mentions,
            },
        };
        self.dispatcher
            .dispatch(fan_out(&trigger, &self.actor, &self.entity, Utc::now()));
        Ok(stored)
    }

    pub async fn edit_comment(&self, id: &CommentId, text: &str) -> Result<(), Error> {
        api::validate_text(text)?;
        let edit = CommentEdit {
            text: String::from(text),
            edited_at: Utc::now(),
        };
        let prior = {
            let mut store = self.store.lock();
            let comment = store
                .get_mut(id)
                .ok_or_else(|| Error::UnknownComment(id.clone()))?;
            let prior = comment.clone();
            comment.apply_edit(&edit);
            prior
        };

        if let Err(source) = self.collaborator.update_comment(&self.scope, id, &edit).await {
            if let Some(comment) = self.store.lock().get_mut(id) {
                comment.text = prior.text;
                comment.edited_at = prior.edited_at;
            }
            tracing::error!(comment_id = %id, err = %source, "failed saving edit, rolled back");
            return Err(Error::write(WriteOp::EditComment, source));
        }
        Ok(())
    }

    pub async fn toggle_reaction(&self, id: &CommentId, emoji: &str) -> Result<(), Error> {
        api::validate_text(emoji)?;
        let me = &self.actor.email;
        let had_reacted = {
            let mut store = self.store.lock();
            let comment = store
                .get_mut(id)
                .ok_or_else(|| Error::UnknownComment(id.clone()))?;
            let had_reacted = comment.reactions.has_reacted(emoji, me);
            comment.toggle_reaction(emoji, me);
            had_reacted
        };

        let stored = match self
            .collaborator
            .toggle_reaction(&self.scope, id, emoji, me)
            .await
        {
            Ok(stored) => stored,
            Err(source) => {
                if let Some(comment) = self.store.lock().get_mut(id) {
                    // undo only this toggle, whatever else happened meanwhile
                    if comment.reactions.has_reacted(emoji, me) != had_reacted {
                        comment.toggle_reaction(emoji, me);
                    }
                }
                tracing::error!(comment_id = %id, %emoji, err = %source, "failed saving reaction, rolled back");
                return Err(Error::write(WriteOp::ToggleReaction, source));
            }
        };
        let added = !had_reacted && stored.reactions.has_reacted(emoji, me);
        {
            let mut store = self.store.lock();
            match store.get_mut(id) {
                // other fields may carry a pending edit
                Some(comment) => comment.reactions = stored.reactions.clone(),
                None => store.apply(stored.clone()),
            }
        }

        if added {
            let trigger = Trigger::ReactionAdded {
                comment: &stored,
                emoji,
            };
            self.dispatcher
                .dispatch(fan_out(&trigger, &self.actor, &self.entity, Utc::now()));
        }
        Ok(())
    }

    /// Waits for outstanding notification deliveries
    pub async fn settle(&self) {
        self.dispatcher.settle().await
    }
}
