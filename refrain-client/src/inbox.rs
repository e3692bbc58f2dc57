use std::{cmp::Reverse, sync::Arc};

use crate::{
    api::{Collaborator, Notification, NotificationId, UserEmail},
    error::{Error, WriteOp},
};

/// The notifications addressed to one member, newest first
pub struct Inbox {
    collaborator: Arc<dyn Collaborator>,
    dataset: String,
    recipient: UserEmail,
    notifications: Vec<Notification>,
}

impl Inbox {
    pub fn new(collaborator: Arc<dyn Collaborator>, dataset: String, recipient: UserEmail) -> Inbox {
        Inbox {
            collaborator,
            dataset,
            recipient,
            notifications: Vec::new(),
        }
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }

    /// On failure, the previously loaded notifications stay
    pub async fn load(&mut self) -> Result<(), Error> {
        let mut fetched = self
            .collaborator
            .fetch_notifications(&self.dataset, &self.recipient)
            .await
            .map_err(|source| Error::FetchNotifications {
                recipient: self.recipient.clone(),
                source,
            })?;
        fetched.sort_by_key(|n| Reverse(n.created_at));
        tracing::debug!(recipient = %self.recipient, num_notifications = fetched.len(), "loaded notifications");
        self.notifications = fetched;
        Ok(())
    }

    pub async fn mark_read(&mut self, id: &NotificationId) -> Result<(), Error> {
        let Some(i) = self.notifications.iter().position(|n| n.id == *id) else {
            return Err(Error::Invalid(crate::api::Error::NotFound(format!(
                "notification {id}"
            ))));
        };
        if self.notifications[i].read {
            return Ok(());
        }
        self.notifications[i].read = true;
        if let Err(source) = self
            .collaborator
            .mark_notification_read(&self.dataset, id)
            .await
        {
            self.notifications[i].read = false;
            tracing::error!(notification_id = %id, err = %source, "failed marking notification read");
            return Err(Error::write(WriteOp::MarkNotificationRead, source));
        }
        Ok(())
    }

    /// Marks every unread notification, stopping at the first failure
    pub async fn mark_all_read(&mut self) -> Result<(), Error> {
        let unread = self
            .notifications
            .iter()
            .filter(|n| !n.read)
            .map(|n| n.id.clone())
            .collect::<Vec<_>>();
        for id in unread {
            self.mark_read(&id).await?;
        }
        Ok(())
    }
}
