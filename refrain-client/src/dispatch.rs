use std::sync::Arc;

use parking_lot::Mutex;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    api::{Collaborator, NewNotification, ScopeKey},
    error::NotificationDeliveryError,
};

/// Sends fan-out results to the remote store in the background.
///
/// Delivery never reports back to the operation that caused it: failures are
/// logged and pushed to the optional error channel.
pub struct Dispatcher {
    collaborator: Arc<dyn Collaborator>,
    scope: ScopeKey,
    errors: Option<mpsc::UnboundedSender<NotificationDeliveryError>>,
    in_flight: Mutex<Vec<JoinHandle<()>>>,
}

impl Dispatcher {
    pub fn new(collaborator: Arc<dyn Collaborator>, scope: ScopeKey) -> Dispatcher {
        Dispatcher {
            collaborator,
            scope,
            errors: None,
            in_flight: Mutex::new(Vec::new()),
        }
    }

    pub fn set_error_channel(&mut self, errors: mpsc::UnboundedSender<NotificationDeliveryError>) {
        self.errors = Some(errors);
    }

    pub fn dispatch(&self, drafts: Vec<NewNotification>) {
        let Some(first) = drafts.first() else {
            return;
        };
        let reference = first.reference_id.clone();
        let collaborator = self.collaborator.clone();
        let scope = self.scope.clone();
        let errors = self.errors.clone();
        let task = tokio::spawn(async move {
            let res = match drafts.len() {
                1 => collaborator
                    .create_notification(&scope, drafts[0].clone())
                    .await
                    .map(|_| ()),
                _ => collaborator
                    .create_notifications(&scope, drafts.clone())
                    .await
                    .map(|_| ()),
            };
            match res {
                Ok(()) => tracing::debug!(
                    comment_id = %reference,
                    num_notifications = drafts.len(),
                    "delivered notifications"
                ),
                Err(source) => {
                    let err = NotificationDeliveryError {
                        reference,
                        drafts,
                        source,
                    };
                    tracing::error!(%err, "notification delivery failed");
                    if let Some(errors) = errors {
                        // nobody listening anymore is fine
                        let _ = errors.send(err);
                    }
                }
            }
        });
        let mut in_flight = self.in_flight.lock();
        in_flight.retain(|t| !t.is_finished());
        in_flight.push(task);
    }

    /// Waits for every delivery dispatched so far
    pub async fn settle(&self) {
        let tasks = std::mem::take(&mut *self.in_flight.lock());
        for t in tasks {
            if let Err(err) = t.await {
                tracing::error!(?err, "notification delivery task panicked");
            }
        }
    }
}
