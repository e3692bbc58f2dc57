use std::{sync::Arc, time::Duration};

use futures::{pin_mut, select, FutureExt};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{sleep_until, Instant},
};

use crate::view::CommentView;

/// Shortest interval `LiveRefresh` will poll at
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Visibility {
    Visible,
    Hidden,
}

enum Wakeup {
    Refresh,
    VisibilityChanged,
    Stopped,
}

/// Keeps a view up to date while it is shown.
///
/// While visible, the view reloads every `interval`. While hidden, nothing
/// happens; becoming visible again reloads at once and restarts the interval.
/// Dropping the scheduler stops it, letting an in-flight load finish.
pub struct LiveRefresh {
    visibility: Option<watch::Sender<Visibility>>,
    task: Option<JoinHandle<()>>,
}

impl LiveRefresh {
    /// Intervals below `MIN_REFRESH_INTERVAL` are raised to it
    pub fn start(view: Arc<CommentView>, interval: Duration, initially: Visibility) -> LiveRefresh {
        if interval < MIN_REFRESH_INTERVAL {
            tracing::warn!(
                ?interval,
                min = ?MIN_REFRESH_INTERVAL,
                "refresh interval too short, raising it"
            );
        }
        let interval = interval.max(MIN_REFRESH_INTERVAL);
        let (sender, receiver) = watch::channel(initially);
        let task = tokio::spawn(run(view, interval, receiver));
        LiveRefresh {
            visibility: Some(sender),
            task: Some(task),
        }
    }

    pub fn set_visibility(&self, visibility: Visibility) {
        if let Some(sender) = &self.visibility {
            sender.send_if_modified(|v| std::mem::replace(v, visibility) != visibility);
        }
    }

    /// Stops refreshing, and waits for the load in progress if any
    pub async fn stop(mut self) {
        self.visibility.take();
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                tracing::error!(?err, "live refresh task panicked");
            }
        }
    }
}

impl Drop for LiveRefresh {
    fn drop(&mut self) {
        // the task notices the closed channel on its next wakeup
        self.visibility.take();
    }
}

async fn refresh(view: &CommentView) {
    // failures are logged and flagged on the store by `load` itself
    let _ = view.load().await;
}

async fn run(view: Arc<CommentView>, interval: Duration, mut visibility: watch::Receiver<Visibility>) {
    let scope = view.scope().clone();
    let mut was_paused = false;
    loop {
        // Paused
        while *visibility.borrow_and_update() == Visibility::Hidden {
            was_paused = true;
            if visibility.changed().await.is_err() {
                tracing::debug!(%scope, "live refresh stopped");
                return;
            }
        }

        // Polling
        tracing::debug!(%scope, ?interval, "live refresh polling");
        if was_paused {
            refresh(&view).await;
            was_paused = false;
        }
        let mut next_refresh = Instant::now() + interval;
        loop {
            let wakeup = {
                let delay_refresh = sleep_until(next_refresh).fuse();
                let changed = visibility.changed().fuse();
                pin_mut!(delay_refresh, changed);
                select! {
                    _ = delay_refresh => Wakeup::Refresh,
                    res = changed => match res {
                        Ok(()) => Wakeup::VisibilityChanged,
                        Err(_) => Wakeup::Stopped,
                    },
                }
            };
            match wakeup {
                Wakeup::Refresh => {
                    refresh(&view).await;
                    next_refresh += interval;
                }
                Wakeup::VisibilityChanged => {
                    if *visibility.borrow() == Visibility::Hidden {
                        tracing::debug!(%scope, "live refresh paused");
                        break;
                    }
                }
                Wakeup::Stopped => {
                    tracing::debug!(%scope, "live refresh stopped");
                    return;
                }
            }
        }
    }
}
