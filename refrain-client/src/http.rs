use anyhow::Context;
use async_trait::async_trait;
use reqwest::{RequestBuilder, Url};

use crate::api::{
    Collaborator, Comment, CommentEdit, CommentId, Error, Member, NewComment, NewNotification,
    Notification, NotificationId, ScopeKey, UserEmail,
};

/// Talks to the remote row store over HTTP.
///
/// Rows live under `{host}/api/{dataset}/`. Failed requests answer with the
/// body of an `api::Error`.
pub struct HttpCollaborator {
    client: reqwest::Client,
    host: Url,
}

#[derive(serde::Serialize)]
struct ReactionToggle<'a> {
    emoji: &'a str,
    user: &'a UserEmail,
}

impl HttpCollaborator {
    pub fn new(host: &str) -> anyhow::Result<HttpCollaborator> {
        let host = Url::parse(host).with_context(|| format!("parsing host url {host:?}"))?;
        anyhow::ensure!(!host.cannot_be_a_base(), "host url {host} cannot have a path");
        Ok(HttpCollaborator {
            client: reqwest::Client::new(),
            host,
        })
    }

    /// Reads the host from `REFRAIN_HOST`
    pub fn from_env() -> anyhow::Result<HttpCollaborator> {
        let host =
            std::env::var("REFRAIN_HOST").context("retrieving REFRAIN_HOST environment variable")?;
        HttpCollaborator::new(&host)
    }

    fn url(&self, dataset: &str, path: &[&str]) -> Url {
        let mut url = self.host.clone();
        url.path_segments_mut()
            .expect("checked in constructor")
            .pop_if_empty()
            .extend(["api", dataset])
            .extend(path);
        url
    }

    fn comments_url(&self, scope: &ScopeKey, path: &[&str]) -> Url {
        let mut full = vec!["comments", scope.entity_type.as_str(), scope.entity_id.0.as_str()];
        full.extend_from_slice(path);
        self.url(&scope.dataset, &full)
    }
}

async fn send(req: RequestBuilder) -> Result<reqwest::Response, Error> {
    let resp = req
        .send()
        .await
        .map_err(|err| Error::Unavailable(err.to_string()))?;
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let body = resp
        .bytes()
        .await
        .map_err(|err| Error::Unavailable(err.to_string()))?;
    Err(Error::parse(&body).unwrap_or_else(|err| {
        tracing::warn!(%status, ?body, %err, "remote store sent an unparseable error");
        Error::Unknown(format!("remote store answered {status}"))
    }))
}

async fn send_json<T: serde::de::DeserializeOwned>(req: RequestBuilder) -> Result<T, Error> {
    send(req)
        .await?
        .json()
        .await
        .map_err(|err| Error::Unknown(format!("decoding remote store answer: {err}")))
}

#[async_trait]
impl Collaborator for HttpCollaborator {
    async fn fetch_comments(&self, scope: &ScopeKey) -> Result<Vec<Comment>, Error> {
        send_json(self.client.get(self.comments_url(scope, &[]))).await
    }

    async fn create_comment(&self, scope: &ScopeKey, draft: NewComment) -> Result<Comment, Error> {
        send_json(self.client.post(self.comments_url(scope, &[])).json(&draft)).await
    }

    async fn update_comment(
        &self,
        scope: &ScopeKey,
        comment: &CommentId,
        edit: &CommentEdit,
    ) -> Result<(), Error> {
        send(
            self.client
                .patch(self.comments_url(scope, &[comment.0.as_str()]))
                .json(edit),
        )
        .await
        .map(|_| ())
    }

    async fn toggle_reaction(
        &self,
        scope: &ScopeKey,
        comment: &CommentId,
        emoji: &str,
        user: &UserEmail,
    ) -> Result<Comment, Error> {
        send_json(
            self.client
                .post(self.comments_url(scope, &[comment.0.as_str(), "reactions"]))
                .json(&ReactionToggle { emoji, user }),
        )
        .await
    }

    async fn create_notification(
        &self,
        scope: &ScopeKey,
        draft: NewNotification,
    ) -> Result<Notification, Error> {
        send_json(
            self.client
                .post(self.url(&scope.dataset, &["notifications"]))
                .json(&draft),
        )
        .await
    }

    async fn create_notifications(
        &self,
        scope: &ScopeKey,
        drafts: Vec<NewNotification>,
    ) -> Result<Vec<Notification>, Error> {
        send_json(
            self.client
                .post(self.url(&scope.dataset, &["notifications", "batch"]))
                .json(&drafts),
        )
        .await
    }

    async fn fetch_members(&self, dataset: &str) -> Result<Vec<Member>, Error> {
        send_json(self.client.get(self.url(dataset, &["members"]))).await
    }

    async fn fetch_notifications(
        &self,
        dataset: &str,
        recipient: &UserEmail,
    ) -> Result<Vec<Notification>, Error> {
        send_json(
            self.client
                .get(self.url(dataset, &["notifications"]))
                .query(&[("recipient", recipient.as_str())]),
        )
        .await
    }

    async fn mark_notification_read(
        &self,
        dataset: &str,
        id: &NotificationId,
    ) -> Result<(), Error> {
        send(
            self.client
                .post(self.url(dataset, &["notifications", id.0.as_str(), "read"])),
        )
        .await
        .map(|_| ())
    }
}
