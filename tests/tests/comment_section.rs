use std::{sync::Arc, time::Duration};

use refrain_api::{
    EntityId, EntityType, Member, NotificationType, ReactionsExt, ScopeKey, UserEmail,
};
use refrain_client::{
    ClientConfig, CommentView, EntityInfo, Inbox, LiveRefresh, Visibility,
};
use refrain_mock_server::{MockServer, Op, Seed};

fn init_tracing() {
    if std::env::var("RUST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt::try_init();
    }
}

fn ana() -> Member {
    Member::new("ana@example.com", "Ana")
}

fn ben() -> Member {
    Member::new("ben@example.com", "Ben")
}

fn cleo() -> Member {
    Member::new("cleo@example.com", "Cleo")
}

fn config() -> ClientConfig {
    ClientConfig {
        dataset: String::from("spring"),
        ..ClientConfig::default()
    }
}

fn song() -> EntityInfo {
    EntityInfo {
        entity_type: EntityType::Song,
        entity_id: EntityId(String::from("song-7")),
        title: Some(String::from("Paper Boats")),
        owner: Some(ben().email),
    }
}

fn server() -> Arc<MockServer> {
    init_tracing();
    let seed: Seed = serde_json::from_value(serde_json::json!({
        "dataset": "spring",
        "members": [
            { "email": "Ana@Example.com", "name": "Ana" },
            { "email": "ben@example.com", "name": "Ben" },
            { "email": "cleo@example.com", "name": "Cleo" },
        ],
        "comments": [],
    }))
    .unwrap();
    Arc::new(MockServer::from_seed(seed))
}

fn view(server: &Arc<MockServer>, actor: Member) -> Arc<CommentView> {
    Arc::new(CommentView::new(server.clone(), &config(), actor, song()))
}

async fn inbox_of(server: &Arc<MockServer>, who: &Member) -> Inbox {
    let mut inbox = Inbox::new(server.clone(), String::from("spring"), who.email.clone());
    inbox.load().await.unwrap();
    inbox
}

#[tokio::test]
async fn conversation_between_two_sessions() {
    let server = server();
    let ana_view = view(&server, ana());
    let ben_view = view(&server, ben());
    ana_view.load_members().await.unwrap();

    // Ana comments on Ben's song, mentioning Cleo through the composer
    let mut composer = ana_view.composer();
    composer.set_input("Great hook, @cle", 16);
    assert_eq!(composer.suggestions().len(), 1);
    composer.insert(0).unwrap();
    let (text, mentions) = composer.take_submission();
    let comment = ana_view.post_comment(&text, &mentions).await.unwrap();
    ana_view.settle().await;

    // Ben sees it after a load, and got notified
    ben_view.load().await.unwrap();
    let threads = ben_view.threads();
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].0.text, "Great hook, @Cleo ");

    let ben_inbox = inbox_of(&server, &ben()).await;
    assert_eq!(ben_inbox.unread_count(), 1);
    assert_eq!(ben_inbox.notifications()[0].kind, NotificationType::CommentOnSong);
    assert_eq!(
        ben_inbox.notifications()[0].message,
        "Ana commented on \"Paper Boats\""
    );
    let cleo_inbox = inbox_of(&server, &cleo()).await;
    assert_eq!(cleo_inbox.notifications()[0].kind, NotificationType::MentionInComment);

    // Ben replies and reacts
    ben_view
        .post_reply(&comment.id, "thanks!", &[])
        .await
        .unwrap();
    ben_view.toggle_reaction(&comment.id, "🙌").await.unwrap();
    ben_view.settle().await;

    ana_view.load().await.unwrap();
    let threads = ana_view.threads();
    assert_eq!(threads[0].1.len(), 1);
    assert_eq!(threads[0].1[0].author, "Ben");
    assert_eq!(threads[0].0.reactions.count("🙌"), 1);

    let mut ana_inbox = inbox_of(&server, &ana()).await;
    let kinds = ana_inbox
        .notifications()
        .iter()
        .map(|n| n.kind)
        .collect::<Vec<_>>();
    assert_eq!(kinds.len(), 2);
    assert!(kinds.contains(&NotificationType::ReplyToComment));
    assert!(kinds.contains(&NotificationType::ReactionOnComment));
    ana_inbox.mark_all_read().await.unwrap();
    assert_eq!(inbox_of(&server, &ana()).await.unread_count(), 0);
}

#[tokio::test]
async fn optimistic_entries_survive_an_outage() {
    let server = server();
    let ana_view = view(&server, ana());
    let scope = ScopeKey::new("spring", EntityType::Song, "song-7");

    server.fail_all(
        Op::CreateComment,
        refrain_api::Error::Unavailable(String::from("offline")),
    );
    let local = ana_view.post_comment("draft idea", &[]).await.unwrap();
    assert!(local.id.is_placeholder());
    assert!(server.test_comments(&scope).is_empty());

    server.fail_all(
        Op::FetchComments,
        refrain_api::Error::Unavailable(String::from("offline")),
    );
    assert!(ana_view.load().await.is_err());
    assert!(ana_view.read(|s| s.is_stale()));
    assert_eq!(ana_view.threads().len(), 1);

    server.recover(Op::FetchComments);
    server.recover(Op::CreateComment);
    ana_view.load().await.unwrap();
    assert_eq!(ana_view.threads().len(), 1);
    assert!(ana_view.threads()[0].0.id.is_placeholder());

    // reactions on an unsaved comment are rejected remotely and rolled back
    assert!(ana_view.toggle_reaction(&local.id, "🔥").await.is_err());
    assert!(!ana_view
        .comment(&local.id)
        .unwrap()
        .reactions
        .has_reacted("🔥", &UserEmail::new("ana@example.com")));
}

#[tokio::test(start_paused = true)]
async fn live_refresh_shows_other_sessions() {
    let server = server();
    let ana_view = view(&server, ana());
    let ben_view = view(&server, ben());
    ana_view.load().await.unwrap();
    let refresher = LiveRefresh::start(
        ana_view.clone(),
        config().refresh_interval,
        Visibility::Visible,
    );

    ben_view.post_comment("new verse up", &[]).await.unwrap();
    assert!(ana_view.threads().is_empty());
    tokio::time::sleep(config().refresh_interval + Duration::from_millis(1)).await;
    assert_eq!(ana_view.threads().len(), 1);

    refresher.set_visibility(Visibility::Hidden);
    ben_view.post_comment("and a bridge", &[]).await.unwrap();
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(ana_view.threads().len(), 1);

    refresher.set_visibility(Visibility::Visible);
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(ana_view.threads().len(), 2);
    refresher.stop().await;
}
