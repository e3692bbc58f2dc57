use anyhow::Context;
use chrono::{Duration, Utc};
use rand::{seq::SliceRandom, Rng};
use refrain_api::{
    Comment, CommentId, EntityType, Member, NewComment, NewNotification, Notification,
    NotificationId, NotificationType, ScopeKey,
};
use refrain_mock_server::Seed;

const NUM_MEMBERS: usize = 8;
const NUM_ENTITIES_PER_TYPE: usize = 5;

const NUM_COMMENTS: usize = 120;
const REPLY_PROBABILITY: f64 = 0.4;
const COMMENT_WORD_COUNT: usize = 20;

const REACTION_PROBABILITY: f64 = 0.3;
const EMOJIS: [&str; 6] = ["❤️", "🔥", "👏", "🎵", "😂", "🙌"];

const NUM_NOTIFICATIONS: usize = 40;

fn main() -> anyhow::Result<()> {
    let dataset = std::env::args().nth(1).unwrap_or_else(|| String::from("default"));
    let mut rng = rand::thread_rng();

    // Generate members
    let members = (0..NUM_MEMBERS)
        .map(|i| {
            let name = lipsum::lipsum_title()
                .split_whitespace()
                .next()
                .map(String::from)
                .unwrap_or_else(|| format!("Member{i}"));
            Member::new(&format!("{}.{i}@example.com", name.to_lowercase()), &name)
        })
        .collect::<Vec<_>>();

    // Generate entities
    let ds = dataset.as_str();
    let scopes = [EntityType::Song, EntityType::Prompt, EntityType::Assignment]
        .into_iter()
        .flat_map(|t| {
            (0..NUM_ENTITIES_PER_TYPE)
                .map(move |i| ScopeKey::new(ds, t, &format!("{}-{i}", t.as_str())))
        })
        .collect::<Vec<_>>();

    // Generate comments, replies only pointing to earlier comments of the same entity
    let mut comments: Vec<(ScopeKey, Comment)> = Vec::new();
    for i in 0..NUM_COMMENTS {
        let scope = scopes.choose(&mut rng).context("no entities")?.clone();
        let author = members.choose(&mut rng).context("no members")?;
        let parent = match rng.gen_bool(REPLY_PROBABILITY) {
            false => None,
            true => comments
                .iter()
                .filter(|(s, c)| *s == scope && c.parent_id.is_none())
                .map(|(_, c)| c.id.clone())
                .collect::<Vec<_>>()
                .choose(&mut rng)
                .cloned(),
        };
        let draft = NewComment {
            entity_type: scope.entity_type,
            entity_id: scope.entity_id.clone(),
            parent_id: parent,
            author: author.name.clone(),
            author_email: author.email.clone(),
            text: lipsum::lipsum_words(COMMENT_WORD_COUNT),
            timestamp: Utc::now() - Duration::minutes(((NUM_COMMENTS - i) * 17) as i64),
        };
        let mut comment = Comment::from_draft(CommentId(format!("seed-rec{i}")), draft);
        for m in &members {
            if rng.gen_bool(REACTION_PROBABILITY) {
                let emoji = EMOJIS.choose(&mut rng).context("no emojis")?;
                comment.toggle_reaction(emoji, &m.email);
            }
        }
        comments.push((scope, comment));
    }

    // Generate notifications about the generated comments
    let mut notifications = Vec::new();
    for i in 0..NUM_NOTIFICATIONS {
        let (_, comment) = comments.choose(&mut rng).context("no comments")?;
        let recipient = members.choose(&mut rng).context("no members")?;
        let draft = NewNotification {
            recipient_email: recipient.email.clone(),
            kind: NotificationType::MentionInComment,
            trigger_user_email: comment.author_email.clone(),
            trigger_user_name: comment.author.clone(),
            entity_type: comment.entity_type,
            entity_id: comment.entity_id.clone(),
            reference_id: comment.id.clone(),
            message: format!(
                "{} mentioned you in a comment on {}",
                comment.author,
                comment.entity_type.noun_phrase()
            ),
            created_at: comment.timestamp,
        };
        let mut notification =
            Notification::from_draft(NotificationId(format!("seed-ntf{i}")), draft);
        notification.read = rng.gen_bool(0.5);
        notifications.push(notification);
    }

    let seed = Seed {
        dataset,
        members,
        comments,
        notifications,
    };
    serde_json::to_writer_pretty(std::io::stdout().lock(), &seed).context("writing seed")?;
    println!();
    Ok(())
}
