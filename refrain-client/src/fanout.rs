use std::collections::HashSet;

use crate::api::{
    Comment, EntityId, EntityType, Member, NewNotification, NotificationType, Time, UserEmail,
};

/// What the view knows about the commented-on item
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EntityInfo {
    pub entity_type: EntityType,
    pub entity_id: EntityId,
    pub title: Option<String>,
    /// Who to tell about new comments, for songs
    pub owner: Option<UserEmail>,
}

impl EntityInfo {
    fn subject(&self) -> String {
        match &self.title {
            Some(title) if !title.trim().is_empty() => format!("\"{title}\""),
            _ => String::from(self.entity_type.noun_phrase()),
        }
    }
}

/// The action that may cause notifications
#[derive(Clone, Copy, Debug)]
pub enum Trigger<'a> {
    NewComment {
        comment: &'a Comment,
        mentions: &'a [Member],
    },
    Reply {
        reply: &'a Comment,
        parent: &'a Comment,
        mentions: &'a [Member],
    },
    /// Only additions notify; a removal is not a trigger
    ReactionAdded { comment: &'a Comment, emoji: &'a str },
}

impl<'a> Trigger<'a> {
    fn reference(&self) -> &'a Comment {
        match *self {
            Trigger::NewComment { comment, .. } => comment,
            Trigger::Reply { reply, .. } => reply,
            Trigger::ReactionAdded { comment, .. } => comment,
        }
    }
}

/// Computes who to notify about `trigger`, performed by `actor`.
///
/// Each recipient gets at most one notification per trigger: an owner or
/// parent author already notified is not notified again for a mention, and
/// the actor is never notified.
pub fn fan_out(
    trigger: &Trigger<'_>,
    actor: &Member,
    entity: &EntityInfo,
    now: Time,
) -> Vec<NewNotification> {
    let mut notified = HashSet::new();
    notified.insert(actor.email.clone());
    let subject = entity.subject();
    let reference = trigger.reference();
    let mut res = Vec::new();
    let mut notify = |recipient: &UserEmail, kind, message: String| {
        if notified.insert(recipient.clone()) {
            res.push(NewNotification {
                recipient_email: recipient.clone(),
                kind,
                trigger_user_email: actor.email.clone(),
                trigger_user_name: actor.name.clone(),
                entity_type: entity.entity_type,
                entity_id: entity.entity_id.clone(),
                reference_id: reference.id.clone(),
                message,
                created_at: now,
            });
        }
    };

    let mentions: &[Member] = match *trigger {
        Trigger::NewComment { mentions, .. } => {
            if let (EntityType::Song, Some(owner)) = (entity.entity_type, &entity.owner) {
                notify(
                    owner,
                    NotificationType::CommentOnSong,
                    format!("{} commented on {subject}", actor.name),
                );
            }
            mentions
        }
        Trigger::Reply {
            parent, mentions, ..
        } => {
            notify(
                &parent.author_email,
                NotificationType::ReplyToComment,
                format!("{} replied to your comment on {subject}", actor.name),
            );
            mentions
        }
        Trigger::ReactionAdded { comment, emoji } => {
            notify(
                &comment.author_email,
                NotificationType::ReactionOnComment,
                format!("{} reacted {emoji} to your comment on {subject}", actor.name),
            );
            &[]
        }
    };
    for m in mentions {
        notify(
            &m.email,
            NotificationType::MentionInComment,
            format!("{} mentioned you in a comment on {subject}", actor.name),
        );
    }
    res
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::api::{CommentId, Reactions};

    fn member(name: &str) -> Member {
        Member::new(&format!("{}@example.com", name.to_lowercase()), name)
    }

    fn song(owner: &str, title: Option<&str>) -> EntityInfo {
        EntityInfo {
            entity_type: EntityType::Song,
            entity_id: EntityId(String::from("song-1")),
            title: title.map(String::from),
            owner: Some(member(owner).email),
        }
    }

    fn comment(id: &str, by: &Member, parent: Option<&str>) -> Comment {
        Comment {
            id: CommentId(String::from(id)),
            entity_type: EntityType::Song,
            entity_id: EntityId(String::from("song-1")),
            parent_id: parent.map(|p| CommentId(String::from(p))),
            author: by.name.clone(),
            author_email: by.email.clone(),
            text: String::from("Love this bridge!"),
            timestamp: Utc::now(),
            reactions: Reactions::new(),
            edited_at: None,
        }
    }

    fn summary(ns: &[NewNotification]) -> Vec<(&str, NotificationType)> {
        ns.iter()
            .map(|n| (n.recipient_email.as_str(), n.kind))
            .collect()
    }

    #[test]
    fn top_level_comment_notifies_song_owner() {
        let a = member("Ana");
        let c = comment("rec1", &a, None);
        let res = fan_out(
            &Trigger::NewComment {
                comment: &c,
                mentions: &[],
            },
            &a,
            &song("Ben", Some("Midnight Train")),
            Utc::now(),
        );
        assert_eq!(summary(&res), vec![("ben@example.com", NotificationType::CommentOnSong)]);
        assert_eq!(res[0].reference_id, c.id);
        assert_eq!(res[0].trigger_user_email, a.email);
        assert_eq!(res[0].message, "Ana commented on \"Midnight Train\"");
    }

    #[test]
    fn own_song_and_other_entities_do_not_notify_owner() {
        let a = member("Ana");
        let c = comment("rec1", &a, None);
        let trigger = Trigger::NewComment {
            comment: &c,
            mentions: &[],
        };
        assert!(fan_out(&trigger, &a, &song("Ana", None), Utc::now()).is_empty());

        let mut prompt = song("Ben", None);
        prompt.entity_type = EntityType::Prompt;
        assert!(fan_out(&trigger, &a, &prompt, Utc::now()).is_empty());

        let mut unowned = song("Ben", None);
        unowned.owner = None;
        assert!(fan_out(&trigger, &a, &unowned, Utc::now()).is_empty());
    }

    #[test]
    fn reply_with_mentions_dedups_parent_author() {
        let (a, b, c) = (member("Ana"), member("Ben"), member("Cleo"));
        let parent = comment("rec1", &b, None);
        let reply = comment("rec2", &a, Some("rec1"));
        let mentions = [b.clone(), c.clone(), a.clone(), c.clone()];
        let res = fan_out(
            &Trigger::Reply {
                reply: &reply,
                parent: &parent,
                mentions: &mentions,
            },
            &a,
            &song("Dan", None),
            Utc::now(),
        );
        assert_eq!(
            summary(&res),
            vec![
                ("ben@example.com", NotificationType::ReplyToComment),
                ("cleo@example.com", NotificationType::MentionInComment),
            ]
        );
        assert!(res.iter().all(|n| n.reference_id == reply.id));
        assert_eq!(res[0].message, "Ana replied to your comment on a song");
    }

    #[test]
    fn replying_to_yourself_only_notifies_mentions() {
        let (a, c) = (member("Ana"), member("Cleo"));
        let parent = comment("rec1", &a, None);
        let reply = comment("rec2", &a, Some("rec1"));
        let res = fan_out(
            &Trigger::Reply {
                reply: &reply,
                parent: &parent,
                mentions: &[c],
            },
            &a,
            &song("Ana", None),
            Utc::now(),
        );
        assert_eq!(
            summary(&res),
            vec![("cleo@example.com", NotificationType::MentionInComment)]
        );
    }

    #[test]
    fn owner_mentioned_in_top_level_comment_is_notified_once() {
        let (a, b) = (member("Ana"), member("Ben"));
        let c = comment("rec1", &a, None);
        let mentions = [b.clone()];
        let res = fan_out(
            &Trigger::NewComment {
                comment: &c,
                mentions: &mentions,
            },
            &a,
            &song("Ben", None),
            Utc::now(),
        );
        assert_eq!(summary(&res), vec![("ben@example.com", NotificationType::CommentOnSong)]);
    }

    #[test]
    fn reactions() {
        let (a, b) = (member("Ana"), member("Ben"));
        let c = comment("rec1", &b, None);
        let mut entity = song("Ben", None);
        entity.entity_type = EntityType::Assignment;
        let res = fan_out(
            &Trigger::ReactionAdded {
                comment: &c,
                emoji: "🔥",
            },
            &a,
            &entity,
            Utc::now(),
        );
        assert_eq!(
            summary(&res),
            vec![("ben@example.com", NotificationType::ReactionOnComment)]
        );
        assert_eq!(res[0].message, "Ana reacted 🔥 to your comment on an assignment");

        let own = fan_out(
            &Trigger::ReactionAdded {
                comment: &c,
                emoji: "🔥",
            },
            &b,
            &entity,
            Utc::now(),
        );
        assert!(own.is_empty());
    }

    #[test]
    fn never_two_notifications_to_one_recipient() {
        let people = ["Ana", "Ben", "Cleo", "Dan"].map(member);
        bolero::check!()
            .with_type::<(u8, u8, u8, Vec<u8>, bool)>()
            .cloned()
            .for_each(|(actor, owner, parent_author, mentioned, is_reply)| {
                let pick = |i: u8| &people[i as usize % people.len()];
                let actor = pick(actor);
                let parent = comment("rec1", pick(parent_author), None);
                let new = comment("rec2", actor, is_reply.then_some("rec1"));
                let mentions = mentioned.into_iter().map(|i| pick(i).clone()).collect::<Vec<_>>();
                let trigger = match is_reply {
                    true => Trigger::Reply {
                        reply: &new,
                        parent: &parent,
                        mentions: &mentions,
                    },
                    false => Trigger::NewComment {
                        comment: &new,
                        mentions: &mentions,
                    },
                };
                let res = fan_out(&trigger, actor, &song(&pick(owner).name, None), Utc::now());
                let recipients = res.iter().map(|n| &n.recipient_email).collect::<HashSet<_>>();
                assert_eq!(recipients.len(), res.len());
                assert!(!recipients.contains(&actor.email));
            })
    }
}
