use std::fmt;

/// Stable identity key of a community member.
///
/// Emails are compared case-insensitively everywhere (edit rights, reaction
/// sets, notification recipients), so the normalized form is the only one we
/// ever store.
#[derive(
    Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(from = "String")]
pub struct UserEmail(String);

impl UserEmail {
    pub fn new(email: &str) -> UserEmail {
        UserEmail(email.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for UserEmail {
    fn from(s: String) -> UserEmail {
        UserEmail::new(&s)
    }
}

impl From<&str> for UserEmail {
    fn from(s: &str) -> UserEmail {
        UserEmail::new(s)
    }
}

impl fmt::Display for UserEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Someone who can author comments and be mentioned
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Member {
    pub email: UserEmail,
    pub name: String,
}

impl Member {
    pub fn new(email: &str, name: &str) -> Member {
        Member {
            email: UserEmail::new(email),
            name: String::from(name),
        }
    }
}
