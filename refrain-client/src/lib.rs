mod config;
pub use config::{ClientConfig, DEFAULT_REFRESH_INTERVAL, DEFAULT_SUGGESTION_LIMIT};

mod dispatch;

mod error;
pub use error::{Error, NotificationDeliveryError, WriteOp};

mod fanout;
pub use fanout::{fan_out, EntityInfo, Trigger};

mod http;
pub use http::HttpCollaborator;

mod inbox;
pub use inbox::Inbox;

pub mod mention;
pub use mention::MentionComposer;

mod refresh;
pub use refresh::{LiveRefresh, Visibility, MIN_REFRESH_INTERVAL};

mod store;
pub use store::{CommentStore, Thread};

mod view;
pub use view::CommentView;

pub mod api {
    pub use refrain_api::*;
}

pub mod prelude {
    pub use crate::api::ReactionsExt;
}
