use std::time::Duration;

use anyhow::Context;

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_SUGGESTION_LIMIT: usize = 8;

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Dataset of the remote store holding this community's rows
    pub dataset: String,

    /// Time between two live refreshes of a visible view
    #[serde(with = "secs")]
    pub refresh_interval: Duration,

    /// Maximum number of mention suggestions shown at once
    pub suggestion_limit: usize,
}

impl Default for ClientConfig {
    fn default() -> ClientConfig {
        ClientConfig {
            dataset: String::from("default"),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
        }
    }
}

impl ClientConfig {
    /// Reads `REFRAIN_DATASET` and `REFRAIN_REFRESH_SECS`, falling back to
    /// defaults for whichever is unset
    pub fn from_env() -> anyhow::Result<ClientConfig> {
        let mut config = ClientConfig::default();
        if let Ok(dataset) = std::env::var("REFRAIN_DATASET") {
            config.dataset = dataset;
        }
        if let Ok(secs) = std::env::var("REFRAIN_REFRESH_SECS") {
            let secs: u64 = secs
                .parse()
                .with_context(|| format!("parsing REFRAIN_REFRESH_SECS {secs:?} as seconds"))?;
            anyhow::ensure!(secs > 0, "REFRAIN_REFRESH_SECS must be positive");
            config.refresh_interval = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

mod secs {
    use std::time::Duration;

    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        match u64::deserialize(d)? {
            0 => Err(D::Error::custom("refresh interval must be positive")),
            secs => Ok(Duration::from_secs(secs)),
        }
    }
}
