//! Node configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use meshsync_sync::CoordinatorConfig;

/// Configuration for a [`Node`](crate::Node).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeConfig {
    /// Period of the background snapshot task. Zero disables it; a final
    /// snapshot is still written on shutdown.
    #[serde(with = "secs")]
    pub snapshot_interval: Duration,

    /// Also write a snapshot after every accepted publish.
    pub persist_on_publish: bool,

    /// Coordinator configuration.
    pub coordinator: CoordinatorConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            snapshot_interval: Duration::from_secs(30),
            persist_on_publish: true,
            coordinator: CoordinatorConfig::default(),
        }
    }
}

/// Durations as whole seconds.
mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
