//! Coordinator configuration.

use serde::{Deserialize, Serialize};

/// Tunables for a [`Coordinator`](crate::Coordinator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CoordinatorConfig {
    /// Reported by `info`.
    pub node_name: String,

    /// Re-fan relayed messages out to `messages` subscribers.
    pub fanout_on_relay: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            node_name: "meshsync".to_string(),
            fanout_on_relay: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: CoordinatorConfig = serde_json::from_str(r#"{"nodeName":"drone-1"}"#).unwrap();
        assert_eq!(config.node_name, "drone-1");
        assert!(config.fanout_on_relay);
    }
}
