//! Fanout: choosing and notifying the peers interested in an event.
//!
//! A plan is computed while the state lock is held and delivered after it is
//! released. Delivery failures are logged and reported, never rolled back.

use meshsync_core::PeerId;

use crate::messages::RelayEvent;
use crate::registry::PeerRegistry;
use crate::transport::Transport;

/// An event and the peers it should reach.
#[derive(Debug, Clone, PartialEq)]
pub struct FanoutPlan {
    pub event: RelayEvent,
    pub targets: Vec<PeerId>,
}

/// How a plan's delivery went.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub unreachable: Vec<PeerId>,
}

/// Computes fanout sets from topic subscriptions.
pub struct Broadcaster;

impl Broadcaster {
    /// Plan delivery of `event` to the known subscribers of any of `topics`.
    pub fn plan(registry: &PeerRegistry, event: RelayEvent, topics: &[&str]) -> FanoutPlan {
        let targets: Vec<PeerId> = registry.subscribers(topics).into_iter().collect();
        tracing::debug!(
            kind = event.kind(),
            topics = ?topics,
            targets = targets.len(),
            "fanout planned"
        );
        FanoutPlan { event, targets }
    }
}

impl FanoutPlan {
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Deliver to every target, one at a time.
    pub async fn deliver<T: Transport + ?Sized>(&self, transport: &T) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        for peer in &self.targets {
            match transport.deliver(peer, &self.event).await {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    tracing::warn!(peer = %peer, kind = self.event.kind(), error = %e, "gossip delivery failed");
                    report.unreachable.push(peer.clone());
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::memory::MemoryNetwork;
    use meshsync_core::{DeviceClass, Peer, TopicEntry, MESSAGES, PRESENCE};

    fn joined(ids: &[&str]) -> PeerRegistry {
        let mut registry = PeerRegistry::new();
        for id in ids {
            registry.join(Peer::new(*id, *id, DeviceClass::Laptop, 0));
        }
        registry
    }

    fn event() -> RelayEvent {
        RelayEvent::PeerJoined(Peer::new("new", "New", DeviceClass::Phone, 0))
    }

    #[test]
    fn test_plan_targets_known_subscribers() {
        let registry = joined(&["a", "b"]);
        let plan = Broadcaster::plan(&registry, event(), &[PRESENCE]);
        assert_eq!(plan.targets, vec![PeerId::from("a"), PeerId::from("b")]);
    }

    #[test]
    fn test_plan_unions_topics_without_duplicates() {
        let registry = joined(&["a"]);
        let plan = Broadcaster::plan(&registry, event(), &[PRESENCE, MESSAGES]);
        assert_eq!(plan.targets, vec![PeerId::from("a")]);
    }

    #[test]
    fn test_plan_excludes_unknown_subscribers() {
        let registry = PeerRegistry::restore(
            Vec::new(),
            vec![TopicEntry(PRESENCE.into(), vec![PeerId::from("ghost")])],
        );
        assert!(Broadcaster::plan(&registry, event(), &[PRESENCE]).is_empty());
    }

    #[tokio::test]
    async fn test_deliver_reports_unreachable_peers() {
        let network = MemoryNetwork::new();
        let inbox = network.connect(PeerId::from("a")).await;

        let plan = Broadcaster::plan(&joined(&["a", "b"]), event(), &[PRESENCE]);
        let report = plan.deliver(&network.transport()).await;

        assert_eq!(report.delivered, 1);
        assert_eq!(report.unreachable, vec![PeerId::from("b")]);
        assert_eq!(inbox.drain().await, vec![event()]);
    }
}
