//! Last-write-wins merge over messages.
//!
//! A message set is a map of LWW registers keyed by [`MessageId`]. Conflicts
//! are resolved per record by comparing `created_at` only: no per-field merge,
//! no vector clocks, no causal ordering beyond the wall-clock timestamp.

use std::collections::BTreeMap;

use crate::message::Message;
use crate::types::MessageId;

/// What happened when a single message was merged into a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The ID was unknown; the message was inserted as-is.
    Inserted,
    /// The incoming message won and replaced the existing record.
    Replaced,
    /// The existing record won (or tied) and was kept.
    Kept,
}

/// Pick the winner of two versions of the same message.
///
/// Returns `remote` only if its `created_at` is strictly greater; ties keep
/// `local`.
pub fn merge<'a>(local: &'a Message, remote: &'a Message) -> &'a Message {
    if remote.created_at > local.created_at {
        remote
    } else {
        local
    }
}

/// Merge one message into a map in place.
pub fn merge_into(map: &mut BTreeMap<MessageId, Message>, incoming: Message) -> MergeOutcome {
    match map.get_mut(&incoming.id) {
        None => {
            map.insert(incoming.id.clone(), incoming);
            MergeOutcome::Inserted
        }
        Some(existing) => {
            if std::ptr::eq(merge(existing, &incoming), &incoming) {
                *existing = incoming;
                MergeOutcome::Replaced
            } else {
                MergeOutcome::Kept
            }
        }
    }
}

/// Merge a batch of incoming messages into an existing map.
///
/// Unknown IDs are inserted as-is; known IDs are resolved with [`merge`].
/// Incoming messages are applied in order, so a batch that repeats an ID is
/// resolved the same way as two consecutive merges.
pub fn merge_all<I>(mut existing: BTreeMap<MessageId, Message>, incoming: I) -> BTreeMap<MessageId, Message>
where
    I: IntoIterator<Item = Message>,
{
    for message in incoming {
        merge_into(&mut existing, message);
    }
    existing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageBuilder;
    use proptest::prelude::*;

    fn msg(id: &str, content: &str, created_at: i64) -> Message {
        MessageBuilder::new(id, "author")
            .content(content)
            .created_at(created_at)
            .build()
    }

    #[test]
    fn test_merge_newer_remote_wins() {
        let local = msg("m", "old", 100);
        let remote = msg("m", "new", 200);
        assert_eq!(merge(&local, &remote).content, "new");
        assert_eq!(merge(&remote, &local).content, "new");
    }

    #[test]
    fn test_merge_tie_keeps_local() {
        let local = msg("m", "local", 100);
        let remote = msg("m", "remote", 100);
        assert_eq!(merge(&local, &remote).content, "local");
    }

    #[test]
    fn test_merge_into_outcomes() {
        let mut map = BTreeMap::new();
        assert_eq!(merge_into(&mut map, msg("m", "a", 100)), MergeOutcome::Inserted);
        assert_eq!(merge_into(&mut map, msg("m", "b", 50)), MergeOutcome::Kept);
        assert_eq!(merge_into(&mut map, msg("m", "c", 100)), MergeOutcome::Kept);
        assert_eq!(merge_into(&mut map, msg("m", "d", 150)), MergeOutcome::Replaced);
        assert_eq!(map.len(), 1);
        assert_eq!(map[&MessageId::from("m")].content, "d");
    }

    #[test]
    fn test_merge_all_inserts_and_resolves() {
        let existing: BTreeMap<_, _> = [msg("a", "a1", 10), msg("b", "b1", 10)]
            .into_iter()
            .map(|m| (m.id.clone(), m))
            .collect();

        let merged = merge_all(existing, vec![msg("b", "b2", 20), msg("c", "c1", 5), msg("a", "a0", 1)]);

        assert_eq!(merged.len(), 3);
        assert_eq!(merged[&MessageId::from("a")].content, "a1");
        assert_eq!(merged[&MessageId::from("b")].content, "b2");
        assert_eq!(merged[&MessageId::from("c")].content, "c1");
    }

    #[test]
    fn test_merge_replaces_record_wholesale() {
        let mut map = BTreeMap::new();
        merge_into(
            &mut map,
            MessageBuilder::new("m", "alice").content("x").created_at(1).sequence(7).build(),
        );
        merge_into(
            &mut map,
            MessageBuilder::new("m", "bob").content("y").created_at(2).sequence(3).build(),
        );
        let m = &map[&MessageId::from("m")];
        assert_eq!(m.author_id.as_str(), "bob");
        assert_eq!(m.sequence, 3);
    }

    proptest! {
        #[test]
        fn merge_strictly_newer_wins_both_ways(
            t1 in 0i64..1_000_000,
            dt in 1i64..1_000_000,
            c1 in "[a-z]{0,8}",
            c2 in "[a-z]{0,8}",
        ) {
            let newer = msg("same", &c1, t1 + dt);
            let older = msg("same", &c2, t1);
            prop_assert_eq!(merge(&newer, &older), &newer);
            prop_assert_eq!(merge(&older, &newer), &newer);
        }

        #[test]
        fn merge_all_is_order_independent_for_distinct_timestamps(
            stamps in prop::collection::hash_set(0i64..10_000, 1..8),
        ) {
            let versions: Vec<Message> = stamps
                .iter()
                .map(|t| msg("x", &t.to_string(), *t))
                .collect();
            let mut reversed = versions.clone();
            reversed.reverse();

            let a = merge_all(BTreeMap::new(), versions);
            let b = merge_all(BTreeMap::new(), reversed);
            prop_assert_eq!(a, b);
        }
    }
}
