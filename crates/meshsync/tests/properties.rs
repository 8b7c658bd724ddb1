//! Property tests over the JSON request surface.

use proptest::prelude::*;
use serde_json::json;

use meshsync::{handle_json, Operation};
use meshsync_testkit::{join_request, TestNode};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn mutating_operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        Just(Operation::Join),
        Just(Operation::Publish),
        Just(Operation::Sync),
        Just(Operation::Relay),
    ]
}

/// Bodies that are well-formed JSON but rarely the right shape.
fn json_body() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        Just(json!(null)),
        any::<bool>().prop_map(|b| json!(b)),
        any::<i32>().prop_map(|n| json!(n)),
        "[a-z]{0,6}".prop_map(|s| json!(s)),
    ];
    let value = leaf.prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(|v| json!(v)),
            prop::collection::btree_map(
                prop_oneof![
                    Just("type".to_string()),
                    Just("data".to_string()),
                    Just("peerId".to_string()),
                    Just("messages".to_string()),
                    "[a-z]{1,6}",
                ],
                inner,
                0..4,
            )
            .prop_map(|m| json!(m)),
        ]
    });
    value.prop_map(|v| v.to_string())
}

proptest! {
    #[test]
    fn test_rejected_requests_change_nothing(
        op in mutating_operation(),
        body in prop_oneof![json_body(), ".{0,24}"],
    ) {
        runtime().block_on(async {
            let t = TestNode::start("n").await;
            t.node.join(join_request("a")).await;
            let before = t.node.info().await;
            let peers = t.node.peers().await;

            if let Err(err) = handle_json(&t.node, op, &body).await {
                assert!(err.is_client_error(), "{op} {body}: {err}");
                assert_eq!(t.node.info().await, before);
                assert_eq!(t.node.peers().await, peers);
            }
        });
    }

    #[test]
    fn test_operation_names_round_trip(op in prop_oneof![
        Just(Operation::Join),
        Just(Operation::Publish),
        Just(Operation::Sync),
        Just(Operation::Relay),
        Just(Operation::Topics),
        Just(Operation::Info),
        Just(Operation::Peers),
        Just(Operation::Messages),
    ]) {
        prop_assert_eq!(op.as_str().parse::<Operation>().unwrap(), op);
        prop_assert_eq!(format!("/{op}").parse::<Operation>().unwrap(), op);
    }
}
