//! Property tests: queue order and depth under arbitrary enqueue/remove mixes.

use muster_core::models::{EntityType, MutationAction};
use muster_storage::StorageEngine;
use proptest::prelude::*;
use serde_json::json;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn drain_preserves_enqueue_order(ids in prop::collection::vec("[a-z]{1,8}", 1..20)) {
        let rt = runtime();
        let drained_ids = rt.block_on(async {
            let storage = StorageEngine::open_in_memory().unwrap();
            for id in &ids {
                storage
                    .enqueue(EntityType::Member, MutationAction::Delete, &json!({"id": id}))
                    .await
                    .unwrap();
            }
            storage
                .drain()
                .await
                .unwrap()
                .into_iter()
                .map(|m| m.payload["id"].as_str().unwrap().to_string())
                .collect::<Vec<_>>()
        });
        prop_assert_eq!(drained_ids, ids);
    }

    #[test]
    fn count_matches_enqueues_minus_removals(
        n in 1usize..15,
        removals in prop::collection::vec(any::<prop::sample::Index>(), 0..10),
    ) {
        let rt = runtime();
        let (count, expected, ascending) = rt.block_on(async {
            let storage = StorageEngine::open_in_memory().unwrap();
            let mut seqs = Vec::new();
            for i in 0..n {
                let seq = storage
                    .enqueue(EntityType::Meeting, MutationAction::Delete, &json!({"id": i.to_string()}))
                    .await
                    .unwrap();
                seqs.push(seq);
            }
            let mut removed = std::collections::HashSet::new();
            for idx in &removals {
                let seq = seqs[idx.index(seqs.len())];
                let was_present = storage.remove(seq).await.unwrap();
                assert_eq!(was_present, removed.insert(seq));
            }
            let drained = storage.drain().await.unwrap();
            let ascending = drained.windows(2).all(|w| w[0].local_seq < w[1].local_seq);
            (storage.count().await.unwrap(), n - removed.len(), ascending)
        });
        prop_assert_eq!(count, expected);
        prop_assert!(ascending);
    }
}
