use hybridrec::algorithms::{BiasedMf, CsrMatrix, LatentFactorModel, RankingModel};
use hybridrec::config::EngineConfig;
use hybridrec::engine::enricher::Enricher;
use hybridrec::engine::IdRegistry;
use hybridrec::{
    EngineHandle, ItemId, ItemMetadata, ModelError, RecommendationEngine, UserId,
};
use ndarray::array;
use std::collections::HashMap;
use std::sync::Arc;

// Fixture universe: users 1, 7, 42 (internal 0..3) and items 10..50
// (internal 0..5). User 1 has interacted with item 10; user 42 with items
// 10, 20, 30, leaving only two eligible candidates.

fn engine_config() -> EngineConfig {
    EngineConfig {
        candidate_pool: 50,
        default_k: 10,
        max_k: 50,
    }
}

fn registry() -> Arc<IdRegistry> {
    Arc::new(IdRegistry::new(
        &[UserId(1), UserId(7), UserId(42)],
        &[ItemId(10), ItemId(20), ItemId(30), ItemId(40), ItemId(50)],
    ))
}

fn retrieval_model() -> Arc<LatentFactorModel> {
    let users = array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
    let items = array![
        [1.0, 0.0],
        [0.9, 0.0],
        [0.0, 1.0],
        [0.5, 0.5],
        [0.1, 0.1]
    ];
    Arc::new(LatentFactorModel::new(users, items).unwrap())
}

fn interactions() -> Arc<CsrMatrix> {
    Arc::new(
        CsrMatrix::new(
            vec![0, 1, 1, 4],
            vec![0, 0, 1, 2],
            vec![5.0, 4.0, 4.0, 4.0],
            5,
        )
        .unwrap(),
    )
}

fn ranking_model() -> Arc<BiasedMf> {
    let mut user_bias = HashMap::new();
    user_bias.insert(UserId(1), 0.1);
    let mut item_bias = HashMap::new();
    item_bias.insert(ItemId(20), -1.0);
    item_bias.insert(ItemId(30), 1.0);
    item_bias.insert(ItemId(40), 0.2);
    item_bias.insert(ItemId(50), 0.0);
    Arc::new(BiasedMf::new(
        3.5,
        1.0,
        5.0,
        user_bias,
        item_bias,
        HashMap::new(),
        HashMap::new(),
    ))
}

fn metadata_table() -> HashMap<ItemId, ItemMetadata> {
    let mut table = HashMap::new();
    table.insert(
        ItemId(30),
        ItemMetadata {
            title: "Dangerous Minds (1995)".to_string(),
            genres: vec!["Drama".to_string()],
        },
    );
    table.insert(
        ItemId(40),
        ItemMetadata {
            title: "Cry, the Beloved Country (1995)".to_string(),
            genres: vec!["Drama".to_string()],
        },
    );
    table
}

fn popularity() -> Vec<ItemId> {
    [2858u64, 260, 1196, 1210, 480]
        .into_iter()
        .map(ItemId)
        .collect()
}

fn engine() -> RecommendationEngine {
    RecommendationEngine::from_parts(
        registry(),
        retrieval_model(),
        interactions(),
        ranking_model(),
        Some(metadata_table()),
        Some(popularity()),
        &engine_config(),
    )
}

fn ids(recs: &[hybridrec::Recommendation]) -> Vec<ItemId> {
    recs.iter().map(|r| r.item_id).collect()
}

#[test]
fn unknown_user_is_served_from_popularity_list() {
    let engine = engine();
    let recs = engine.recommend(UserId(999), 3, false).unwrap();
    assert_eq!(ids(&recs), vec![ItemId(2858), ItemId(260), ItemId(1196)]);
    assert!(recs.iter().all(|r| r.score.is_none()));
}

#[test]
fn unknown_user_respects_any_k_up_to_list_length() {
    let engine = engine();
    for k in 1..=5 {
        let recs = engine.recommend(UserId(999), k, false).unwrap();
        assert_eq!(recs.len(), k);
        assert_eq!(ids(&recs), popularity()[..k].to_vec());
    }
}

#[test]
fn ranked_output_is_sorted_and_a_subset_of_candidates() {
    let engine = engine();
    let recs = engine.recommend(UserId(1), 10, false).unwrap();

    let scores: Vec<f32> = recs.iter().map(|r| r.score.unwrap()).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));

    // Everything user 1 has not interacted with, reordered by the ranker.
    let candidate_universe = [ItemId(20), ItemId(30), ItemId(40), ItemId(50)];
    assert!(ids(&recs).iter().all(|id| candidate_universe.contains(id)));
    assert_eq!(
        ids(&recs),
        vec![ItemId(30), ItemId(40), ItemId(50), ItemId(20)]
    );
}

#[test]
fn ranking_is_prefix_stable_across_k() {
    let engine = engine();
    let top2 = engine.recommend(UserId(1), 2, false).unwrap();
    let top4 = engine.recommend(UserId(1), 4, false).unwrap();
    assert_eq!(ids(&top2), ids(&top4)[..2].to_vec());
}

#[test]
fn fewer_candidates_than_k_returns_all_unpadded() {
    let engine = engine();
    // User 42 has interacted with three of the five items.
    let recs = engine.recommend(UserId(42), 10, false).unwrap();
    assert_eq!(recs.len(), 2);
}

#[test]
fn interacted_items_never_reappear() {
    let engine = engine();
    let recs = engine.recommend(UserId(42), 10, false).unwrap();
    let watched = [ItemId(10), ItemId(20), ItemId(30)];
    assert!(ids(&recs).iter().all(|id| !watched.contains(id)));
}

#[test]
fn known_user_with_no_eligible_candidates_gets_popularity_fallback() {
    // One user who has already interacted with the entire catalog.
    let registry = Arc::new(IdRegistry::new(&[UserId(1)], &[ItemId(10), ItemId(20)]));
    let retrieval = Arc::new(
        LatentFactorModel::new(array![[1.0, 0.0]], array![[1.0, 0.0], [0.0, 1.0]]).unwrap(),
    );
    let interactions =
        Arc::new(CsrMatrix::new(vec![0, 2], vec![0, 1], vec![5.0, 4.0], 2).unwrap());
    let engine = RecommendationEngine::from_parts(
        registry,
        retrieval,
        interactions,
        ranking_model(),
        None,
        Some(popularity()),
        &engine_config(),
    );

    let recs = engine.recommend(UserId(1), 3, false).unwrap();
    assert_eq!(ids(&recs), vec![ItemId(2858), ItemId(260), ItemId(1196)]);
    assert!(recs.iter().all(|r| r.score.is_none()));
}

#[test]
fn equal_scores_keep_retrieval_order() {
    // A baseline-only ranker scores every candidate identically, so the
    // result must preserve the retrieval model's affinity order.
    let engine = RecommendationEngine::from_parts(
        registry(),
        retrieval_model(),
        interactions(),
        Arc::new(BiasedMf::baseline(3.5, 1.0, 5.0)),
        None,
        None,
        &engine_config(),
    );
    let recs = engine.recommend(UserId(1), 4, false).unwrap();
    assert_eq!(
        ids(&recs),
        vec![ItemId(20), ItemId(40), ItemId(50), ItemId(30)]
    );
}

#[test]
fn enrichment_is_a_pure_transform() {
    let engine = engine();
    let raw = engine.recommend(UserId(1), 4, false).unwrap();
    let enriched = engine.recommend(UserId(1), 4, true).unwrap();

    let independent = Enricher::new(Some(metadata_table())).enrich(&ids(&raw));
    let inline: Vec<ItemMetadata> = enriched
        .into_iter()
        .map(|r| r.metadata.unwrap())
        .collect();
    assert_eq!(inline, independent);
}

#[test]
fn missing_metadata_rows_get_placeholders_without_shrinking_the_result() {
    let engine = engine();
    let recs = engine.recommend(UserId(1), 4, true).unwrap();
    assert_eq!(recs.len(), 4);

    for rec in &recs {
        let meta = rec.metadata.as_ref().unwrap();
        if rec.item_id == ItemId(20) || rec.item_id == ItemId(50) {
            assert_eq!(meta, &ItemMetadata::unknown());
        } else {
            assert_ne!(meta.title, "Unknown title");
        }
    }
}

#[test]
fn absent_metadata_table_yields_generic_placeholders() {
    let engine = RecommendationEngine::from_parts(
        registry(),
        retrieval_model(),
        interactions(),
        ranking_model(),
        None,
        Some(popularity()),
        &engine_config(),
    );
    let recs = engine.recommend(UserId(999), 2, true).unwrap();
    assert_eq!(recs[0].metadata.as_ref().unwrap().title, "Item 2858");
    assert_eq!(recs[1].metadata.as_ref().unwrap().title, "Item 260");
}

#[test]
fn absent_popularity_list_falls_back_to_builtin_items() {
    let engine = RecommendationEngine::from_parts(
        registry(),
        retrieval_model(),
        interactions(),
        ranking_model(),
        Some(metadata_table()),
        None,
        &engine_config(),
    );
    let recs = engine.recommend(UserId(999), 3, false).unwrap();
    assert_eq!(ids(&recs), vec![ItemId(2858), ItemId(260), ItemId(1196)]);
}

#[test]
fn popular_endpoint_matches_cold_start_sequence() {
    let engine = engine();
    let popular = engine.popular(3, false);
    let cold = engine.recommend(UserId(999), 3, false).unwrap();
    assert_eq!(ids(&popular), ids(&cold));
}

struct FailingRanker;

impl RankingModel for FailingRanker {
    fn predict(&self, _user: UserId, _item: ItemId) -> Result<f32, ModelError> {
        Err(ModelError::QueryFailed("prediction backend down".to_string()))
    }
}

#[test]
fn ranking_failure_fails_the_request_instead_of_returning_empty() {
    let engine = RecommendationEngine::from_parts(
        registry(),
        retrieval_model(),
        interactions(),
        Arc::new(FailingRanker),
        None,
        Some(popularity()),
        &engine_config(),
    );

    assert!(engine.recommend(UserId(1), 5, false).is_err());
    // The fallback path never touches the ranking model.
    assert!(engine.recommend(UserId(999), 5, false).is_ok());
}

#[test]
fn engine_handle_publishes_exactly_once() {
    let handle = EngineHandle::new();
    assert!(!handle.is_ready());
    assert!(handle.get().is_none());

    assert!(handle.publish(engine()));
    assert!(handle.is_ready());
    assert!(handle.get().unwrap().recommend(UserId(1), 3, false).is_ok());

    // First publication wins.
    assert!(!handle.publish(engine()));
}
