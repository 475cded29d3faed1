mod common;

use std::sync::Arc;

use survivorpool::engine::lifecycle::LifecycleCoordinator;
use survivorpool::error::EngineError;
use survivorpool::model::{MatchStatus, Outcome, Winner};
use survivorpool::store::memory::MemoryStore;
use survivorpool::store::Store;

use common::{finished, league, prediction, scheduled, test_config, ScriptedProvider};

fn coordinator(
    store: &Arc<MemoryStore>,
    provider: ScriptedProvider,
) -> LifecycleCoordinator {
    LifecycleCoordinator::new(store.clone(), Box::new(provider), &test_config())
}

// ---------------------------------------------------------------------------
// Happy path: persist, score, cleanup, advance cursor — in that order
// ---------------------------------------------------------------------------
#[tokio::test]
async fn full_cycle_scores_cleans_and_advances() {
    let store = Arc::new(MemoryStore::new());
    store.put_league(league("l1", &["u1"]));
    store.put_prediction(prediction("u1", "l1", 5, "TeamB"));

    let provider = ScriptedProvider::new(5, vec![finished(1, 5, "TeamA", "TeamB", Winner::HomeTeam)]);
    let report = coordinator(&store, provider).run_cycle().await.unwrap();

    assert_eq!(report.matchday, 5);
    assert_eq!(report.matches_fetched, 1);
    assert!(report.scored);
    assert_eq!(report.matches_removed, 1);
    assert!(report.cursor_advanced);

    // scored before cleanup: the life was lost even though the match is gone
    assert_eq!(store.user_league_state("u1", "l1").unwrap().unwrap().lives, 2);
    assert_eq!(
        store.prediction("u1", "l1", 5).unwrap().unwrap().outcome,
        Outcome::Incorrect
    );
    assert!(store.all_matches().is_empty());
    assert_eq!(store.cursor().unwrap(), 5);
}

// ---------------------------------------------------------------------------
// Provider outage: cycle aborts, cursor stays put
// ---------------------------------------------------------------------------
#[tokio::test]
async fn provider_failure_leaves_cursor_untouched() {
    let store = Arc::new(MemoryStore::new());
    store.put_league(league("l1", &["u1"]));

    let err = coordinator(&store, ScriptedProvider::failing())
        .run_cycle()
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ProviderUnavailable(_)));
    assert_eq!(store.cursor().unwrap(), 1);
    assert!(store.user_league_state("u1", "l1").unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Unlocked matchday: results persist but nothing is assigned or scored
// ---------------------------------------------------------------------------
#[tokio::test]
async fn open_matchday_skips_scoring() {
    let store = Arc::new(MemoryStore::new());
    store.put_league(league("l1", &["u1"]));

    let future_kickoff = survivorpool::model::now_ts() + 86_400;
    let provider =
        ScriptedProvider::new(5, vec![scheduled(1, 5, "TeamA", "TeamB", future_kickoff)]);
    let report = coordinator(&store, provider).run_cycle().await.unwrap();

    assert!(!report.scored);
    assert!(store.prediction("u1", "l1", 5).unwrap().is_none());
    // the fetched fixture is persisted for the lock check next cycle
    assert_eq!(store.matches_for_matchday(5).unwrap().len(), 1);
    assert_eq!(store.matches_for_matchday(5).unwrap()[0].status, MatchStatus::Scheduled);
}

// ---------------------------------------------------------------------------
// Re-running a cycle for the same matchday changes nothing
// ---------------------------------------------------------------------------
#[tokio::test]
async fn rerunning_a_cycle_is_idempotent() {
    let store = Arc::new(MemoryStore::new());
    store.put_league(league("l1", &["u1"]));
    store.put_prediction(prediction("u1", "l1", 5, "TeamB"));

    let matches = vec![finished(1, 5, "TeamA", "TeamB", Winner::HomeTeam)];

    coordinator(&store, ScriptedProvider::new(5, matches.clone()))
        .run_cycle()
        .await
        .unwrap();
    let report2 = coordinator(&store, ScriptedProvider::new(5, matches))
        .run_cycle()
        .await
        .unwrap();

    assert!(!report2.cursor_advanced, "cursor already at 5");
    assert_eq!(store.user_league_state("u1", "l1").unwrap().unwrap().lives, 2);
    assert!(store.all_matches().is_empty());
}

// ---------------------------------------------------------------------------
// Cleanup leaves no finished match behind, scheduled ones survive
// ---------------------------------------------------------------------------
#[tokio::test]
async fn cleanup_only_evicts_finished_matches() {
    let store = Arc::new(MemoryStore::new());
    store.put_league(league("l1", &["u1"]));
    store.put_prediction(prediction("u1", "l1", 5, "TeamA"));

    let provider = ScriptedProvider::new(
        5,
        vec![
            finished(1, 5, "TeamA", "TeamB", Winner::Draw),
            scheduled(2, 5, "TeamC", "TeamD", 1_000),
        ],
    );
    coordinator(&store, provider).run_cycle().await.unwrap();

    let remaining = store.all_matches();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, 2);
    assert!(remaining.iter().all(|m| m.status != MatchStatus::Finished));
}
