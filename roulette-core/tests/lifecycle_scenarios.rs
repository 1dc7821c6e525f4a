//! End-to-end lifecycle behavior against the in-memory store

use std::collections::HashSet;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use roulette_core::{
    Error, ErrorKind, MemoryStore, PrLifecycle, PrStatus, PrStore, TeamMember, TeamService,
    User,
};

type Lifecycle = PrLifecycle<MemoryStore, MemoryStore>;

fn lifecycle(store: &Arc<MemoryStore>, seed: u64) -> Lifecycle {
    PrLifecycle::with_rng(store.clone(), store.clone(), StdRng::seed_from_u64(seed))
}

fn member(id: &str, active: bool) -> TeamMember {
    TeamMember {
        user_id: id.to_string(),
        username: id.to_uppercase(),
        is_active: active,
    }
}

async fn store_with_team(name: &str, members: Vec<TeamMember>) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    TeamService::new(store.clone())
        .add_team(name, members)
        .await
        .unwrap();
    store
}

#[tokio::test]
async fn scenario_a_two_reviewers_from_author_team() {
    let store = store_with_team(
        "backend",
        vec![member("u1", true), member("u2", true), member("u3", true)],
    )
    .await;
    let lifecycle = lifecycle(&store, 1);

    let view = lifecycle.create_pr("pr-1", "T", "u1").await.unwrap();

    let reviewers: HashSet<_> = view.reviewers.iter().cloned().collect();
    assert_eq!(reviewers.len(), 2);
    assert!(reviewers.is_subset(&HashSet::from(["u2".to_string(), "u3".to_string()])));
    assert_eq!(view.id, "pr-1");
    assert_eq!(view.author_id, "u1");
    assert_eq!(view.status, PrStatus::Open);
}

#[tokio::test]
async fn scenario_b_merge_is_idempotent() {
    let store = store_with_team("backend", vec![member("u1", true), member("u2", true)]).await;
    let lifecycle = lifecycle(&store, 2);

    lifecycle.create_pr("pr-1", "T", "u1").await.unwrap();
    let first = lifecycle.merge_pr("pr-1").await.unwrap();
    let second = lifecycle.merge_pr("pr-1").await.unwrap();

    assert_eq!(first.status, PrStatus::Merged);
    assert_eq!(second.status, PrStatus::Merged);
    assert!(first.merged_at.is_some());
    assert_eq!(first.merged_at, second.merged_at);
    assert_eq!(first, second);
}

#[tokio::test]
async fn scenario_c_no_replacement_candidate() {
    let store = store_with_team(
        "backend",
        vec![member("u1", true), member("u2", true), member("u3", false)],
    )
    .await;
    let lifecycle = lifecycle(&store, 3);

    let view = lifecycle.create_pr("pr-2", "T", "u1").await.unwrap();
    assert_eq!(view.reviewers, vec!["u2".to_string()]);

    let err = lifecycle.reassign_reviewer("pr-2", "u2").await.unwrap_err();
    assert!(matches!(err, Error::NoCandidate(ref id) if id == "pr-2"));
    assert_eq!(err.kind(), ErrorKind::ResourceExhausted);

    // The failed attempt left the reviewer set alone
    let stored = store.get_by_id("pr-2").await.unwrap().unwrap();
    assert_eq!(stored.reviewers, vec!["u2".to_string()]);
}

#[tokio::test]
async fn scenario_d_no_reassignment_after_merge() {
    let store = store_with_team(
        "backend",
        vec![
            member("u1", true),
            member("u2", true),
            member("u3", true),
            member("u4", true),
        ],
    )
    .await;
    let lifecycle = lifecycle(&store, 4);

    let view = lifecycle.create_pr("pr-3", "T", "u1").await.unwrap();
    lifecycle.merge_pr("pr-3").await.unwrap();

    let err = lifecycle
        .reassign_reviewer("pr-3", &view.reviewers[0])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::PrMerged(_)));
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}

#[tokio::test]
async fn scenario_e_reassign_unassigned_user() {
    let store = store_with_team(
        "backend",
        vec![member("u1", true), member("u2", true), member("u3", true)],
    )
    .await;
    let lifecycle = lifecycle(&store, 5);

    lifecycle.create_pr("pr-4", "T", "u1").await.unwrap();

    // The author exists but is never a reviewer of their own PR
    let err = lifecycle.reassign_reviewer("pr-4", "u1").await.unwrap_err();
    assert!(matches!(err, Error::NotAssigned { ref pr, ref user } if pr == "pr-4" && user == "u1"));
    assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
}

#[tokio::test]
async fn reviewer_set_invariants_hold_across_rosters() {
    for team_size in 1..=6usize {
        for inactive in 0..team_size {
            let members: Vec<_> = (0..team_size)
                .map(|i| member(&format!("u{}", i), i == 0 || i > inactive))
                .collect();
            let store = store_with_team("team", members).await;
            let lifecycle = lifecycle(&store, (team_size * 10 + inactive) as u64);

            let active_peers = (1..team_size).filter(|i| *i > inactive).count();
            let view = lifecycle.create_pr("pr", "T", "u0").await.unwrap();

            let unique: HashSet<_> = view.reviewers.iter().collect();
            assert_eq!(unique.len(), view.reviewers.len(), "duplicate reviewer");
            assert!(!view.reviewers.contains(&"u0".to_string()), "author assigned");
            assert_eq!(view.reviewers.len(), active_peers.min(2));
        }
    }
}

#[tokio::test]
async fn reassignment_swaps_exactly_one() {
    let members = (1..=6).map(|i| member(&format!("u{}", i), true)).collect();
    let store = store_with_team("backend", members).await;
    let lifecycle = lifecycle(&store, 6);

    let mut view = lifecycle.create_pr("pr-1", "T", "u1").await.unwrap();
    for round in 0..10 {
        let old = view.reviewers[round % view.reviewers.len()].clone();
        let before = view.reviewers.clone();

        let outcome = lifecycle.reassign_reviewer("pr-1", &old).await.unwrap();

        assert!(!outcome.pr.reviewers.contains(&old));
        assert!(outcome.pr.reviewers.contains(&outcome.replaced_by));
        assert!(!before.contains(&outcome.replaced_by));
        assert_ne!(outcome.replaced_by, "u1");
        assert_eq!(outcome.pr.reviewers.len(), before.len());
        view = outcome.pr;
    }
}

#[tokio::test]
async fn deactivated_reviewer_stays_assigned() {
    let store = store_with_team("backend", vec![member("u1", true), member("u2", true)]).await;
    let lifecycle = lifecycle(&store, 7);
    let teams = TeamService::new(store.clone());

    lifecycle.create_pr("pr-1", "T", "u1").await.unwrap();
    teams.set_is_active("u2", false).await.unwrap();

    let view = lifecycle.get_pr("pr-1").await.unwrap();
    assert_eq!(view.reviewers, vec!["u2".to_string()]);

    // ...but is not picked for new pull requests
    let view = lifecycle.create_pr("pr-2", "T", "u1").await.unwrap();
    assert!(view.reviewers.is_empty());
}

#[tokio::test]
async fn stats_follow_reassignment() {
    let store = store_with_team(
        "backend",
        vec![member("u1", true), member("u2", true), member("u3", true)],
    )
    .await;
    let lifecycle = lifecycle(&store, 8);
    let teams = TeamService::new(store.clone());

    teams.set_is_active("u3", false).await.unwrap();
    lifecycle.create_pr("pr-1", "T", "u1").await.unwrap();
    teams.set_is_active("u3", true).await.unwrap();
    lifecycle.reassign_reviewer("pr-1", "u2").await.unwrap();

    let stats = teams.assignment_stats().await.unwrap();
    assert_eq!(stats.get("u3"), Some(&1));
    assert_eq!(stats.get("u2"), None);
}

#[tokio::test]
async fn concurrent_reassignments_never_duplicate() {
    let members = (1..=8).map(|i| member(&format!("u{}", i), true)).collect();
    let store = store_with_team("backend", members).await;
    let lifecycle = Arc::new(lifecycle(&store, 9));

    let view = lifecycle.create_pr("pr-1", "T", "u1").await.unwrap();
    let targets = view.reviewers.clone();

    let mut handles = Vec::new();
    for target in targets.iter().cycle().take(16).cloned() {
        let lifecycle = lifecycle.clone();
        handles.push(tokio::spawn(async move {
            lifecycle.reassign_reviewer("pr-1", &target).await
        }));
    }

    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) | Err(Error::NotAssigned { .. }) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    let stored = store.get_by_id("pr-1").await.unwrap().unwrap();
    let unique: HashSet<_> = stored.reviewers.iter().collect();
    assert_eq!(stored.reviewers.len(), 2);
    assert_eq!(unique.len(), 2);
    assert!(!stored.reviewers.contains(&"u1".to_string()));
}

#[tokio::test]
async fn concurrent_creates_of_same_id_yield_one_pr() {
    let store = store_with_team("backend", vec![member("u1", true), member("u2", true)]).await;
    let lifecycle = Arc::new(lifecycle(&store, 10));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let lifecycle = lifecycle.clone();
        handles.push(tokio::spawn(async move {
            lifecycle.create_pr("pr-1", "T", "u1").await
        }));
    }

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(Error::PrExists(_)) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(created, 1);
}
