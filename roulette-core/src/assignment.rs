//! Reviewer selection
//!
//! Pure decision logic over roster snapshots. Nothing here touches storage;
//! callers load the roster, pass in a random source and persist the result.
//!
//! Randomness is always supplied by the caller. Production code hands in an
//! entropy-seeded [`rand::rngs::StdRng`]; tests hand in a seeded one. Either
//! way every eligible candidate is equally likely to be picked.

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use crate::models::{User, MAX_REVIEWERS};

/// No eligible replacement reviewer exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no eligible replacement candidate")]
pub struct NoCandidate;

/// Active members of `team_members` other than `author_id`
fn eligible<'a>(
    team_members: &'a [User],
    author_id: &'a str,
) -> impl Iterator<Item = &'a User> + 'a {
    team_members
        .iter()
        .filter(move |u| u.is_active && u.id != author_id)
}

/// Pick up to [`MAX_REVIEWERS`] reviewers for a new pull request
///
/// The pool is every active member of the roster except the author. With two
/// or fewer candidates all of them are returned; otherwise exactly two are
/// drawn uniformly without replacement using a partial Fisher-Yates shuffle.
/// An empty pool gives an empty result.
pub fn select_initial_reviewers<R>(
    author: &User,
    team_members: &[User],
    rng: &mut R,
) -> Vec<String>
where
    R: Rng + ?Sized,
{
    let mut pool: Vec<&str> = eligible(team_members, &author.id)
        .map(|u| u.id.as_str())
        .collect();
    dedup_preserving_order(&mut pool);

    tracing::debug!(
        author = %author.id,
        team = %author.team_id,
        candidates = pool.len(),
        "Selecting initial reviewers"
    );

    let (chosen, _) = pool.partial_shuffle(rng, MAX_REVIEWERS);
    chosen.iter().map(|id| id.to_string()).collect()
}

/// Pick a single replacement reviewer
///
/// `team_members` is the roster of the reviewer being replaced. The pool
/// excludes inactive users, the author and anyone already in
/// `current_reviewers` (the departing reviewer included).
pub fn select_replacement<R>(
    current_reviewers: &[String],
    author_id: &str,
    team_members: &[User],
    rng: &mut R,
) -> Result<String, NoCandidate>
where
    R: Rng + ?Sized,
{
    let mut pool: Vec<&str> = eligible(team_members, author_id)
        .filter(|u| !current_reviewers.contains(&u.id))
        .map(|u| u.id.as_str())
        .collect();
    dedup_preserving_order(&mut pool);

    tracing::debug!(candidates = pool.len(), "Selecting replacement reviewer");

    pool.choose(rng).map(|id| id.to_string()).ok_or(NoCandidate)
}

/// Drop repeated ids so a roster with duplicate rows cannot bias the draw
fn dedup_preserving_order(pool: &mut Vec<&str>) {
    let mut seen = std::collections::HashSet::new();
    pool.retain(|id| seen.insert(*id));
}
