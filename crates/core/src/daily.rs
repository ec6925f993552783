//! Daily quiz question selection.

use rand::Rng;
use rand::seq::IndexedRandom;
use thiserror::Error;

use crate::model::{Question, Subject};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DailyQuizError {
    #[error("daily quiz needs {required} questions but only {available} are available")]
    InsufficientContent { required: usize, available: usize },
}

/// Every question of every lesson that carries a quiz, in content order.
#[must_use]
pub fn question_pool(subjects: &[Subject]) -> Vec<Question> {
    subjects
        .iter()
        .flat_map(Subject::lessons)
        .filter_map(|lesson| lesson.quiz())
        .flat_map(|quiz| quiz.questions().iter().cloned())
        .collect()
}

/// Pick `size` distinct questions uniformly at random.
///
/// Options are left in content order; the session shuffles them as each
/// question is entered.
///
/// # Errors
///
/// Returns `DailyQuizError::InsufficientContent` when the pool is smaller
/// than `size`.
pub fn pick_daily_questions<R: Rng + ?Sized>(
    pool: &[Question],
    size: usize,
    rng: &mut R,
) -> Result<Vec<Question>, DailyQuizError> {
    if pool.len() < size {
        return Err(DailyQuizError::InsufficientContent {
            required: size,
            available: pool.len(),
        });
    }

    Ok(pool.choose_multiple(rng, size).cloned().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::tests::question;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn pool(n: usize) -> Vec<Question> {
        (0..n)
            .map(|i| question(&format!("p{i}"), &["a", "b"], 0))
            .collect()
    }

    #[test]
    fn picks_distinct_questions_from_pool() {
        let pool = pool(9);
        for seed in 0..20 {
            let picked = pick_daily_questions(&pool, 5, &mut StdRng::seed_from_u64(seed)).unwrap();
            assert_eq!(picked.len(), 5);
            let ids: HashSet<_> = picked.iter().map(|q| q.id().clone()).collect();
            assert_eq!(ids.len(), 5);
            assert!(picked.iter().all(|q| pool.contains(q)));
        }
    }

    #[test]
    fn exact_pool_size_is_enough() {
        let picked = pick_daily_questions(&pool(5), 5, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(picked.len(), 5);
    }

    #[test]
    fn small_pool_is_an_error() {
        let err = pick_daily_questions(&pool(4), 5, &mut StdRng::seed_from_u64(1)).unwrap_err();
        assert_eq!(
            err,
            DailyQuizError::InsufficientContent {
                required: 5,
                available: 4
            }
        );
    }

    #[test]
    fn selection_varies_with_seed() {
        let pool = pool(9);
        let orders: HashSet<Vec<String>> = (0..10)
            .map(|seed| {
                pick_daily_questions(&pool, 5, &mut StdRng::seed_from_u64(seed))
                    .unwrap()
                    .iter()
                    .map(|q| q.id().to_string())
                    .collect()
            })
            .collect();
        assert!(orders.len() > 1);
    }
}
