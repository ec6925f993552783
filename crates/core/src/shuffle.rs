//! Multiple-choice option shuffling.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::model::Question;

/// Per-presentation view of a question with its options reordered.
///
/// `display_options[display_correct_index]` is always the original correct text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShuffledQuestion {
    original: Question,
    display_options: Vec<String>,
    display_correct_index: usize,
}

impl ShuffledQuestion {
    #[must_use]
    pub fn original(&self) -> &Question {
        &self.original
    }

    #[must_use]
    pub fn display_options(&self) -> &[String] {
        &self.display_options
    }

    #[must_use]
    pub fn display_correct_index(&self) -> usize {
        self.display_correct_index
    }

    #[must_use]
    pub fn is_correct(&self, display_index: usize) -> bool {
        display_index == self.display_correct_index
    }
}

/// Produces `ShuffledQuestion`s from an injected random source.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnswerShuffler;

impl AnswerShuffler {
    /// Applies a uniform permutation to the options and relocates the correct
    /// answer by text. With duplicate option texts the first match wins.
    pub fn shuffle<R: Rng + ?Sized>(question: &Question, rng: &mut R) -> ShuffledQuestion {
        let mut display_options = question.options().to_vec();
        display_options.shuffle(rng);

        let correct_text = question.correct_option();
        // A permutation keeps every text, so the lookup always finds a match.
        let display_correct_index = display_options
            .iter()
            .position(|option| option == correct_text)
            .unwrap_or(question.correct_index());

        ShuffledQuestion {
            original: question.clone(),
            display_options,
            display_correct_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::tests::question;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn shuffle_preserves_options_and_correct_text() {
        let q = question("q1", &["Vento", "Correntes", "Marés", "Sismos"], 0);
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let shuffled = AnswerShuffler::shuffle(&q, &mut rng);

            let mut got = shuffled.display_options().to_vec();
            let mut want = q.options().to_vec();
            got.sort();
            want.sort();
            assert_eq!(got, want);

            assert_eq!(
                shuffled.display_options()[shuffled.display_correct_index()],
                "Vento"
            );
        }
    }

    #[test]
    fn same_seed_gives_same_order() {
        let q = question("q1", &["a", "b", "c", "d", "e"], 2);
        let a = AnswerShuffler::shuffle(&q, &mut StdRng::seed_from_u64(7));
        let b = AnswerShuffler::shuffle(&q, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn duplicate_texts_resolve_to_first_match() {
        let q = question("dup", &["igual", "igual", "outra"], 1);
        for seed in 0..20 {
            let shuffled = AnswerShuffler::shuffle(&q, &mut StdRng::seed_from_u64(seed));
            let first = shuffled
                .display_options()
                .iter()
                .position(|o| o == "igual")
                .unwrap();
            assert_eq!(shuffled.display_correct_index(), first);
        }
    }
}
