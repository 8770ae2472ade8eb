//! Pronounceable fixture addresses.

const CONSONANTS: &[u8] = b"bcdfklmnprstwyz";
const VOWELS: &[u8] = b"aou";
const TLDS: &[&str] = &[".biz", ".com", ".net", ".org"];

const MIN_SYLLABLES: usize = 6;
const EXTRA_SYLLABLES: usize = 12;

/// A source of uniformly distributed indices.
///
/// The synthesizer draws every random choice through this trait, so a test can
/// substitute a scripted source and predict the exact address.
pub trait RandomSource {
    /// Returns an index in `0..bound`. `bound` is never zero.
    fn index(&mut self, bound: usize) -> usize;
}

impl RandomSource for fastrand::Rng {
    fn index(&mut self, bound: usize) -> usize {
        self.usize(..bound)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn index(&mut self, bound: usize) -> usize {
        (**self).index(bound)
    }
}

/// Builds a hostname from consonant+vowel syllables and a top-level domain.
///
/// The body has between 6 and 17 syllables.
pub fn random_address<R: RandomSource + ?Sized>(rng: &mut R) -> String {
    let syllables = MIN_SYLLABLES + rng.index(EXTRA_SYLLABLES);
    let mut address = String::with_capacity(syllables * 2 + 4);

    for _ in 0..syllables {
        address.push(CONSONANTS[rng.index(CONSONANTS.len())] as char);
        address.push(VOWELS[rng.index(VOWELS.len())] as char);
    }
    address.push_str(TLDS[rng.index(TLDS.len())]);
    address
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    /// Replays a fixed script of indices.
    struct Scripted(std::vec::IntoIter<usize>);

    impl RandomSource for Scripted {
        fn index(&mut self, bound: usize) -> usize {
            let next = self.0.next().expect("script exhausted");
            assert!(next < bound);
            next
        }
    }

    #[test]
    fn test_scripted_address() {
        // 6 syllables: "ba" five times then "zu", then ".org".
        let mut script = vec![0];
        script.extend([0, 0].repeat(5));
        script.extend([14, 2, 3]);
        let mut rng = Scripted(script.into_iter());

        assert_eq!(random_address(&mut rng), "bababababazu.org");
    }

    #[test]
    fn test_address_shape() {
        let pattern = Regex::new(r"^(?:[bcdfklmnprstwyz][aou])+\.(?:biz|com|net|org)$").unwrap();
        let mut rng = fastrand::Rng::new();

        for _ in 0..200 {
            let address = random_address(&mut rng);
            assert!(pattern.is_match(&address), "bad address {address}");

            let body = address.rsplit_once('.').unwrap().0;
            assert!((12..=34).contains(&body.len()), "bad length {address}");
        }
    }

    #[test]
    fn test_same_seed_same_address() {
        let mut a = fastrand::Rng::with_seed(7);
        let mut b = fastrand::Rng::with_seed(7);
        assert_eq!(random_address(&mut a), random_address(&mut b));
    }
}
