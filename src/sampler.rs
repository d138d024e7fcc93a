//! Uniform sampling of strings over an alphabet, using batched rejection sampling.
//!
//! Each 64-bit word drawn from the entropy source is cut into 7-bit chunks. A chunk is an index
//! candidate; candidates at or beyond the alphabet's length are thrown away rather than reduced
//! modulo the length, so every character in the alphabet is picked with the same probability.

use crate::random::{random_u64, EntropySource};
use crate::Error;

/// Width of an index candidate, in bits.
pub const CHUNK_BITS: u32 = 7;
/// The largest alphabet that a chunk can address.
pub const MAX_CHAR_RANGE: usize = 1 << CHUNK_BITS;

const CHUNK_MASK: u64 = (1 << CHUNK_BITS) - 1;
const CHUNKS_PER_WORD: u32 = u64::BITS / CHUNK_BITS;

/// Generate a string of `length` characters, each drawn uniformly and independently from
/// `char_range`.
///
/// Characters that appear more than once in `char_range` are proportionally more likely. On any
/// error nothing is returned; a failure part-way through discards what was built so far.
pub fn sample_string<R>(rng: &mut R, length: usize, char_range: &str) -> Result<String, Error>
where
    R: EntropySource + ?Sized,
{
    if length < 1 {
        return Err(Error::InvalidLength);
    }
    let alphabet = char_range.chars().collect::<Vec<_>>();
    if alphabet.is_empty() {
        return Err(Error::InvalidCharRange);
    }
    if alphabet.len() > MAX_CHAR_RANGE {
        return Err(Error::CharRangeTooLarge {
            len: alphabet.len(),
        });
    }

    let mut output = String::with_capacity(length);
    let mut produced = 0;
    let mut word = 0u64;
    let mut chunks_left = 0;
    let mut rejected = 0u64;
    while produced < length {
        if chunks_left == 0 {
            word = random_u64(rng)?;
            chunks_left = CHUNKS_PER_WORD;
        }
        let index = (word & CHUNK_MASK) as usize;
        word >>= CHUNK_BITS;
        chunks_left -= 1;

        if index < alphabet.len() {
            output.push(alphabet[index]);
            produced += 1;
        } else {
            rejected += 1;
        }
    }
    tracing::trace!(
        length,
        alphabet = alphabet.len(),
        rejected,
        "sampled string"
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::random::tests::{Broken, ShortReads, Words};

    #[test]
    fn has_requested_length_and_alphabet() {
        let mut rng = StdRng::seed_from_u64(10);
        let char_range = "abcdefXYZ0123!";
        for length in [1, 2, 9, 10, 64, 257] {
            let sampled = sample_string(&mut rng, length, char_range).unwrap();
            assert_eq!(sampled.chars().count(), length);
            assert!(sampled.chars().all(|c| char_range.contains(c)));
        }
    }

    #[test]
    fn rejects_zero_length() {
        let mut rng = StdRng::seed_from_u64(11);
        assert!(matches!(
            sample_string(&mut rng, 0, "abc"),
            Err(Error::InvalidLength)
        ));
    }

    #[test]
    fn rejects_empty_char_range() {
        let mut rng = StdRng::seed_from_u64(12);
        assert!(matches!(
            sample_string(&mut rng, 8, ""),
            Err(Error::InvalidCharRange)
        ));
    }

    #[test]
    fn rejects_alphabets_a_chunk_cannot_address() {
        let mut rng = StdRng::seed_from_u64(13);
        let char_range = ('\u{100}'..).take(MAX_CHAR_RANGE + 1).collect::<String>();
        assert!(matches!(
            sample_string(&mut rng, 8, &char_range),
            Err(Error::CharRangeTooLarge { len }) if len == MAX_CHAR_RANGE + 1
        ));

        let char_range = ('\u{100}'..).take(MAX_CHAR_RANGE).collect::<String>();
        let sampled = sample_string(&mut rng, 8, &char_range).unwrap();
        assert_eq!(sampled.chars().count(), 8);
    }

    #[test]
    fn consumes_chunks_low_bits_first_and_skips_out_of_range() {
        // Chunks (low to high): 2, 127 (rejected), 0, 1, then zeros.
        let word = 2 | (127 << 7) | (1 << 21);
        let mut rng = Words(vec![word]);
        assert_eq!(sample_string(&mut rng, 4, "abc").unwrap(), "caba");
    }

    #[test]
    fn draws_a_new_word_after_nine_chunks() {
        // Every chunk of the first word is out of range for a two letter alphabet; only the
        // second word contributes.
        let mut rng = Words(vec![u64::MAX, 1]);
        assert_eq!(sample_string(&mut rng, 2, "ab").unwrap(), "ba");
    }

    #[test]
    fn duplicates_count_as_extra_weight() {
        let mut rng = StdRng::seed_from_u64(14);
        let sampled = sample_string(&mut rng, 30_000, "aab").unwrap();
        let a = sampled.chars().filter(|&c| c == 'a').count();
        // Expected 20000 'a's; the standard deviation is about 82.
        assert!((19_500..=20_500).contains(&a), "{a} 'a's");
    }

    #[test]
    fn is_uniform_over_the_alphabet() {
        let char_range = "abcdefghij";
        let mut rng = StdRng::seed_from_u64(15);
        let sampled = sample_string(&mut rng, 100_000, char_range).unwrap();
        let mut counts = [0usize; 10];
        for c in sampled.chars() {
            counts[char_range.find(c).unwrap()] += 1;
        }
        let expected = 10_000.0;
        let chi_square: f64 = counts
            .iter()
            .map(|&c| {
                let diff = c as f64 - expected;
                diff * diff / expected
            })
            .sum();
        assert!(chi_square < 27.88, "chi-square {chi_square} for {counts:?}");
    }

    #[test]
    fn entropy_faults_abort() {
        assert!(matches!(
            sample_string(&mut Broken, 4, "abc"),
            Err(Error::Entropy(_))
        ));
        assert!(matches!(
            sample_string(&mut ShortReads, 4, "abc"),
            Err(Error::LengthMismatch { .. })
        ));
        // The word supplies fewer than four accepted characters before the source runs dry.
        assert!(matches!(
            sample_string(&mut Words(vec![u64::MAX]), 4, "abc"),
            Err(Error::Entropy(_))
        ));
    }
}
