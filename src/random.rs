//! Access to the entropy source, and unbiased bounded integers drawn from it.

use rand::{CryptoRng, RngCore};

use crate::Error;

/// Anything that can fill a buffer with cryptographically secure random bytes.
///
/// Implementations return the number of bytes actually written; a short read is reported to
/// callers as [`Error::LengthMismatch`]. Every [`RngCore`] + [`CryptoRng`] (such as
/// [`rand::rngs::OsRng`]) is an entropy source.
pub trait EntropySource {
    fn read_random(&mut self, buf: &mut [u8]) -> Result<usize, rand::Error>;
}

impl<R> EntropySource for R
where
    R: RngCore + CryptoRng,
{
    fn read_random(&mut self, buf: &mut [u8]) -> Result<usize, rand::Error> {
        self.try_fill_bytes(buf)?;
        Ok(buf.len())
    }
}

/// Return exactly `len` random bytes.
pub fn random_bytes<R>(rng: &mut R, len: usize) -> Result<Vec<u8>, Error>
where
    R: EntropySource + ?Sized,
{
    if len < 1 {
        return Err(Error::InvalidLength);
    }
    let mut bytes = vec![0u8; len];
    let read = rng.read_random(&mut bytes).map_err(Error::Entropy)?;
    if read != len {
        return Err(Error::LengthMismatch {
            expected: len,
            read,
        });
    }
    Ok(bytes)
}

/// Draw a full 64-bit word, interpreted big-endian.
pub(crate) fn random_u64<R>(rng: &mut R) -> Result<u64, Error>
where
    R: EntropySource + ?Sized,
{
    let bytes = random_bytes(rng, 8)?;
    let mut word = [0u8; 8];
    word.copy_from_slice(&bytes);
    Ok(u64::from_be_bytes(word))
}

/// Return a number uniformly distributed over `[0, max)`.
///
/// Words below `2^64 mod max` are rejected and redrawn, which leaves a range whose size is an
/// exact multiple of `max`; reducing that modulo `max` gives every output the same weight.
pub fn rand_num<R>(rng: &mut R, max: u64) -> Result<u64, Error>
where
    R: EntropySource + ?Sized,
{
    if max < 1 {
        return Err(Error::InvalidLength);
    }
    let threshold = max.wrapping_neg() % max;
    loop {
        let word = random_u64(rng)?;
        if word >= threshold {
            return Ok(word % max);
        }
    }
}

/// Return 0 or 1 with equal probability.
pub fn coin_flip<R>(rng: &mut R) -> Result<u8, Error>
where
    R: EntropySource + ?Sized,
{
    Ok(rand_num(rng, 2)? as u8)
}

pub fn coin_flip_bool<R>(rng: &mut R) -> Result<bool, Error>
where
    R: EntropySource + ?Sized,
{
    Ok(coin_flip(rng)? == 1)
}

#[cfg(test)]
pub(crate) mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    /// Fills only half of every buffer it is handed.
    pub(crate) struct ShortReads;

    impl EntropySource for ShortReads {
        fn read_random(&mut self, buf: &mut [u8]) -> Result<usize, rand::Error> {
            let half = buf.len() / 2;
            buf[..half].fill(0xAA);
            Ok(half)
        }
    }

    /// Fails every read.
    pub(crate) struct Broken;

    impl EntropySource for Broken {
        fn read_random(&mut self, _buf: &mut [u8]) -> Result<usize, rand::Error> {
            Err(rand::Error::new(std::io::Error::new(
                std::io::ErrorKind::Other,
                "entropy pool unavailable",
            )))
        }
    }

    /// Replays a fixed list of 64-bit words, then fails.
    pub(crate) struct Words(pub(crate) Vec<u64>);

    impl EntropySource for Words {
        fn read_random(&mut self, buf: &mut [u8]) -> Result<usize, rand::Error> {
            assert_eq!(buf.len(), 8, "words are always drawn whole");
            if self.0.is_empty() {
                return Broken.read_random(buf);
            }
            let word = self.0.remove(0);
            buf.copy_from_slice(&word.to_be_bytes());
            Ok(8)
        }
    }

    #[test]
    fn random_bytes_has_requested_length() {
        let mut rng = StdRng::seed_from_u64(1);
        for len in [1, 7, 8, 64, 1000] {
            assert_eq!(random_bytes(&mut rng, len).unwrap().len(), len);
        }
    }

    #[test]
    fn random_bytes_rejects_zero_length() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            random_bytes(&mut rng, 0),
            Err(Error::InvalidLength)
        ));
    }

    #[test]
    fn random_bytes_reports_short_reads() {
        match random_bytes(&mut ShortReads, 16) {
            Err(Error::LengthMismatch { expected, read }) => {
                assert_eq!(expected, 16);
                assert_eq!(read, 8);
            }
            other => panic!("expected a length mismatch, got {other:?}"),
        }
    }

    #[test]
    fn random_bytes_passes_through_source_faults() {
        assert!(matches!(random_bytes(&mut Broken, 4), Err(Error::Entropy(_))));
    }

    #[test]
    fn rand_num_rejects_zero() {
        let mut rng = StdRng::seed_from_u64(2);
        assert!(matches!(rand_num(&mut rng, 0), Err(Error::InvalidLength)));
    }

    #[test]
    fn rand_num_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for max in 1..=50u64 {
            for _ in 0..200 {
                assert!(rand_num(&mut rng, max).unwrap() < max);
            }
        }
        assert!(rand_num(&mut rng, u64::MAX).unwrap() < u64::MAX);
        assert_eq!(rand_num(&mut rng, 1).unwrap(), 0);
    }

    #[test]
    fn rand_num_is_uniform() {
        const BUCKETS: u64 = 10;
        const TRIALS: usize = 100_000;

        let mut rng = StdRng::seed_from_u64(4);
        let mut counts = [0usize; BUCKETS as usize];
        for _ in 0..TRIALS {
            counts[rand_num(&mut rng, BUCKETS).unwrap() as usize] += 1;
        }

        let expected = TRIALS as f64 / BUCKETS as f64;
        let chi_square: f64 = counts
            .iter()
            .map(|&c| {
                let diff = c as f64 - expected;
                diff * diff / expected
            })
            .sum();
        // 9 degrees of freedom; p = 0.001 critical value is 27.88.
        assert!(chi_square < 27.88, "chi-square {chi_square} for {counts:?}");
    }

    #[test]
    fn rand_num_redraws_words_in_the_biased_zone() {
        // 2^64 mod 3 == 1, so the word 0 is rejected and the next one is used.
        let mut rng = Words(vec![0, 5]);
        assert_eq!(rand_num(&mut rng, 3).unwrap(), 2);
    }

    #[test]
    fn coin_flip_only_yields_zero_or_one() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut seen = [false; 2];
        for _ in 0..1000 {
            let flip = coin_flip(&mut rng).unwrap();
            assert!(flip <= 1);
            seen[flip as usize] = true;
        }
        assert_eq!(seen, [true, true]);
    }

    #[test]
    fn coin_flip_bool_matches_coin_flip() {
        for seed in 0..100 {
            let flip = coin_flip(&mut StdRng::seed_from_u64(seed)).unwrap();
            let flip_bool = coin_flip_bool(&mut StdRng::seed_from_u64(seed)).unwrap();
            assert_eq!(flip_bool, flip == 1);
        }
    }
}
