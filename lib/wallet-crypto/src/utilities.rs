use rand::distributions::{Alphanumeric, DistString};
use rand::{CryptoRng, Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// RFC 3986 unreserved characters
const UNRESERVED: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";

pub fn generate_alphanumeric(length: usize) -> String {
    Alphanumeric.sample_string(&mut get_rng(), length)
}

pub fn generate_unreserved(length: usize) -> String {
    let rng = &mut get_rng();
    std::iter::repeat_with(|| UNRESERVED[rng.gen_range(0..UNRESERVED.len())] as char)
        .take(length)
        .collect()
}

pub fn generate_length_in_range(min: usize, max: usize) -> usize {
    get_rng().gen_range(min..=max)
}

pub fn get_rng() -> impl RngCore + CryptoRng {
    ChaCha20Rng::from_entropy()
}

#[cfg(test)]
mod test {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(1)]
    #[case(43)]
    #[case(128)]
    fn test_generate_unreserved(#[case] length: usize) {
        let value = generate_unreserved(length);
        assert_eq!(value.len(), length);
        assert!(
            value
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "-._~".contains(c))
        );
    }

    #[test]
    fn test_generate_length_in_range() {
        for _ in 0..100 {
            let length = generate_length_in_range(43, 128);
            assert!((43..=128).contains(&length));
        }
    }
}
