use ct_codecs::{Base64UrlSafeNoPadding, Encoder};
use sha2::{Digest, Sha256};

use crate::{Hasher, HasherError};

pub struct SHA256;

impl Hasher for SHA256 {
    fn hash_base64_url(&self, input: &[u8]) -> Result<String, HasherError> {
        let output = self.hash(input)?;
        Base64UrlSafeNoPadding::encode_to_string(output).map_err(|_| HasherError::CouldNotHash)
    }

    fn hash(&self, input: &[u8]) -> Result<Vec<u8>, HasherError> {
        let mut hasher = Sha256::new();
        hasher.update(input);
        Ok(hasher.finalize().to_vec())
    }
}
