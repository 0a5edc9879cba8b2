use sha2::{Digest, Sha256};

pub fn compute_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    hex::encode(digest)
}

/// Unpredictable file name stem for a new upload.
pub fn random_file_stem(file_name: &str) -> String {
    let nonce: u128 = rand::random();
    compute_hash(&format!("upload:{nonce:032x}:{file_name}"))
}
