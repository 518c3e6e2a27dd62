use sha2::Digest;

/// Lowercase hex SHA-256 of `bytes`, logged for every written file.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    hex::encode(digest)
}
