//! Record and identifier helpers

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use serde_json::{Map, Value};

/// A stored record: any JSON object
pub type Record = Map<String, Value>;

/// Random bytes behind each generated id
pub const ID_ENTROPY_BYTES: usize = 16;

/// Generates a URL-safe random record id (22 characters for 16 bytes)
pub fn generate_id() -> String {
    let mut bytes = [0u8; ID_ENTROPY_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Ids double as file names, so only the URL-safe base64 alphabet is allowed
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_valid_and_distinct() {
        let a = generate_id();
        let b = generate_id();
        assert_eq!(a.len(), 22);
        assert!(is_valid_id(&a));
        assert_ne!(a, b);
    }

    #[test]
    fn test_rejects_path_like_ids() {
        assert!(!is_valid_id(""));
        assert!(!is_valid_id("../secrets"));
        assert!(!is_valid_id("a/b"));
        assert!(!is_valid_id("card.json"));
        assert!(is_valid_id("Ab-_09"));
    }
}
