//! Identifier helpers.

use uuid::Uuid;

/// Separator used between identifier parts in cache keys and object keys.
pub const ID_SEPARATOR: &str = ":";

/// Generate a fresh random identifier.
pub fn new_uuid() -> String {
    Uuid::new_v4().to_string()
}

/// Join identifier parts with [`ID_SEPARATOR`].
pub fn join_ids(parts: &[&str]) -> String {
    parts.join(ID_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_ids() {
        assert_eq!(join_ids(&["abc", "user1"]), "abc:user1");
        assert_eq!(join_ids(&["watchcount", "abc"]), "watchcount:abc");
    }

    #[test]
    fn test_new_uuid_is_unique() {
        assert_ne!(new_uuid(), new_uuid());
        assert_eq!(new_uuid().len(), 36);
    }
}
