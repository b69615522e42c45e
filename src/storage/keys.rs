// Physical key layout shared by every storage tier
//
// For shortcut `K`: `K` → replacement, `__label__K` → label, `__meta__K` → write timestamp.

/// Prefix of label companion keys
pub const LABEL_PREFIX: &str = "__label__";
/// Prefix of timestamp companion keys
pub const META_PREFIX: &str = "__meta__";

/// A flat storage key decoded into what it describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKey<'a> {
    Value(&'a str),
    Label(&'a str),
    Meta(&'a str),
}

impl<'a> RecordKey<'a> {
    pub fn parse(key: &'a str) -> Self {
        if let Some(token) = key.strip_prefix(LABEL_PREFIX) {
            RecordKey::Label(token)
        } else if let Some(token) = key.strip_prefix(META_PREFIX) {
            RecordKey::Meta(token)
        } else {
            RecordKey::Value(key)
        }
    }

    /// The shortcut token the key belongs to
    pub fn token(&self) -> &'a str {
        match self {
            RecordKey::Value(t) | RecordKey::Label(t) | RecordKey::Meta(t) => t,
        }
    }
}

pub fn label_key(token: &str) -> String {
    format!("{}{}", LABEL_PREFIX, token)
}

pub fn meta_key(token: &str) -> String {
    format!("{}{}", META_PREFIX, token)
}

/// All three physical keys of one logical record
pub fn record_keys(token: &str) -> Vec<String> {
    vec![token.to_string(), label_key(token), meta_key(token)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keys() {
        assert_eq!(RecordKey::parse("brb"), RecordKey::Value("brb"));
        assert_eq!(RecordKey::parse("__label__brb"), RecordKey::Label("brb"));
        assert_eq!(RecordKey::parse("__meta__brb"), RecordKey::Meta("brb"));
        assert_eq!(RecordKey::parse("__meta__brb").token(), "brb");
    }

    #[test]
    fn test_record_keys() {
        assert_eq!(
            record_keys("sig"),
            vec!["sig".to_string(), "__label__sig".to_string(), "__meta__sig".to_string()]
        );
    }
}
