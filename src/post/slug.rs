use rand::Rng;

/// Number of leading words carried into a slug.
pub const SLUG_WORDS: usize = 5;

/// Lower-cased word tokens of `text`: maximal runs of alphanumeric characters
/// or underscores.
///
/// Narrower than `regex`'s `\w`: combining marks are not word characters, so
/// `cafe\u{301}` yields `cafe`.
pub fn slug_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|word| !word.is_empty())
        .take(SLUG_WORDS)
        .map(str::to_string)
        .collect()
}

/// Eight hex characters from 32 bits of the thread-local CSPRNG.
pub fn random_suffix() -> String {
    format!("{:08x}", rand::rng().random::<u32>())
}

/// Build a slug such as `hello-world-123-9f86d081`.
///
/// Uniqueness is not guaranteed; callers check storage and retry.
pub fn create_slug(text: &str) -> String {
    let words = slug_words(text);
    let suffix = random_suffix();

    if words.is_empty() {
        suffix
    } else {
        format!("{}-{}", words.join("-"), suffix)
    }
}
