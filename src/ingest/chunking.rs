//! Whitespace-safe text chunking.

/// Default target chunk length in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Split text into chunks of at most `chunk_size` characters.
///
/// Words are packed greedily and never split, so a single word longer than
/// `chunk_size` becomes its own oversized chunk. Runs of whitespace collapse
/// to one space. Never produces an empty chunk.
pub fn split_into_chunks(text: &str, chunk_size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if !current.is_empty() && current_len + 1 + word_len > chunk_size {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        assert_eq!(split_into_chunks("Bloom  the\ngrounds", 1000), vec!["Bloom the grounds"]);
    }

    #[test]
    fn test_empty_text() {
        assert!(split_into_chunks("", 10).is_empty());
        assert!(split_into_chunks("   \n\t", 10).is_empty());
    }

    #[test]
    fn test_greedy_packing() {
        let chunks = split_into_chunks("aaa bbb ccc ddd", 7);
        assert_eq!(chunks, vec!["aaa bbb", "ccc ddd"]);
    }

    #[test]
    fn test_long_word_gets_own_chunk() {
        let chunks = split_into_chunks("abcdefghijkl xy", 5);
        assert_eq!(chunks, vec!["abcdefghijkl", "xy"]);
    }

    #[test]
    fn test_chunks_bounded_and_lossless() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(200);
        let chunks = split_into_chunks(&text, DEFAULT_CHUNK_SIZE);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(!chunk.is_empty());
            assert!(chunk.chars().count() <= DEFAULT_CHUNK_SIZE);
        }

        let words: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(chunks.join(" ").split(' ').collect::<Vec<_>>(), words);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let chunks = split_into_chunks("café café", 9);
        assert_eq!(chunks, vec!["café café"]);
    }
}
