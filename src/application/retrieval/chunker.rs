//! Paragraph-greedy chunking.
//!
//! Paragraphs (blank-line separated) are accumulated whole into a chunk until
//! adding the next one would exceed the word budget. A boundary is only ever
//! drawn between paragraphs, so a single paragraph longer than the budget
//! still becomes one whole chunk. Chunks never overlap.

pub const DEFAULT_CHUNK_WORDS: usize = 350;

pub fn chunk(text: &str, max_words: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut count = 0;

    for paragraph in paragraphs(text) {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if count + words.len() > max_words && !current.is_empty() {
            chunks.push(current.join(" "));
            current.clear();
            count = 0;
        }
        count += words.len();
        current.extend(words);
    }
    if !current.is_empty() {
        chunks.push(current.join(" "));
    }
    chunks
}

/// Split on runs of blank lines, dropping whitespace-only paragraphs.
fn paragraphs(text: &str) -> Vec<&str> {
    let mut result = Vec::new();
    let mut start = None;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        if line.trim().is_empty() {
            if let Some(begin) = start.take() {
                result.push(text[begin..offset].trim());
            }
        } else if start.is_none() {
            start = Some(offset);
        }
        offset += line.len();
    }
    if let Some(begin) = start {
        result.push(text[begin..].trim());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn empty_and_whitespace_input_yield_no_chunks() {
        assert!(chunk("", DEFAULT_CHUNK_WORDS).is_empty());
        assert!(chunk("  \n\n   \n", DEFAULT_CHUNK_WORDS).is_empty());
    }

    #[test]
    fn an_oversized_paragraph_is_never_split() {
        let text = words(900);
        let chunks = chunk(&text, 350);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].split_whitespace().count(), 900);
    }

    #[test]
    fn paragraphs_pack_greedily_up_to_the_budget() {
        let text = format!("{}\n\n{}\n\n{}", words(200), words(100), words(100));
        let chunks = chunk(&text, 350);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].split_whitespace().count(), 300);
        assert_eq!(chunks[1].split_whitespace().count(), 100);
    }

    #[test]
    fn chunks_never_double_count_words() {
        let text = format!(
            "{}\n\n{}\n\n\n{}\n\n{}",
            words(120),
            words(300),
            words(50),
            words(400)
        );
        let total: usize = chunk(&text, 350)
            .iter()
            .map(|c| c.split_whitespace().count())
            .sum();
        assert_eq!(total, 870);
    }

    #[test]
    fn multiple_blank_lines_count_as_one_boundary() {
        let chunks = chunk("alpha\n\n\n\nbeta", 10);
        assert_eq!(chunks, vec!["alpha beta".to_string()]);
    }

    #[test]
    fn single_newlines_stay_inside_a_paragraph() {
        let chunks = chunk("one two\nthree four", 10);
        assert_eq!(chunks, vec!["one two three four".to_string()]);
    }
}
