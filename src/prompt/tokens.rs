//! Heuristic tokenizer for prompt size estimation
//!
//! Approximates the behaviour of BPE tokenizers used by hosted models
//! closely enough for a price estimate: words are split into pieces of at
//! most six characters, digits into groups of three, a single leading
//! space is folded into the following word and every punctuation mark is
//! its own token. Pieces are mapped to stable FNV-1a ids.

const MAX_WORD_PIECE: usize = 6;
const MAX_DIGIT_PIECE: usize = 3;

const FNV_OFFSET: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Word,
    Digit,
    Space,
    Punct,
}

fn class_of(c: char) -> Class {
    if c.is_numeric() {
        Class::Digit
    } else if c.is_alphabetic() {
        Class::Word
    } else if c.is_whitespace() {
        Class::Space
    } else {
        Class::Punct
    }
}

fn token_id(piece: &str) -> u32 {
    piece.bytes().fold(FNV_OFFSET, |hash, b| {
        (hash ^ u32::from(b)).wrapping_mul(FNV_PRIME)
    })
}

/// Push `run` as pieces of at most `max` chars
fn push_pieces<'a>(out: &mut Vec<&'a str>, run: &'a str, max: usize) {
    let mut start = 0;
    let mut count = 0;
    for (idx, _) in run.char_indices() {
        if count == max {
            out.push(&run[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < run.len() {
        out.push(&run[start..]);
    }
}

/// Split text into token pieces
pub fn pieces(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut i = 0;

    while i < chars.len() {
        let (start, c) = chars[i];
        let class = class_of(c);

        if class == Class::Punct {
            let end = chars.get(i + 1).map_or(text.len(), |(idx, _)| *idx);
            out.push(&text[start..end]);
            i += 1;
            continue;
        }

        let mut j = i + 1;
        while j < chars.len() && class_of(chars[j].1) == class {
            j += 1;
        }
        let end = chars.get(j).map_or(text.len(), |(idx, _)| *idx);

        match class {
            Class::Space => {
                // A lone trailing space before a word becomes part of it
                let next_is_word = chars
                    .get(j)
                    .is_some_and(|(_, n)| class_of(*n) == Class::Word);
                let last_is_space = chars[j - 1].1 == ' ';
                if next_is_word && last_is_space {
                    let lead_end = chars[j - 1].0;
                    if lead_end > start {
                        out.push(&text[start..lead_end]);
                    }
                    // Consume the word together with its space
                    let mut k = j + 1;
                    while k < chars.len() && class_of(chars[k].1) == Class::Word {
                        k += 1;
                    }
                    let word_end = chars.get(k).map_or(text.len(), |(idx, _)| *idx);
                    let word = &text[lead_end..word_end];
                    let head_end = word
                        .char_indices()
                        .nth(MAX_WORD_PIECE + 1)
                        .map_or(word.len(), |(idx, _)| idx);
                    out.push(&word[..head_end]);
                    push_pieces(&mut out, &word[head_end..], MAX_WORD_PIECE);
                    i = k;
                    continue;
                }
                out.push(&text[start..end]);
            }
            Class::Word => push_pieces(&mut out, &text[start..end], MAX_WORD_PIECE),
            Class::Digit => push_pieces(&mut out, &text[start..end], MAX_DIGIT_PIECE),
            Class::Punct => unreachable!("punctuation handled above"),
        }
        i = j;
    }

    out
}

/// Encode text into token ids
pub fn encode(text: &str) -> Vec<u32> {
    pieces(text).into_iter().map(token_id).collect()
}

/// Number of tokens in `text`
pub fn count(text: &str) -> usize {
    pieces(text).len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert!(encode("").is_empty());
        assert_eq!(count(""), 0);
    }

    #[test]
    fn test_short_words_with_spaces() {
        assert_eq!(pieces("the cat sat"), vec!["the", " cat", " sat"]);
    }

    #[test]
    fn test_long_word_is_split() {
        assert_eq!(pieces("translation"), vec!["transl", "ation"]);
        assert_eq!(pieces(" translation"), vec![" transl", "ation"]);
        assert_eq!(pieces(" interpretation"), vec![" interp", "retati", "on"]);
    }

    #[test]
    fn test_digits_grouped_by_three() {
        assert_eq!(pieces("1234567"), vec!["123", "456", "7"]);
    }

    #[test]
    fn test_punctuation_and_newlines() {
        assert_eq!(pieces("Hi!\n\nok."), vec!["Hi", "!", "\n\n", "ok", "."]);
    }

    #[test]
    fn test_multiple_spaces_before_word() {
        assert_eq!(pieces("a   b"), vec!["a", "  ", " b"]);
    }

    #[test]
    fn test_placeholder_braces() {
        assert_eq!(pieces("{{X}}"), vec!["{", "{", "X", "}", "}"]);
    }

    #[test]
    fn test_non_ascii() {
        assert_eq!(pieces("Übersetzungen"), vec!["Überse", "tzunge", "n"]);
        assert!(count("สวัสดีครับ") > 0);
    }

    #[test]
    fn test_ids_are_stable() {
        let a = encode("hello world");
        let b = encode("hello world");
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
        assert_eq!(a[0], token_id("hello"));
        assert_eq!(a[1], token_id(" world"));
    }

    #[test]
    fn test_count_matches_encode() {
        let text = "You are an expert simultaneous interpreter, 2024 edition.";
        assert_eq!(count(text), encode(text).len());
    }
}
