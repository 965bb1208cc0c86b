//! Positioned word tokens from a single text line.
//!
//! Offsets are counted in characters, not bytes, so accented names do not
//! shift the columns of everything to their right.

/// A word (or merged phrase) and its `[start, end)` character span in the
/// raw line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// A tokenized line plus the views of it that control flow decisions need.
#[derive(Debug, Clone)]
pub struct TakenLine<'a> {
    /// Tokens in left-to-right order.
    pub tokens: Vec<Token>,
    /// The line without leading or trailing whitespace.
    pub trimmed: &'a str,
    /// Character count of the raw line, layout padding included and line
    /// terminator excluded.
    pub length: usize,
}

impl TakenLine<'_> {
    /// Whether nothing survived tokenization.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// A whitespace-separated word with its character span.
struct Word<'a> {
    text: &'a str,
    start: usize,
    end: usize,
}

fn words(line: &str) -> (Vec<Word<'_>>, usize) {
    let mut words = Vec::new();
    // (char offset, byte offset) of the word being read
    let mut current: Option<(usize, usize)> = None;
    let mut length = 0;

    for (char_pos, (byte_pos, c)) in line.char_indices().enumerate() {
        length = char_pos + 1;
        if c.is_whitespace() {
            if let Some((start, byte_start)) = current.take() {
                words.push(Word {
                    text: &line[byte_start..byte_pos],
                    start,
                    end: char_pos,
                });
            }
        } else if current.is_none() {
            current = Some((char_pos, byte_pos));
        }
    }

    if let Some((start, byte_start)) = current {
        words.push(Word {
            text: &line[byte_start..],
            start,
            end: length,
        });
    }

    (words, length)
}

/// Splits `line` into positioned tokens.
///
/// With `join_words`, a word separated from the previous kept token by at
/// most one whitespace character is appended to it, so names and labels
/// broken into words come back as one phrase. `ignore` receives each word
/// and its index among all words of the line; words it accepts are dropped
/// before joining.
///
/// ```
/// use verba_extract::tokenizer::tokenize;
///
/// let line = "Fulano de Tal    R$ 1.200,00";
/// let taken = tokenize(line, true, |w, _| w == "R$");
/// let texts: Vec<&str> = taken.tokens.iter().map(|t| t.text.as_str()).collect();
/// assert_eq!(texts, ["Fulano de Tal", "1.200,00"]);
/// assert_eq!(taken.tokens[1].start, 20);
/// ```
pub fn tokenize<F>(line: &str, join_words: bool, mut ignore: F) -> TakenLine<'_>
where
    F: FnMut(&str, usize) -> bool,
{
    let (words, length) = words(line);
    let mut tokens: Vec<Token> = Vec::with_capacity(words.len());

    for (index, word) in words.into_iter().enumerate() {
        if ignore(word.text, index) {
            continue;
        }
        match tokens.last_mut() {
            Some(last) if join_words && word.start <= last.end + 1 => {
                last.text.push(' ');
                last.text.push_str(word.text);
                last.end = word.end;
            }
            _ => tokens.push(Token {
                text: word.text.to_owned(),
                start: word.start,
                end: word.end,
            }),
        }
    }

    TakenLine {
        tokens,
        trimmed: line.trim(),
        length,
    }
}

/// Tokenizes with joining on and nothing ignored.
#[must_use]
pub fn tokenize_all(line: &str) -> TakenLine<'_> {
    tokenize(line, true, |_, _| false)
}
