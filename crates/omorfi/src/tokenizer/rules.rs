// Rule-based tokenization, used when no tokenizer model is loaded or the
// model has no reading for a chunk of text.

use omorfi_core::character::{CharType, get_char_type, is_hyphen, is_quotation_mark};
use omorfi_core::TokenKind;

/// Characters outside letter/digit/punctuation that may occur in e-mail
/// addresses.
fn is_email_unknown_char(c: char) -> bool {
    matches!(c, '#' | '$' | '%' | '*' | '+' | '=' | '^' | '_' | '`' | '|' | '~')
}

/// Punctuation allowed in e-mail addresses.
fn is_email_punctuation_char(c: char) -> bool {
    matches!(c, '!' | '&' | '\'' | '-' | '/' | '?' | '{' | '}' | '.')
}

/// Characters outside letter/digit/punctuation allowed in HTTP URLs.
fn is_url_unknown_char(c: char) -> bool {
    matches!(c, '=' | '#' | '%')
}

fn starts_with_chars(text: &[char], prefix: &str) -> bool {
    text.len() >= prefix.chars().count() && text.iter().copied().zip(prefix.chars()).all(|(a, b)| a == b)
}

/// Length of a URL (`http://`, `https://`) or e-mail address at the start of
/// `text`, or 0 if there is none.
fn find_url_or_email(text: &[char]) -> usize {
    let textlen = text.len();

    // 12 is a rough lower bound for a real-world HTTP URL
    let is_https = textlen >= 12 && starts_with_chars(text, "https://");
    let is_http = textlen >= 12 && starts_with_chars(text, "http://");
    if !is_http && !is_https {
        return find_email(text);
    }

    let start = if is_https { 8 } else { 7 };
    for i in start..textlen {
        match get_char_type(text[i]) {
            CharType::Whitespace => return i,
            CharType::Unknown => {
                if !is_url_unknown_char(text[i]) {
                    return i;
                }
            }
            CharType::Digit | CharType::Letter => {}
            CharType::Punctuation => {
                // a dot before the end or whitespace closes the sentence, not the URL
                if text[i] == '.'
                    && (i + 1 == textlen || get_char_type(text[i + 1]) == CharType::Whitespace)
                {
                    return i;
                }
            }
        }
    }
    textlen
}

fn find_email(text: &[char]) -> usize {
    let textlen = text.len();
    if textlen < 6 {
        return 0;
    }

    let mut found_at = false;
    let mut found_dot = false;
    let complete = |found_at: bool, found_dot: bool, i: usize| {
        if found_at && found_dot { i } else { 0 }
    };

    for i in 0..textlen {
        let c = text[i];
        match get_char_type(c) {
            CharType::Whitespace => return complete(found_at, found_dot, i),
            CharType::Unknown => {
                if c == '@' {
                    if found_at {
                        return 0;
                    }
                    found_at = true;
                } else if !is_email_unknown_char(c) {
                    return complete(found_at, found_dot, i);
                }
            }
            CharType::Digit | CharType::Letter => {}
            CharType::Punctuation => {
                if c == '.' && found_at {
                    if i + 1 == textlen || get_char_type(text[i + 1]) == CharType::Whitespace {
                        return complete(found_at, found_dot, i);
                    }
                    found_dot = true;
                } else if !is_email_punctuation_char(c) {
                    return complete(found_at, found_dot, i);
                }
            }
        }
    }
    complete(found_at, found_dot, textlen)
}

/// Length of the word starting at `text[0]`.
///
/// Letters and digits run on; apostrophes and colons join letters
/// ("vaa'an", "EU:n"), hyphens join word parts and stay on a word that ends
/// in one ("kala-" in "kala- ja lihakauppa"), dots join letters and digit
/// groups ("1.2.3") but a final dot is left out, and commas join digits
/// ("1,5").
fn word_length(text: &[char]) -> usize {
    let textlen = text.len();

    let url_length = find_url_or_email(text);
    if url_length != 0 {
        return url_length;
    }

    let mut wlen = 0;
    let mut processing_number = false;
    let mut seen_letters = false;

    while wlen < textlen {
        let c = text[wlen];
        let next = text.get(wlen + 1).copied();
        match get_char_type(c) {
            CharType::Letter => {
                processing_number = false;
                seen_letters = true;
                wlen += 1;
            }
            CharType::Digit => {
                processing_number = true;
                wlen += 1;
            }
            CharType::Whitespace | CharType::Unknown => return wlen,
            CharType::Punctuation => match c {
                '\'' | '\u{2019}' | ':' => match next.map(get_char_type) {
                    Some(CharType::Letter) => wlen += 1,
                    _ => return wlen,
                },
                c if is_hyphen(c) => {
                    let Some(next) = next else {
                        return wlen + 1;
                    };
                    if is_quotation_mark(next) {
                        return wlen + 1;
                    }
                    match get_char_type(next) {
                        CharType::Letter | CharType::Digit => wlen += 1,
                        CharType::Whitespace | CharType::Unknown => return wlen + 1,
                        CharType::Punctuation => {
                            return if next == ',' { wlen + 1 } else { wlen };
                        }
                    }
                }
                '.' => match next.map(get_char_type) {
                    Some(CharType::Letter) => wlen += 1,
                    Some(CharType::Digit) if !seen_letters => wlen += 1,
                    _ => return wlen,
                },
                ',' => match next.map(get_char_type) {
                    Some(CharType::Digit) if processing_number => wlen += 1,
                    _ => return wlen,
                },
                _ => return wlen,
            },
        }
    }
    textlen
}

/// Find the token starting at `text[0]`.
///
/// Returns its kind and length in characters. A kind of `None` marks a run of
/// whitespace, which separates tokens but is not one. `text` must not be
/// empty.
pub fn next_token(text: &[char]) -> (Option<TokenKind>, usize) {
    match get_char_type(text[0]) {
        CharType::Letter | CharType::Digit => (Some(TokenKind::Word), word_length(text)),
        CharType::Whitespace => {
            let len = text
                .iter()
                .take_while(|&&c| get_char_type(c) == CharType::Whitespace)
                .count();
            (None, len)
        }
        CharType::Punctuation => {
            // leading hyphen followed by a word: "-talo", "-2"
            if matches!(text[0], '-' | '\u{2010}' | '\u{2011}') && text.len() > 1 {
                let wlen = match get_char_type(text[1]) {
                    CharType::Letter | CharType::Digit => word_length(&text[1..]),
                    _ => 0,
                };
                if wlen > 0 {
                    return (Some(TokenKind::Word), wlen + 1);
                }
            }
            if text.len() >= 3 && text[..3] == ['.', '.', '.'] {
                return (Some(TokenKind::Punctuation), 3);
            }
            (Some(TokenKind::Punctuation), 1)
        }
        CharType::Unknown => (Some(TokenKind::Unknown), 1),
    }
}

/// Split `text` into `(kind, surface)` pieces by the rules above.
pub fn split(text: &str) -> Vec<(TokenKind, String)> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = Vec::new();
    let mut pos = 0;
    while pos < chars.len() {
        let (kind, len) = next_token(&chars[pos..]);
        if let Some(kind) = kind {
            out.push((kind, chars[pos..pos + len].iter().collect()));
        }
        pos += len;
    }
    out
}
