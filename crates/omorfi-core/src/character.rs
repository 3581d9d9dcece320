// Character classification used by the rule-based tokenizer and case handling.

/// Coarse character class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharType {
    Unknown,
    Letter,
    Digit,
    Whitespace,
    Punctuation,
}

/// Returns the character type for a given character.
///
/// Letters are anything Unicode considers alphabetic, which covers Latin,
/// Cyrillic and Sámi orthographies alike. Combining marks count as letters
/// too, so decomposed (NFD) text keeps its accented words whole: the
/// tokenizer does not compose them, and a token's surface stays in the form
/// it had in the input. Digits are any numeric character, not just ASCII.
/// Punctuation is a closed list of marks that occur in running text;
/// anything else that is neither letter, digit nor whitespace is `Unknown`
/// (symbols, emoji, control characters).
pub fn get_char_type(c: char) -> CharType {
    if c.is_alphabetic() || is_combining_mark(c) {
        return CharType::Letter;
    }
    if is_whitespace(c) {
        return CharType::Whitespace;
    }
    if is_punctuation_char(c) || is_quotation_mark(c) {
        return CharType::Punctuation;
    }
    if c.is_numeric() {
        return CharType::Digit;
    }
    CharType::Unknown
}

/// Check whether a character is a combining mark that attaches to the letter
/// before it.
///
/// Covers the combining diacritic blocks plus Hebrew points and Arabic
/// harakat. Vowel signs of Indic and other abugidas are already alphabetic.
pub fn is_combining_mark(c: char) -> bool {
    matches!(
        c,
        '\u{0300}'..='\u{036F}'
            | '\u{0483}'..='\u{0489}'
            | '\u{0591}'..='\u{05BD}'
            | '\u{05BF}'
            | '\u{05C1}'..='\u{05C2}'
            | '\u{05C4}'..='\u{05C5}'
            | '\u{05C7}'
            | '\u{0610}'..='\u{061A}'
            | '\u{064B}'..='\u{065F}'
            | '\u{0670}'
            | '\u{06D6}'..='\u{06DC}'
            | '\u{06DF}'..='\u{06E4}'
            | '\u{06E7}'..='\u{06E8}'
            | '\u{06EA}'..='\u{06ED}'
            | '\u{1AB0}'..='\u{1AFF}'
            | '\u{1DC0}'..='\u{1DFF}'
            | '\u{20D0}'..='\u{20F0}'
            | '\u{302A}'..='\u{302F}'
            | '\u{3099}'..='\u{309A}'
            | '\u{FE20}'..='\u{FE2F}'
    )
}

fn is_punctuation_char(c: char) -> bool {
    matches!(
        c,
        '.' | ','
            | ';'
            | '-'
            | '!'
            | '?'
            | ':'
            | '\''
            | '('
            | ')'
            | '['
            | ']'
            | '{'
            | '}'
            | '/'
            | '&'
            | '\u{00AD}' // SOFT HYPHEN
            | '\u{2018}' // LEFT SINGLE QUOTATION MARK
            | '\u{2019}' // RIGHT SINGLE QUOTATION MARK
            | '\u{2010}' // HYPHEN
            | '\u{2011}' // NON-BREAKING HYPHEN
            | '\u{2013}' // EN DASH
            | '\u{2014}' // EM DASH
            | '\u{2026}' // HORIZONTAL ELLIPSIS
    )
}

/// Check whether a character is a double quotation mark of any style.
pub fn is_quotation_mark(c: char) -> bool {
    matches!(
        c,
        '"' | '\u{00AB}' // « LEFT-POINTING DOUBLE ANGLE QUOTATION MARK
            | '\u{00BB}' // » RIGHT-POINTING DOUBLE ANGLE QUOTATION MARK
            | '\u{201C}' // LEFT DOUBLE QUOTATION MARK
            | '\u{201D}' // RIGHT DOUBLE QUOTATION MARK
            | '\u{201E}' // DOUBLE LOW-9 QUOTATION MARK
    )
}

/// Check whether a character is a hyphen that can join word parts.
pub fn is_hyphen(c: char) -> bool {
    matches!(c, '-' | '\u{00AD}' | '\u{2010}' | '\u{2011}')
}

// ---------------------------------------------------------------------------
// Case mapping
//
// One-to-one mappings only: multi-character expansions (e.g. German sharp s
// uppercasing to "SS") keep just the first character so that case variants
// never change a word's length.
// ---------------------------------------------------------------------------

/// Convert a character to its simple lowercase equivalent.
pub fn simple_lower(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Convert a character to its simple uppercase equivalent.
pub fn simple_upper(c: char) -> char {
    c.to_uppercase().next().unwrap_or(c)
}

/// Check whether a character is an uppercase letter.
pub fn is_upper(c: char) -> bool {
    c != simple_lower(c)
}

/// Check whether a character is a lowercase letter.
pub fn is_lower(c: char) -> bool {
    c != simple_upper(c)
}

/// Check whether a character is whitespace, including the no-break and
/// typographic spaces that show up in edited text.
pub fn is_whitespace(c: char) -> bool {
    let cp = c as u32;
    (0x09..=0x0D).contains(&cp)
        || cp == 0x20
        || cp == 0x85
        || cp == 0xA0
        || cp == 0x1680
        || cp == 0x180E
        || (0x2000..=0x200A).contains(&cp)
        || cp == 0x2028
        || cp == 0x2029
        || cp == 0x202F
        || cp == 0x205F
        || cp == 0x3000
}
