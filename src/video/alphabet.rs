use std::str::FromStr;

use crate::foundation::error::{TracemarkError, TracemarkResult};

const DIGITS: &str = "0123456789";
const LATIN: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const HIRAGANA: &str = "あいうえおかきくけこさしすせそたちつてとなにぬねのはひふへほまみむめもやゆよらりるれろわゐゑをん";
const KATAKANA: &str = "アイウエオカキクケコサシスセソタチツテトナニヌネノハヒフヘホマミムメモヤユヨラリルレロワヰヱヲン";
const SYMBOL: &str = "●";

/// Character set a cipher is drawn from.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alphabet {
    /// `0-9`.
    #[default]
    Digits,
    /// ASCII letters and digits.
    Latin,
    /// Hiragana and katakana. Needs a font with Japanese coverage.
    Kana,
    /// A single filled circle; every copy carries the same shape.
    Symbol,
    /// Caller-provided characters.
    Custom(String),
}

impl Alphabet {
    /// Characters of the alphabet, in order.
    pub fn chars(&self) -> Vec<char> {
        match self {
            Self::Digits => DIGITS.chars().collect(),
            Self::Latin => LATIN.chars().collect(),
            Self::Kana => HIRAGANA.chars().chain(KATAKANA.chars()).collect(),
            Self::Symbol => SYMBOL.chars().collect(),
            Self::Custom(s) => s.chars().collect(),
        }
    }
}

impl FromStr for Alphabet {
    type Err = TracemarkError;

    /// Accepts the preset names `digits`, `en`, `jp`, `symbol`, or `custom:<chars>`.
    fn from_str(s: &str) -> TracemarkResult<Self> {
        match s {
            "digits" => Ok(Self::Digits),
            "en" | "latin" => Ok(Self::Latin),
            "jp" | "kana" => Ok(Self::Kana),
            "symbol" => Ok(Self::Symbol),
            other => match other.strip_prefix("custom:") {
                Some(chars) if !chars.is_empty() => Ok(Self::Custom(chars.to_string())),
                _ => Err(TracemarkError::validation(format!(
                    "unknown alphabet '{other}' (expected digits, en, jp, symbol, or custom:<chars>)"
                ))),
            },
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/video/alphabet.rs"]
mod tests;
