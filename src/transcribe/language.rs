use serde::{Deserialize, Serialize};

/// Languages the service reports. The deployment only distinguishes
/// Khmer from English; anything unrecognized is reported as English.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lang {
    #[serde(rename = "en")]
    En,
    #[serde(rename = "km")]
    Km,
}

impl Lang {
    pub fn code(self) -> &'static str {
        match self {
            Lang::En => "en",
            Lang::Km => "km",
        }
    }
}

const KHMER_BLOCK_START: u32 = 0x1780;
const KHMER_BLOCK_END: u32 = 0x17FF;

fn contains_khmer(text: &str) -> bool {
    text.chars()
        .any(|c| (KHMER_BLOCK_START..=KHMER_BLOCK_END).contains(&(c as u32)))
}

/// Classify the language of a transcript.
///
/// The upstream capability's own language tag is unreliable for short
/// clips, so the rules are applied in order:
/// 1. any code point in the Khmer Unicode block → Khmer
/// 2. reported language name contains "khmer" (case-insensitive) → Khmer
/// 3. otherwise → English
pub fn normalize(text: &str, reported: Option<&str>) -> Lang {
    if contains_khmer(text) {
        return Lang::Km;
    }
    if let Some(name) = reported {
        if name.to_lowercase().contains("khmer") {
            return Lang::Km;
        }
    }
    Lang::En
}
