//! Mojibake repair for raw label tokens
//!
//! Annotation exports store UTF-8 text that was decoded as Latin-1 somewhere
//! upstream, so `正手` arrives as `æ­£æ‰‹`-style garbage. Repair maps every
//! character back to its Latin-1 byte and decodes the bytes as UTF-8.

use std::borrow::Cow;

use crate::record::{Decoded, Original, RawExport};

/// Repairs text that was UTF-8 decoded as Latin-1.
///
/// Returns the input unchanged when it cannot be mojibake: when a character lies
/// outside Latin-1, or when the recovered bytes are not valid UTF-8.
///
/// ```
/// # use strokelab_pipeline::codec::repair_mojibake;
/// let garbled: String = "正手".bytes().map(char::from).collect();
/// assert_eq!(repair_mojibake(&garbled), "正手");
/// assert_eq!(repair_mojibake("正手"), "正手");
/// ```
#[must_use]
pub fn repair_mojibake(text: &str) -> Cow<'_, str> {
    if text.is_ascii() {
        return Cow::Borrowed(text);
    }

    let Some(bytes) = text
        .chars()
        .map(|c| u8::try_from(u32::from(c)).ok())
        .collect::<Option<Vec<u8>>>()
    else {
        return Cow::Borrowed(text);
    };

    match String::from_utf8(bytes) {
        Ok(repaired) => Cow::Owned(repaired),
        Err(_) => Cow::Borrowed(text),
    }
}

/// Repairs every token of a label token list in place.
pub fn repair_tokens(tokens: &mut [String]) {
    for token in tokens {
        let repaired = repair_mojibake(token).into_owned();
        *token = repaired;
    }
}

/// Repairs the label tokens of every action in an export.
#[must_use]
pub fn decode_export(mut export: RawExport<Original>) -> RawExport<Decoded> {
    for action in export.videos.iter_mut().flat_map(|video| &mut video.actions) {
        repair_tokens(&mut action.label_names);
    }
    export.into_stage()
}
