//! Inline markup removal for description text.
//!
//! Two grammars are in use and they are deliberately kept apart: status
//! descriptions drop only the tags, action descriptions drop a tag pair
//! together with whatever it encloses.

use once_cell::sync::Lazy;
use regex::Regex;

static BARE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^<]+?>").expect("bare tag pattern"));

static PAIRED_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<.*?>.*?</.*?>").expect("paired tag pattern"));

/// `"Deals <b>damage</b>."` becomes `"Deals damage."`
pub fn strip_bare_tags(text: &str) -> String {
    BARE_TAG.replace_all(text, "").into_owned()
}

/// `"Deals <b>damage</b>."` becomes `"Deals ."`
pub fn strip_paired_tags(text: &str) -> String {
    PAIRED_TAG.replace_all(text, "").into_owned()
}
