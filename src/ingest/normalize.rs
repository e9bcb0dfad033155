// src/ingest/normalize.rs
//! Heuristic markup stripping for provider text fields.
//!
//! Tags are removed with a non-greedy `<...>` match; there is no HTML parsing, so
//! nested or malformed markup is handled only as well as the regex allows. After
//! stripping, a fixed set of entities is replaced one after another. `&amp;` is
//! decoded before `&lt;`/`&gt;`, so `&amp;lt;` ends up as `<`; anything outside the
//! list (e.g. `&nbsp;`, numeric references) is left untouched.

use once_cell::sync::OnceCell;
use regex::Regex;

/// Replacement order matters; see module docs.
const ENTITIES: [(&str, &str); 6] = [
    ("&quot;", "\""),
    ("&apos;", "'"),
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&middot;", "\u{00B7}"),
];

fn tag_regex() -> &'static Regex {
    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    // `.` without (?s): tags spanning a newline are left alone.
    RE_TAGS.get_or_init(|| Regex::new(r"<.*?>").expect("tag regex"))
}

/// Strip tags, then decode the fixed entity list. Empty input yields "".
pub fn normalize_text(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    let mut out = tag_regex().replace_all(s, "").into_owned();
    for (entity, ch) in ENTITIES {
        if out.contains(entity) {
            out = out.replace(entity, ch);
        }
    }
    out
}
