use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "m4a", "wav"];

const VERSION_MARKER: &str = "Taylor's Version";

static TRUNCATED_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\btaylor['’]s ver(?:sion)?\b").expect("static pattern")
});
static TRACK_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:cd\d+ )?\d+[-._ ]+").expect("static pattern"));
static FEATURING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:ft|feat)\b\.?").expect("static pattern"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static pattern"));

pub fn normalize_filename(file_name: &str) -> String {
    let base = strip_audio_extension(file_name).nfc().collect::<String>();
    let base = collapse_spaces(&base);
    let base = TRUNCATED_VERSION.replace_all(&base, VERSION_MARKER);
    let base = FEATURING.replace_all(&base, "feat.");
    let base = TRACK_PREFIX.replace(&base, "");
    trim_dangling_paren(&base)
}

pub fn normalize_title(title: &str) -> String {
    let title = collapse_spaces(&title.nfc().collect::<String>());
    TRUNCATED_VERSION
        .replace_all(&title, VERSION_MARKER)
        .into_owned()
}

pub fn distance(a: &str, b: &str) -> usize {
    strsim::levenshtein(&a.to_lowercase(), &b.to_lowercase())
}

pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

pub fn is_audio_name(file_name: &str) -> bool {
    audio_extension(file_name).is_some()
}

fn strip_audio_extension(file_name: &str) -> &str {
    match audio_extension(file_name) {
        Some(ext) => &file_name[..file_name.len() - ext.len() - 1],
        None => file_name,
    }
}

fn audio_extension(file_name: &str) -> Option<&str> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    AUDIO_EXTENSIONS
        .iter()
        .any(|supported| ext.eq_ignore_ascii_case(supported))
        .then_some(ext)
}

fn collapse_spaces(value: &str) -> String {
    let spaced = value.replace('_', " ");
    WHITESPACE.replace_all(&spaced, " ").trim().to_string()
}

fn trim_dangling_paren(value: &str) -> String {
    value
        .trim_end_matches(|c: char| c == '(' || c.is_whitespace())
        .trim()
        .to_string()
}
