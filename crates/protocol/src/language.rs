//! Language name normalisation.
//!
//! The trend feeds are partitioned by language and use a lowercase URL
//! segment, while the social feed tags posts with an upper-case flair. Both
//! are mapped here so the allow-list compares like with like.

/// Maps a language name to the segment used in the trend feed URL.
///
/// An empty name means repositories without a detected language, which the
/// feed publishes as `unknown`.
///
/// # Examples
///
/// ```
/// use ghwatch_protocol::trend_feed_segment;
///
/// assert_eq!(trend_feed_segment("C++"), "cpp");
/// assert_eq!(trend_feed_segment(""), "unknown");
/// assert_eq!(trend_feed_segment("Rust"), "rust");
/// ```
#[must_use]
pub fn trend_feed_segment(language: &str) -> String {
    let language = if language.is_empty() {
        "Unknown"
    } else {
        language
    };
    language.to_lowercase().replace("c++", "cpp")
}

/// Maps a social feed flair (e.g. `RUST`, `CPP`) to a language name.
///
/// A missing flair yields an empty name.
///
/// # Examples
///
/// ```
/// use ghwatch_protocol::flair_language;
///
/// assert_eq!(flair_language(Some("CPP")), "C++");
/// assert_eq!(flair_language(Some("JAVASCRIPT")), "Javascript");
/// assert_eq!(flair_language(None), "");
/// ```
#[must_use]
pub fn flair_language(flair: Option<&str>) -> String {
    flair
        .map(|flair| title_case(&flair.replace("CPP", "C++")))
        .unwrap_or_default()
}

/// Upper-cases the first letter of every run of letters and lower-cases the
/// rest.
///
/// # Examples
///
/// ```
/// use ghwatch_protocol::title_case;
///
/// assert_eq!(title_case("OBJECTIVE-C"), "Objective-C");
/// assert_eq!(title_case("c++"), "C++");
/// ```
#[must_use]
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}
