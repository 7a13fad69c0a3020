//! Text rendering of pending repositories.

use crossterm::style::Stylize;
use ghwatch_protocol::RepoRecord;

/// Formats the `[i/n] ` progress prefix, padding `i` to the width of `n`.
///
/// # Examples
///
/// ```
/// use ghwatch_review::display::format_counter;
///
/// assert_eq!(format_counter(3, 120), "[  3/120] ");
/// ```
#[must_use]
pub fn format_counter(index: usize, total: usize) -> String {
    let width = total.to_string().len();
    format!("[{index:>width$}/{total}] ")
}

/// Formats a count with thousands separators, or `?` when unknown.
///
/// # Examples
///
/// ```
/// use ghwatch_review::display::format_count;
///
/// assert_eq!(format_count(Some(1_234_567)), "1,234,567");
/// assert_eq!(format_count(None), "?");
/// ```
#[must_use]
pub fn format_count(count: Option<u64>) -> String {
    let Some(count) = count else {
        return "?".to_string();
    };
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Renders a repository: URL, language and counts, homepage, description.
///
/// With `color`, the owner is green and the repository name yellow.
#[must_use]
pub fn format_repo(record: &RepoRecord, color: bool) -> String {
    let mut out = String::from("https://github.com/");
    if color {
        out.push_str(&format!(
            "{}/{}",
            record.user.as_str().green(),
            record.repo.as_str().yellow()
        ));
    } else {
        out.push_str(&format!("{}/{}", record.user, record.repo));
    }
    out.push('\n');

    out.push_str(&format!(
        "{:20} {:>6} / {:>6}\n",
        record.language_or_unknown(),
        format_count(record.stars()),
        format_count(record.forks()),
    ));
    if let Some(homepage) = record.homepage() {
        out.push_str(homepage);
        out.push('\n');
    }
    out.push('\n');

    if let Some(description) = record.description.as_deref().filter(|d| !d.is_empty()) {
        out.push_str(description);
        out.push_str("\n\n");
    }
    out
}

/// Returns the key prompt; `[h]omepage` is only offered when there is one.
#[must_use]
pub fn prompt(has_homepage: bool) -> String {
    let mut prompt = String::from("[z]ap [s]nooze [r]eadme [c]heck ");
    if has_homepage {
        prompt.push_str("[h]omepage ");
    }
    prompt.push_str("[space] skip [q]uit? ");
    prompt
}
