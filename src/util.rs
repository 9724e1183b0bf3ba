// Small helpers for repository URLs and report text

use regex::Regex;
use std::sync::OnceLock;

fn github_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^https?://github\.com/[A-Za-z0-9_-]+/[A-Za-z0-9_.-]+/?$")
            .expect("GitHub URL pattern is valid")
    })
}

/// Check for `http(s)://github.com/<owner>/<repo>` with an optional
/// trailing slash or `.git` suffix
pub fn validate_github_url(url: &str) -> bool {
    let url = url.strip_suffix(".git").unwrap_or(url);
    github_url_pattern().is_match(url)
}

/// Last path segment of a repository URL, without `.git`
pub fn extract_repo_name(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);
    trimmed.rsplit('/').next().unwrap_or(trimmed).to_string()
}

/// Human-readable size, e.g. `1.5 KB`
pub fn format_file_size(size_bytes: u64) -> String {
    let mut size = size_bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{:.1} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.1} TB", size)
}

/// Shorten text to the leading paragraphs that fit in `max_length` characters
///
/// Text that already fits is returned unchanged; otherwise `...` is appended.
pub fn summarize_text(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        return text.to_string();
    }

    let mut summary = Vec::new();
    let mut current_length = 0;
    for para in text.split("\n\n") {
        let len = para.chars().count();
        if current_length + len > max_length {
            break;
        }
        summary.push(para);
        current_length += len;
    }

    format!("{}...", summary.join("\n\n"))
}

/// Local time formatted as `YYYY-MM-DD HH:MM:SS`
pub fn current_datetime() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
