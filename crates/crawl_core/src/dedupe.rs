use url::Url;

/// Key used to detect repeated submissions of the same page.
///
/// Parsing lowercases scheme and host and drops default ports; the fragment
/// and trailing slashes are removed on top of that.
pub fn normalize_url_for_dedupe(raw: &str) -> String {
    let trimmed = raw.trim();
    match Url::parse(trimmed) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.as_str().trim_end_matches('/').to_string()
        }
        Err(_) => trimmed.trim_end_matches('/').to_string(),
    }
}
