//! Credential resolution across deployment environments.
//!
//! Deployments name the API key differently; resolution consults an explicit
//! ordered list of sources and the first non-empty value wins. The key is
//! resolved once, at client construction, and injected into the provider;
//! nothing reads the environment at call time.

/// Environment variables consulted for the API key, in priority order.
pub const API_KEY_ENV_VARS: &[&str] = &["BANANAGEN_API_KEY", "KIE_API_KEY", "API_KEY"];

/// First non-empty value wins; whitespace-only values are skipped.
pub fn first_non_empty<'a, I>(sources: I) -> Option<(&'a str, String)>
where
    I: IntoIterator<Item = (&'a str, Option<String>)>,
{
    sources.into_iter().find_map(|(name, value)| {
        let value = value?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some((name, trimmed.to_string()))
        }
    })
}

/// Resolve the API key from the process environment using
/// [`API_KEY_ENV_VARS`].
pub fn resolve_api_key() -> Option<String> {
    let (source, value) = first_non_empty(
        API_KEY_ENV_VARS
            .iter()
            .map(|&name| (name, std::env::var(name).ok())),
    )?;
    tracing::debug!(source, "resolved API key from environment");
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn earlier_source_wins() {
        let resolved = first_non_empty(vec![
            ("FIRST", Some("aaa".to_string())),
            ("SECOND", Some("bbb".to_string())),
        ]);
        assert_eq!(resolved, Some(("FIRST", "aaa".to_string())));
    }

    #[test]
    fn empty_and_missing_sources_are_skipped() {
        let resolved = first_non_empty(vec![
            ("FIRST", None),
            ("SECOND", Some("   ".to_string())),
            ("THIRD", Some(" key-3 ".to_string())),
        ]);
        assert_eq!(resolved, Some(("THIRD", "key-3".to_string())));
    }

    #[test]
    fn no_usable_source_yields_none() {
        let resolved = first_non_empty(vec![("FIRST", None), ("SECOND", Some(String::new()))]);
        assert_eq!(resolved, None);
    }
}
