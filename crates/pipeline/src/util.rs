/// Strip the mount-path prefix from a request path exactly once, for
/// classification against a version's path rules. Independent of
/// `proxy.strip_listen_path`, which only governs what's forwarded upstream:
/// path classification always operates on the mount-relative path.
#[must_use]
pub fn strip_mount_prefix<'a>(mount: &str, path: &'a str) -> &'a str {
    let trimmed_mount = mount.trim_end_matches('/');
    let Some(rest) = path.strip_prefix(trimmed_mount) else {
        return path;
    };
    if rest.is_empty() {
        "/"
    } else {
        rest
    }
}

/// Find the value of `name` in a raw (unparsed) query string. Version
/// tokens are plain identifiers, so this skips percent-decoding rather than
/// pulling in a full query-string crate for one lookup.
#[must_use]
pub fn query_param(query: &str, name: &str) -> Option<String> {
    query.split('&').find_map(|pair| {
        let mut parts = pair.splitn(2, '=');
        let key = parts.next()?;
        if key == name {
            Some(parts.next().unwrap_or_default().to_owned())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_query_param_among_several() {
        assert_eq!(query_param("a=1&v=v2&b=3", "v"), Some("v2".to_owned()));
        assert_eq!(query_param("a=1&b=3", "v"), None);
    }

    #[test]
    fn strips_mount_prefix_once() {
        assert_eq!(strip_mount_prefix("/listen", "/listen/public/x"), "/public/x");
    }

    #[test]
    fn root_request_after_strip_is_slash() {
        assert_eq!(strip_mount_prefix("/listen", "/listen"), "/");
        assert_eq!(strip_mount_prefix("/listen/", "/listen"), "/");
    }

    #[test]
    fn non_matching_prefix_is_returned_unchanged() {
        assert_eq!(strip_mount_prefix("/listen", "/other/x"), "/other/x");
    }
}
