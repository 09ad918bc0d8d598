//! Logical path handling for raw requests.
//!
//! Responsibility:
//! - Reject malformed / placeholder path inputs before any network call.
//! - Normalize to an absolute, dot-free posix path.
//! - Build the Graph item address under the configured base directory.

/// Unresolved route placeholder some clients send verbatim.
pub const PATH_PLACEHOLDER: &str = "[...path]";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("No path specified.")]
    Placeholder,
    #[error("Path query invalid.")]
    Invalid,
}

/// Resolve `.`/`..` segments against `/` and collapse repeated slashes.
///
/// `..` above the root stays at the root; the trailing slash is dropped.
pub fn normalize_path(raw: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for seg in raw.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    format!("/{}", segments.join("/"))
}

/// Validate a raw `path` input and return the normalized path.
///
/// The unresolved placeholder and NUL bytes are rejected.
pub fn validate_path(raw: &str) -> Result<String, PathError> {
    if raw == PATH_PLACEHOLDER {
        return Err(PathError::Placeholder);
    }
    if raw.contains('\0') {
        return Err(PathError::Invalid);
    }

    Ok(normalize_path(raw))
}

/// Graph path segment for `path` under `base_directory`.
///
/// Returns `""` for the drive root, otherwise `:<percent-encoded absolute path>`
/// so it can be appended to `{drive}/root`.
pub fn encode_item_path(base_directory: &str, path: &str) -> String {
    let joined = normalize_path(&format!("{base_directory}/{path}"));
    if joined == "/" {
        return String::new();
    }
    format!(":{}", urlencoding::encode(&joined))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_resolves_dot_segments() {
        assert_eq!(normalize_path("/a/../b"), "/b");
        assert_eq!(normalize_path("/a/./b/"), "/a/b");
        assert_eq!(normalize_path("a//b"), "/a/b");
        assert_eq!(normalize_path("/../../etc"), "/etc");
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/"), "/");
    }

    #[test]
    fn normalize_is_case_preserving() {
        assert_eq!(normalize_path("/Docs/Report.PDF"), "/Docs/Report.PDF");
    }

    #[test]
    fn validate_rejects_placeholder_and_nul() {
        assert_eq!(validate_path("[...path]"), Err(PathError::Placeholder));
        assert_eq!(validate_path("/a\0b"), Err(PathError::Invalid));
    }

    #[test]
    fn validate_normalizes_accepted_path() {
        assert_eq!(
            validate_path("/secret/../public/x.txt").unwrap(),
            "/public/x.txt"
        );
        assert_eq!(validate_path("").unwrap(), "/");
    }

    #[test]
    fn encode_joins_base_directory() {
        assert_eq!(encode_item_path("/", "/"), "");
        assert_eq!(encode_item_path("/", "/docs/a b.txt"), ":%2Fdocs%2Fa%20b.txt");
        assert_eq!(encode_item_path("/share/", "/docs"), ":%2Fshare%2Fdocs");
        assert_eq!(encode_item_path("/share", "/"), ":%2Fshare");
    }
}
