//! Virtual-path helpers shared across host abstractions.

/// Normalizes a virtual filesystem path.
///
/// This helper trims whitespace, converts backslashes to `/`, resolves `.`/`..`, ensures a
/// leading slash, and returns `/` for empty or fully-collapsed paths.
pub fn normalize_virtual_path(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return "/".to_string();
    }

    let mut out = String::new();
    for segment in trimmed.replace('\\', "/").split('/') {
        if segment.is_empty() || segment == "." {
            continue;
        }
        if segment == ".." {
            if let Some(idx) = out.rfind('/') {
                out.truncate(idx);
            }
            continue;
        }
        out.push('/');
        out.push_str(segment);
    }

    if out.is_empty() {
        "/".to_string()
    } else {
        out
    }
}

/// Resolves `input` against `cwd`; absolute inputs ignore `cwd`.
pub fn join_virtual_path(cwd: &str, input: &str) -> String {
    if input.trim().starts_with('/') {
        return normalize_virtual_path(input);
    }
    normalize_virtual_path(&format!("{}/{}", cwd.trim_end_matches('/'), input))
}

/// Returns the parent directory of `path`; the root is its own parent.
pub fn parent_virtual_path(path: &str) -> String {
    join_virtual_path(path, "..")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_virtual_path_matches_expected_cases() {
        let cases = [
            ("", "/"),
            ("   ", "/"),
            ("Documents/Sub", "/Documents/Sub"),
            ("/Documents//Sub/", "/Documents/Sub"),
            ("./Images/../Music", "/Music"),
            ("\\\\Documents\\\\notes", "/Documents/notes"),
            ("/../../", "/"),
        ];

        for (input, expected) in cases {
            assert_eq!(normalize_virtual_path(input), expected, "input={input:?}");
        }
    }

    #[test]
    fn join_resolves_relative_and_absolute_inputs() {
        assert_eq!(join_virtual_path("/Documents", "Sub"), "/Documents/Sub");
        assert_eq!(join_virtual_path("/Documents", "/Music"), "/Music");
        assert_eq!(join_virtual_path("/", "My File.txt"), "/My File.txt");
    }

    #[test]
    fn parent_of_root_is_root() {
        assert_eq!(parent_virtual_path("/Documents/Sub"), "/Documents");
        assert_eq!(parent_virtual_path("/"), "/");
    }
}
