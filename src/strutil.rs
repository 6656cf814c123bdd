//! Small string helpers shared by the interceptors and the test workflow:
//! lexical path normalization, line splitting, indentation and
//! namespace-name cycling.

/// Lexically normalize a filesystem path string.
///
/// Backslash separators are unified to `/`, empty and `.` segments are
/// dropped, and `..` segments consume their parent where one exists.
/// Leading `..` segments of a relative path are preserved; `..` at the root
/// of an absolute path is discarded. The result never carries a trailing
/// separator, which makes the function idempotent.
pub fn normalize_path(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let absolute = unified.starts_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&"..") | None => {
                    if !absolute {
                        segments.push("..");
                    }
                }
                _ => {
                    segments.pop();
                }
            },
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    if absolute {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Split text on `\r?\n` boundaries into owned lines.
///
/// A trailing newline produces a trailing empty line, matching how
/// newline-terminated process output is appended to a buffer.
pub fn split_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}

/// Prefix every line after the first with `width` spaces.
pub fn add_indent(width: usize, text: &str) -> String {
    let pad = " ".repeat(width);
    let mut out = String::with_capacity(text.len());
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
            out.push_str(&pad);
        }
        out.push_str(line);
    }
    out
}

/// Cycle a namespace name between its source form and its conventional
/// test counterpart: `foo.bar` <-> `foo.bar-test`.
pub fn cycle_ns_name(ns: &str) -> String {
    match ns.strip_suffix("-test") {
        Some(stripped) => stripped.to_string(),
        None => format!("{ns}-test"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_resolves_dots() {
        assert_eq!(normalize_path("/a/./b/../c"), "/a/c");
        assert_eq!(normalize_path("a/b/../../c"), "c");
        assert_eq!(normalize_path("src//core/../io.clj"), "src/io.clj");
    }

    #[test]
    fn test_normalize_path_unifies_separators() {
        assert_eq!(normalize_path("src\\core\\io.clj"), "src/core/io.clj");
    }

    #[test]
    fn test_normalize_path_relative_parent_preserved() {
        assert_eq!(normalize_path("../a/b"), "../a/b");
        assert_eq!(normalize_path("../../x"), "../../x");
    }

    #[test]
    fn test_normalize_path_root_parent_discarded() {
        assert_eq!(normalize_path("/../a"), "/a");
    }

    #[test]
    fn test_normalize_path_degenerate() {
        assert_eq!(normalize_path(""), ".");
        assert_eq!(normalize_path("a/.."), ".");
        assert_eq!(normalize_path("/"), "/");
    }

    #[test]
    fn test_normalize_path_idempotent() {
        for p in [
            "/a/../b",
            "a/./b/",
            "../x",
            "src\\core",
            "/",
            "",
            "a//b/../c",
        ] {
            let once = normalize_path(p);
            assert_eq!(normalize_path(&once), once, "not idempotent for {p:?}");
        }
    }

    #[test]
    fn test_split_lines() {
        assert_eq!(split_lines("a\nb"), vec!["a", "b"]);
        assert_eq!(split_lines("a\r\nb"), vec!["a", "b"]);
        assert_eq!(split_lines("a\n"), vec!["a", ""]);
        assert_eq!(split_lines("only"), vec!["only"]);
    }

    #[test]
    fn test_add_indent() {
        assert_eq!(add_indent(2, "a\nb\nc"), "a\n  b\n  c");
        assert_eq!(add_indent(4, "single"), "single");
    }

    #[test]
    fn test_cycle_ns_name() {
        assert_eq!(cycle_ns_name("my.ns"), "my.ns-test");
        assert_eq!(cycle_ns_name("my.ns-test"), "my.ns");
    }
}
