//! POSIX-style relative path helpers.
//!
//! Manifest paths are always relative to the scan root, separated by `/`,
//! with `"."` standing for the root itself.

/// Path of the scan root.
pub const ROOT: &str = ".";

/// Path separator used by manifest paths on every platform.
pub const SEPARATOR: char = '/';

/// Depth of a path below the root. The root is depth 0, `"a"` is 1,
/// `"a/b"` is 2.
pub fn depth(path: &str) -> u32 {
    if path == ROOT || path.is_empty() {
        return 0;
    }
    path.matches(SEPARATOR).count() as u32 + 1
}

/// Parent of a path, or `None` for the root.
pub fn parent(path: &str) -> Option<&str> {
    if path == ROOT || path.is_empty() {
        return None;
    }
    match path.rfind(SEPARATOR) {
        Some(idx) => Some(&path[..idx]),
        None => Some(ROOT),
    }
}

/// Last segment of a path.
pub fn file_name(path: &str) -> &str {
    match path.rfind(SEPARATOR) {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Extension of a file name: everything after the last `.`, empty if the
/// name has no dot.
pub fn extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) => &name[idx + 1..],
        None => "",
    }
}

/// Join a parent path and a child name.
pub fn join(parent: &str, name: &str) -> String {
    if parent == ROOT || parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}{SEPARATOR}{name}")
    }
}

/// Whether `path` lies strictly beneath `dir`.
pub fn is_beneath(path: &str, dir: &str) -> bool {
    if dir == ROOT {
        return path != ROOT;
    }
    path.len() > dir.len() + 1
        && path.starts_with(dir)
        && path[dir.len()..].starts_with(SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth() {
        assert_eq!(depth("."), 0);
        assert_eq!(depth("a"), 1);
        assert_eq!(depth("a/b"), 2);
        assert_eq!(depth("a/b/c.txt"), 3);
    }

    #[test]
    fn test_parent() {
        assert_eq!(parent("."), None);
        assert_eq!(parent("a"), Some("."));
        assert_eq!(parent("a/b"), Some("a"));
        assert_eq!(parent("a/b/c.txt"), Some("a/b"));
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension("x.txt"), "txt");
        assert_eq!(extension("archive.tar.gz"), "gz");
        assert_eq!(extension("Makefile"), "");
        assert_eq!(extension(".bashrc"), "bashrc");
        assert_eq!(extension("trailing."), "");
    }

    #[test]
    fn test_file_name_and_join() {
        assert_eq!(file_name("a/b/c.txt"), "c.txt");
        assert_eq!(file_name("top"), "top");
        assert_eq!(join(".", "a"), "a");
        assert_eq!(join("a", "b"), "a/b");
    }

    #[test]
    fn test_is_beneath() {
        assert!(is_beneath("a/b", "a"));
        assert!(is_beneath("a/b/c", "a"));
        assert!(!is_beneath("a", "a"));
        assert!(!is_beneath("ab/c", "a"));
        assert!(is_beneath("a", "."));
        assert!(!is_beneath(".", "."));
    }
}
