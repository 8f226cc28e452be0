//! The plain-text listing the user edits: building it and reading it back.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::normalize::base_name;

/// Marks a comment line, or a deletion when followed by the file's name.
pub const COMMENT_PREFIX: &str = "//";

const HEADER: &[&str] = &[
    "Please change the filenames that need to be renamed and save the file.",
    "Lines that are left unchanged will be ignored (no renaming).",
    "",
    "To delete a file, put \"//\" at the beginning of its line.",
    "",
    "Do NOT swap the order of lines, as this is what is used to match the",
    "original filenames to the new ones.",
    "",
    "Do NOT delete lines, as the rename operation will be cancelled.",
];

/// Line terminator used for listings on this platform.
pub fn platform_newline() -> &'static str {
    if cfg!(windows) { "\r\n" } else { "\n" }
}

pub fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

/// Expand glob patterns into a sorted list of paths. No pattern means `*`.
pub fn file_paths_from_args(patterns: &[String], include_dirs: bool) -> Result<Vec<PathBuf>> {
    let default = ["*".to_string()];
    let patterns = if patterns.is_empty() {
        &default[..]
    } else {
        patterns
    };

    let mut output = Vec::new();
    for pattern in patterns {
        let matches = glob::glob(pattern).map_err(|e| Error::Io {
            op: "glob",
            path: PathBuf::from(pattern),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e.msg),
        })?;
        for entry in matches {
            let path = entry.map_err(|e| {
                let path = e.path().to_path_buf();
                Error::io("glob", path)(e.into())
            })?;
            if !include_dirs && path.is_dir() {
                continue;
            }
            output.push(path);
        }
    }
    output.sort();
    output.dedup();
    Ok(output)
}

/// Render the editable listing: a comment header then one base name per line.
pub fn render_listing(paths: &[PathBuf], newline: &str) -> String {
    let mut out = String::new();
    for line in HEADER {
        out.push_str(COMMENT_PREFIX);
        if !line.is_empty() {
            out.push(' ');
            out.push_str(line);
        }
        out.push_str(newline);
    }
    out.push_str(newline);
    for path in paths {
        out.push_str(&base_name(path));
        out.push_str(newline);
    }
    out
}

/// Non-blank, non-comment lines of `text`, untrimmed.
pub fn file_paths_from_string(text: &str, newline: &str) -> Vec<String> {
    strip_bom(text)
        .split(newline)
        .filter(|line| !line.trim().is_empty() && !line.starts_with(COMMENT_PREFIX))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[cfg(unix)]
    #[test]
    fn unreadable_directory_is_a_glob_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let locked = dir.path().join("locked");
        std::fs::create_dir(&locked).unwrap();
        std::fs::write(locked.join("f"), "x").unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

        let pattern = format!("{}/*/*", dir.path().display());
        let result = file_paths_from_args(&[pattern], false);
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o700)).unwrap();

        // Running as root bypasses directory permissions.
        if let Err(err) = result {
            assert!(matches!(err, Error::Io { op: "glob", .. }));
        }
    }

    #[test]
    fn strip_bom_removes_only_leading_mark() {
        assert_eq!(strip_bom("\u{feff}"), "");
        assert_eq!(strip_bom("\u{feff}\u{feff}"), "\u{feff}");
        assert_eq!(strip_bom("\u{feff}AB"), "AB");
        assert_eq!(strip_bom("A\u{feff}"), "A\u{feff}");
        assert_eq!(strip_bom(""), "");
    }

    #[test]
    fn file_paths_from_string_skips_comments_and_blanks() {
        let text = "// comment\n\n  file1 \n\tfile2\n\nanother file\t\n//comment\n\n\n";
        assert_eq!(
            file_paths_from_string(text, "\n"),
            vec!["  file1 ", "\tfile2", "another file\t"]
        );
        assert!(file_paths_from_string("\n// comment\n\n", "\n").is_empty());
        assert!(file_paths_from_string("", "\n").is_empty());
    }

    #[test]
    fn rendered_listing_round_trips_to_no_actions() {
        let paths = vec![PathBuf::from("dir/abcd"), PathBuf::from("dir/efgh")];
        let text = render_listing(&paths, "\n");
        assert!(text.starts_with("// Please change"));
        assert_eq!(file_paths_from_string(&text, "\n"), vec!["abcd", "efgh"]);
        let actions = crate::diff::parse_actions(&paths, &text, "\n").unwrap();
        assert!(actions.is_empty());
    }

    #[test]
    fn glob_expansion_excludes_directories_unless_asked() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("0"), "x").unwrap();
        std::fs::write(dir.path().join("1"), "x").unwrap();
        std::fs::create_dir(dir.path().join("dir0")).unwrap();

        let pattern = vec![format!("{}/*", dir.path().display())];
        let files = file_paths_from_args(&pattern, false).unwrap();
        assert_eq!(files, vec![dir.path().join("0"), dir.path().join("1")]);

        let all = file_paths_from_args(&pattern, true).unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.contains(&dir.path().join("dir0")));
    }
}
