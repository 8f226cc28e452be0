use anyhow::Result;
use massren::config::Settings;
use massren::profile::Profile;
use massren::{Error, FileAction, Session};
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn open_session(root: &std::path::Path, dry_run: bool) -> Result<Session> {
    let profile = Profile::open(Some(root.join("profile")))?;
    Ok(Session::with_settings(profile, Settings::default(), dry_run, false)?)
}

fn create_files(root: &std::path::Path, names: &[&str]) -> Vec<PathBuf> {
    names
        .iter()
        .map(|name| {
            let path = root.join(name);
            fs::write(&path, name).unwrap();
            path
        })
        .collect()
}

#[test]
fn test_rename_then_undo() -> Result<()> {
    let dir = tempdir()?;
    let root = dir.path();
    let paths = create_files(root, &["one", "two", "three"]);
    let mut session = open_session(root, false)?;

    let actions = massren::diff::derive_actions(&paths, "one\nnewname\nthree\n", "\n")?;
    assert_eq!(actions, vec![FileAction::rename(root.join("two"), "newname")]);

    massren::apply::apply(actions, &mut session)?;
    assert!(!root.join("two").exists());
    assert_eq!(fs::read_to_string(root.join("newname"))?, "two");
    assert_eq!(session.history.all()?.len(), 1);

    massren::undo::undo(&[root.join("newname")], &mut session)?;
    assert_eq!(fs::read_to_string(root.join("two"))?, "two");
    assert!(!root.join("newname").exists());
    assert!(session.history.all()?.is_empty());
    Ok(())
}

#[test]
fn test_swap_via_listing() -> Result<()> {
    let dir = tempdir()?;
    let root = dir.path();
    let paths = create_files(root, &["0", "1"]);
    let mut session = open_session(root, false)?;

    let text = massren::listing::render_listing(&paths, "\n").replace("0\n1\n", "1\n0\n");
    let actions = massren::diff::derive_actions(&paths, &text, "\n")?;
    let outcome = massren::apply::apply(actions, &mut session)?;

    assert_eq!(outcome.renamed, 2);
    assert_eq!(fs::read_to_string(root.join("0"))?, "1");
    assert_eq!(fs::read_to_string(root.join("1"))?, "0");
    assert_eq!(fs::read_dir(root)?.count(), 3); // 0, 1 and the profile
    Ok(())
}

#[test]
fn test_delete_and_rename_into_freed_name() -> Result<()> {
    let dir = tempdir()?;
    let root = dir.path();
    let paths = create_files(root, &["0", "1"]);
    let mut session = open_session(root, false)?;

    let actions = massren::diff::derive_actions(&paths, "1\n//1\n", "\n")?;
    massren::apply::apply(actions, &mut session)?;

    assert!(!root.join("0").exists());
    assert_eq!(fs::read_to_string(root.join("1"))?, "0");
    let history = session.history.all()?;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].source, root.join("0"));
    Ok(())
}

#[test]
fn test_subdirectory_rename() -> Result<()> {
    let dir = tempdir()?;
    let root = dir.path();
    let paths = create_files(root, &["abcd"]);
    let mut session = open_session(root, false)?;

    let actions = massren::diff::derive_actions(&paths, "ab/cd\n", "\n")?;
    massren::apply::apply(actions, &mut session)?;
    assert_eq!(fs::read_to_string(root.join("ab/cd"))?, "abcd");

    massren::undo::undo(&[root.join("ab/cd")], &mut session)?;
    assert!(root.join("abcd").exists());
    Ok(())
}

#[test]
fn test_plan_errors_leave_files_alone() -> Result<()> {
    let dir = tempdir()?;
    let root = dir.path();
    let paths = create_files(root, &["a", "b"]);

    let err = massren::diff::derive_actions(&paths, "dup\ndup\n", "\n").unwrap_err();
    assert!(matches!(err, Error::DuplicateDestination(_)));
    assert!(err.is_plan_error());

    let err = massren::diff::derive_actions(&paths, "a\n", "\n").unwrap_err();
    assert!(matches!(err, Error::CountMismatch { expected: 2, found: 1 }));

    assert!(paths.iter().all(|p| p.exists()));
    Ok(())
}
