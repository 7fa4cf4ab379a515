use std::fs::{self, File};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use treecat::{BINARY_PLACEHOLDER, Blocked, Node, TreecatBuilder, TreecatError, build, build_tree};

/// Temp dirs default to a `.tmp` prefix, which the hidden-entry rule would
/// exclude along with everything inside.
fn fixture_dir() -> TempDir {
    tempfile::Builder::new().prefix("treecat").tempdir().unwrap()
}

fn create_test_files(root: &Path) {
    let files: [(&str, &[u8]); 4] = [
        ("file1.txt", b"content1"),
        ("dir1/file2.txt", b"content2"),
        ("dir1/dir2/file3.txt", b"content3"),
        ("dir1/dir2/binary.bin", &[0x00, 0xFF]),
    ];
    for (path, content) in files {
        let full = root.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }
}

fn find<'a>(root: &'a Node, name: &str) -> Option<&'a Node> {
    root.iter().find(|n| n.name == name)
}

#[test]
fn test_file_counts_with_filters() {
    let dir = fixture_dir();
    create_test_files(dir.path());
    let cases = [
        ("no filters", None, None, 4),
        ("exclude txt files", Some("*.txt"), None, 1),
        ("include only txt files", None, Some("*.txt"), 3),
        ("exclude wins over include", Some("dir1/*"), Some("*.txt"), 1),
    ];
    for (name, exclude, include, want) in cases {
        let root = build_tree(dir.path(), exclude, include, dir.path(), -1, true).unwrap();
        assert_eq!(root.file_count(), want, "{}", name);
    }
}

#[test]
fn test_excluded_files_leave_directories() {
    let dir = fixture_dir();
    create_test_files(dir.path());
    let root = build_tree(dir.path(), Some("*.txt"), None, dir.path(), -1, true).unwrap();
    let dir1 = find(&root, "dir1").unwrap();
    assert!(dir1.is_dir);
    let bin = find(&root, "binary.bin").unwrap();
    assert_eq!(bin.content.as_deref(), Some(BINARY_PLACEHOLDER));
}

#[test]
fn test_depth_zero_is_root_only() {
    let dir = fixture_dir();
    create_test_files(dir.path());
    let options = TreecatBuilder::new(dir.path()).max_depth(0).build();
    let root = build(&options).unwrap();
    assert!(root.is_dir);
    assert!(root.children.is_empty());
}

#[test]
fn test_depth_one_stops_at_direct_entries() {
    let dir = fixture_dir();
    create_test_files(dir.path());
    let options = TreecatBuilder::new(dir.path()).max_depth(1).build();
    let root = build(&options).unwrap();
    let names: Vec<_> = root.children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["dir1", "file1.txt"]);
    assert!(root.children[0].is_dir);
    assert!(root.children[0].children.is_empty());
    assert_eq!(root.children[1].content.as_deref(), Some("content1"));
}

#[test]
fn test_hidden_entries_are_skipped() {
    let dir = fixture_dir();
    fs::create_dir(dir.path().join(".git")).unwrap();
    fs::write(dir.path().join(".git/config"), "[core]").unwrap();
    fs::write(dir.path().join(".env"), "SECRET=1").unwrap();
    fs::write(dir.path().join("main.rs"), "fn main() {}").unwrap();
    let options = TreecatBuilder::new(dir.path())
        .include(Some("*".into()))
        .no_limit_depth()
        .build();
    let root = build(&options).unwrap();
    assert_eq!(root.children.len(), 1);
    assert_eq!(root.children[0].name, "main.rs");
}

#[test]
fn test_unmatched_directory_stays_as_empty_node() {
    let dir = fixture_dir();
    fs::create_dir(dir.path().join("assets")).unwrap();
    fs::write(dir.path().join("assets/logo.png"), [0x89u8, 0x50, 0x4E, 0x47]).unwrap();
    fs::write(dir.path().join("lib.rs"), "").unwrap();
    let options = TreecatBuilder::new(dir.path())
        .include(Some("*.rs".into()))
        .no_limit_depth()
        .build();
    let root = build(&options).unwrap();
    let assets = find(&root, "assets").unwrap();
    assert!(assets.is_dir);
    assert!(assets.children.is_empty());
    assert_eq!(find(&root, "lib.rs").unwrap().content.as_deref(), Some(""));
}

#[test]
fn test_children_are_sorted() {
    let dir = fixture_dir();
    for name in ["c.txt", "a.txt", "b.txt", "d"] {
        if name == "d" {
            fs::create_dir(dir.path().join(name)).unwrap();
        } else {
            fs::write(dir.path().join(name), name).unwrap();
        }
    }
    let root = build(&TreecatBuilder::new(dir.path()).build()).unwrap();
    let names: Vec<_> = root.children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["a.txt", "b.txt", "c.txt", "d"]);
}

#[test]
fn test_deadline_exceeded() {
    let dir = fixture_dir();
    create_test_files(dir.path());
    let options = TreecatBuilder::new(dir.path())
        .timeout(Duration::ZERO)
        .build();
    let err = build(&options).unwrap_err();
    assert!(matches!(err, TreecatError::DeadlineExceeded { .. }));
}

#[test]
fn test_safety_empty_directory() {
    let dir = fixture_dir();
    let root = build(&TreecatBuilder::new(dir.path()).build()).unwrap();
    assert!(root.children.is_empty());
}

#[test]
fn test_safety_too_many_files() {
    let dir = fixture_dir();
    for i in 0..1001 {
        File::create(dir.path().join(format!("f{i}.txt"))).unwrap();
    }
    let err = build(&TreecatBuilder::new(dir.path()).build()).unwrap_err();
    assert!(matches!(
        err,
        TreecatError::Blocked(Blocked::TooManyFiles {
            count: 1001,
            limit: 1000
        })
    ));

    let forced = TreecatBuilder::new(dir.path()).force(true).build();
    assert_eq!(build(&forced).unwrap().file_count(), 1001);
}

#[test]
fn test_safety_large_average() {
    let dir = fixture_dir();
    let file = File::create(dir.path().join("huge.bin")).unwrap();
    file.set_len(11 * 1024 * 1024).unwrap();
    let err = build(&TreecatBuilder::new(dir.path()).build()).unwrap_err();
    assert!(matches!(
        err,
        TreecatError::Blocked(Blocked::FilesTooLarge { .. })
    ));
    assert!(err.to_string().contains("Use --force to override"));

    let forced = TreecatBuilder::new(dir.path()).force(true).build();
    let root = build(&forced).unwrap();
    assert_eq!(root.children[0].content.as_deref(), Some(BINARY_PLACEHOLDER));
}

#[test]
fn test_missing_root_is_fatal() {
    let dir = fixture_dir();
    let err = build(&TreecatBuilder::new(dir.path().join("missing")).build()).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_excluded_file_root() {
    let dir = fixture_dir();
    let file = dir.path().join("notes.md");
    fs::write(&file, "# notes").unwrap();
    let err = build_tree(&file, Some("*.md"), None, &file, -1, false).unwrap_err();
    assert!(matches!(err, TreecatError::Excluded(_)));

    let node = build_tree(&file, None, None, &file, -1, false).unwrap();
    assert!(!node.is_dir);
    assert_eq!(node.content.as_deref(), Some("# notes"));
}

#[test]
fn test_invalid_depth() {
    let dir = fixture_dir();
    let err = build_tree(dir.path(), None, None, dir.path(), -2, false).unwrap_err();
    assert!(matches!(err, TreecatError::InvalidDepth(-2)));
}

#[cfg(unix)]
#[test]
fn test_symlinked_file_is_followed() {
    let dir = fixture_dir();
    fs::write(dir.path().join("target.txt"), "linked").unwrap();
    std::os::unix::fs::symlink(dir.path().join("target.txt"), dir.path().join("link.txt"))
        .unwrap();
    std::os::unix::fs::symlink(dir.path().join("gone.txt"), dir.path().join("dangling.txt"))
        .unwrap();
    let root = build(&TreecatBuilder::new(dir.path()).build()).unwrap();
    let names: Vec<_> = root.children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["link.txt", "target.txt"]);
    assert_eq!(root.children[0].content.as_deref(), Some("linked"));
}

#[test]
fn test_start_dir_below_hidden_directory_includes_nothing() {
    let dir = fixture_dir();
    let hidden = dir.path().join(".config/app");
    fs::create_dir_all(hidden.join("sub")).unwrap();
    fs::write(hidden.join("settings.toml"), "a = 1").unwrap();
    fs::write(hidden.join("sub/more.toml"), "b = 2").unwrap();
    let options = TreecatBuilder::new(&hidden)
        .include(Some("*.toml".into()))
        .no_limit_depth()
        .build();
    let root = build(&options).unwrap();
    assert!(root.is_dir);
    assert_eq!(root.file_count(), 0);
}

#[cfg(unix)]
#[test]
fn test_safety_counts_symlinked_files() {
    let dir = fixture_dir();
    let target = dir.path().join("t.txt");
    fs::write(&target, "t").unwrap();
    for i in 0..1001 {
        std::os::unix::fs::symlink(&target, dir.path().join(format!("l{i}.txt"))).unwrap();
    }
    let err = build(&TreecatBuilder::new(dir.path()).build()).unwrap_err();
    assert!(matches!(
        err,
        TreecatError::Blocked(Blocked::TooManyFiles { count: 1002, .. })
    ));
}

#[cfg(unix)]
#[test]
fn test_safety_counts_files_behind_symlinked_directory() {
    let vendor = fixture_dir();
    for i in 0..1500 {
        File::create(vendor.path().join(format!("v{i}.rs"))).unwrap();
    }
    let dir = fixture_dir();
    fs::write(dir.path().join("main.rs"), "fn main() {}").unwrap();
    std::os::unix::fs::symlink(vendor.path(), dir.path().join("vendor")).unwrap();
    let err = build(&TreecatBuilder::new(dir.path()).build()).unwrap_err();
    assert!(matches!(
        err,
        TreecatError::Blocked(Blocked::TooManyFiles { count: 1501, .. })
    ));
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_keeps_empty_node() {
    use std::os::unix::fs::PermissionsExt;

    let dir = fixture_dir();
    let locked = dir.path().join("locked.txt");
    fs::write(&locked, "secret").unwrap();
    fs::write(dir.path().join("open.txt"), "visible").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    if fs::read(&locked).is_ok() {
        // privileged user, permissions are not enforced
        return;
    }

    let root = build(&TreecatBuilder::new(dir.path()).build()).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

    let locked_node = find(&root, "locked.txt").unwrap();
    assert!(!locked_node.is_dir);
    assert_eq!(locked_node.content.as_deref(), Some(""));
    assert_eq!(
        find(&root, "open.txt").unwrap().content.as_deref(),
        Some("visible")
    );
}

#[cfg(unix)]
#[test]
fn test_unlistable_subdirectory_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let dir = fixture_dir();
    let sealed = dir.path().join("sealed");
    fs::create_dir(&sealed).unwrap();
    fs::write(sealed.join("inner.txt"), "inner").unwrap();
    fs::create_dir(dir.path().join("open")).unwrap();
    fs::write(dir.path().join("open/ok.txt"), "ok").unwrap();
    fs::write(dir.path().join("top.txt"), "top").unwrap();
    fs::set_permissions(&sealed, fs::Permissions::from_mode(0o000)).unwrap();
    if fs::read_dir(&sealed).is_ok() {
        fs::set_permissions(&sealed, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    // the safety scan cannot read the sealed directory either
    let options = TreecatBuilder::new(dir.path())
        .no_limit_depth()
        .force(true)
        .build();
    let result = build(&options);
    fs::set_permissions(&sealed, fs::Permissions::from_mode(0o755)).unwrap();

    let root = result.unwrap();
    let names: Vec<_> = root.children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["open", "top.txt"]);
    assert!(find(&root, "ok.txt").is_some());
    assert!(find(&root, "inner.txt").is_none());
}
