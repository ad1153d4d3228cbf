//! Library resolution across search directories, suffixes and case policies

use integration_tests::LibraryFixture;
use iv_library::{LibraryError, LibraryIndex, LibrarySearch, MissingModules};

#[test]
fn test_first_directory_wins() {
    let mut fixture = LibraryFixture::new().unwrap();
    let first = fixture.library_dir("A", &["foo.v"]).unwrap();
    let second = fixture.library_dir("B", &["foo.v"]).unwrap();

    let build = LibraryIndex::build(&LibrarySearch::new([&first, &second], [".v", ".va"], true));
    assert!(build.errors.is_empty());
    assert_eq!(
        build.index.resolve("foo"),
        Some(first.join("foo.v").as_path())
    );
}

#[test]
fn test_case_insensitive_lookup_keeps_disk_name() {
    let mut fixture = LibraryFixture::new().unwrap();
    let dir = fixture.library_dir("lib", &["foo.v"]).unwrap();

    let build = LibraryIndex::build(&LibrarySearch::new([&dir], [".v"], false));
    let path = build.index.resolve("FOO").unwrap();
    assert_eq!(path.file_name().unwrap(), "foo.v");
}

#[test]
fn test_unreadable_directory_does_not_stop_build() {
    let mut fixture = LibraryFixture::new().unwrap();
    let gone = fixture.missing_dir("gone");
    let dir = fixture.library_dir("lib", &["dff.v", "mux.v"]).unwrap();

    let build = LibraryIndex::build(&LibrarySearch::new([&gone, &dir], [".v"], true));
    assert_eq!(build.index.module_count(), 2);
    assert_eq!(build.errors.len(), 1);
    let LibraryError::ScanDirectory { path, .. } = &build.errors[0];
    assert_eq!(path, &gone);
    assert!(build.errors[0].to_string().contains("gone"));
}

#[test]
fn test_miss_then_report() {
    let build = LibraryIndex::build(&LibrarySearch::default());
    let missing = MissingModules::new();

    assert!(build.index.resolve("bar").is_none());
    missing.record_miss("bar");
    assert_eq!(missing.report().pairs(), [("bar", 1)]);

    missing.record_miss("bar");
    assert_eq!(missing.report().pairs(), [("bar", 2)]);
}

#[test]
fn test_mixed_suffix_priorities() {
    let mut fixture = LibraryFixture::new().unwrap();
    let local = fixture.library_dir("local", &["ram.vl", "rom.txt"]).unwrap();
    let vendor = fixture
        .library_dir("vendor", &["ram.v", "rom.v", "pll.vl"])
        .unwrap();

    let build = LibraryIndex::build(&LibrarySearch::new([&local, &vendor], [".v", ".vl"], true));
    let index = build.index;
    assert_eq!(index.resolve("ram"), Some(local.join("ram.vl").as_path()));
    assert_eq!(index.resolve("rom"), Some(vendor.join("rom.v").as_path()));
    assert_eq!(index.resolve("pll"), Some(vendor.join("pll.vl").as_path()));

    let discovered: Vec<_> = index.iter().map(|(name, _)| name).collect();
    assert_eq!(discovered, ["ram", "rom", "pll"]);
}
