//! Keeps `tests/unit` in step with `src`

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::fs;
    use std::path::Path;
    use walkdir::WalkDir;

    const SRC_DIR: &str = "src";
    const UNIT_DIR: &str = "tests/unit";

    /// Relative paths of every directory and `.rs` file below `root`
    fn relative_paths(root: &str) -> BTreeSet<String> {
        let root = Path::new(root);
        WalkDir::new(root)
            .min_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| {
                entry.file_type().is_dir()
                    || entry.path().extension().and_then(|e| e.to_str()) == Some("rs")
            })
            .filter_map(|entry| {
                entry
                    .path()
                    .strip_prefix(root)
                    .ok()
                    .map(|p| p.to_string_lossy().replace('\\', "/"))
            })
            .collect()
    }

    fn is_module_file(path: &str) -> bool {
        path == "mod.rs" || path.ends_with("/mod.rs")
    }

    // Tests every source file has a unit test file at the same relative path
    // Verified by adding a source file without tests
    #[test]
    fn test_all_src_files_have_unit_tests() {
        let tests = relative_paths(UNIT_DIR);
        let missing: Vec<String> = relative_paths(SRC_DIR)
            .into_iter()
            .filter(|p| p != "main.rs" && p != "lib.rs" && !is_module_file(p))
            .filter(|p| !tests.contains(p))
            .map(|p| format!("  - src/{p} -> tests/unit/{p}"))
            .collect();

        assert!(
            missing.is_empty(),
            "Source files without unit tests:\n{}",
            missing.join("\n")
        );
    }

    // Tests no unit test file outlives its source file
    // Verified by deleting a source file
    #[test]
    fn test_all_unit_tests_have_src_counterparts() {
        let sources = relative_paths(SRC_DIR);
        let orphaned: Vec<String> = relative_paths(UNIT_DIR)
            .into_iter()
            .filter(|p| !is_module_file(p) && !sources.contains(p))
            .map(|p| format!("  - tests/unit/{p} -> src/{p} (missing)"))
            .collect();

        assert!(
            orphaned.is_empty(),
            "Unit tests without source files:\n{}",
            orphaned.join("\n")
        );
    }

    // Tests every test file declares at least one test
    // Verified by emptying a test file
    #[test]
    fn test_all_test_files_contain_tests() {
        let empty: Vec<String> = WalkDir::new("tests")
            .into_iter()
            .filter_map(Result::ok)
            .map(walkdir::DirEntry::into_path)
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("rs"))
            .filter(|path| {
                let harness = path == Path::new("tests/main.rs");
                let module = path.file_name().and_then(|n| n.to_str()) == Some("mod.rs");
                !harness && !module
            })
            .filter(|path| {
                fs::read_to_string(path).is_ok_and(|content| !content.contains("#[test]"))
            })
            .map(|path| format!("  - {}", path.display()))
            .collect();

        assert!(
            empty.is_empty(),
            "Test files without any #[test] functions:\n{}",
            empty.join("\n")
        );
    }
}
