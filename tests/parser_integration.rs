//! Integration tests for descriptor parsing
//!
//! Parses real .service files from the host, when there are any.

use std::path::{Path, PathBuf};

use sysinit::{Unit, UnitError, UnitOptions};

/// Non-symlinked .service files directly under `dir`
fn service_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return vec![];
    };

    entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().map_or(false, |e| e == "service"))
        // Skip symlinks to avoid duplicates and masked units
        .filter(|p| !p.is_symlink())
        .collect()
}

fn parse_services_in_dir(dir: &Path) -> (usize, Vec<(String, String)>) {
    let opts = UnitOptions::default();
    let mut success = 0;
    let mut failures = Vec::new();

    for path in service_files(dir) {
        match Unit::from_descriptor_file(&path, &opts) {
            Ok(unit) => {
                let stem = path.file_stem().and_then(|s| s.to_str()).unwrap();
                assert_eq!(unit.name(), stem);
                assert!(!unit.service_type.is_empty());
                success += 1;
            }
            // Empty, unreadable and template files are all fair game on a real host
            Err(UnitError::InvalidDescriptor(_))
            | Err(UnitError::Io { .. })
            | Err(UnitError::InvalidName(_)) => {}
            Err(e) => failures.push((path.display().to_string(), e.to_string())),
        }
    }

    (success, failures)
}

#[test]
fn test_parse_etc_systemd() {
    let (success, failures) = parse_services_in_dir(Path::new("/etc/systemd/system"));

    for (path, err) in &failures {
        eprintln!("  {}: {}", path, err);
    }
    assert!(
        failures.is_empty(),
        "Failed to parse {} out of {} service files in /etc/systemd/system",
        failures.len(),
        success + failures.len()
    );
}

#[test]
fn test_parse_usr_lib_systemd() {
    let (success, failures) = parse_services_in_dir(Path::new("/usr/lib/systemd/system"));

    for (path, err) in &failures {
        eprintln!("  {}: {}", path, err);
    }
    assert!(
        failures.is_empty(),
        "Failed to parse {} out of {} service files in /usr/lib/systemd/system",
        failures.len(),
        success + failures.len()
    );
}

#[test]
fn test_regenerate_parsed_host_units() {
    let opts = UnitOptions::default();

    for path in service_files(Path::new("/usr/lib/systemd/system")).into_iter().take(25) {
        let Ok(unit) = Unit::from_descriptor_file(&path, &opts) else {
            continue;
        };
        let text = unit.generate_descriptor().unwrap();
        assert_eq!(text, unit.generate_descriptor().unwrap());
        assert!(text.starts_with("[Unit]\nDescription="));
    }
}
