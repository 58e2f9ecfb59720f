//! Utilities for snapshot testing with insta

use insta::{assert_snapshot, Settings};

/// Configure insta settings for consistent snapshots
pub fn with_settings<F>(f: F)
where
    F: FnOnce(),
{
    let mut settings = Settings::clone_current();
    settings.set_snapshot_path("../snapshots");
    settings.set_prepend_module_to_snapshot(false);
    settings.bind(f);
}

/// Snapshot of a whole generated Python file
pub fn assert_python_snapshot(name: &str, python: &str) {
    with_settings(|| {
        assert_snapshot!(name, python);
    });
}

/// Helper for creating error snapshots with consistent formatting
pub fn assert_error_snapshot(name: &str, error: &dyn std::fmt::Display) {
    with_settings(|| {
        assert_snapshot!(name, format!("{}", error));
    });
}
