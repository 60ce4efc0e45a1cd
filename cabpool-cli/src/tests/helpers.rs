//! Test helpers for temporary inputs and scripted solver backends.

use cabpool_core::MipBackend;
use cabpool_core::test_support::ScriptedBackend;
use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

use crate::input::BackendBuilder;

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path, contents).expect("write fixture file");
}

/// Temporary directory plus its UTF-8 path; keep the guard alive.
pub(super) fn workspace() -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    (tmp, root)
}

/// Hands out a borrowed [`ScriptedBackend`] so tests can count solver calls.
pub(super) struct ScriptedBuilder {
    pub(super) backend: ScriptedBackend,
}

impl ScriptedBuilder {
    pub(super) fn new(backend: ScriptedBackend) -> Self {
        Self { backend }
    }
}

impl BackendBuilder for ScriptedBuilder {
    fn build(&self) -> Box<dyn MipBackend + '_> {
        Box::new(&self.backend)
    }
}
