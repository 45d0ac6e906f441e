// Copyright (c) 2022-2025 RBB S.r.l
// opensource@mintlayer.org
// SPDX-License-Identifier: MIT
// Licensed under the MIT License;
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// https://github.com/mintlayer/mintlayer-core/blob/master/LICENSE
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Temporary directories for tests touching the file system

use std::path::{Path, PathBuf};

use logging::log;

/// A directory that is removed, together with its contents, when dropped
pub struct TestDir(tempfile::TempDir);

impl TestDir {
    /// Create a fresh directory in the system temp location. The prefix helps to tell apart
    /// leftovers of different tests.
    pub fn new(prefix: &str) -> std::io::Result<Self> {
        let dir = tempfile::Builder::new().prefix(prefix).tempdir()?;
        log::debug!("Created test directory {}", dir.path().display());
        Ok(Self(dir))
    }

    pub fn path(&self) -> &Path {
        self.0.path()
    }

    /// Path of a file inside the directory
    pub fn file(&self, name: &str) -> PathBuf {
        self.0.path().join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removed_on_drop() {
        let dir = TestDir::new("test-dir-").unwrap();
        let path = dir.path().to_path_buf();
        std::fs::write(dir.file("a.txt"), b"abc").unwrap();
        assert!(path.is_dir());

        drop(dir);
        assert!(!path.exists());
    }
}
