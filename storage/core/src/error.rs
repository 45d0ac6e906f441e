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

//! Storage errors

/// Recoverable database error
#[derive(Debug, Ord, PartialOrd, PartialEq, Eq, Clone, thiserror::Error)]
pub enum Recoverable {
    /// Transaction has failed to execute and its effects have not taken place. This could be e.g.
    /// because of a conflicting transaction front-running this one.
    #[error("Transaction failed")]
    TransactionFailed,

    /// Some resource is temporarily exhausted so the operation did not succeed.
    /// This could be e.g. the database being locked by another process.
    #[error("The database has temporarily exhausted some resource")]
    TemporarilyUnavailable,

    /// Database could not be initialized
    #[error("Database initialization failed")]
    DbInit,

    /// Recoverable I/O error
    #[error("I/O error {0:?}: {1}")]
    Io(std::io::ErrorKind, String),
}

/// Fatal database error
#[derive(Debug, Ord, PartialOrd, PartialEq, Eq, Clone, thiserror::Error)]
pub enum Fatal {
    #[error("Out of storage space")]
    OutOfSpace,
    #[error("Database has been corrupted")]
    DatabaseCorrupted,
    #[error("Database internal error: {0}")]
    InternalError(String),
    #[error("Database schema does not match database settings or contents")]
    SchemaMismatch,
    #[error("Fatal I/O error {0:?}: {1}")]
    Io(std::io::ErrorKind, String),
    #[error("Database has been closed")]
    Closed,
}

/// Database error
#[derive(Debug, Ord, PartialOrd, PartialEq, Eq, Clone, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Recoverable(#[from] Recoverable),
    #[error("{0}")]
    Fatal(#[from] Fatal),
}

impl Error {
    /// Whether retrying the operation later may succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable(_))
    }
}

/// Map an I/O error into a storage error, classifying it as recoverable or fatal
pub fn process_io_error(err: std::io::Error) -> Error {
    use std::io::ErrorKind;
    match err.kind() {
        ErrorKind::BrokenPipe
        | ErrorKind::AlreadyExists
        | ErrorKind::PermissionDenied
        | ErrorKind::NotFound
        | ErrorKind::WouldBlock
        | ErrorKind::Interrupted => Recoverable::Io(err.kind(), err.to_string()).into(),
        _ => Fatal::Io(err.kind(), err.to_string()).into(),
    }
}
