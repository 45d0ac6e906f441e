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

use rusqlite::{Error, ErrorCode};

use storage_core::error::{process_io_error, Fatal, Recoverable};

/// Classify an SQLite error
pub fn process_sqlite_error(err: Error) -> storage_core::Error {
    let (code, msg) = match &err {
        Error::SqliteFailure(ffi_err, msg) => (ffi_err.code, msg.clone()),
        // Errors raised by rusqlite itself signify a flaw in how the library is used
        _ => return Fatal::InternalError(err.to_string()).into(),
    };

    match code {
        // Another connection holds a conflicting lock for longer than the busy timeout
        ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => {
            Recoverable::TemporarilyUnavailable.into()
        }

        // We have exhausted some resource which may become available again later
        ErrorCode::OutOfMemory | ErrorCode::OperationInterrupted => {
            Recoverable::TemporarilyUnavailable.into()
        }

        // Transaction failed to commit
        ErrorCode::OperationAborted => Recoverable::TransactionFailed.into(),

        // Initialization issues
        ErrorCode::CannotOpen
        | ErrorCode::PermissionDenied
        | ErrorCode::ReadOnly
        | ErrorCode::FileLockingProtocolFailed
        | ErrorCode::NoLargeFileSupport => Recoverable::DbInit.into(),

        ErrorCode::DiskFull => Fatal::OutOfSpace.into(),

        // These are database corruption issues
        ErrorCode::DatabaseCorrupt | ErrorCode::NotADatabase => Fatal::DatabaseCorrupted.into(),

        // The file does not have the layout this backend expects
        ErrorCode::SchemaChanged | ErrorCode::TypeMismatch | ErrorCode::ConstraintViolation => {
            Fatal::SchemaMismatch.into()
        }

        ErrorCode::SystemIoFailure => {
            let msg = msg.unwrap_or_else(|| err.to_string());
            process_io_error(std::io::Error::other(msg))
        }

        // These signify an implementation flaw
        _ => Fatal::InternalError(err.to_string()).into(),
    }
}
