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

use storage_core::Namespace;

pub use crate::serializer::SerializationError;

/// Mistakes in the set of columns and variables an accessor is opened with or asked about
#[derive(Debug, PartialEq, Eq, Clone, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Column id {0} declared more than once")]
    DuplicateColumnId(u8),
    #[error("Variable id {0} declared more than once")]
    DuplicateVariableId(u8),
    #[error("Column '{name}' (id {id}) is not part of the schema")]
    UnknownColumn { id: u8, name: String },
    #[error("Variable '{name}' (id {id}) is not part of the schema")]
    UnknownVariable { id: u8, name: String },
    #[error("The store has {namespace} recorded as '{stored}', schema declares '{declared}'")]
    SchemaMismatch {
        namespace: Namespace,
        stored: String,
        declared: String,
    },
}

/// Operations invoked on a handle in the wrong state
#[derive(Debug, PartialEq, Eq, Clone, Copy, thiserror::Error)]
pub enum UsageError {
    #[error("Transaction has already been committed or closed")]
    TransactionNotOpen,
    #[error("Another transaction is in progress")]
    WriterBusy,
    #[error("The accessor has been closed")]
    AccessorClosed,
}

#[derive(Debug, PartialEq, Eq, Clone, thiserror::Error)]
pub enum Error {
    #[error("Storage fault: {0}")]
    Storage(#[from] storage_core::Error),
    #[error("Serialization fault: {0}")]
    Serialization(#[from] SerializationError),
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("Usage error: {0}")]
    Usage(#[from] UsageError),
}

impl Error {
    /// Whether retrying the operation may succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Storage(e) => e.is_recoverable(),
            Self::Usage(UsageError::WriterBusy) => true,
            Self::Serialization(_) | Self::Configuration(_) | Self::Usage(_) => false,
        }
    }
}

impl From<storage_core::error::Fatal> for Error {
    fn from(e: storage_core::error::Fatal) -> Self {
        Self::Storage(e.into())
    }
}

impl From<storage_core::error::Recoverable> for Error {
    fn from(e: storage_core::error::Recoverable) -> Self {
        Self::Storage(e.into())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use storage_core::error::{Fatal, Recoverable};

    #[test]
    fn recoverability() {
        assert!(Error::from(Recoverable::TransactionFailed).is_recoverable());
        assert!(Error::from(UsageError::WriterBusy).is_recoverable());
        assert!(!Error::from(Fatal::Closed).is_recoverable());
        assert!(!Error::from(UsageError::AccessorClosed).is_recoverable());
        assert!(!Error::from(SerializationError::InvalidLength {
            expected: 8,
            actual: 1
        })
        .is_recoverable());
    }

    #[test]
    fn messages() {
        let err = Error::from(ConfigurationError::SchemaMismatch {
            namespace: Namespace::Column(3),
            stored: "blocks".to_owned(),
            declared: "states".to_owned(),
        });
        assert_eq!(
            err.to_string(),
            "Configuration error: The store has column #3 recorded as 'blocks', \
             schema declares 'states'"
        );
    }
}
