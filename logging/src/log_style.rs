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

use thiserror::Error;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogStyle {
    /// Colored output if writing to a terminal
    Auto,
    /// Always colored
    Colored,
    /// Never colored
    Plain,
}

impl LogStyle {
    pub fn parse(str: &str) -> Result<LogStyle, LogStyleParseError> {
        let str = str.to_lowercase();
        match str.as_str() {
            "text" | "auto" => Ok(LogStyle::Auto),
            "text-colored" => Ok(LogStyle::Colored),
            "text-uncolored" => Ok(LogStyle::Plain),
            _ => Err(LogStyleParseError::UnrecognizedFormat(str)),
        }
    }
}

impl From<LogStyle> for env_logger::WriteStyle {
    fn from(style: LogStyle) -> Self {
        match style {
            LogStyle::Auto => env_logger::WriteStyle::Auto,
            LogStyle::Colored => env_logger::WriteStyle::Always,
            LogStyle::Plain => env_logger::WriteStyle::Never,
        }
    }
}

pub fn get_log_style_from_env(env_var_name: &str) -> Result<Option<LogStyle>, LogStyleParseError> {
    match std::env::var(env_var_name) {
        Ok(val) => LogStyle::parse(&val).map(Some),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => Err(LogStyleParseError::NotUnicode),
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LogStyleParseError {
    #[error("Unrecognized format: {0}")]
    UnrecognizedFormat(String),
    #[error("Env var value is not valid unicode")]
    NotUnicode,
}

#[cfg(test)]
mod tests {
    use super::*;

    // Make the name verbose so that it doesn't conflict with env variables used by other
    // tests, if any.
    static TEST_ENV_VAR: &str = "STORAGE_LOG_STYLE_TEST_ENV_VAR";

    #[test]
    fn parse_styles() {
        assert_eq!(LogStyle::parse("text"), Ok(LogStyle::Auto));
        assert_eq!(LogStyle::parse("TEXT-Colored"), Ok(LogStyle::Colored));
        assert_eq!(LogStyle::parse("text-uncolored"), Ok(LogStyle::Plain));
        assert_eq!(
            LogStyle::parse("json"),
            Err(LogStyleParseError::UnrecognizedFormat("json".to_owned()))
        );
    }

    // All env var checks are inside one test so they don't race with each other.
    #[test]
    fn parse_env_var() {
        std::env::remove_var(TEST_ENV_VAR);
        assert_eq!(get_log_style_from_env(TEST_ENV_VAR), Ok(None));

        std::env::set_var(TEST_ENV_VAR, "text-uncolored");
        assert_eq!(get_log_style_from_env(TEST_ENV_VAR), Ok(Some(LogStyle::Plain)));

        std::env::set_var(TEST_ENV_VAR, "foo");
        assert_eq!(
            get_log_style_from_env(TEST_ENV_VAR),
            Err(LogStyleParseError::UnrecognizedFormat("foo".to_owned()))
        );
        std::env::remove_var(TEST_ENV_VAR);
    }
}
