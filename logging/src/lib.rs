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

pub use log;

mod log_style;

pub use log_style::{get_log_style_from_env, LogStyle, LogStyleParseError};

/// Environment variable selecting the output coloring, see [LogStyle::parse]
pub const LOG_STYLE_ENV_VAR: &str = "STORAGE_LOG_STYLE";

static INITIALIZE_LOGGER_ONCE_FLAG: std::sync::Once = std::sync::Once::new();

/// Initialize the global logger. The filter is taken from `RUST_LOG`.
///
/// Only the first call has any effect, subsequent calls are ignored.
pub fn init_logging() {
    INITIALIZE_LOGGER_ONCE_FLAG.call_once(|| {
        let style = match get_log_style_from_env(LOG_STYLE_ENV_VAR) {
            Ok(style) => style.unwrap_or(LogStyle::Auto),
            Err(e) => {
                eprintln!("Ignoring {LOG_STYLE_ENV_VAR}: {e}");
                LogStyle::Auto
            }
        };

        let mut builder = env_logger::Builder::from_default_env();
        builder.write_style(style.into());

        // Another logger may have been installed by the host application
        if let Err(e) = builder.try_init() {
            eprintln!("Logger not initialized: {e}");
        }
    });
}
