// SPDX-License-Identifier: AGPL-3.0-or-later

//! # Runtime Configuration Constants
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Root directory for the store document and key material | `/data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `OPERATOR_TOKEN` | Shared token for operator endpoints | Unset (operator surface disabled) |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

/// Environment variable name for the data directory path.
///
/// The data directory holds the persisted store document (`store.json`)
/// and the operator key pair (`keys/`). The keys subdirectory is created
/// with owner-only permissions.
///
/// # Default
/// `/data`
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Default data directory when `DATA_DIR` is unset.
pub const DEFAULT_DATA_DIR: &str = "/data";

/// Environment variable name for the operator token.
///
/// Operator endpoints (catalog management, order status updates, the
/// decrypt audit path) require this token in the `X-Operator-Token`
/// header. When the variable is unset the operator surface rejects every
/// request.
pub const OPERATOR_TOKEN_ENV: &str = "OPERATOR_TOKEN";

/// Environment variable name selecting the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";
