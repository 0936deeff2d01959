// Copyright 2023 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use crate::LoggingConfig;
use anyhow::Result;

/// The configuration for the current process.
/// Most users will just pass `Default::default()` to `cli_main`.
pub struct ConfigBuilder {
    logging: Option<LoggingConfig>,

    log_command_line: bool,
}

impl ConfigBuilder {
    #[inline(always)]
    pub fn new() -> Self {
        Self {
            logging: None,
            log_command_line: true,
        }
    }

    #[inline(always)]
    /// Overrides the logging config. If this isn't called, it defaults to
    /// `LoggingConfig::from_env()`.
    pub fn logging(mut self, cfg: LoggingConfig) -> Self {
        self.logging = Some(cfg);
        self
    }

    #[inline(always)]
    /// `enable` controls whether to log the command-line of the current process.
    pub fn log_command_line(mut self, enable: bool) -> Self {
        self.log_command_line = enable;
        self
    }

    #[inline(always)]
    /// Builds a Config suitable for use with cli_main.
    pub fn build(self) -> Result<Config> {
        let logging = match self.logging {
            Some(logging) => logging,
            None => LoggingConfig::from_env()?,
        };
        Ok(Config {
            logging,
            log_command_line: self.log_command_line,
        })
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A POD struct containing the configs, after applying any defaults for unset values.
pub struct Config {
    pub(crate) logging: LoggingConfig,
    pub(crate) log_command_line: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_config() {
        let config = ConfigBuilder::new()
            .logging(LoggingConfig::disabled())
            .log_command_line(false)
            .build()
            .unwrap();
        assert_eq!(config.log_command_line, false);
        assert!(config.logging.log_file.is_none());
        assert!(config.logging.console_logger.is_none());
    }

    #[test]
    fn test_default_logs_command_line() {
        let config = ConfigBuilder::default()
            .logging(LoggingConfig::disabled())
            .build()
            .unwrap();
        assert!(config.log_command_line);
    }
}
