/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the wrake project authors
 */

use std::time::Duration;

/// Limits and timeouts for the control channel codec.
#[derive(Debug, Clone)]
pub struct FtpControlConfig {
    pub max_line_len: usize,
    pub max_multi_lines: usize,
    pub command_timeout: Duration,
}

impl Default for FtpControlConfig {
    fn default() -> Self {
        FtpControlConfig {
            max_line_len: 2048,
            max_multi_lines: 64,
            command_timeout: Duration::from_secs(30),
        }
    }
}

/// Limits and timeouts for data channel transfers.
#[derive(Debug, Clone)]
pub struct FtpTransferConfig {
    pub copy_buffer_size: usize,
    pub list_max_line_len: usize,
    pub list_max_entries: usize,
    /// how long to wait for the end reply after the data channel hits EOF
    pub end_wait_timeout: Duration,
}

impl Default for FtpTransferConfig {
    fn default() -> Self {
        FtpTransferConfig {
            copy_buffer_size: 16 * 1024,
            list_max_line_len: 2048,
            list_max_entries: 8192,
            end_wait_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FtpClientConfig {
    pub control: FtpControlConfig,
    pub transfer: FtpTransferConfig,
    pub greeting_timeout: Duration,
    pub always_try_epsv: bool,
}

impl Default for FtpClientConfig {
    fn default() -> Self {
        FtpClientConfig {
            control: FtpControlConfig::default(),
            transfer: FtpTransferConfig::default(),
            greeting_timeout: Duration::from_secs(10),
            always_try_epsv: true,
        }
    }
}
