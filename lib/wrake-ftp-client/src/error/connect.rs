/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the wrake project authors
 */

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FtpConnectError<E: std::error::Error> {
    #[error("connect failed: {0:?}")]
    ConnectIoError(E),
    #[error("timed out to connect")]
    ConnectTimedOut,
    #[error("no address resolved")]
    NoAddressResolved,
}
