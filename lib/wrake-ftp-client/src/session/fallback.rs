/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the wrake project authors
 */

use crate::control::FtpCommand;
use crate::error::{FtpCommandError, FtpSessionError, FtpTransferServerError};

/// Whether a failed MLSD attempt should degrade to the legacy LIST
/// command.
///
/// Only "command unrecognized" (500) and "command not implemented" (502)
/// against MLSD itself qualify, whether they arrive as the direct reply
/// to the command or as the end reply of the data phase. Everything else
/// is terminal, and a failure of the LIST attempt is never degraded
/// further.
pub(crate) fn should_degrade_to_list<E: std::error::Error>(e: &FtpSessionError<E>) -> bool {
    match e {
        FtpSessionError::CommandFailed(
            FtpCommandError::CommandUnrecognized(cmd)
            | FtpCommandError::CommandNotImplemented(cmd),
        ) => *cmd == FtpCommand::MLSD,
        FtpSessionError::TransferFailed(FtpTransferServerError::UnexpectedEndReplyCode(
            cmd,
            500 | 502,
        )) => *cmd == FtpCommand::MLSD,
        _ => false,
    }
}
