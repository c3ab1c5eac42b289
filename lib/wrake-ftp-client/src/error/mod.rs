/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the wrake project authors
 */

mod command;
mod connect;
mod file;
mod response;
mod session;
mod transfer;

pub use command::FtpCommandError;
pub use connect::FtpConnectError;
pub use file::FtpFileFactsParseError;
pub use response::FtpRawResponseError;
pub use session::{FtpLoginError, FtpSessionError};
pub use transfer::{FtpTransferError, FtpTransferServerError};

pub(crate) use session::FtpAuthStatus;
