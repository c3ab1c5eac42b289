/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the wrake project authors
 */

use std::io;

use thiserror::Error;

use super::command::FtpCommandError;
use super::transfer::{FtpTransferError, FtpTransferServerError};

pub(crate) enum FtpAuthStatus {
    NotLoggedIn,
    LoggedIn,
    NeedPassword,
    NeedAccount,
}

/// Login rejected by the server; fatal for the session, never retried.
#[derive(Debug, Error)]
pub enum FtpLoginError {
    #[error("raw command error: {0}")]
    RawCommandError(FtpCommandError),
    #[error("service not available")]
    ServiceNotAvailable,
    #[error("not logged in")]
    NotLoggedIn,
    #[error("extra account is needed")]
    AccountIsNeeded,
}

impl From<FtpCommandError> for FtpLoginError {
    fn from(e: FtpCommandError) -> Self {
        match e {
            FtpCommandError::ServiceNotAvailable => FtpLoginError::ServiceNotAvailable,
            _ => FtpLoginError::RawCommandError(e),
        }
    }
}

/// The flattened error surface of `fetch` and `fetch_listing`.
///
/// `E` is the connection pool's checkout error type. Nothing here is
/// retried by the session itself; retry policy belongs to the caller.
#[derive(Debug, Error)]
pub enum FtpSessionError<E: std::error::Error> {
    #[error("a fetch is already in progress on this session")]
    SessionInUse,
    #[error("session is not connected")]
    NotConnected,
    #[error("control connection failed: {0:?}")]
    ConnectFailed(E),
    #[error("data connection failed: {0:?}")]
    DataConnectFailed(E),
    #[error("timeout to wait greeting")]
    GreetingTimeout,
    #[error("login failed: {0}")]
    LoginFailed(#[from] FtpLoginError),
    #[error("command failed: {0}")]
    CommandFailed(#[from] FtpCommandError),
    #[error("transfer failed: {0}")]
    TransferFailed(#[from] FtpTransferServerError),
    #[error("data read failed: {0:?}")]
    DataReadFailed(io::Error),
    #[error("local sink io failed: {0:?}")]
    SinkIoFailed(io::Error),
    #[error("timeout to wait transfer end reply")]
    TransferEndTimeout,
}

impl<E: std::error::Error> From<FtpTransferError<E>> for FtpSessionError<E> {
    fn from(e: FtpTransferError<E>) -> Self {
        match e {
            FtpTransferError::NegotiationFailed(e) => FtpSessionError::CommandFailed(e),
            FtpTransferError::DataConnectFailed(e) => FtpSessionError::DataConnectFailed(e),
            FtpTransferError::CommandFailed(e) => FtpSessionError::CommandFailed(e),
            FtpTransferError::DataReadFailed(e) => FtpSessionError::DataReadFailed(e),
            FtpTransferError::SinkIoFailed(e) => FtpSessionError::SinkIoFailed(e),
            FtpTransferError::ServerReported(e) => FtpSessionError::TransferFailed(e),
            FtpTransferError::EndWaitTimeout => FtpSessionError::TransferEndTimeout,
        }
    }
}
