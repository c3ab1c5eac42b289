/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the wrake project authors
 */

use std::io;

use thiserror::Error;

use super::FtpRawResponseError;
use super::command::FtpCommandError;
use crate::control::FtpCommand;

/// A failure reported by the server at the end of a data transfer.
#[derive(Debug, Error)]
pub enum FtpTransferServerError {
    #[error("unable to recv reply: {0}")]
    RecvFailed(#[from] FtpRawResponseError),
    #[error("data transfer not established")]
    DataTransferNotEstablished,
    #[error("data transfer lost")]
    DataTransferLost,
    #[error("server failed")]
    ServerFailed,
    #[error("unexpected end reply code ({0} -> {1})")]
    UnexpectedEndReplyCode(FtpCommand, u16),
}

/// Anything that can go wrong while driving one data channel cycle.
#[derive(Debug, Error)]
pub enum FtpTransferError<E: std::error::Error> {
    #[error("failed to negotiate data channel: {0}")]
    NegotiationFailed(FtpCommandError),
    #[error("failed to establish data connection: {0:?}")]
    DataConnectFailed(E),
    #[error("command failed: {0}")]
    CommandFailed(FtpCommandError),
    #[error("data read failed: {0:?}")]
    DataReadFailed(io::Error),
    #[error("local sink io failed: {0:?}")]
    SinkIoFailed(io::Error),
    #[error("server reported transfer error: {0}")]
    ServerReported(#[from] FtpTransferServerError),
    #[error("timeout to wait transfer end reply")]
    EndWaitTimeout,
}
