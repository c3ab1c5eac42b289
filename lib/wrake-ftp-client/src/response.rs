/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the wrake project authors
 */

use crate::facts::FtpFileFacts;
use crate::reply::FtpReply;
use crate::request::FtpRequest;

/// The outcome of a completed file fetch.
///
/// The body sink stays with the caller; on a failed fetch whatever was
/// partially written is left in place for the caller to inspect or discard.
#[derive(Debug, Clone, PartialEq)]
pub struct FtpResponse {
    pub request: FtpRequest,
    pub reply: FtpReply,
}

/// The outcome of a completed directory listing fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct FtpListingResponse {
    pub request: FtpRequest,
    pub reply: FtpReply,
    pub files: Vec<FtpFileFacts>,
}
