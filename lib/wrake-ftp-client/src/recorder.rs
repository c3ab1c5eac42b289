/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the wrake project authors
 */

use std::sync::{Arc, Mutex};

use crate::reply::FtpReply;
use crate::request::FtpRequest;

/// A passive observer of session traffic and lifecycle events.
///
/// Every method is fire-and-forget: implementations must not assume they
/// can influence the fetch, and a session behaves identically whether or
/// not a recorder is attached. All methods default to no-ops so a recorder
/// only implements the events it cares about.
pub trait FtpRecorderSink: Send {
    fn begin_control(&mut self, _request: &FtpRequest) {}

    /// Raw bytes written to the control channel (commands).
    fn request_control_data(&mut self, _data: &[u8]) {}

    /// Raw bytes read from the control channel (replies).
    fn response_control_data(&mut self, _data: &[u8]) {}

    fn pre_response(&mut self, _request: &FtpRequest) {}

    /// Raw bytes read from the data channel.
    fn response_data(&mut self, _data: &[u8]) {}

    fn response(&mut self, _request: &FtpRequest, _reply: &FtpReply) {}

    fn end_control(&mut self, _request: &FtpRequest, _reply: &FtpReply) {}
}

/// Shared handle to a recorder, cloneable into the byte taps of the
/// control and data channels.
pub type SharedRecorder = Arc<Mutex<dyn FtpRecorderSink>>;
