/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the wrake project authors
 */

use std::fmt;

/// Reply code classes per the first digit of the code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FtpReplyClass {
    Preliminary,
    Success,
    Intermediate,
    TransientNegative,
    PermanentNegative,
}

/// The terminal reply of one command cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtpReply {
    code: u16,
    message: String,
}

impl FtpReply {
    pub(crate) fn new(code: u16, message: impl Into<String>) -> Self {
        FtpReply {
            code,
            message: message.into(),
        }
    }

    #[inline]
    pub fn code(&self) -> u16 {
        self.code
    }

    #[inline]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    pub fn class(&self) -> FtpReplyClass {
        match self.code / 100 {
            1 => FtpReplyClass::Preliminary,
            2 => FtpReplyClass::Success,
            3 => FtpReplyClass::Intermediate,
            4 => FtpReplyClass::TransientNegative,
            _ => FtpReplyClass::PermanentNegative,
        }
    }
}

impl fmt::Display for FtpReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_class() {
        assert_eq!(FtpReply::new(150, "").class(), FtpReplyClass::Preliminary);
        assert_eq!(FtpReply::new(226, "").class(), FtpReplyClass::Success);
        assert_eq!(FtpReply::new(331, "").class(), FtpReplyClass::Intermediate);
        assert_eq!(
            FtpReply::new(450, "").class(),
            FtpReplyClass::TransientNegative
        );
        assert_eq!(
            FtpReply::new(502, "").class(),
            FtpReplyClass::PermanentNegative
        );
    }

    #[test]
    fn display() {
        let reply = FtpReply::new(226, "Transfer complete");
        assert_eq!(reply.to_string(), "226 Transfer complete");
    }
}
