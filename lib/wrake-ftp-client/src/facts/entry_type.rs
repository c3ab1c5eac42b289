/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the wrake project authors
 */

use std::fmt;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum FtpFileEntryType {
    Unknown,
    File,
    Directory,
    CurrentDir,
    ParentDir,
    Symlink,
    OsType(String),
}

impl fmt::Display for FtpFileEntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FtpFileEntryType {
    pub(crate) fn parse(value: &str) -> Self {
        let lower = value.to_lowercase();
        match lower.as_str() {
            "file" => FtpFileEntryType::File,
            "dir" => FtpFileEntryType::Directory,
            "cdir" => FtpFileEntryType::CurrentDir,
            "pdir" => FtpFileEntryType::ParentDir,
            // "OS.unix=symlink" and the "OS.unix=slink:<target>" form
            _ if lower.starts_with("os.unix=symlink") || lower.starts_with("os.unix=slink") => {
                FtpFileEntryType::Symlink
            }
            _ => FtpFileEntryType::OsType(value.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FtpFileEntryType::Unknown => "unknown",
            FtpFileEntryType::File => "file",
            FtpFileEntryType::Directory => "dir",
            FtpFileEntryType::CurrentDir => "cdir",
            FtpFileEntryType::ParentDir => "pdir",
            FtpFileEntryType::Symlink => "symlink",
            FtpFileEntryType::OsType(s) => s,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(
            self,
            FtpFileEntryType::Directory
                | FtpFileEntryType::CurrentDir
                | FtpFileEntryType::ParentDir
        )
    }

    pub fn maybe_file(&self) -> bool {
        match self {
            FtpFileEntryType::Unknown => true,
            FtpFileEntryType::File => true,
            FtpFileEntryType::Directory => false,
            FtpFileEntryType::CurrentDir => false,
            FtpFileEntryType::ParentDir => false,
            FtpFileEntryType::Symlink => true,
            FtpFileEntryType::OsType(_) => true,
        }
    }
}
