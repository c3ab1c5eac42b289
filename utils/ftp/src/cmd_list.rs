/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the wrake project authors
 */

use clap::{Arg, ArgMatches, Command};

use wrake_ftp_client::{MemoryBody, RemoteAddr};

use super::FtpTcpSession;

pub(super) const COMMAND: &str = "list";

const COMMAND_ARG_PATH: &str = "path";

pub(super) fn command() -> Command {
    Command::new(COMMAND).about("List path").arg(
        Arg::new(COMMAND_ARG_PATH)
            .value_name("FILE PATH")
            .num_args(1),
    )
}

pub(super) async fn run(
    session: &mut FtpTcpSession,
    server: &RemoteAddr,
    args: &ArgMatches,
) -> anyhow::Result<()> {
    let path = args
        .get_one::<String>(COMMAND_ARG_PATH)
        .map(|s| s.as_str())
        .unwrap_or_default();
    let request = super::build_request(server, args, path);

    let mut body = MemoryBody::new();
    let response = session.fetch_listing(request, &mut body).await?;

    for entry in &response.files {
        let size = entry
            .size()
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string());
        let mtime = entry
            .mtime()
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<8} {:>12} {:>25} {}",
            entry.entry_type(),
            size,
            mtime,
            entry.name()
        );
    }

    Ok(())
}
