/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the wrake project authors
 */

use anyhow::{Context, anyhow};
use clap::{Arg, ArgMatches, Command};
use tokio::io::AsyncWriteExt;

use wrake_ftp_client::{MemoryBody, RemoteAddr};

use super::FtpTcpSession;

pub(super) const COMMAND: &str = "get";

const COMMAND_ARG_PATH: &str = "path";
const COMMAND_ARG_OUTPUT: &str = "output";

pub(super) fn command() -> Command {
    Command::new(COMMAND)
        .about("Download a file")
        .arg(
            Arg::new(COMMAND_ARG_PATH)
                .value_name("FILE PATH")
                .num_args(1)
                .required(true),
        )
        .arg(
            Arg::new(COMMAND_ARG_OUTPUT)
                .help("local output file, stdout if not set")
                .value_name("LOCAL FILE")
                .num_args(1)
                .short('o')
                .long("output"),
        )
}

pub(super) async fn run(
    session: &mut FtpTcpSession,
    server: &RemoteAddr,
    args: &ArgMatches,
) -> anyhow::Result<()> {
    let path = args
        .get_one::<String>(COMMAND_ARG_PATH)
        .ok_or_else(|| anyhow!("no file path given"))?;
    let request = super::build_request(server, args, path);

    match args.get_one::<String>(COMMAND_ARG_OUTPUT) {
        Some(local) => {
            let mut file = tokio::fs::File::create(local)
                .await
                .context(format!("failed to create local file {local}"))?;
            let response = session.fetch(request, &mut file).await?;
            file.flush().await?;
            log::info!("saved {path} to {local} ({})", response.reply);
        }
        None => {
            let mut body = MemoryBody::new();
            let response = session.fetch(request, &mut body).await?;
            let mut stdout = tokio::io::stdout();
            stdout.write_all(body.as_slice()).await?;
            stdout.flush().await?;
            log::info!("fetched {path} ({})", response.reply);
        }
    }

    Ok(())
}
