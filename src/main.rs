mod api;

mod channel;

mod config;

mod dispatcher;

mod errors;

mod init;

mod interpreter;

mod language;

mod message {
    pub(crate) mod push;
    pub(crate) mod request;
}

mod projector;

mod question;

mod session;

mod sid;

mod verdict;

mod workbench;

use anyhow::Result;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    init::main().await
}
