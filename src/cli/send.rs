use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use super::Options;
use crate::config::{self, ConfigError, Layer};
use crate::dispatch::{Dispatched, HttpTransport};
use crate::environment::{default_env_files, Variables};
use crate::message::Message;
use crate::{pipeline, Error};

/// Execute one invocation and map the outcome to an exit status.
///
/// Failures are reported as a single diagnostic on stderr.
pub fn run(options: Options) -> ExitCode {
    init_tracing(options.debug);

    match execute(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:?}", miette::Report::new(e));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("slatemess=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}

fn execute(options: &Options) -> Result<(), Error> {
    let flags = options.flag_layer();

    let mut vars = Variables::from_process();
    let home = vars.get("HOME").map(PathBuf::from);
    vars.load_env_files(&default_env_files(home.as_deref()));
    flags.export(&mut vars);

    let file_layer = match &options.config {
        Some(path) => Layer::load(path)?,
        None => Layer::default(),
    };

    let stdin = std::io::stdin();
    let piped = !stdin.is_terminal();
    let message = read_message(options, piped, stdin.lock())?;

    let layers = [file_layer, Layer::from_variables(&vars), flags];
    let config = config::verify(&message, &layers, options.dry_run)?;
    tracing::debug!(
        host = config.hook.host_str().unwrap_or_default(),
        overrides = ?config.overrides,
        dry_run = config.dry_run,
        timeout = ?config.timeout,
        source = ?message.source(),
        "configuration resolved"
    );

    let message = if options.fence {
        message.fenced()
    } else {
        message
    };

    let transport = HttpTransport::new(config.timeout)?;
    match pipeline::send(&message, &vars.snapshot(), &config, &transport)? {
        Dispatched::Printed(command) => println!("{command}"),
        Dispatched::Delivered => tracing::debug!("message sent"),
    }
    Ok(())
}

/// Pick the single message source for this invocation.
///
/// `--message` and `--file` are exclusive; stdin is read only when piped and
/// neither flag is given. With no source at all the message is empty, which
/// verification rejects.
fn read_message(options: &Options, piped: bool, stdin: impl Read) -> Result<Message, Error> {
    match (&options.message, &options.file) {
        (Some(_), Some(_)) => Err(ConfigError::ConflictingInputs.into()),
        (Some(text), None) => Ok(Message::literal(text.as_str())),
        (None, Some(path)) => Ok(Message::from_file(path)?),
        (None, None) if piped => Ok(Message::from_reader(stdin)?),
        (None, None) => Ok(Message::literal("")),
    }
}
