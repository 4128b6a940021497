pub mod config;
pub mod dispatch;
pub mod environment;
pub mod message;
pub mod payload;
pub mod template;

mod error;
mod pipeline;

pub(crate) mod cli;

pub use cli::Options;
pub use error::Error;
pub use pipeline::send;

/// Run one invocation: resolve configuration, read the message, then send
/// it or print the dry-run command.
///
/// This is the binary entry point. It bridges `main.rs` to the library
/// without exposing `cli` internals; embedders should call [`send`] with
/// their own [`config::DeliveryConfig`] and [`dispatch::Transport`].
pub fn run(options: Options) -> std::process::ExitCode {
    cli::send::run(options)
}
