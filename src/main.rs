use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

/// Send a piped, inline, or file message to a chat webhook.
#[derive(Debug, Parser)]
#[command(name = "slatemess", version, about)]
struct Cli {
    /// Webhook URL, overriding SLACK_HOOK
    #[arg(long)]
    hook: Option<String>,

    /// Channel to post to, unless the payload sets one
    #[arg(long)]
    channel: Option<String>,

    /// Username to post as, unless the payload sets one
    #[arg(long)]
    user: Option<String>,

    /// Icon emoji to post with, unless the payload sets one
    #[arg(long)]
    icon: Option<String>,

    /// Message text (instead of stdin)
    #[arg(long)]
    message: Option<String>,

    /// Read the message from a file (instead of stdin)
    #[arg(long)]
    file: Option<PathBuf>,

    /// Path to a KDL config file with default settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Request timeout in seconds (1 to 3600)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=slatemess::config::MAX_TIMEOUT_SECS))]
    timeout: Option<u64>,

    /// Embed the text in a code fence so it displays as a code block
    #[arg(long)]
    fence: bool,

    /// Print an equivalent curl command instead of sending
    #[arg(long)]
    dry: bool,

    /// Print debug info on stderr
    #[arg(long)]
    debug: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    slatemess::run(slatemess::Options {
        hook: cli.hook,
        channel: cli.channel,
        user: cli.user,
        icon: cli.icon,
        message: cli.message,
        file: cli.file,
        config: cli.config,
        timeout: cli.timeout,
        fence: cli.fence,
        dry_run: cli.dry,
        debug: cli.debug,
    })
}
