use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "werewolf-client",
    about = "Drives a werewolf game against the rules/agent backend."
)]
pub struct Opt {
    /// backend base URL (overrides WEREWOLF_BASE_URL)
    #[structopt(long)]
    pub base_url: Option<String>,
    /// per-request timeout in seconds
    #[structopt(long)]
    pub timeout: Option<u64>,
    /// never issue speculative requests
    #[structopt(long)]
    pub no_prefetch: bool,
    /// typewriter delay per character in milliseconds
    #[structopt(long)]
    pub typewriter_ms: Option<u64>,
    /// debug-level logging for this crate
    #[structopt(short, long)]
    pub verbose: bool,
    #[structopt(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, StructOpt, PartialEq, Eq)]
pub enum Command {
    /// start a new game and play it to the end
    #[structopt(name = "play")]
    Play,
    /// print the backend's event history
    #[structopt(name = "history")]
    History,
    /// check whether speech synthesis is available
    #[structopt(name = "tts-status")]
    TtsStatus,
}
