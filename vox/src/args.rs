use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Vox voice-clone relay
#[derive(Debug, Parser)]
#[command(name = "vox", about = "Voice-clone relay and audio file server for Fish Audio")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the relay and the static file server
    Serve(ServeArgs),
    /// Create (or reuse) a model from a local voice sample and synthesize speech
    Batch(BatchArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "vox.toml", env = "VOX_CONFIG")]
    pub config: PathBuf,

    /// Override the API listen address
    #[arg(long, env = "VOX_LISTEN")]
    pub listen: Option<std::net::SocketAddr>,
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "vox.toml", env = "VOX_CONFIG")]
    pub config: PathBuf,

    /// Local voice sample to create the model from
    #[arg(long)]
    pub voice_file: PathBuf,

    /// Text to synthesize
    #[arg(long, default_value = "Hello! This is my first stream!")]
    pub text: String,

    /// Output file; defaults to speech_{first 8 chars of the model id}.mp3
    #[arg(long)]
    pub output: Option<PathBuf>,
}
