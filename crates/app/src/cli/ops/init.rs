use std::path::PathBuf;

use clap::Args;
use common::bucket::ThreadId;

use bucket_sync::state::{AppConfig, AppState, StateError};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Chunk size for pushes, in bytes
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Thread to scope bucket commands to
    #[arg(long)]
    pub thread: Option<ThreadId>,

    /// Also write daily log files to this directory
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Identity used with --memory
    #[arg(long)]
    pub identity: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let defaults = AppConfig::default();
        let config = AppConfig {
            remote: ctx.remote.clone().unwrap_or(defaults.remote),
            chunk_size: self.chunk_size.unwrap_or(defaults.chunk_size),
            thread: self.thread,
            log_dir: self.log_dir.clone(),
            identity: self.identity.clone().unwrap_or(defaults.identity),
            ..AppConfig::default()
        };

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;

        let thread_str = match state.config.thread {
            Some(thread) => thread.to_string(),
            None => "none (adopted from the first bucket opened)".to_string(),
        };

        let output = format!(
            "Initialized bsync directory at: {}\n\
             - Config: {}\n\
             - Remote: {}\n\
             - Chunk size: {}\n\
             - Thread: {}",
            state.app_dir.display(),
            state.config_path.display(),
            state.config.remote,
            state.config.chunk_size,
            thread_str
        );

        Ok(output)
    }
}
