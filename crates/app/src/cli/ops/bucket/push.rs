use std::path::PathBuf;

use clap::Args;
use common::bucket::CreateOptions;
use common::cancel::CancelSignal;
use common::chunks::Source;
use common::error::BucketError;
use common::session::PushOptions;

use super::{BucketTarget, TargetError};
use bucket_sync::process::abort_on_interrupt;

#[derive(Args, Debug, Clone)]
pub struct Push {
    #[command(flatten)]
    pub bucket: BucketTarget,

    /// Local file to upload, or `-` for stdin
    pub source: PathBuf,

    /// Destination path in the bucket (defaults to the file name)
    pub path: Option<String>,

    /// Create the bucket named by --name if it does not exist
    #[arg(long)]
    pub create: bool,

    /// Chunk size in bytes (defaults to the configured size)
    #[arg(long)]
    pub chunk_size: Option<usize>,
}

#[derive(Debug, thiserror::Error)]
pub enum BucketPushError {
    #[error(transparent)]
    Target(#[from] TargetError),
    #[error("bucket push failed: {0}")]
    Bucket(#[from] BucketError),
    #[error("failed to open {0:?}: {1}")]
    Open(PathBuf, std::io::Error),
    #[error("no destination path given and {0:?} has no file name")]
    NoDestination(PathBuf),
    #[error("--create needs --name")]
    CreateWithoutName,
}

impl Push {
    fn reads_stdin(&self) -> bool {
        self.source.as_os_str() == "-"
    }

    fn destination(&self) -> Result<String, BucketPushError> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        if self.reads_stdin() {
            return Err(BucketPushError::NoDestination(self.source.clone()));
        }
        self.source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| BucketPushError::NoDestination(self.source.clone()))
    }

    async fn open_source(&self) -> Result<Source, BucketPushError> {
        if self.reads_stdin() {
            return Ok(Source::from_reader(tokio::io::stdin()));
        }
        Source::from_file(&self.source)
            .await
            .map_err(|e| BucketPushError::Open(self.source.clone(), e))
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Push {
    type Error = BucketPushError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut buckets = ctx.buckets.clone();
        let key = match (&self.bucket.name, self.create) {
            (Some(name), true) => {
                buckets
                    .get_or_create(name, CreateOptions::default())
                    .await?
                    .root
                    .key
            }
            (None, true) => return Err(BucketPushError::CreateWithoutName),
            (_, false) => self.bucket.resolve(&buckets).await?,
        };
        let path = self.destination()?;
        let source = self.open_source().await?;

        let signal = CancelSignal::new();
        let interrupt = abort_on_interrupt(signal.clone());
        let mut opts = PushOptions::default()
            .with_signal(signal)
            .with_progress(|sent| tracing::debug!(bytes = sent, "pushed"));
        if let Some(chunk_size) = self.chunk_size {
            opts = opts.with_chunk_size(chunk_size);
        }

        let result = buckets.push_path(&key, &path, source, opts).await;
        interrupt.abort();
        let reply = result?;

        Ok(format!(
            "pushed {} ({} bytes)\n- Root: {}",
            reply.path, reply.size, reply.root.path
        ))
    }
}
