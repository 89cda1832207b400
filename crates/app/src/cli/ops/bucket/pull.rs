use std::path::PathBuf;

use clap::Args;
use common::cancel::CancelSignal;
use common::error::BucketError;
use common::session::PullOptions;

use super::{BucketTarget, TargetError};
use bucket_sync::process::abort_on_interrupt;

#[derive(Args, Debug, Clone)]
pub struct Pull {
    #[command(flatten)]
    pub bucket: BucketTarget,

    /// Path of the file in the bucket
    pub path: String,

    /// Write to this file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum BucketPullError {
    #[error(transparent)]
    Target(#[from] TargetError),
    #[error("bucket pull failed: {0}")]
    Bucket(#[from] BucketError),
    #[error("failed to create {0:?}: {1}")]
    Create(PathBuf, std::io::Error),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Pull {
    type Error = BucketPullError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let key = self.bucket.resolve(&ctx.buckets).await?;
        let file = match &self.output {
            Some(output) => Some(
                tokio::fs::File::create(output)
                    .await
                    .map_err(|e| BucketPullError::Create(output.clone(), e))?,
            ),
            None => None,
        };

        let signal = CancelSignal::new();
        let interrupt = abort_on_interrupt(signal.clone());
        let opts = PullOptions::default()
            .with_signal(signal)
            .with_progress(|received| tracing::debug!(bytes = received, "pulled"));

        let result = match file {
            Some(mut file) => {
                ctx.buckets
                    .pull_path_to_writer(&key, &self.path, &mut file, opts)
                    .await
            }
            None => {
                let mut stdout = tokio::io::stdout();
                ctx.buckets
                    .pull_path_to_writer(&key, &self.path, &mut stdout, opts)
                    .await
            }
        };
        interrupt.abort();
        let received = result?;

        // content went to stdout, keep it clean
        match &self.output {
            Some(output) => Ok(format!("pulled {} bytes to {}", received, output.display())),
            None => Ok(String::new()),
        }
    }
}
