use clap::Args;
use common::error::BucketError;

use super::{BucketTarget, TargetError};

#[derive(Args, Debug, Clone)]
pub struct Flat {
    #[command(flatten)]
    pub bucket: BucketTarget,

    /// Path in bucket to list (defaults to root)
    #[arg(default_value = "")]
    pub path: String,

    /// Include directories as well as files
    #[arg(long)]
    pub dirs: bool,

    /// Levels below the path to walk (defaults to the configured depth)
    #[arg(long)]
    pub depth: Option<u32>,
}

#[derive(Debug, thiserror::Error)]
pub enum BucketFlatError {
    #[error(transparent)]
    Target(#[from] TargetError),
    #[error("bucket flat failed: {0}")]
    Bucket(#[from] BucketError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Flat {
    type Error = BucketFlatError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let key = self.bucket.resolve(&ctx.buckets).await?;
        let depth = self.depth.unwrap_or(ctx.config.flat_depth);
        let paths = ctx
            .buckets
            .list_path_flat(&key, &self.path, self.dirs, Some(depth))
            .await?;

        if paths.is_empty() {
            Ok("No items found".to_string())
        } else {
            Ok(paths.join("\n"))
        }
    }
}
