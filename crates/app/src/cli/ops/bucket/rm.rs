use clap::Args;
use common::client::RemoveOptions;
use common::error::BucketError;

use super::{BucketTarget, TargetError};

#[derive(Args, Debug, Clone)]
pub struct Rm {
    #[command(flatten)]
    pub bucket: BucketTarget,

    /// Path to remove, with everything below it
    pub path: String,
}

#[derive(Debug, thiserror::Error)]
pub enum BucketRmError {
    #[error(transparent)]
    Target(#[from] TargetError),
    #[error("bucket rm failed: {0}")]
    Bucket(#[from] BucketError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Rm {
    type Error = BucketRmError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let key = self.bucket.resolve(&ctx.buckets).await?;
        let root = ctx
            .buckets
            .remove_path(&key, &self.path, RemoveOptions::default())
            .await?;
        Ok(format!("removed {}\n- Root: {}", self.path, root.path))
    }
}
