use clap::Args;
use common::error::BucketError;

use super::{BucketTarget, TargetError};

#[derive(Args, Debug, Clone)]
pub struct Destroy {
    #[command(flatten)]
    pub bucket: BucketTarget,
}

#[derive(Debug, thiserror::Error)]
pub enum BucketDestroyError {
    #[error(transparent)]
    Target(#[from] TargetError),
    #[error("bucket destroy failed: {0}")]
    Bucket(#[from] BucketError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Destroy {
    type Error = BucketDestroyError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let key = self.bucket.resolve(&ctx.buckets).await?;
        ctx.buckets.remove(&key).await?;
        Ok(format!("removed bucket {}", key))
    }
}
