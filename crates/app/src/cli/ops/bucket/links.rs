use clap::Args;
use common::error::BucketError;

use super::{BucketTarget, TargetError};

#[derive(Args, Debug, Clone)]
pub struct BucketLinks {
    #[command(flatten)]
    pub bucket: BucketTarget,
}

#[derive(Debug, thiserror::Error)]
pub enum BucketLinksError {
    #[error(transparent)]
    Target(#[from] TargetError),
    #[error("bucket links failed: {0}")]
    Bucket(#[from] BucketError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for BucketLinks {
    type Error = BucketLinksError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let key = self.bucket.resolve(&ctx.buckets).await?;
        let links = ctx.buckets.links(&key).await?;

        let mut output = format!("URL: {}\nIPNS: {}", links.url, links.ipns);
        match links.www {
            Some(www) => output.push_str(&format!("\nWWW: {}", www)),
            None => output.push_str("\nWWW: unavailable for encrypted buckets"),
        }
        Ok(output)
    }
}
