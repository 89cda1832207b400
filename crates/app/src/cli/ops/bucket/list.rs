use clap::Args;
use common::error::BucketError;

#[derive(Args, Debug, Clone)]
pub struct List {
    /// Every bucket you own, across threads
    #[arg(long)]
    pub owned: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum BucketListError {
    #[error("bucket list failed: {0}")]
    Bucket(#[from] BucketError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for List {
    type Error = BucketListError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let roots = if self.owned {
            ctx.buckets.existing().await?
        } else {
            ctx.buckets.list().await?
        };

        if roots.is_empty() {
            return Ok("No buckets found".to_string());
        }
        Ok(roots
            .iter()
            .map(|root| {
                format!(
                    "{} {} (updated {})",
                    root.key,
                    root.name,
                    root.updated_at.format("%Y-%m-%d %H:%M:%S")
                )
            })
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
