use clap::Args;
use common::bucket::CreateOptions;
use common::error::BucketError;

#[derive(Args, Debug, Clone)]
pub struct Create {
    /// Name of the bucket
    pub name: String,

    /// Thread to open the bucket in when none is configured
    #[arg(long)]
    pub thread_name: Option<String>,

    /// Encrypt the bucket's content
    #[arg(long)]
    pub encrypted: bool,

    /// Reuse an existing bucket with the same name instead of creating another
    #[arg(long)]
    pub open: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum BucketCreateError {
    #[error("bucket create failed: {0}")]
    Bucket(#[from] BucketError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Create {
    type Error = BucketCreateError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut buckets = ctx.buckets.clone();
        let opts = CreateOptions {
            thread_name: self.thread_name.clone(),
            encrypted: self.encrypted,
        };

        let reply = if self.open {
            buckets.get_or_create(&self.name, opts).await?
        } else {
            buckets.create(&self.name, opts).await?
        };

        let mut output = format!(
            "{} ({})\n\
             - Thread: {}\n\
             - Root: {}\n\
             - URL: {}\n\
             - IPNS: {}",
            reply.root.name,
            reply.root.key,
            reply.thread_id,
            reply.root.path,
            reply.links.url,
            reply.links.ipns,
        );
        if let Some(www) = &reply.links.www {
            output.push_str(&format!("\n- WWW: {}", www));
        }
        Ok(output)
    }
}
