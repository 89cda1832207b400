use clap::{Args, Subcommand};
use common::client::Buckets;
use common::error::BucketError;

pub mod create;
pub mod destroy;
pub mod flat;
pub mod links;
pub mod list;
pub mod ls;
pub mod pull;
pub mod push;
pub mod rm;
pub mod roles;

use crate::cli::op::Op;

crate::command_enum! {
    (Create, create::Create),
    (List, list::List),
    (Ls, ls::Ls),
    (Flat, flat::Flat),
    (Push, push::Push),
    (Pull, pull::Pull),
    (Rm, rm::Rm),
    (Destroy, destroy::Destroy),
    (Links, links::BucketLinks),
    (Roles, roles::Roles),
}

// Rename the generated Command to BucketCommand for clarity
pub type BucketCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Bucket {
    #[command(subcommand)]
    pub command: BucketCommand,
}

#[async_trait::async_trait]
impl Op for Bucket {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}

/// Which bucket a command targets
#[derive(Args, Debug, Clone)]
pub struct BucketTarget {
    /// Bucket key (or use --name)
    #[arg(long, group = "bucket_identifier")]
    pub key: Option<String>,

    /// Bucket name within the current thread (or use --key)
    #[arg(long, group = "bucket_identifier")]
    pub name: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    #[error("Either --key or --name must be provided")]
    NoBucketIdentifier,
    #[error(transparent)]
    Bucket(#[from] BucketError),
}

impl BucketTarget {
    /// Resolve to a bucket key. Names are matched exactly against the
    ///  buckets listed in the client's thread.
    pub async fn resolve(&self, buckets: &Buckets) -> Result<String, TargetError> {
        if let Some(key) = &self.key {
            return Ok(key.clone());
        }
        let Some(name) = &self.name else {
            return Err(TargetError::NoBucketIdentifier);
        };

        buckets
            .list()
            .await?
            .into_iter()
            .find(|root| &root.name == name)
            .map(|root| root.key)
            .ok_or_else(|| BucketError::BucketNotFound(name.clone()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::bucket::CreateOptions;
    use common::remote::MemoryRemote;

    #[tokio::test]
    async fn test_resolve_target() {
        let mut buckets = Buckets::new(MemoryRemote::new("alice"));
        let reply = buckets
            .get_or_create("photos", CreateOptions::default())
            .await
            .unwrap();

        let by_key = BucketTarget {
            key: Some(reply.root.key.clone()),
            name: None,
        };
        assert_eq!(by_key.resolve(&buckets).await.unwrap(), reply.root.key);

        let by_name = BucketTarget {
            key: None,
            name: Some("photos".to_string()),
        };
        assert_eq!(by_name.resolve(&buckets).await.unwrap(), reply.root.key);

        let missing = BucketTarget {
            key: None,
            name: Some("videos".to_string()),
        };
        assert!(matches!(
            missing.resolve(&buckets).await,
            Err(TargetError::Bucket(BucketError::BucketNotFound(_)))
        ));

        let neither = BucketTarget {
            key: None,
            name: None,
        };
        assert!(matches!(
            neither.resolve(&buckets).await,
            Err(TargetError::NoBucketIdentifier)
        ));
    }
}
