use clap::{Args, Subcommand};
use common::bucket::{AccessRole, AccessRoles};
use common::error::BucketError;

use super::{BucketTarget, TargetError};
use crate::cli::op::Op;

crate::command_enum! {
    (Push, PushRoles),
    (Pull, PullRoles),
}

#[derive(Args, Debug, Clone)]
pub struct Roles {
    #[command(subcommand)]
    pub command: Command,
}

#[async_trait::async_trait]
impl Op for Roles {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}

/// `principal=role`, e.g. `bob=writer`
fn parse_grant(grant: &str) -> Result<(String, AccessRole), String> {
    let (principal, role) = grant
        .split_once('=')
        .ok_or_else(|| format!("expected principal=role, got {:?}", grant))?;
    if principal.is_empty() {
        return Err(format!("missing principal in {:?}", grant));
    }
    let role = role.parse::<AccessRole>().map_err(|e| e.to_string())?;
    Ok((principal.to_string(), role))
}

#[derive(Args, Debug, Clone)]
pub struct PushRoles {
    #[command(flatten)]
    pub bucket: BucketTarget,

    /// Path the roles apply to (defaults to root)
    #[arg(default_value = "")]
    pub path: String,

    /// Grant as principal=role (none, reader, writer, admin). Repeatable;
    ///  none revokes.
    #[arg(long = "grant", value_parser = parse_grant)]
    pub grants: Vec<(String, AccessRole)>,
}

#[derive(Debug, thiserror::Error)]
pub enum PushRolesError {
    #[error(transparent)]
    Target(#[from] TargetError),
    #[error("bucket roles push failed: {0}")]
    Bucket(#[from] BucketError),
}

#[async_trait::async_trait]
impl Op for PushRoles {
    type Error = PushRolesError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let key = self.bucket.resolve(&ctx.buckets).await?;
        let mut roles = AccessRoles::new();
        for (principal, role) in &self.grants {
            roles.insert(principal.clone(), *role);
        }

        ctx.buckets
            .push_path_access_roles(&key, &self.path, &roles)
            .await?;
        Ok(format!(
            "set {} role(s) at /{}",
            roles.len(),
            self.path.trim_start_matches('/')
        ))
    }
}

#[derive(Args, Debug, Clone)]
pub struct PullRoles {
    #[command(flatten)]
    pub bucket: BucketTarget,

    /// Path to read roles at (defaults to root)
    #[arg(default_value = "")]
    pub path: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PullRolesError {
    #[error(transparent)]
    Target(#[from] TargetError),
    #[error("bucket roles pull failed: {0}")]
    Bucket(#[from] BucketError),
}

#[async_trait::async_trait]
impl Op for PullRoles {
    type Error = PullRolesError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let key = self.bucket.resolve(&ctx.buckets).await?;
        let roles = ctx
            .buckets
            .pull_path_access_roles(&key, &self.path)
            .await?;

        if roles.is_empty() {
            return Ok("No roles set".to_string());
        }
        Ok(roles
            .iter()
            .map(|(principal, role)| format!("{} {}", principal, role))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
