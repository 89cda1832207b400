use clap::Args;
use common::bucket::BucketItem;
use common::error::BucketError;

use super::{BucketTarget, TargetError};

#[derive(Args, Debug, Clone)]
pub struct Ls {
    #[command(flatten)]
    pub bucket: BucketTarget,

    /// Path in bucket to list (defaults to root)
    #[arg(default_value = "")]
    pub path: String,

    /// Levels below the path to include (defaults to the configured depth)
    #[arg(long)]
    pub depth: Option<u32>,
}

#[derive(Debug, thiserror::Error)]
pub enum BucketLsError {
    #[error(transparent)]
    Target(#[from] TargetError),
    #[error("bucket ls failed: {0}")]
    Bucket(#[from] BucketError),
}

/// Indented tree, one item per line. Directories end with `/`.
pub fn render_tree(item: &BucketItem) -> String {
    let mut lines = Vec::new();
    let name = if item.path.is_empty() { "/" } else { item.name.as_str() };
    lines.push(describe(name, item));
    render_children(item, 1, &mut lines);
    lines.join("\n")
}

fn render_children(item: &BucketItem, indent: usize, lines: &mut Vec<String>) {
    for child in &item.items {
        lines.push(format!(
            "{}{}",
            "  ".repeat(indent),
            describe(&child.name, child)
        ));
        render_children(child, indent + 1, lines);
    }
}

fn describe(name: &str, item: &BucketItem) -> String {
    if item.is_dir {
        let name = name.trim_end_matches('/');
        format!("{}/ ({} items)", name, item.items_count)
    } else {
        format!("{} ({} bytes)", name, item.size)
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Ls {
    type Error = BucketLsError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let key = self.bucket.resolve(&ctx.buckets).await?;
        let depth = self.depth.unwrap_or(ctx.config.list_depth);
        let listing = ctx.buckets.list_path(&key, &self.path, Some(depth)).await?;
        Ok(render_tree(&listing.item))
    }
}
