use std::error::Error;
use std::path::PathBuf;

use common::client::Buckets;
use common::remote::MemoryRemote;
use url::Url;

use bucket_sync::http::{ApiError, HttpRemote};
use bucket_sync::state::AppConfig;

/// Resolve the remote URL for the bucket service.
///
/// Priority: explicit `--remote` flag > config file `remote` > built-in default.
pub fn resolve_remote(explicit: Option<Url>, config: &AppConfig) -> Url {
    explicit.unwrap_or_else(|| config.remote.clone())
}

#[derive(Debug, Clone)]
pub struct OpContext {
    /// Bucket client, scoped to the configured thread if there is one
    pub buckets: Buckets,
    /// Service URL, `None` when running in memory
    pub remote: Option<Url>,
    /// Loaded configuration (defaults when no config file exists)
    pub config: AppConfig,
    /// Optional custom config path (defaults to ~/.bsync)
    pub config_path: Option<PathBuf>,
}

impl OpContext {
    /// Create a context talking to the service at `remote`
    pub fn new(
        remote: Url,
        config: AppConfig,
        config_path: Option<PathBuf>,
    ) -> Result<Self, ApiError> {
        let buckets = Buckets::new(HttpRemote::new(&remote)?);
        Ok(Self::with_buckets(buckets, Some(remote), config, config_path))
    }

    /// Create a context backed by an empty in-memory remote
    pub fn in_memory(config: AppConfig, config_path: Option<PathBuf>) -> Self {
        let buckets = Buckets::new(MemoryRemote::new(config.identity.clone()));
        Self::with_buckets(buckets, None, config, config_path)
    }

    fn with_buckets(
        buckets: Buckets,
        remote: Option<Url>,
        config: AppConfig,
        config_path: Option<PathBuf>,
    ) -> Self {
        let mut buckets = buckets.with_chunk_size(config.chunk_size);
        if let Some(thread) = config.thread {
            buckets = buckets.with_thread(thread);
        }
        Self {
            buckets,
            remote,
            config,
            config_path,
        }
    }
}

#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: Error + Send + Sync + 'static;
    type Output;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $type:ty)),* $(,)?) => {
        #[derive(Subcommand, Debug, Clone)]
        pub enum Command {
            $($variant($type),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$type as $crate::cli::op::Op>::Output),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$type as $crate::cli::op::Op>::Error),
            )*
        }

        #[async_trait::async_trait]
        impl $crate::cli::op::Op for Command {
            type Output = OpOutput;
            type Error = OpError;

            async fn execute(&self, ctx: &$crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Command::$variant(op) => {
                            op.execute(ctx).await
                                .map(OpOutput::$variant)
                                .map_err(OpError::$variant)
                        },
                    )*
                }
            }
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        OpOutput::$variant(output) => write!(f, "{}", output),
                    )*
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::bucket::ThreadId;

    #[test]
    fn test_resolve_remote_explicit_wins() {
        let explicit = Url::parse("http://example.com:9999").unwrap();
        let result = resolve_remote(Some(explicit.clone()), &AppConfig::default());
        assert_eq!(result, explicit);
    }

    #[test]
    fn test_resolve_remote_uses_config() {
        let config = AppConfig {
            remote: Url::parse("https://hub.example.com").unwrap(),
            ..Default::default()
        };
        assert_eq!(
            resolve_remote(None, &config).as_str(),
            "https://hub.example.com/"
        );
    }

    #[test]
    fn test_resolve_remote_default() {
        let result = resolve_remote(None, &AppConfig::default());
        assert_eq!(result.port().unwrap(), 3007);
    }

    #[test]
    fn test_context_carries_config_scope() {
        let thread = ThreadId::generate();
        let config = AppConfig {
            thread: Some(thread),
            ..Default::default()
        };
        let ctx = OpContext::in_memory(config, None);
        assert_eq!(ctx.buckets.thread(), Some(thread));
        assert!(ctx.remote.is_none());

        let ctx = OpContext::new(
            Url::parse("http://localhost:3007").unwrap(),
            AppConfig::default(),
            None,
        )
        .unwrap();
        assert!(ctx.buckets.thread().is_none());
    }
}
