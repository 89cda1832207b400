// CLI modules
mod cli;

use bucket_sync::process;
use bucket_sync::state::AppState;
use clap::{Parser, Subcommand};
use cli::{args::Args, op::Op, Bucket, Init, Version};

command_enum! {
    (Bucket, Bucket),
    (Init, Init),
    (Version, Version),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match AppState::load_config(args.config_path.clone()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config: {}", e);
            std::process::exit(1);
        }
    };
    let guards = process::init_logging(&config);

    // Build context: in-memory remote, or HTTP against flag > config > default
    let ctx = if args.memory {
        cli::op::OpContext::in_memory(config, args.config_path)
    } else {
        let remote = cli::op::resolve_remote(args.remote, &config);
        match cli::op::OpContext::new(remote, config, args.config_path) {
            Ok(ctx) => ctx,
            Err(e) => {
                eprintln!("Error: Failed to create API client: {}", e);
                std::process::exit(1);
            }
        }
    };

    let code = match args.command.execute(&ctx).await {
        Ok(output) => {
            let output = output.to_string();
            if !output.is_empty() {
                println!("{}", output);
            }
            0
        }
        Err(e) => {
            tracing::debug!("command failed: {:?}", e);
            eprintln!("Error: {}", e);
            1
        }
    };

    // flush buffered log lines before exiting
    drop(guards);
    std::process::exit(code);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bucket_commands() {
        let args = Args::try_parse_from([
            "bsync", "--memory", "bucket", "push", "--name", "site", "--create", "./index.html",
        ])
        .unwrap();
        assert!(args.memory);
        assert!(matches!(args.command, Command::Bucket(_)));

        let args = Args::try_parse_from([
            "bsync",
            "bucket",
            "roles",
            "push",
            "--key",
            "abc",
            "path/to",
            "--grant",
            "bob=writer",
            "--grant",
            "eve=reader",
        ])
        .unwrap();
        assert!(!args.memory);
    }

    #[test]
    fn test_reject_conflicting_args() {
        // a bucket can be named or keyed, not both
        assert!(Args::try_parse_from([
            "bsync", "bucket", "ls", "--key", "abc", "--name", "site"
        ])
        .is_err());
        assert!(Args::try_parse_from([
            "bsync", "--memory", "--remote", "http://localhost:3007", "version"
        ])
        .is_err());
    }

    #[tokio::test]
    async fn test_memory_session() {
        let ctx = cli::op::OpContext::in_memory(Default::default(), None);
        let create = Args::try_parse_from(["bsync", "bucket", "create", "site"]).unwrap();
        let output = create.command.execute(&ctx).await.unwrap().to_string();
        assert!(output.starts_with("site ("));

        // contexts share the remote; the listing sees the new bucket
        let list = Args::try_parse_from(["bsync", "bucket", "list", "--owned"]).unwrap();
        let output = list.command.execute(&ctx).await.unwrap().to_string();
        assert!(output.contains(" site (updated "));

        let ls = Args::try_parse_from(["bsync", "bucket", "ls", "--name", "nope"]).unwrap();
        let err = ls.command.execute(&ctx).await.unwrap_err();
        assert!(err.to_string().contains("bucket not found: nope"));

        // --create needs a name to create, a key is not enough
        let push = Args::try_parse_from([
            "bsync", "bucket", "push", "--key", "abc", "--create", "./index.html",
        ])
        .unwrap();
        let err = push.command.execute(&ctx).await.unwrap_err();
        assert!(err.to_string().contains("--create needs --name"));
    }
}
