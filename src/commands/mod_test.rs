use super::*;
use crate::config::Settings;
use crate::dictionary::DictionaryError;
use crate::storage::{MemoryTier, TierError};
use tempfile::TempDir;

fn context() -> CommandContext {
    CommandContext {
        sync: Arc::new(StorageSync::new(Arc::new(MemoryTier::new("local")))),
        config: AppConfig {
            dir: PathBuf::from("/nonexistent"),
            settings: Settings::default(),
        },
    }
}

#[test]
fn test_parse_add_with_label() {
    let cli = Cli::try_parse_from(["snapkey", "add", "brb", "be right back", "away"]).unwrap();
    assert_eq!(
        cli.command,
        Commands::Add {
            token: "brb".to_string(),
            replacement: "be right back".to_string(),
            label: Some("away".to_string()),
        }
    );
}

#[test]
fn test_parse_export_without_file() {
    let cli = Cli::try_parse_from(["snapkey", "export"]).unwrap();
    assert_eq!(cli.command, Commands::Export { file: None });
}

#[test]
fn test_parse_rejects_missing_arguments() {
    assert!(Cli::try_parse_from(["snapkey", "import"]).is_err());
    assert!(Cli::try_parse_from(["snapkey", "add", "brb"]).is_err());
    assert!(Cli::try_parse_from(["snapkey"]).is_err());
}

#[test]
fn test_to_user_error_validation() {
    let message = to_user_error(StorageError::Validation(DictionaryError::EmptyToken));
    assert_eq!(message, "Invalid shortcut: Shortcut cannot be empty");
}

#[test]
fn test_to_user_error_local() {
    let message = to_user_error(StorageError::Local(TierError::Unavailable("local".to_string())));
    assert!(message.starts_with("Failed to save shortcuts:"));
}

#[tokio::test]
async fn test_execute_add_list_remove() {
    let ctx = context();

    let added = execute(
        Commands::Add {
            token: "brb".to_string(),
            replacement: "be right back".to_string(),
            label: None,
        },
        &ctx,
    )
    .await
    .unwrap();
    assert_eq!(added, "Saved brb → be right back");

    let listed = execute(Commands::List, &ctx).await.unwrap();
    assert_eq!(listed, "brb → be right back");

    execute(Commands::Remove { token: "brb".to_string() }, &ctx)
        .await
        .unwrap();
    let listed = execute(Commands::List, &ctx).await.unwrap();
    assert_eq!(listed, "No shortcuts defined");
}

#[tokio::test]
async fn test_execute_add_invalid_token() {
    let ctx = context();
    let result = execute(
        Commands::Add {
            token: "__x".to_string(),
            replacement: "y".to_string(),
            label: None,
        },
        &ctx,
    )
    .await;
    assert!(result.unwrap_err().starts_with("Invalid shortcut:"));
}

#[tokio::test]
async fn test_execute_expand() {
    let ctx = context();
    ctx.sync.save("ty", "thank you", None).await.unwrap();

    let output = execute(Commands::Expand { text: "ty!".to_string() }, &ctx)
        .await
        .unwrap();
    assert_eq!(output, "thank you!");
}

#[tokio::test]
async fn test_context_from_config_uses_file_tiers() {
    let dir = TempDir::new().unwrap();
    let config = AppConfig {
        dir: dir.path().to_path_buf(),
        settings: Settings {
            remote_store_path: Some(PathBuf::from("remote.json")),
            ..Settings::default()
        },
    };
    let ctx = CommandContext::from_config(config);

    execute(
        Commands::Add {
            token: "brb".to_string(),
            replacement: "be right back".to_string(),
            label: None,
        },
        &ctx,
    )
    .await
    .unwrap();

    let local = std::fs::read_to_string(dir.path().join("local.json")).unwrap();
    let remote = std::fs::read_to_string(dir.path().join("remote.json")).unwrap();
    assert!(local.contains("be right back"));
    assert!(remote.contains("be right back"));
}
