use super::data::{Config, UserProfile};
use chrono::{TimeZone, Utc};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_load_nonexistent_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nonexistent_config.toml");

    let config = Config::load_from_path(&config_path).expect("Failed to load config");

    assert_eq!(config, Config::default());
    assert!(!config.is_initialized());
}

#[test]
fn test_config_persistence_lifecycle() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nested").join("config.toml");

    let mut config = Config {
        user: Some(UserProfile {
            username: "alice".to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
        }),
        ..Default::default()
    };
    config.mark_configured("OpenAI");
    config.set_global_default("openai", "gpt-4o-2024-11-20".to_string());
    config.set_default_model("deepseek", "deepseek-chat".to_string());
    config
        .save_to_path(&config_path)
        .expect("Failed to save config");

    let loaded = Config::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(loaded, config);
    assert_eq!(loaded.providers, vec!["openai".to_string()]);
    assert_eq!(
        loaded.global_default(),
        Some(("openai", "gpt-4o-2024-11-20"))
    );
    assert_eq!(
        loaded.get_default_model("DeepSeek").map(String::as_str),
        Some("deepseek-chat")
    );

    let mut config = loaded;
    config.reset_defaults();
    config
        .save_to_path(&config_path)
        .expect("Failed to save config");
    let loaded = Config::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(loaded.global_default(), None);
    assert!(loaded.default_models.is_empty());
    assert!(loaded.is_provider_configured("openai"));
}

#[test]
fn test_malformed_config_reports_path() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "default_provider = [").expect("write config");

    let err = Config::load_from_path(&config_path).expect_err("should fail to parse");
    let message = err.to_string();
    assert!(message.starts_with("Failed to parse config at"), "{message}");
    assert!(message.contains("config.toml"));
}

#[test]
fn test_mark_unconfigured_clears_defaults() {
    let mut config = Config::default();
    config.mark_configured("perplexity");
    config.mark_configured("perplexity");
    config.set_global_default("perplexity", "sonar".to_string());
    assert_eq!(config.providers.len(), 1);

    config.mark_unconfigured("Perplexity");
    assert!(config.providers.is_empty());
    assert_eq!(config.default_provider, None);
    assert_eq!(config.default_model, None);
    assert_eq!(config.get_default_model("perplexity"), None);
}

#[test]
fn test_sorted_default_models() {
    let mut config = Config::default();
    config.set_default_model("openai", "gpt-4".to_string());
    config.set_default_model("Anthropic", "claude-3-5-haiku-latest".to_string());

    assert_eq!(
        config.sorted_default_models(),
        vec![
            ("anthropic", "claude-3-5-haiku-latest"),
            ("openai", "gpt-4")
        ]
    );
}
