#[cfg(test)]
mod tests {
    use crate::config::{self, AppConfig, StorageKind};
    use std::env;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Tests below mutate process-wide environment variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn write_temp_config(content: &str) -> NamedTempFile {
        let temp_file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        fs::write(temp_file.path(), content).unwrap();
        temp_file
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.storage.kind, StorageKind::File);
        assert_eq!(config.storage.file_path, "file.json");
        assert_eq!(config.storage.database_url, "sqlite://data/hbnb.db");
        assert_eq!(config.cors.allowed_origins, vec!["*".to_string()]);
        assert!(config.security.is_none());
        assert!(config::validate(&config).is_ok());
    }

    #[test]
    fn test_valid_config_does_not_error() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        assert!(config::load().is_ok());
    }

    #[test]
    fn test_invalid_server_port() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        env::set_var("HBNB__SERVER__PORT", "0");
        let result = config::load();
        env::remove_var("HBNB__SERVER__PORT");
        assert!(result.unwrap_err().to_string().contains("invalid server.port"));
    }

    #[test]
    fn test_config_from_env() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        env::set_var("HBNB__SERVER__HOST", "127.0.0.1");
        env::set_var("HBNB__STORAGE__KIND", "db");
        env::set_var("HBNB__STORAGE__DATABASE_URL", "sqlite://test.db");

        let config = config::load();

        env::remove_var("HBNB__SERVER__HOST");
        env::remove_var("HBNB__STORAGE__KIND");
        env::remove_var("HBNB__STORAGE__DATABASE_URL");

        let config = config.unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.storage.kind, StorageKind::Db);
        assert_eq!(config.storage.database_url, "sqlite://test.db");
    }

    #[test]
    fn test_legacy_variables_override() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        env::set_var("HBNB__SERVER__PORT", "7000");
        env::set_var("HBNB_API_PORT", "5001");
        env::set_var("HBNB_API_HOST", "localhost");
        env::set_var("HBNB_TYPE_STORAGE", "db");

        let config = config::load();

        env::remove_var("HBNB__SERVER__PORT");
        env::remove_var("HBNB_API_PORT");
        env::remove_var("HBNB_API_HOST");
        env::remove_var("HBNB_TYPE_STORAGE");

        let config = config.unwrap();
        assert_eq!(config.server.port, 5001);
        assert_eq!(config.server.host, "localhost");
        assert_eq!(config.storage.kind, StorageKind::Db);
    }

    #[test]
    fn test_config_from_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let temp_file = write_temp_config(
            r#"
[server]
port = 9000

[storage]
kind = "file"
file_path = "/tmp/hbnb-objects.json"

[rate_limit]
max_requests = 10
window_seconds = 1

[security]
enable_hsts = true
"#,
        );
        env::set_var("HBNB_CONFIG", temp_file.path());

        let config = config::load();
        env::remove_var("HBNB_CONFIG");

        let config = config.unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.storage.file_path, "/tmp/hbnb-objects.json");
        assert_eq!(config.rate_limit.max_requests, 10);
        assert_eq!(config.security.and_then(|s| s.enable_hsts), Some(true));
    }

    #[test]
    fn test_validate_rejects_empty_storage_location() {
        let mut config = AppConfig::default();
        config.storage.file_path = "  ".into();
        assert!(config::validate(&config).is_err());

        // Only the selected engine's location matters
        config.storage.kind = StorageKind::Db;
        assert!(config::validate(&config).is_ok());
        config.storage.database_url = String::new();
        assert!(config::validate(&config).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let mut config = AppConfig::default();
        config.rate_limit.max_requests = 0;
        assert!(config::validate(&config).is_err());

        let mut config = AppConfig::default();
        config.server.max_body_bytes = 0;
        assert!(config::validate(&config).is_err());
    }

    #[test]
    fn test_ensure_sqlite_parent_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("subdir/test.db");
        let db_url = format!("sqlite://{}", db_path.display());

        assert!(!db_path.parent().unwrap().exists());
        config::ensure_sqlite_parent_dir(&db_url).unwrap();
        assert!(db_path.parent().unwrap().exists());

        assert!(config::ensure_sqlite_parent_dir("sqlite://:memory:").is_ok());
    }

    #[test]
    fn test_ensure_file_parent_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("nested/dir/file.json");
        config::ensure_file_parent_dir(file_path.to_str().unwrap()).unwrap();
        assert!(file_path.parent().unwrap().exists());
    }
}
