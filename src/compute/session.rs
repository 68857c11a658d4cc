//! Compute session configuration
//!
//! Builds the Spark properties a job needs to reach object storage, with the
//! storage credentials resolved through config lookup. No engine is started
//! here; the result is handed to `spark-submit` or a session builder.

use crate::error::StorageError;
use crate::storage::StorageCredentials;

/// Master URL for an in-process local session
pub const LOCAL_MASTER: &str = "local[*]";

const S3A_ACCESS_KEY: &str = "spark.hadoop.fs.s3a.access.key";
const S3A_SECRET_KEY: &str = "spark.hadoop.fs.s3a.secret.key";
const S3A_ENDPOINT: &str = "spark.hadoop.fs.s3a.endpoint";
const S3A_PATH_STYLE: &str = "spark.hadoop.fs.s3a.path.style.access";
const S3A_IMPL: &str = "spark.hadoop.fs.s3a.impl";
const SQL_EXTENSIONS: &str = "spark.sql.extensions";
const SPARK_CATALOG: &str = "spark.sql.catalog.spark_catalog";

const REDACTED: &str = "***";

/// Resolved configuration of a compute session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    app_name: String,
    master: Option<String>,
    properties: Vec<(String, String)>,
}

/// Builder for [`SessionConfig`]
#[derive(Debug, Clone)]
pub struct SessionConfigBuilder {
    app_name: String,
    local: bool,
    credentials: Option<StorageCredentials>,
    extra: Vec<(String, String)>,
}

impl SessionConfig {
    pub fn builder(app_name: impl Into<String>) -> SessionConfigBuilder {
        SessionConfigBuilder {
            app_name: app_name.into(),
            local: false,
            credentials: None,
            extra: Vec::new(),
        }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// `Some("local[*]")` for local sessions, `None` when the cluster decides
    pub fn master(&self) -> Option<&str> {
        self.master.as_deref()
    }

    /// Session properties in the order they are applied
    pub fn properties(&self) -> &[(String, String)] {
        &self.properties
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Command-line arguments for `spark-submit`
    pub fn submit_args(&self) -> Vec<String> {
        let mut args = vec!["--name".to_string(), self.app_name.clone()];
        if let Some(master) = &self.master {
            args.push("--master".to_string());
            args.push(master.clone());
        }
        for (key, value) in &self.properties {
            args.push("--conf".to_string());
            args.push(format!("{}={}", key, value));
        }
        args
    }

    /// Properties safe to print, with secret values masked
    pub fn redacted(&self) -> Vec<(String, String)> {
        self.properties
            .iter()
            .map(|(key, value)| {
                if is_secret_key(key) {
                    (key.clone(), REDACTED.to_string())
                } else {
                    (key.clone(), value.clone())
                }
            })
            .collect()
    }
}

impl SessionConfigBuilder {
    /// Run with a local master instead of the cluster's
    pub fn local(mut self, local: bool) -> Self {
        self.local = local;
        self
    }

    pub fn credentials(mut self, credentials: StorageCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Extra property; replaces a default with the same key
    pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((key.into(), value.into()));
        self
    }

    /// Build the session config, resolving storage credentials if none were given
    pub fn build(self) -> Result<SessionConfig, StorageError> {
        let credentials = match self.credentials {
            Some(credentials) => credentials,
            None => StorageCredentials::from_env()?,
        };

        let mut properties: Vec<(String, String)> = vec![
            (S3A_ACCESS_KEY.to_string(), credentials.access_key),
            (S3A_SECRET_KEY.to_string(), credentials.secret_key),
            (S3A_ENDPOINT.to_string(), credentials.endpoint_url),
            (S3A_PATH_STYLE.to_string(), "true".to_string()),
            (
                S3A_IMPL.to_string(),
                "org.apache.hadoop.fs.s3a.S3AFileSystem".to_string(),
            ),
            (
                SQL_EXTENSIONS.to_string(),
                "io.delta.sql.DeltaSparkSessionExtension".to_string(),
            ),
            (
                SPARK_CATALOG.to_string(),
                "org.apache.spark.sql.delta.catalog.DeltaCatalog".to_string(),
            ),
        ];

        for (key, value) in self.extra {
            match properties.iter_mut().find(|(k, _)| *k == key) {
                Some(existing) => existing.1 = value,
                None => properties.push((key, value)),
            }
        }

        tracing::debug!(
            app_name = %self.app_name,
            local = self.local,
            properties = properties.len(),
            "Built compute session config"
        );

        Ok(SessionConfig {
            app_name: self.app_name,
            master: self.local.then(|| LOCAL_MASTER.to_string()),
            properties,
        })
    }
}

fn is_secret_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key.contains("secret") || key.contains("password") || key.contains("token")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_credentials() -> StorageCredentials {
        StorageCredentials {
            access_key: "AKIA_TEST".to_string(),
            secret_key: "SECRET_TEST".to_string(),
            endpoint_url: "http://minio:9000".to_string(),
            region: "us-east-1".to_string(),
        }
    }

    #[test]
    fn test_local_session() {
        let config = SessionConfig::builder("test_app")
            .local(true)
            .credentials(mock_credentials())
            .build()
            .unwrap();

        assert_eq!(config.app_name(), "test_app");
        assert_eq!(config.master(), Some("local[*]"));
        assert_eq!(config.get(S3A_ACCESS_KEY), Some("AKIA_TEST"));
        assert_eq!(config.get(S3A_SECRET_KEY), Some("SECRET_TEST"));
        assert_eq!(config.get(S3A_ENDPOINT), Some("http://minio:9000"));
    }

    #[test]
    fn test_cluster_session_has_no_master() {
        let config = SessionConfig::builder("test_app")
            .credentials(mock_credentials())
            .build()
            .unwrap();

        assert_eq!(config.master(), None);
        assert_eq!(config.get(S3A_ACCESS_KEY), Some("AKIA_TEST"));
    }

    #[test]
    fn test_extra_property_overrides_default() {
        let config = SessionConfig::builder("test_app")
            .credentials(mock_credentials())
            .property(S3A_PATH_STYLE, "false")
            .property("spark.executor.memory", "2g")
            .build()
            .unwrap();

        assert_eq!(config.get(S3A_PATH_STYLE), Some("false"));
        assert_eq!(config.get("spark.executor.memory"), Some("2g"));
        assert_eq!(
            config.properties().iter().filter(|(k, _)| k == S3A_PATH_STYLE).count(),
            1
        );
    }

    #[test]
    fn test_submit_args() {
        let config = SessionConfig::builder("test_app")
            .local(true)
            .credentials(mock_credentials())
            .build()
            .unwrap();

        let args = config.submit_args();
        assert_eq!(&args[..4], ["--name", "test_app", "--master", "local[*]"]);
        assert!(args.contains(&format!("{}=AKIA_TEST", S3A_ACCESS_KEY)));
    }

    #[test]
    fn test_redacted_hides_secret() {
        let config = SessionConfig::builder("test_app")
            .credentials(mock_credentials())
            .build()
            .unwrap();

        let redacted = config.redacted();
        assert!(redacted.iter().all(|(_, v)| v != "SECRET_TEST"));
        assert!(redacted.contains(&(S3A_ACCESS_KEY.to_string(), "AKIA_TEST".to_string())));
    }
}
