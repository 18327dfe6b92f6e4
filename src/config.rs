use std::env;
use std::time::Duration;

use crate::s3::ShareError;
use crate::s3::error::Result;
use crate::s3::presign::MAX_URL_EXPIRY;

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_BUCKET: &str = "fbm-files";
pub const DEFAULT_KEY_PREFIX: &str = "files/";
pub const DEFAULT_URL_EXPIRY_SECS: u64 = 60;

/// Configuration for a share run
#[derive(Debug, Clone)]
pub struct Config {
    pub region: String,
    pub profile: Option<String>,
    pub bucket: String,
    pub key_prefix: String,
    pub url_expiry: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            profile: None,
            bucket: DEFAULT_BUCKET.to_string(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            url_expiry: Duration::from_secs(DEFAULT_URL_EXPIRY_SECS),
        }
    }
}

impl Config {
    /// Load configuration from environment variables and .env file
    ///
    /// Unset variables fall back to the defaults above.
    ///
    /// # Errors
    ///
    /// Returns [`ShareError::Config`] if a variable is present but invalid
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file if it exists

        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let region = lookup("AWS_REGION").unwrap_or(defaults.region);
        Self::validate_region(&region)?;

        let profile = lookup("AWS_PROFILE").filter(|p| !p.is_empty());

        let bucket = lookup("S3_BUCKET").unwrap_or(defaults.bucket);
        Self::validate_bucket_name(&bucket)?;

        let key_prefix = lookup("S3_KEY_PREFIX").unwrap_or(defaults.key_prefix);
        Self::validate_key_prefix(&key_prefix)?;

        let url_expiry = match lookup("S3_URL_EXPIRY_SECS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|_| {
                    ShareError::Config(format!(
                        "S3_URL_EXPIRY_SECS '{}' is not a whole number of seconds",
                        raw
                    ))
                })?;
                Self::validate_url_expiry(secs)?
            }
            None => defaults.url_expiry,
        };

        Ok(Self {
            region,
            profile,
            bucket,
            key_prefix,
            url_expiry,
        })
    }

    /// Apply per-run overrides from the command line
    pub fn with_overrides(mut self, prefix: Option<String>, expires_in: Option<u64>) -> Result<Self> {
        if let Some(prefix) = prefix {
            Self::validate_key_prefix(&prefix)?;
            self.key_prefix = prefix;
        }

        if let Some(secs) = expires_in {
            self.url_expiry = Self::validate_url_expiry(secs)?;
        }

        Ok(self)
    }

    /// Validate AWS region format
    fn validate_region(region: &str) -> Result<()> {
        if region.is_empty() {
            return Err(ShareError::Config("AWS_REGION cannot be empty".to_string()));
        }

        // Basic validation - ensure it looks like a region (contains a dash)
        if !region.contains('-') {
            return Err(ShareError::Config(format!(
                "AWS_REGION '{}' doesn't look like a valid region (e.g., us-east-1, eu-west-1)",
                region
            )));
        }

        Ok(())
    }

    /// Validate S3 bucket name according to AWS rules
    fn validate_bucket_name(bucket: &str) -> Result<()> {
        let invalid = |reason: String| -> Result<()> { Err(ShareError::Config(reason)) };

        if bucket.len() < 3 || bucket.len() > 63 {
            return invalid(format!(
                "Bucket name '{}' (S3_BUCKET) has {} characters, S3 allows 3 to 63",
                bucket,
                bucket.len()
            ));
        }

        let is_edge = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();
        if !bucket.starts_with(is_edge) {
            return invalid(format!(
                "Bucket name '{}' (S3_BUCKET) has to begin with a lowercase letter or digit",
                bucket
            ));
        }
        if !bucket.ends_with(is_edge) {
            return invalid(format!(
                "Bucket name '{}' (S3_BUCKET) has to finish with a lowercase letter or digit",
                bucket
            ));
        }

        if let Some(c) = bucket
            .chars()
            .find(|&c| !c.is_ascii_lowercase() && !c.is_ascii_digit() && c != '-' && c != '.')
        {
            return invalid(format!(
                "Bucket name '{}' (S3_BUCKET) has '{}'; use lowercase letters, digits, '-' and '.' only",
                bucket, c
            ));
        }

        if bucket.contains("..") {
            return invalid(format!(
                "Bucket name '{}' (S3_BUCKET) has '..'",
                bucket
            ));
        }

        if bucket.split('.').count() == 4 && bucket.split('.').all(|part| part.parse::<u8>().is_ok()) {
            return invalid(format!(
                "Bucket name '{}' (S3_BUCKET) looks like an IPv4 address",
                bucket
            ));
        }

        Ok(())
    }

    /// Validate the key prefix; empty stores objects at the bucket root
    fn validate_key_prefix(prefix: &str) -> Result<()> {
        if prefix.contains("//") {
            return Err(ShareError::Config(format!(
                "Key prefix '{}' contains consecutive slashes (not allowed)",
                prefix
            )));
        }

        if prefix.contains("..") {
            return Err(ShareError::Config(format!(
                "Key prefix '{}' contains '..' (not allowed for security)",
                prefix
            )));
        }

        if prefix.starts_with('/') {
            return Err(ShareError::Config(format!(
                "Key prefix '{}' should not start with '/' (use relative path)",
                prefix
            )));
        }

        Ok(())
    }

    fn validate_url_expiry(secs: u64) -> Result<Duration> {
        let expiry = Duration::from_secs(secs);
        if secs == 0 || expiry > MAX_URL_EXPIRY {
            return Err(ShareError::Config(format!(
                "URL expiry must be between 1 and {} seconds (got {})",
                MAX_URL_EXPIRY.as_secs(),
                secs
            )));
        }
        Ok(expiry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.bucket, "fbm-files");
        assert_eq!(config.key_prefix, "files/");
        assert_eq!(config.url_expiry, Duration::from_secs(60));
        assert!(config.profile.is_none());
    }

    #[test]
    fn test_env_values_override_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("AWS_REGION", "eu-west-1"),
            ("AWS_PROFILE", "uploader"),
            ("S3_BUCKET", "team-share"),
            ("S3_KEY_PREFIX", "shared/"),
            ("S3_URL_EXPIRY_SECS", "3600"),
        ]))
        .unwrap();

        assert_eq!(config.region, "eu-west-1");
        assert_eq!(config.profile.as_deref(), Some("uploader"));
        assert_eq!(config.bucket, "team-share");
        assert_eq!(config.key_prefix, "shared/");
        assert_eq!(config.url_expiry, Duration::from_secs(3600));
    }

    #[test]
    fn test_invalid_env_values() {
        for vars in [
            [("S3_URL_EXPIRY_SECS", "soon")],
            [("S3_URL_EXPIRY_SECS", "0")],
            [("S3_URL_EXPIRY_SECS", "604801")],
            [("AWS_REGION", "useast1")],
            [("S3_BUCKET", "My_Bucket")],
            [("S3_KEY_PREFIX", "/files/")],
        ] {
            let err = Config::from_lookup(lookup_from(&vars)).unwrap_err();
            assert!(matches!(err, ShareError::Config(_)), "{:?}", vars);
        }
    }

    #[test]
    fn test_overrides() {
        let config = Config::default()
            .with_overrides(Some("reports/".to_string()), Some(300))
            .unwrap();
        assert_eq!(config.key_prefix, "reports/");
        assert_eq!(config.url_expiry, Duration::from_secs(300));

        assert!(Config::default().with_overrides(Some("a//b".to_string()), None).is_err());
        assert!(Config::default().with_overrides(None, Some(0)).is_err());
    }

    #[test]
    fn test_bucket_name_validation() {
        // Valid bucket names
        assert!(Config::validate_bucket_name("fbm-files").is_ok());
        assert!(Config::validate_bucket_name("my.bucket.123").is_ok());
        assert!(Config::validate_bucket_name("abc").is_ok());

        // Invalid bucket names
        assert!(Config::validate_bucket_name("ab").is_err()); // Too short
        assert!(Config::validate_bucket_name(&"a".repeat(64)).is_err()); // Too long
        assert!(Config::validate_bucket_name("MY-BUCKET").is_err()); // Uppercase
        assert!(Config::validate_bucket_name("my_bucket").is_err()); // Underscore
        assert!(Config::validate_bucket_name("-mybucket").is_err()); // Starts with dash
        assert!(Config::validate_bucket_name("mybucket-").is_err()); // Ends with dash
        assert!(Config::validate_bucket_name("my..bucket").is_err()); // Consecutive periods
        assert!(Config::validate_bucket_name("192.168.1.1").is_err()); // IP address format
        assert!(Config::validate_bucket_name("").is_err()); // Empty
    }

    #[test]
    fn test_bucket_errors_name_the_variable() {
        let err = Config::validate_bucket_name("My_Bucket").unwrap_err();
        assert!(err.to_string().contains("(S3_BUCKET)"));
    }

    #[test]
    fn test_key_prefix_validation() {
        assert!(Config::validate_key_prefix("").is_ok());
        assert!(Config::validate_key_prefix("files/").is_ok());
        assert!(Config::validate_key_prefix("uploads/videos/").is_ok());

        assert!(Config::validate_key_prefix("files//").is_err());
        assert!(Config::validate_key_prefix("../files/").is_err());
        assert!(Config::validate_key_prefix("/files/").is_err());
    }
}
