//! # Pilothouse Certificates (`common::ssl`)
//!
//! File: cli/src/common/ssl.rs
//!
//! Generates a self-signed certificate pair for a site domain with `openssl`,
//! written to `<site>/ssl/<domain>.crt` and `<site>/ssl/<domain>.key`, the
//! paths the rendered server block points nginx at.
//!
use crate::common::fs::io;
use crate::common::process::{self, CommandSpec};
use crate::core::config::SslConfig;
use crate::core::error::Result;
use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::info;

/// Host paths of a certificate pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificatePaths {
    pub certificate: PathBuf,
    pub key: PathBuf,
}

impl CertificatePaths {
    pub fn for_domain(ssl_dir: &Path, domain: &str) -> Self {
        Self {
            certificate: ssl_dir.join(format!("{}.crt", domain)),
            key: ssl_dir.join(format!("{}.key", domain)),
        }
    }
}

/// `openssl req` invocation producing a self-signed pair with a SAN for `domain`.
pub fn openssl_command(ssl: &SslConfig, paths: &CertificatePaths, domain: &str) -> CommandSpec {
    CommandSpec::new(ssl.openssl.clone()).args([
        "req".to_string(),
        "-x509".to_string(),
        "-nodes".to_string(),
        "-newkey".to_string(),
        "rsa:2048".to_string(),
        "-sha256".to_string(),
        "-days".to_string(),
        ssl.days.to_string(),
        "-keyout".to_string(),
        paths.key.display().to_string(),
        "-out".to_string(),
        paths.certificate.display().to_string(),
        "-subj".to_string(),
        format!("/CN={}", domain),
        "-addext".to_string(),
        format!("subjectAltName=DNS:{},DNS:*.{}", domain, domain),
    ])
}

/// Generates (or regenerates) the certificate pair for `domain` in `ssl_dir`.
pub async fn generate_certificate(
    ssl: &SslConfig,
    ssl_dir: &Path,
    domain: &str,
) -> Result<CertificatePaths> {
    io::ensure_dir_exists(ssl_dir)?;
    let paths = CertificatePaths::for_domain(ssl_dir, domain);
    process::run_checked(&openssl_command(ssl, &paths, domain))
        .await
        .with_context(|| format!("Failed to generate a certificate for {}", domain))?;
    info!(
        "Generated certificate {} (valid {} days)",
        paths.certificate.display(),
        ssl.days
    );
    Ok(paths)
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_certificate_paths() {
        let paths = CertificatePaths::for_domain(Path::new("/srv/sites/blog/ssl"), "blog.test");
        assert_eq!(
            paths.certificate,
            PathBuf::from("/srv/sites/blog/ssl/blog.test.crt")
        );
        assert_eq!(paths.key, PathBuf::from("/srv/sites/blog/ssl/blog.test.key"));
    }

    #[test]
    fn test_openssl_command() {
        let ssl = SslConfig {
            openssl: "/usr/bin/openssl".into(),
            days: 30,
        };
        let paths = CertificatePaths::for_domain(Path::new("/ssl"), "blog.test");
        let spec = openssl_command(&ssl, &paths, "blog.test");
        assert_eq!(spec.program, "/usr/bin/openssl");
        let joined = spec.args.join(" ");
        assert!(joined.starts_with("req -x509 -nodes"));
        assert!(joined.contains("-days 30"));
        assert!(joined.contains("-keyout /ssl/blog.test.key"));
        assert!(joined.contains("-out /ssl/blog.test.crt"));
        assert!(joined.contains("-subj /CN=blog.test"));
        assert!(joined.contains("subjectAltName=DNS:blog.test,DNS:*.blog.test"));
    }

    #[tokio::test]
    #[ignore] // Requires the openssl binary.
    async fn test_generate_certificate() {
        let dir = tempfile::tempdir().unwrap();
        let paths = generate_certificate(&SslConfig::default(), &dir.path().join("ssl"), "blog.test")
            .await
            .unwrap();
        assert!(paths.certificate.is_file());
        assert!(paths.key.is_file());
    }
}
