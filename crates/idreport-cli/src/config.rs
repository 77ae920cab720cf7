//! # Configuration
//!
//! Optional YAML file given with `--config`:
//!
//! ```yaml
//! schema_dir: ./schemas
//! certificate: ./keys/signer.cert.pem
//! private_key: ./keys/signer.key.pem
//! log_filter: idreport_schema=debug,info
//! ```
//!
//! Relative paths are resolved against the directory holding the file.
//! Command-line flags take precedence over file values.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use idreport_crypto::{Certificate, KeyMaterial, PrivateKey};
use idreport_report::catalog::{builtin_source, registry_with_source};
use idreport_report::ReportResolver;
use idreport_schema::{ChainSource, DirectorySource};

/// Location prefix under which the built-in schemas live.
const SCHEMA_MOUNT: &str = "/schemas/";

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory whose schemas take precedence over the embedded ones.
    pub schema_dir: Option<PathBuf>,
    /// PEM certificate used to sign and verify.
    pub certificate: Option<PathBuf>,
    /// PEM PKCS#8 private key used to sign.
    pub private_key: Option<PathBuf>,
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub log_filter: Option<String>,
}

impl Config {
    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config: Self = serde_yaml::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        Ok(config)
    }

    /// Load the file if one was given, the defaults otherwise.
    pub fn load_optional(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        for path in [
            &mut self.schema_dir,
            &mut self.certificate,
            &mut self.private_key,
        ]
        .into_iter()
        .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    /// A resolver over the configured schema directory, falling back to
    /// the embedded schemas.
    pub fn resolver(&self) -> ReportResolver {
        let registry = match &self.schema_dir {
            Some(dir) => {
                tracing::debug!(schema_dir = %dir.display(), "layering schema directory over built-ins");
                registry_with_source(
                    ChainSource::new()
                        .then(DirectorySource::new(dir).mount_at(SCHEMA_MOUNT))
                        .then(builtin_source()),
                )
            }
            None => registry_with_source(builtin_source()),
        };
        ReportResolver::new(Arc::new(registry))
    }

    /// The certificate path: the flag, else the configured one.
    pub fn certificate_path(&self, flag: Option<&Path>) -> Result<PathBuf> {
        match flag.or(self.certificate.as_deref()) {
            Some(path) => Ok(path.to_path_buf()),
            None => bail!("no certificate given; pass --cert or set `certificate` in the config"),
        }
    }

    /// The private key path: the flag, else the configured one.
    pub fn private_key_path(&self, flag: Option<&Path>) -> Result<PathBuf> {
        match flag.or(self.private_key.as_deref()) {
            Some(path) => Ok(path.to_path_buf()),
            None => bail!("no private key given; pass --key or set `private_key` in the config"),
        }
    }

    /// Certificate only, for verification and inspection.
    pub fn verification_key(&self, cert: Option<&Path>) -> Result<KeyMaterial> {
        Ok(KeyMaterial::verify_only(load_certificate(
            &self.certificate_path(cert)?,
        )?))
    }

    /// Certificate and private key, for signing.
    pub fn signing_key(&self, cert: Option<&Path>, key: Option<&Path>) -> Result<KeyMaterial> {
        let certificate = load_certificate(&self.certificate_path(cert)?)?;
        let key_path = self.private_key_path(key)?;
        let pem = std::fs::read_to_string(&key_path)
            .with_context(|| format!("failed to read private key {}", key_path.display()))?;
        let private_key = PrivateKey::from_pem(&pem)
            .with_context(|| format!("failed to load private key {}", key_path.display()))?;
        Ok(KeyMaterial::new(certificate, Some(private_key)))
    }
}

fn load_certificate(path: &Path) -> Result<Certificate> {
    let pem = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read certificate {}", path.display()))?;
    Certificate::from_pem(&pem)
        .with_context(|| format!("failed to load certificate {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("idreport.yaml");
        std::fs::write(
            &path,
            "schema_dir: schemas\ncertificate: /etc/idreport/signer.cert.pem\nlog_filter: debug\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.schema_dir, Some(dir.path().join("schemas")));
        assert_eq!(
            config.certificate,
            Some(PathBuf::from("/etc/idreport/signer.cert.pem"))
        );
        assert_eq!(config.private_key, None);
        assert_eq!(config.log_filter.as_deref(), Some("debug"));
    }

    #[test]
    fn load_rejects_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("idreport.yaml");
        std::fs::write(&path, "certficate: typo.pem\n").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn load_optional_without_file_is_default() {
        assert_eq!(Config::load_optional(None).unwrap(), Config::default());
    }

    #[test]
    fn flag_overrides_configured_certificate() {
        let config = Config {
            certificate: Some(PathBuf::from("from-config.pem")),
            ..Default::default()
        };
        assert_eq!(
            config.certificate_path(Some(Path::new("from-flag.pem"))).unwrap(),
            PathBuf::from("from-flag.pem")
        );
        assert_eq!(
            config.certificate_path(None).unwrap(),
            PathBuf::from("from-config.pem")
        );
        assert!(Config::default().certificate_path(None).is_err());
        assert!(Config::default().private_key_path(None).is_err());
    }

    #[test]
    fn schema_dir_overrides_builtin_schema() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("person-ref-minimal-fink.json"),
            r#"{"$id": "urn:test:fink", "type": "object", "required": ["nickname"]}"#,
        )
        .unwrap();
        let config = Config {
            schema_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };

        let resolver = config.resolver();
        let shape = idreport_report::SubjectShape::FinkMinimal;
        assert_eq!(
            resolver.schema_id(&shape).unwrap().as_deref(),
            Some("urn:test:fink")
        );
        // Schemas missing from the directory still come from the built-ins.
        assert!(resolver
            .schema_id(&idreport_report::SubjectShape::EidCard)
            .unwrap()
            .is_some());
    }
}
