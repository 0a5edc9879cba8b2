use std::{env, path::PathBuf};

use url::Url;

use crate::error::{GalleryError, GalleryResult};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_BUCKET: &str = "images";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendConfig {
    /// JSON records and blobs under the data directory.
    Local,
    Remote {
        url: Url,
        api_key: String,
        bucket: String,
    },
}

#[derive(Clone, Debug)]
pub struct GalleryConfig {
    pub port: u16,
    pub backend: BackendConfig,
    pub data_dir: PathBuf,
    pub public_url: String,
}

impl GalleryConfig {
    pub fn from_env() -> GalleryResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> GalleryResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match var("GALLERY_PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|err| GalleryError::Config(format!("GALLERY_PORT `{value}`: {err}")))?,
            None => DEFAULT_PORT,
        };
        let bind_address = format!("0.0.0.0:{port}");

        let backend = match var("GALLERY_BACKEND").as_deref().map(str::trim) {
            None | Some("local") => BackendConfig::Local,
            Some("remote") => {
                let raw_url = var("BACKEND_URL")
                    .ok_or_else(|| GalleryError::Config("BACKEND_URL is required for the remote backend".into()))?;
                let url = Url::parse(raw_url.trim())?;
                if !matches!(url.scheme(), "http" | "https") {
                    return Err(GalleryError::Config(format!(
                        "BACKEND_URL must use http or https, got {}",
                        url.scheme()
                    )));
                }
                let api_key = var("BACKEND_API_KEY")
                    .ok_or_else(|| GalleryError::Config("BACKEND_API_KEY is required for the remote backend".into()))?;
                let bucket = var("BACKEND_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.to_string());
                BackendConfig::Remote {
                    url,
                    api_key: api_key.trim().to_string(),
                    bucket: bucket.trim().to_string(),
                }
            }
            Some(other) => {
                return Err(GalleryError::Config(format!(
                    "GALLERY_BACKEND must be `local` or `remote`, got `{other}`"
                )));
            }
        };

        Ok(Self {
            port,
            backend,
            data_dir: resolve_data_dir(var("GALLERY_DATA_DIR")),
            public_url: resolve_public_url(var("GALLERY_PUBLIC_URL"), &bind_address),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    /// Where the local backend keeps uploaded files.
    pub fn files_dir(&self) -> PathBuf {
        self.data_dir.join("files")
    }

    /// Base URL the local blob store hands out; files are served at `/files`.
    pub fn files_url(&self) -> String {
        format!("{}/files", self.public_url)
    }
}

fn resolve_data_dir(configured: Option<String>) -> PathBuf {
    if let Some(dir) = configured {
        return PathBuf::from(dir.trim());
    }
    let mut base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.push("photo-gallery");
    base
}

fn resolve_public_url(configured: Option<String>, bind_address: &str) -> String {
    let raw = configured.unwrap_or_else(|| bind_address.to_string());
    normalize_base_url(&raw)
}

/// Adds a scheme when missing, collapses doubled schemes and drops trailing
/// slashes.
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    let mut base = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };
    loop {
        let collapsed = base
            .replacen("http://http://", "http://", 1)
            .replacen("https://https://", "https://", 1)
            .replacen("http://https://", "https://", 1)
            .replacen("https://http://", "http://", 1);
        if collapsed == base {
            return base;
        }
        base = collapsed;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> GalleryResult<GalleryConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        GalleryConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_local_backend_on_port_3000() {
        let config = config_from(&[("GALLERY_DATA_DIR", "/srv/gallery")]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.backend, BackendConfig::Local);
        assert_eq!(config.data_dir, PathBuf::from("/srv/gallery"));
        assert_eq!(config.public_url, "http://0.0.0.0:3000");
        assert_eq!(config.files_url(), "http://0.0.0.0:3000/files");
    }

    #[test]
    fn remote_backend_requires_url_and_key() {
        let missing_key = config_from(&[
            ("GALLERY_BACKEND", "remote"),
            ("BACKEND_URL", "https://project.example.co"),
        ]);
        assert!(matches!(missing_key, Err(GalleryError::Config(_))));

        let config = config_from(&[
            ("GALLERY_BACKEND", "remote"),
            ("BACKEND_URL", "https://project.example.co"),
            ("BACKEND_API_KEY", "anon"),
        ])
        .unwrap();
        match config.backend {
            BackendConfig::Remote { url, api_key, bucket } => {
                assert_eq!(url.host_str(), Some("project.example.co"));
                assert_eq!(api_key, "anon");
                assert_eq!(bucket, "images");
            }
            other => panic!("unexpected backend {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_port_and_backend() {
        assert!(config_from(&[("GALLERY_PORT", "http")]).is_err());
        assert!(config_from(&[("GALLERY_BACKEND", "firebase")]).is_err());
        assert!(
            config_from(&[
                ("GALLERY_BACKEND", "remote"),
                ("BACKEND_URL", "ftp://project.example.co"),
                ("BACKEND_API_KEY", "anon"),
            ])
            .is_err()
        );
    }

    #[test]
    fn normalizes_public_urls() {
        assert_eq!(normalize_base_url("gallery.test/"), "http://gallery.test");
        assert_eq!(normalize_base_url("http://https://gallery.test"), "https://gallery.test");
        assert_eq!(normalize_base_url("http://http://http://gallery.test"), "http://gallery.test");
        assert_eq!(normalize_base_url(" https://gallery.test// "), "https://gallery.test");
    }
}
