use std::path::Path;

use figment::providers::{Data, Format, Json, Toml, Yaml};
use figment::value::{Dict, Map};
use figment::{Error, Metadata, Profile, Provider};

/// Pick a figment provider from the file extension. Unknown extensions are
/// sniffed from the content and fall back to TOML.
pub fn auto<P: AsRef<Path>>(path: P) -> impl Provider {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "toml" => FileProvider::Toml(Toml::file(path)),
        "json" => FileProvider::Json(Json::file(path)),
        "yaml" | "yml" => FileProvider::Yaml(Yaml::file(path)),
        _ => {
            let detected = std::fs::read_to_string(path)
                .ok()
                .and_then(|content| detect_format_from_content(&content));
            tracing::debug!(
                "Config {} has no known extension, detected {:?}",
                path.display(),
                detected
            );
            match detected {
                Some("json") => FileProvider::Json(Json::file(path)),
                Some("yaml") => FileProvider::Yaml(Yaml::file(path)),
                _ => FileProvider::Toml(Toml::file(path)),
            }
        }
    }
}

enum FileProvider {
    Toml(Data<Toml>),
    Json(Data<Json>),
    Yaml(Data<Yaml>),
}

impl Provider for FileProvider {
    fn metadata(&self) -> Metadata {
        match self {
            FileProvider::Toml(p) => p.metadata(),
            FileProvider::Json(p) => p.metadata(),
            FileProvider::Yaml(p) => p.metadata(),
        }
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        match self {
            FileProvider::Toml(p) => p.data(),
            FileProvider::Json(p) => p.data(),
            FileProvider::Yaml(p) => p.data(),
        }
    }
}

fn detect_format_from_content(content: &str) -> Option<&'static str> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('{') {
        Some("json")
    } else if trimmed.starts_with('[') || trimmed.lines().any(|l| l.contains(" = ")) {
        Some("toml")
    } else if trimmed.lines().any(|l| l.trim_end().ends_with(':') || l.contains(": ")) {
        Some("yaml")
    } else {
        None
    }
}
