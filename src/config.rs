//! TOML configuration.
//!
//! Every section is optional; a missing section takes its defaults, and
//! [`Config::minimal`] is what the CLI uses when no `--config` is given.
//!
//! ```toml
//! [corpus]
//! path = "data/questions_and_answers.txt"
//! fallback = true
//!
//! [retrieval]
//! top_k = 3
//!
//! [storage]
//! backend = "json_file"          # json_file | per_user | memory
//! path = "data/user_data.json"   # file for json_file, directory for per_user
//!
//! [generator]
//! provider = "extractive"
//! function_calling = true
//! max_answer_chars = 800
//!
//! [[terms]]
//! canonical = "weather"
//! alternates = ["khí hậu"]
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    /// Extra term mappings appended to the built-in table, in file order.
    #[serde(default)]
    pub terms: Vec<TermConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorpusConfig {
    #[serde(default = "default_corpus_path")]
    pub path: PathBuf,
    /// Fall back to the embedded default entry when the file is missing,
    /// unreadable, or empty. When false, such a corpus is treated as absent.
    #[serde(default = "default_true")]
    pub fallback: bool,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            path: default_corpus_path(),
            fallback: true,
        }
    }
}

fn default_corpus_path() -> PathBuf {
    PathBuf::from("data/questions_and_answers.txt")
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

fn default_top_k() -> usize {
    faq_harness_core::assemble::DEFAULT_TOP_K
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: default_storage_path(),
        }
    }
}

fn default_backend() -> String {
    "json_file".to_string()
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("data/user_data.json")
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneratorConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_true")]
    pub function_calling: bool,
    #[serde(default = "default_max_answer_chars")]
    pub max_answer_chars: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            function_calling: true,
            max_answer_chars: default_max_answer_chars(),
        }
    }
}

fn default_provider() -> String {
    "extractive".to_string()
}

fn default_max_answer_chars() -> usize {
    800
}

#[derive(Debug, Deserialize, Clone)]
pub struct TermConfig {
    pub canonical: String,
    #[serde(default)]
    pub alternates: Vec<String>,
}

impl Config {
    /// Defaults for every section, used when no config file is given.
    pub fn minimal() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.retrieval.top_k < 1 {
            anyhow::bail!("retrieval.top_k must be >= 1");
        }

        match self.storage.backend.as_str() {
            "json_file" | "per_user" | "memory" => {}
            other => anyhow::bail!(
                "Unknown storage backend: '{}'. Must be json_file, per_user, or memory.",
                other
            ),
        }

        match self.generator.provider.as_str() {
            "extractive" => {}
            other => anyhow::bail!("Unknown generator provider: '{}'. Must be extractive.", other),
        }

        if self.generator.max_answer_chars == 0 {
            anyhow::bail!("generator.max_answer_chars must be > 0");
        }

        for term in &self.terms {
            if term.canonical.trim().is_empty() {
                anyhow::bail!("terms.canonical must not be empty");
            }
        }

        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        cfg.validate().unwrap();
        assert_eq!(cfg.retrieval.top_k, 3);
        assert_eq!(cfg.storage.backend, "json_file");
        assert!(cfg.corpus.fallback);
        assert!(cfg.generator.function_calling);
        assert!(cfg.terms.is_empty());
    }

    #[test]
    fn test_full_config() {
        let cfg: Config = toml::from_str(
            r#"
[corpus]
path = "faq.txt"
fallback = false

[retrieval]
top_k = 5

[storage]
backend = "per_user"
path = "users"

[generator]
function_calling = false

[[terms]]
canonical = "weather"
alternates = ["khí hậu"]

[[terms]]
canonical = "deploy"
alternates = ["triển khai"]
"#,
        )
        .unwrap();
        cfg.validate().unwrap();
        assert_eq!(cfg.corpus.path, PathBuf::from("faq.txt"));
        assert!(!cfg.corpus.fallback);
        assert_eq!(cfg.retrieval.top_k, 5);
        assert_eq!(cfg.storage.backend, "per_user");
        assert!(!cfg.generator.function_calling);
        assert_eq!(cfg.generator.max_answer_chars, 800);
        assert_eq!(cfg.terms[1].canonical, "deploy");
    }

    #[test]
    fn test_rejects_zero_top_k() {
        let cfg: Config = toml::from_str("[retrieval]\ntop_k = 0\n").unwrap();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_unknown_backend() {
        let cfg: Config = toml::from_str("[storage]\nbackend = \"redis\"\n").unwrap();
        let err = cfg.validate().unwrap_err().to_string();
        assert!(err.contains("redis"));
    }

    #[test]
    fn test_example_config_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/faq.example.toml");
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.terms.len(), 2);
        assert_eq!(cfg.storage.backend, "json_file");
    }

    #[test]
    fn test_rejects_unknown_provider() {
        let cfg: Config = toml::from_str("[generator]\nprovider = \"openai\"\n").unwrap();
        assert!(cfg.validate().is_err());
    }
}
