//! Builds synthetic configuration documents for the `configure` command.

use crate::core::config::{Config, Field, DEFAULT_MAX_POLICY_SIZE, POOL_FIELDS, USER_ID_SENTINEL};
use crate::core::error::{Error, Result};
use crate::core::ids::new_ids;
use rand::Rng;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// How many values to generate for one field, and their prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRequest {
    pub num: usize,
    pub prefix: String,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigureOptions {
    /// Fields missing here get zero values.
    pub fields: HashMap<Field, FieldRequest>,
    pub max_policy_size: Option<usize>,
    pub output: Option<PathBuf>,
}

/// Returns `num` values named `<prefix>0 .. <prefix>{num-1}`.
pub fn generate_values(num: usize, prefix: &str) -> Vec<String> {
    (0..num).map(|index| format!("{prefix}{index}")).collect()
}

/// Like [`generate_values`], except the reserved `UserId` prefix mints unique ids.
pub fn generate_user_ids(rng: &mut impl Rng, num: usize, prefix: &str) -> Vec<String> {
    if prefix == USER_ID_SENTINEL {
        new_ids(rng, num)
    } else {
        generate_values(num, prefix)
    }
}

/// Builds the document described by `options`.
pub fn build_document(options: &ConfigureOptions, rng: &mut impl Rng) -> Result<Config> {
    let max_policy_size = options.max_policy_size.unwrap_or(DEFAULT_MAX_POLICY_SIZE);
    if max_policy_size == 0 {
        return Err(Error::Usage("maxPolicySize must be at least 1".to_string()));
    }
    let mut config = Config {
        process: Vec::new(),
        purpose: Vec::new(),
        processing: Vec::new(),
        recipient: Vec::new(),
        storage: Vec::new(),
        user_id: Vec::new(),
        data: Vec::new(),
        max_policy_size,
    };
    for entry in &POOL_FIELDS {
        let Some(request) = options.fields.get(&entry.field) else {
            continue;
        };
        *config.pool_mut(entry.field) = match entry.field {
            Field::UserId => generate_user_ids(rng, request.num, &request.prefix),
            _ => generate_values(request.num, &request.prefix),
        };
    }
    Ok(config)
}

/// Renders `config` as indented JSON, or TOML when `toml` is set.
pub fn render_document(config: &Config, toml: bool) -> Result<String> {
    if toml {
        toml::to_string_pretty(config).map_err(|err| Error::Serialization(err.to_string()))
    } else {
        serde_json::to_string_pretty(config).map_err(|err| Error::Serialization(err.to_string()))
    }
}

/// Writes the document to `output`, or stdout when no path is given.
pub fn write_document(config: &Config, output: Option<&Path>) -> Result<()> {
    match output {
        None => {
            let text = render_document(config, false)?;
            let mut out = io::stdout().lock();
            writeln!(out, "{text}").map_err(|err| Error::SinkUnavailable(err.to_string()))
        }
        Some(path) => {
            let is_toml = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
            let text = render_document(config, is_toml)?;
            let mut file = File::create(path)
                .map_err(|err| Error::SinkUnavailable(format!("{}: {err}", path.display())))?;
            writeln!(file, "{text}")
                .map_err(|err| Error::SinkUnavailable(format!("{}: {err}", path.display())))?;
            info!(path = %path.display(), "configuration written");
            Ok(())
        }
    }
}

pub fn configure(options: &ConfigureOptions) -> Result<Config> {
    let config = build_document(options, &mut rand::thread_rng())?;
    write_document(&config, options.output.as_deref())?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::PartialConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use uuid::Uuid;

    fn request(num: usize, prefix: &str) -> FieldRequest {
        FieldRequest {
            num,
            prefix: prefix.to_string(),
        }
    }

    #[test]
    fn prefixed_values_are_zero_based() {
        assert_eq!(generate_values(3, "foo"), vec!["foo0", "foo1", "foo2"]);
        assert!(generate_values(0, "foo").is_empty());
    }

    #[test]
    fn document_uses_requested_counts() {
        let mut options = ConfigureOptions::default();
        options.fields.insert(Field::Purpose, request(3, "foo"));
        options.fields.insert(Field::Data, request(0, "data"));
        let config = build_document(&options, &mut StdRng::seed_from_u64(91)).expect("document");
        assert_eq!(config.purpose, vec!["foo0", "foo1", "foo2"]);
        assert!(config.data.is_empty());
        assert!(config.process.is_empty());
        assert_eq!(config.max_policy_size, DEFAULT_MAX_POLICY_SIZE);
    }

    #[test]
    fn user_id_sentinel_mints_unique_ids() {
        let mut options = ConfigureOptions::default();
        options.fields.insert(Field::UserId, request(5, USER_ID_SENTINEL));
        let config = build_document(&options, &mut StdRng::seed_from_u64(92)).expect("document");
        assert_eq!(config.user_id.len(), 5);
        let unique: HashSet<_> = config.user_id.iter().collect();
        assert_eq!(unique.len(), 5);
        for id in &config.user_id {
            Uuid::parse_str(id).expect("valid uuid");
            assert!(!id.starts_with(USER_ID_SENTINEL));
        }
    }

    #[test]
    fn user_id_custom_prefix_is_plain() {
        let mut rng = StdRng::seed_from_u64(93);
        assert_eq!(generate_user_ids(&mut rng, 2, "user"), vec!["user0", "user1"]);
    }

    #[test]
    fn json_document_loads_back() {
        let mut options = ConfigureOptions::default();
        options.fields.insert(Field::Process, request(2, "proc"));
        options.max_policy_size = Some(3);
        let config = build_document(&options, &mut StdRng::seed_from_u64(94)).expect("document");
        let text = render_document(&config, false).expect("render");
        assert!(text.contains("\n  \"process\": ["));
        let partial = PartialConfig::from_json_str(&text).expect("parse");
        assert_eq!(partial.process, Some(vec!["proc0".to_string(), "proc1".to_string()]));
        assert_eq!(partial.max_policy_size, Some(3));
    }

    #[test]
    fn toml_document_loads_back() {
        let mut options = ConfigureOptions::default();
        options.fields.insert(Field::Storage, request(1, "vault"));
        let config = build_document(&options, &mut StdRng::seed_from_u64(95)).expect("document");
        let text = render_document(&config, true).expect("render");
        let partial = PartialConfig::from_toml_str(&text).expect("parse");
        assert_eq!(partial.storage, Some(vec!["vault0".to_string()]));
    }

    #[test]
    fn writes_to_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        let mut options = ConfigureOptions {
            output: Some(path.clone()),
            ..ConfigureOptions::default()
        };
        options.fields.insert(Field::Recipient, request(2, "r"));
        configure(&options).expect("configure");
        let partial = PartialConfig::from_path(&path).expect("load");
        assert_eq!(partial.recipient, Some(vec!["r0".to_string(), "r1".to_string()]));
    }
}
