use crate::core::error::{Error, Result};
use crate::core::ids::new_ids;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Number of user identifiers minted for the built-in `userId` pool.
pub const DEFAULT_USER_ID_COUNT: usize = 5;

/// Upper bound on simple policies per consent when the config does not set one.
pub const DEFAULT_MAX_POLICY_SIZE: usize = 5;

/// Prefix that makes `configure` mint identifiers instead of prefixed names.
pub const USER_ID_SENTINEL: &str = "UserId";

/// A sampled field of the value pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Process,
    Purpose,
    Processing,
    Recipient,
    Storage,
    UserId,
    Data,
}

/// Where the built-in candidates for a field come from.
#[derive(Debug, Clone, Copy)]
pub enum DefaultPool {
    Values(&'static [&'static str]),
    /// Freshly minted identifiers, generated per run.
    Ids(usize),
}

/// One row of the field table shared by config loading, defaults and `configure`.
#[derive(Debug, Clone, Copy)]
pub struct PoolField {
    pub field: Field,
    /// Key in the config document.
    pub name: &'static str,
    pub num_flag: &'static str,
    pub prefix_flag: &'static str,
    pub default_prefix: &'static str,
    pub defaults: DefaultPool,
}

pub const POOL_FIELDS: [PoolField; 7] = [
    PoolField {
        field: Field::Process,
        name: "process",
        num_flag: "processNum",
        prefix_flag: "processPrefix",
        default_prefix: "process",
        defaults: DefaultPool::Values(&["mailinglist", "send-invoice"]),
    },
    PoolField {
        field: Field::Purpose,
        name: "purpose",
        num_flag: "purposeNum",
        prefix_flag: "purposePrefix",
        default_prefix: "purpose",
        defaults: DefaultPool::Values(&[
            "svpu:Account",
            "svpu:Admin",
            "svpu:AnyContact",
            "svpu:Browsing",
            "svpu:Delivery",
            "svpu:Develop",
            "svpu:Feedback",
            "svpu:Login",
            "svpu:Marketing",
            "svpu:Payment",
            "svpu:Sales",
            "svpu:Tailoring",
        ]),
    },
    PoolField {
        field: Field::Processing,
        name: "processing",
        num_flag: "processingNum",
        prefix_flag: "processingPrefix",
        default_prefix: "processing",
        defaults: DefaultPool::Values(&[
            "svpr:Aggregate",
            "svpr:Analyse",
            "svpr:Anonymise",
            "svpr:Collect",
            "svpr:Copy",
            "svpr:Derive",
            "svpr:Move",
            "svpr:Query",
            "svpr:Transfer",
        ]),
    },
    PoolField {
        field: Field::Recipient,
        name: "recipient",
        num_flag: "recipientNum",
        prefix_flag: "recipientPrefix",
        default_prefix: "recipient",
        defaults: DefaultPool::Values(&[
            "svr:Delivery",
            "svr:OtherRecipient",
            "svr:Ours",
            "svr:Public",
            "svr:Same",
            "svr:Unrelated",
        ]),
    },
    PoolField {
        field: Field::Storage,
        name: "storage",
        num_flag: "storageNum",
        prefix_flag: "storagePrefix",
        default_prefix: "storage",
        defaults: DefaultPool::Values(&[
            "svl:ControllerServers",
            "svl:EU",
            "svl:EULike",
            "svl:OurServers",
            "svl:ProcessorServers",
            "svl:ThirdCountries",
            "svl:ThirdParty",
        ]),
    },
    PoolField {
        field: Field::UserId,
        name: "userId",
        num_flag: "userIdNum",
        prefix_flag: "userIdPrefix",
        default_prefix: USER_ID_SENTINEL,
        defaults: DefaultPool::Ids(DEFAULT_USER_ID_COUNT),
    },
    PoolField {
        field: Field::Data,
        name: "data",
        num_flag: "dataNum",
        prefix_flag: "dataPrefix",
        default_prefix: "data",
        defaults: DefaultPool::Values(&[
            "svd:Activity",
            "svd:Anonymized",
            "svd:AudiovisualActivity",
            "svd:Computer",
            "svd:Content",
            "svd:Demographic",
            "svd:Financial",
            "svd:Health",
            "svd:Location",
            "svd:Navigation",
            "svd:Preference",
            "svd:Purchase",
            "svd:UniqueId",
        ]),
    },
];

impl Field {
    /// Returns the table row describing this field.
    pub fn entry(self) -> &'static PoolField {
        // POOL_FIELDS lists every variant exactly once, in declaration order.
        &POOL_FIELDS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.entry().name
    }
}

impl DefaultPool {
    fn materialize(self, rng: &mut impl Rng) -> Vec<String> {
        match self {
            DefaultPool::Values(values) => values.iter().map(|value| value.to_string()).collect(),
            DefaultPool::Ids(count) => new_ids(rng, count),
        }
    }
}

/// Resolved value pool plus auxiliary scalars, read-only for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub process: Vec<String>,
    pub purpose: Vec<String>,
    pub processing: Vec<String>,
    pub recipient: Vec<String>,
    pub storage: Vec<String>,
    pub user_id: Vec<String>,
    pub data: Vec<String>,
    /// Maximum number of simple policies embedded in one consent.
    pub max_policy_size: usize,
}

impl Config {
    /// Builds the built-in configuration; `userId` candidates are minted from `rng`.
    pub fn defaults(rng: &mut impl Rng) -> Self {
        let mut config = Self {
            process: Vec::new(),
            purpose: Vec::new(),
            processing: Vec::new(),
            recipient: Vec::new(),
            storage: Vec::new(),
            user_id: Vec::new(),
            data: Vec::new(),
            max_policy_size: DEFAULT_MAX_POLICY_SIZE,
        };
        for entry in &POOL_FIELDS {
            *config.pool_mut(entry.field) = entry.defaults.materialize(rng);
        }
        config
    }

    /// Loads a config document, or returns the defaults when no path is given.
    pub fn load(path: Option<&Path>, rng: &mut impl Rng) -> Result<Self> {
        let defaults = Self::defaults(rng);
        match path {
            Some(path) => PartialConfig::from_path(path)?.resolve(defaults),
            None => Ok(defaults),
        }
    }

    pub fn pool(&self, field: Field) -> &[String] {
        match field {
            Field::Process => &self.process,
            Field::Purpose => &self.purpose,
            Field::Processing => &self.processing,
            Field::Recipient => &self.recipient,
            Field::Storage => &self.storage,
            Field::UserId => &self.user_id,
            Field::Data => &self.data,
        }
    }

    pub fn pool_mut(&mut self, field: Field) -> &mut Vec<String> {
        match field {
            Field::Process => &mut self.process,
            Field::Purpose => &mut self.purpose,
            Field::Processing => &mut self.processing,
            Field::Recipient => &mut self.recipient,
            Field::Storage => &mut self.storage,
            Field::UserId => &mut self.user_id,
            Field::Data => &mut self.data,
        }
    }

    /// Checks that every pool in `fields` can be sampled.
    pub fn validate(&self, fields: &[Field]) -> Result<()> {
        for field in fields {
            if self.pool(*field).is_empty() {
                return Err(Error::EmptyPool(field.name()));
            }
        }
        if self.max_policy_size == 0 {
            return Err(Error::ConfigInvalid(
                "maxPolicySize must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// A config document as written by a user; every field may be missing.
///
/// Capitalized keys (`Process`, `Location`, `UserId`, ...) are accepted for
/// documents written by the legacy generator.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialConfig {
    #[serde(alias = "Process")]
    pub process: Option<Vec<String>>,
    #[serde(alias = "Purpose")]
    pub purpose: Option<Vec<String>>,
    #[serde(alias = "Processing")]
    pub processing: Option<Vec<String>>,
    #[serde(alias = "location", alias = "Location", alias = "Recipient")]
    pub recipient: Option<Vec<String>>,
    #[serde(alias = "Storage")]
    pub storage: Option<Vec<String>>,
    #[serde(alias = "userID", alias = "UserId", alias = "UserID")]
    pub user_id: Option<Vec<String>>,
    #[serde(alias = "attributes", alias = "Attributes", alias = "Data")]
    pub data: Option<Vec<String>>,
    #[serde(alias = "MaxPolicySize")]
    pub max_policy_size: Option<usize>,
}

impl PartialConfig {
    /// Reads a document from disk; `.toml` files are parsed as TOML, anything else as JSON.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|err| Error::ConfigInvalid(format!("{}: {err}", path.display())))?;
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml {
            Self::from_toml_str(&contents)
        } else {
            Self::from_json_str(&contents)
        }
    }

    pub fn from_json_str(contents: &str) -> Result<Self> {
        serde_json::from_str(contents).map_err(|err| Error::ConfigInvalid(err.to_string()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|err| Error::ConfigInvalid(err.to_string()))
    }

    /// Fills every absent, null or empty pool from `defaults`.
    pub fn resolve(self, defaults: Config) -> Result<Config> {
        let max_policy_size = match self.max_policy_size {
            Some(0) => {
                return Err(Error::ConfigInvalid(
                    "maxPolicySize must be at least 1".to_string(),
                ))
            }
            Some(size) => size,
            None => defaults.max_policy_size,
        };
        Ok(Config {
            process: or_default(self.process, defaults.process),
            purpose: or_default(self.purpose, defaults.purpose),
            processing: or_default(self.processing, defaults.processing),
            recipient: or_default(self.recipient, defaults.recipient),
            storage: or_default(self.storage, defaults.storage),
            user_id: or_default(self.user_id, defaults.user_id),
            data: or_default(self.data, defaults.data),
            max_policy_size,
        })
    }
}

fn or_default(supplied: Option<Vec<String>>, fallback: Vec<String>) -> Vec<String> {
    match supplied {
        Some(values) if !values.is_empty() => values,
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Write;

    fn defaults() -> Config {
        Config::defaults(&mut StdRng::seed_from_u64(7))
    }

    #[test]
    fn table_matches_field_order() {
        for (index, entry) in POOL_FIELDS.iter().enumerate() {
            assert_eq!(entry.field as usize, index);
            assert_eq!(entry.field.entry().name, entry.name);
        }
    }

    #[test]
    fn defaults_fill_every_pool() {
        let config = defaults();
        for entry in &POOL_FIELDS {
            assert!(!config.pool(entry.field).is_empty(), "{} empty", entry.name);
        }
        assert_eq!(config.user_id.len(), DEFAULT_USER_ID_COUNT);
        assert_eq!(config.max_policy_size, DEFAULT_MAX_POLICY_SIZE);
    }

    #[test]
    fn missing_location_and_storage_use_defaults() {
        let partial = PartialConfig::from_json_str(
            r#"{"process": ["billing-run"], "purpose": ["svpu:Payment"]}"#,
        )
        .expect("parse");
        let fallback = defaults();
        let resolved = partial.resolve(fallback.clone()).expect("resolve");
        assert_eq!(resolved.process, vec!["billing-run".to_string()]);
        assert_eq!(resolved.purpose, vec!["svpu:Payment".to_string()]);
        assert_eq!(resolved.recipient, fallback.recipient);
        assert_eq!(resolved.storage, fallback.storage);
        assert_eq!(resolved.user_id, fallback.user_id);
    }

    #[test]
    fn empty_and_null_pools_use_defaults() {
        let partial =
            PartialConfig::from_json_str(r#"{"data": [], "processing": null}"#).expect("parse");
        let fallback = defaults();
        let resolved = partial.resolve(fallback.clone()).expect("resolve");
        assert_eq!(resolved.data, fallback.data);
        assert_eq!(resolved.processing, fallback.processing);
    }

    #[test]
    fn legacy_keys_are_accepted() {
        let partial = PartialConfig::from_json_str(
            r#"{"location": ["belgium"], "attributes": ["email"], "userId": ["u1"]}"#,
        )
        .expect("parse");
        let resolved = partial.resolve(defaults()).expect("resolve");
        assert_eq!(resolved.recipient, vec!["belgium".to_string()]);
        assert_eq!(resolved.data, vec!["email".to_string()]);
        assert_eq!(resolved.user_id, vec!["u1".to_string()]);
    }

    #[test]
    fn capitalized_legacy_keys_are_accepted() {
        let partial = PartialConfig::from_json_str(
            r#"{"Process":["p0"],"Purpose":["u0"],"Location":["l0"],"UserId":["id0"],"Attributes":["a0"]}"#,
        )
        .expect("parse");
        let resolved = partial.resolve(defaults()).expect("resolve");
        assert_eq!(resolved.process, vec!["p0".to_string()]);
        assert_eq!(resolved.purpose, vec!["u0".to_string()]);
        assert_eq!(resolved.recipient, vec!["l0".to_string()]);
        assert_eq!(resolved.user_id, vec!["id0".to_string()]);
        assert_eq!(resolved.data, vec!["a0".to_string()]);
    }

    #[test]
    fn wrong_shape_is_config_invalid() {
        let err = PartialConfig::from_json_str(r#"{"process": "not-a-list"}"#).unwrap_err();
        assert!(matches!(err, Error::ConfigInvalid(_)));
    }

    #[test]
    fn zero_policy_size_is_rejected() {
        let partial = PartialConfig::from_json_str(r#"{"maxPolicySize": 0}"#).expect("parse");
        let err = partial.resolve(defaults()).unwrap_err();
        assert!(matches!(err, Error::ConfigInvalid(_)));
    }

    #[test]
    fn validate_reports_empty_pool() {
        let mut config = defaults();
        config.storage.clear();
        assert!(config.validate(&[Field::Process, Field::Purpose]).is_ok());
        let err = config.validate(&[Field::Storage]).unwrap_err();
        assert!(matches!(err, Error::EmptyPool("storage")));
    }

    #[test]
    fn loads_toml_documents() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("tempfile");
        writeln!(file, "process = [\"nightly-export\"]\nmaxPolicySize = 2").expect("write");
        let config = Config::load(Some(file.path()), &mut StdRng::seed_from_u64(1)).expect("load");
        assert_eq!(config.process, vec!["nightly-export".to_string()]);
        assert_eq!(config.max_policy_size, 2);
    }

    #[test]
    fn unreadable_file_is_config_invalid() {
        let err = Config::load(
            Some(Path::new("/definitely/not/here.json")),
            &mut StdRng::seed_from_u64(1),
        )
        .unwrap_err();
        assert!(matches!(err, Error::ConfigInvalid(_)));
    }
}
