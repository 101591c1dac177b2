//! Settings for the notebook generator.
//!
//! Values come from the defaults, then an optional TOML file, then command line flags.
use crate::{script::DEFAULT_DATA_DIR, Result};
use qu::ick_use::*;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Written to the working directory unless told otherwise.
pub const DEFAULT_OUTPUT: &str = "MIMIC_EDA_Diagnoses.ipynb";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Where the notebook is written.
    pub output: PathBuf,
    /// The directory the notebook reads the csv files from when it is run. Not checked here.
    pub data_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            output: PathBuf::from(DEFAULT_OUTPUT),
            data_dir: DEFAULT_DATA_DIR.to_owned(),
        }
    }
}

impl Config {
    /// Load settings from a TOML file. Missing keys keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        fn inner(path: &Path) -> Result<Config> {
            let text = fs::read_to_string(path)?;
            toml::from_str(&text).map_err(Error::from)
        }
        let path = path.as_ref();
        inner(path).with_context(|| format!("loading config \"{}\"", path.display()))
    }

    /// Replace settings with any that were given explicitly.
    pub fn with_overrides(mut self, output: Option<PathBuf>, data_dir: Option<String>) -> Self {
        if let Some(output) = output {
            self.output = output;
        }
        if let Some(data_dir) = data_dir {
            self.data_dir = data_dir;
        }
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.output, Path::new("MIMIC_EDA_Diagnoses.ipynb"));
        assert_eq!(config.data_dir, "./mimic-iii-clinical-database-1.4/");
    }

    #[test]
    fn file_then_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nbgen.toml");
        fs::write(&path, "data_dir = \"/srv/mimic/\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.data_dir, "/srv/mimic/");
        assert_eq!(config.output, Path::new(DEFAULT_OUTPUT));

        let config = config.with_overrides(Some("out/eda.ipynb".into()), None);
        assert_eq!(config.output, Path::new("out/eda.ipynb"));
        assert_eq!(config.data_dir, "/srv/mimic/");

        let config = config.with_overrides(None, Some("./local/".into()));
        assert_eq!(config.data_dir, "./local/");
    }

    #[test]
    fn unknown_keys_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nbgen.toml");
        fs::write(&path, "kernel = \"python3\"\n").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn missing_file_names_path() {
        let err = Config::load("does/not/exist.toml").unwrap_err();
        assert!(format!("{}", err).contains("does/not/exist.toml"));
    }
}
