/// Explorer configuration file support.
///
/// Every section is optional; a missing file section falls back to the
/// built-in dataset layout.
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::region::RegionKey;
use crate::schema::{source, years};
use crate::table::YearRange;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExplorerConfig {
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default)]
    pub years: YearSettings,
    #[serde(default)]
    pub view: ViewSettings,
    /// Directory relative data paths resolve against.
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

/// Source table location and layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSettings {
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
    #[serde(default = "default_entity_column")]
    pub entity_column: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearSettings {
    #[serde(default = "default_min_year")]
    pub min: i32,
    #[serde(default = "default_max_year")]
    pub max: i32,
}

/// Initial selection of a fresh session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewSettings {
    #[serde(default)]
    pub default_region: RegionKey,
}

fn default_data_path() -> PathBuf {
    PathBuf::from("military_expenditure.csv")
}

fn default_entity_column() -> String {
    source::ENTITY.to_string()
}

fn default_min_year() -> i32 {
    years::MIN
}

fn default_max_year() -> i32 {
    years::MAX
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            entity_column: default_entity_column(),
        }
    }
}

impl Default for YearSettings {
    fn default() -> Self {
        Self {
            min: default_min_year(),
            max: default_max_year(),
        }
    }
}

impl ExplorerConfig {
    /// Load from a TOML file. Relative data paths resolve against the
    /// file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&contents)?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.year_range()?;
        Ok(config)
    }

    pub fn year_range(&self) -> Result<YearRange> {
        YearRange::new(self.years.min, self.years.max)
    }

    pub fn data_path(&self) -> PathBuf {
        match &self.base_dir {
            Some(dir) if self.data.path.is_relative() => dir.join(&self.data.path),
            _ => self.data.path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExplorerError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn empty_file_uses_defaults() {
        let config = ExplorerConfig::from_toml_str("").unwrap();
        assert_eq!(config.data.entity_column, "Country Name");
        assert_eq!(config.year_range().unwrap(), YearRange::default());
        assert_eq!(config.view.default_region, RegionKey::World);
    }

    #[test]
    fn sections_override_defaults() {
        let config = ExplorerConfig::from_toml_str(
            r#"
            [data]
            path = "/srv/data/milex.csv"
            entity_column = "Entity"

            [years]
            min = 1990

            [view]
            default_region = "west_europe"
            "#,
        )
        .unwrap();

        assert_eq!(config.data_path(), PathBuf::from("/srv/data/milex.csv"));
        assert_eq!(config.data.entity_column, "Entity");
        assert_eq!(config.year_range().unwrap().min(), 1990);
        assert_eq!(config.year_range().unwrap().max(), 2018);
        assert_eq!(config.view.default_region, RegionKey::WestEurope);
    }

    #[test]
    fn inverted_years_are_rejected() {
        let err = ExplorerConfig::from_toml_str("[years]\nmin = 2018\nmax = 1960\n").unwrap_err();
        assert!(matches!(err, ExplorerError::InvalidInput(_)));
    }

    #[test]
    fn absurd_year_span_is_rejected() {
        let err = ExplorerConfig::from_toml_str("[years]\nmin = -2000000000\nmax = 2000000000\n")
            .unwrap_err();
        assert!(matches!(err, ExplorerError::InvalidInput(_)));
    }

    #[test]
    fn unknown_region_key_is_a_config_error() {
        let err = ExplorerConfig::from_toml_str("[view]\ndefault_region = \"mars\"\n").unwrap_err();
        assert!(matches!(err, ExplorerError::Config(_)));
    }

    #[test]
    fn relative_data_path_resolves_next_to_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[data]\npath = \"milex.csv\"").unwrap();

        let config = ExplorerConfig::load(file.path()).unwrap();
        let expected = file.path().parent().unwrap().join("milex.csv");
        assert_eq!(config.data_path(), expected);
    }
}
