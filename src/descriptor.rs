//! Per-method dataset descriptors consumed by detection engines.
//!
//! A descriptor is a small YAML document naming the dataset root, the
//! validation image directory and the class taxonomy:
//!
//! ```yaml
//! path: /abs/data/bdd100k_exp
//! train: null
//! val: /abs/data/bdd100k_exp/images/hsv/val
//! test: null
//! names:
//!   0: pedestrian
//!   1: rider
//! ```

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::class_names;
use crate::error::Result;
use crate::types::Method;

/// Dataset descriptor for one method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetDescriptor {
    /// Absolute dataset root.
    pub path: PathBuf,
    #[serde(default)]
    pub train: Option<PathBuf>,
    /// Absolute validation image directory.
    pub val: PathBuf,
    #[serde(default)]
    pub test: Option<PathBuf>,
    /// Class id to class name.
    pub names: BTreeMap<u32, String>,
}

impl DatasetDescriptor {
    /// Build the descriptor for `method` under `data_root`.
    ///
    /// `val` points at `images/{method}/val` when that directory exists and
    /// at `images/{method}` otherwise.
    pub fn for_method(data_root: &Path, method: Method) -> Result<Self> {
        let root = std::path::absolute(data_root)?;
        let images = root.join("images").join(method.as_str());
        let split = images.join("val");
        let val = if split.exists() { split } else { images };

        Ok(Self {
            path: root,
            train: None,
            val,
            test: None,
            names: class_names(),
        })
    }

    /// Ground-truth label directory, `{path}/labels/val`.
    pub fn labels_dir(&self) -> PathBuf {
        self.path.join("labels").join("val")
    }

    /// Write as YAML, replacing any existing file.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let writer = BufWriter::new(File::create(path)?);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_yaml::from_reader(reader)?)
    }
}

/// Writes `bdd100k_{method}.yaml` descriptors into a config directory.
#[derive(Debug, Clone)]
pub struct DescriptorEmitter {
    config_dir: PathBuf,
    data_root: PathBuf,
}

impl DescriptorEmitter {
    pub fn new<C: Into<PathBuf>, D: Into<PathBuf>>(config_dir: C, data_root: D) -> Self {
        Self {
            config_dir: config_dir.into(),
            data_root: data_root.into(),
        }
    }

    pub fn descriptor_path(&self, method: Method) -> PathBuf {
        self.config_dir.join(format!("bdd100k_{}.yaml", method.as_str()))
    }

    /// Generate and write the descriptor for `method`, returning its path.
    pub fn emit(&self, method: Method) -> Result<PathBuf> {
        let descriptor = DatasetDescriptor::for_method(&self.data_root, method)?;
        let path = self.descriptor_path(method);
        descriptor.write(&path)?;
        log::info!("dataset descriptor written: {}", path.display());
        Ok(path)
    }
}
