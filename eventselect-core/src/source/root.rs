//! ROOT ntuple reader
//!
//! Reads the lepton + MET ntuple layout (`lep_n`, `lep_pt`, ..., `met_phi`)
//! from a TTree using the `oxyroot` crate. Integer branches are accepted in
//! signed or unsigned flavour and floating-point branches in single or
//! double precision, since both variants occur in published open data.
//!
//! Branch columns are streamed and zipped entry by entry; no column is
//! loaded into memory as a whole.

use super::{branches, RecordIter, RecordSource};
use crate::types::{AnalysisError, EventRecord, Result};
use itertools::izip;
use oxyroot::{Branch, ReaderTree, RootFile};
use std::path::{Path, PathBuf};

type Column<'a, T> = Box<dyn Iterator<Item = T> + 'a>;

/// An opened ROOT file together with the tree holding the event records
///
/// The file handle is owned by the dataset and released when it is dropped.
pub struct RootDataset {
    path: PathBuf,
    tree_name: String,
    tree: ReaderTree,
    // Keeps the file open for as long as the tree is read
    _file: RootFile,
}

impl RootDataset {
    /// Open `path` and look up the tree `tree_name`
    ///
    /// Fails with [`AnalysisError::SourceOpen`] if the file is missing or
    /// unreadable, with [`AnalysisError::TreeNotFound`] if the tree is
    /// absent and with [`AnalysisError::MissingBranch`] if a required
    /// branch is absent.
    pub fn open(path: &Path, tree_name: &str) -> Result<Self> {
        log::info!("Opening ROOT file: {:?}", path);

        if !path.exists() {
            return Err(AnalysisError::SourceOpen {
                path: path.to_path_buf(),
                reason: "file not found".to_string(),
            });
        }

        let mut file = RootFile::open(path).map_err(|e| AnalysisError::SourceOpen {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let tree = file.get_tree(tree_name).map_err(|e| {
            log::debug!("Tree lookup failed for '{}': {}", tree_name, e);
            AnalysisError::TreeNotFound {
                tree: tree_name.to_string(),
                path: path.to_path_buf(),
            }
        })?;

        let dataset = Self {
            path: path.to_path_buf(),
            tree_name: tree_name.to_string(),
            tree,
            _file: file,
        };

        // Fail at open time rather than half-way through a pass
        for name in branches::ALL {
            dataset.branch(name)?;
        }

        log::info!("ROOT file opened successfully: {:?} (tree '{}')", path, tree_name);
        Ok(dataset)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tree_name(&self) -> &str {
        &self.tree_name
    }

    fn branch(&self, name: &str) -> Result<&Branch> {
        self.tree
            .branch(name)
            .ok_or_else(|| AnalysisError::MissingBranch {
                branch: name.to_string(),
                tree: self.tree_name.clone(),
            })
    }

    fn int_column(&self, name: &str) -> Result<Column<'_, i64>> {
        let branch = self.branch(name)?;
        let column: Column<'_, i64> = match ScalarKind::of(branch) {
            ScalarKind::Unsigned => Box::new(
                branch
                    .as_iter::<u32>()
                    .map_err(read_error(name))?
                    .map(|v| v as i64),
            ),
            ScalarKind::Signed => Box::new(
                branch
                    .as_iter::<i32>()
                    .map_err(read_error(name))?
                    .map(|v| v as i64),
            ),
            kind => return Err(unexpected_type(branch, name, kind)),
        };
        Ok(column)
    }

    fn float_column(&self, name: &str) -> Result<Column<'_, f32>> {
        let branch = self.branch(name)?;
        let column: Column<'_, f32> = match ScalarKind::of(branch) {
            ScalarKind::Float => Box::new(branch.as_iter::<f32>().map_err(read_error(name))?),
            ScalarKind::Double => Box::new(
                branch
                    .as_iter::<f64>()
                    .map_err(read_error(name))?
                    .map(|v| v as f32),
            ),
            kind => return Err(unexpected_type(branch, name, kind)),
        };
        Ok(column)
    }

    fn int_vec_column(&self, name: &str) -> Result<Column<'_, Vec<i32>>> {
        let branch = self.branch(name)?;
        let column: Column<'_, Vec<i32>> = match ScalarKind::of(branch) {
            ScalarKind::Unsigned => Box::new(
                branch
                    .as_iter::<Vec<u32>>()
                    .map_err(read_error(name))?
                    .map(|v| v.into_iter().map(|x| x as i32).collect()),
            ),
            ScalarKind::Signed => {
                Box::new(branch.as_iter::<Vec<i32>>().map_err(read_error(name))?)
            }
            kind => return Err(unexpected_type(branch, name, kind)),
        };
        Ok(column)
    }

    fn float_vec_column(&self, name: &str) -> Result<Column<'_, Vec<f32>>> {
        let branch = self.branch(name)?;
        let column: Column<'_, Vec<f32>> = match ScalarKind::of(branch) {
            ScalarKind::Float => {
                Box::new(branch.as_iter::<Vec<f32>>().map_err(read_error(name))?)
            }
            ScalarKind::Double => Box::new(
                branch
                    .as_iter::<Vec<f64>>()
                    .map_err(read_error(name))?
                    .map(|v| v.into_iter().map(|x| x as f32).collect()),
            ),
            kind => return Err(unexpected_type(branch, name, kind)),
        };
        Ok(column)
    }
}

impl RecordSource for RootDataset {
    fn describe(&self) -> String {
        format!("{} (tree '{}')", self.path.display(), self.tree_name)
    }

    fn records(&self) -> Result<RecordIter<'_>> {
        log::debug!("Reading records from {}", self.describe());

        let lepton_count = self.int_column(branches::LEPTON_COUNT)?;
        let lepton_pt = self.float_vec_column(branches::LEPTON_PT)?;
        let lepton_eta = self.float_vec_column(branches::LEPTON_ETA)?;
        let lepton_phi = self.float_vec_column(branches::LEPTON_PHI)?;
        let lepton_charge = self.int_vec_column(branches::LEPTON_CHARGE)?;
        let lepton_type = self.int_vec_column(branches::LEPTON_TYPE)?;
        let missing_et = self.float_column(branches::MISSING_ET)?;
        let missing_phi = self.float_column(branches::MISSING_PHI)?;

        let records = izip!(
            lepton_count,
            lepton_pt,
            lepton_eta,
            lepton_phi,
            lepton_charge,
            lepton_type,
            missing_et,
            missing_phi
        )
        .map(|(n, pt, eta, phi, charge, flavor, met, met_phi)| {
            Ok(EventRecord {
                lepton_count: n.clamp(0, u32::MAX as i64) as u32,
                lepton_pt: pt,
                lepton_eta: eta,
                lepton_phi: phi,
                lepton_charge: charge,
                lepton_type: flavor,
                missing_et: met,
                missing_phi: met_phi,
            })
        });

        Ok(Box::new(records))
    }
}

/// Element type of a branch, ignoring whether it is a scalar or a vector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScalarKind {
    Signed,
    Unsigned,
    Float,
    Double,
    Other,
}

impl ScalarKind {
    fn of(branch: &Branch) -> Self {
        Self::from_type_name(&branch.item_type_name())
    }

    fn from_type_name(type_name: &str) -> Self {
        let lower = type_name.to_ascii_lowercase();
        let element = lower
            .strip_prefix("vector<")
            .and_then(|s| s.strip_suffix('>'))
            .unwrap_or(&lower)
            .trim();

        match element {
            "float" | "float_t" | "float32_t" => ScalarKind::Float,
            "double" | "double_t" | "double32_t" | "float64_t" => ScalarKind::Double,
            "int" | "int_t" | "int32_t" => ScalarKind::Signed,
            "unsigned int" | "uint_t" | "uint32_t" | "unsigned" => ScalarKind::Unsigned,
            _ => ScalarKind::Other,
        }
    }
}

// NOTE: the oxyroot error type is only used through Display
fn read_error<E: std::fmt::Display>(name: &str) -> impl FnOnce(E) -> AnalysisError + '_ {
    move |e| AnalysisError::BranchRead {
        branch: name.to_string(),
        reason: e.to_string(),
    }
}

fn unexpected_type(branch: &Branch, name: &str, kind: ScalarKind) -> AnalysisError {
    AnalysisError::BranchRead {
        branch: name.to_string(),
        reason: format!(
            "unsupported element type '{}' ({:?})",
            branch.item_type_name(),
            kind
        ),
    }
}
