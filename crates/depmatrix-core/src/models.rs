//! Shared typed models used across discovery, resolution, and matrix layers.

use std::path::PathBuf;

use serde::{Deserialize, Serialize, Serializer};

// ---------------------------------------------------------------------------
// 1. Package groups
// ---------------------------------------------------------------------------

/// A labelled collection of top-level package names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageGroup {
    pub label: String,
    pub packages: Vec<String>,
}

/// The ordered set of package groups under analysis.
///
/// Every constructor normalizes to the same `(label, packages)` sequence. The
/// default label is the empty string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageGroups {
    groups: Vec<PackageGroup>,
}

impl PackageGroups {
    pub fn from_single_package(package: impl Into<String>) -> Self {
        Self::from_package_list([package.into()])
    }

    pub fn from_package_list<I, S>(packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            groups: vec![PackageGroup {
                label: String::new(),
                packages: packages.into_iter().map(Into::into).collect(),
            }],
        }
    }

    pub fn from_labeled_groups<I, L, P, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = (L, P)>,
        L: Into<String>,
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            groups: groups
                .into_iter()
                .map(|(label, packages)| PackageGroup {
                    label: label.into(),
                    packages: packages.into_iter().map(Into::into).collect(),
                })
                .collect(),
        }
    }

    pub fn groups(&self) -> &[PackageGroup] {
        &self.groups
    }

    pub fn labels(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.label.as_str()).collect()
    }

    /// All package names, flattened in group order.
    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.groups
            .iter()
            .flat_map(|g| g.packages.iter().map(String::as_str))
    }
}

// ---------------------------------------------------------------------------
// 2. Module
// ---------------------------------------------------------------------------

/// A discovered source file, or a collapsed group of them at coarser depths.
///
/// `path` is only known for modules of the finest matrix.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_lossy_path"
    )]
    pub path: Option<PathBuf>,
    pub group_index: usize,
    pub group_name: String,
}

/// File names that are not valid UTF-8 are exported with replacement characters.
fn serialize_lossy_path<S: Serializer>(
    path: &Option<PathBuf>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match path {
        Some(p) => serializer.serialize_str(&p.to_string_lossy()),
        None => serializer.serialize_none(),
    }
}

impl Module {
    /// Number of dot-separated segments in the module name.
    pub fn depth(&self) -> usize {
        self.name.split('.').count()
    }
}

// ---------------------------------------------------------------------------
// 3. Import records and edges
// ---------------------------------------------------------------------------

/// A merged `from X import a, b` record: who imports, from where, and which names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRecord {
    #[serde(rename = "by")]
    pub importer: String,
    #[serde(rename = "from")]
    pub target: String,
    #[serde(rename = "import")]
    pub names: Vec<String>,
}

/// A directed, weighted dependency between two modules of the same matrix.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportEdge {
    pub source_name: String,
    pub source_index: usize,
    pub target_name: String,
    pub target_index: usize,
    pub imports: Vec<ImportRecord>,
    pub cardinal: usize,
}

impl ImportEdge {
    /// Absorb another edge with the same endpoints.
    pub fn merge(&mut self, other: &ImportEdge) {
        self.cardinal += other.cardinal;
        self.imports.extend(other.imports.iter().cloned());
    }
}

// ---------------------------------------------------------------------------
// 4. Matrix
// ---------------------------------------------------------------------------

/// The dependency graph at one depth.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matrix {
    pub modules: Vec<Module>,
    pub imports: Vec<ImportEdge>,
}

impl Matrix {
    pub fn new(modules: Vec<Module>, imports: Vec<ImportEdge>) -> Self {
        Self { modules, imports }
    }

    /// Sum of edge cardinals.
    pub fn total_cardinal(&self) -> usize {
        self.imports.iter().map(|e| e.cardinal).sum()
    }
}

// ---------------------------------------------------------------------------
// 5. Build stage
// ---------------------------------------------------------------------------

/// Pipeline progress of a session. Transitions only move forward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildStage {
    #[default]
    Empty,
    ModulesBuilt,
    ImportsBuilt,
    MatricesBuilt,
}
