//! Package location and module discovery on the filesystem.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::models::{Module, PackageGroups};

const SOURCE_EXTENSION: &str = "py";
const INITIALIZER_FILE: &str = "__init__.py";

/// Locates the defining file of a dotted module name.
///
/// A package resolves to its `__init__.py`; a leaf module to its own file.
pub trait PathResolver: Send + Sync {
    fn resolve(&self, module: &str) -> Option<PathBuf>;
}

impl<F> PathResolver for F
where
    F: Fn(&str) -> Option<PathBuf> + Send + Sync,
{
    fn resolve(&self, module: &str) -> Option<PathBuf> {
        self(module)
    }
}

/// Resolves module names against an ordered list of search roots.
#[derive(Clone, Debug)]
pub struct SearchPathResolver {
    roots: Vec<PathBuf>,
}

impl SearchPathResolver {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Roots from `DEPMATRIX_PATH`, falling back to the current directory.
    pub fn from_env() -> Self {
        let roots: Vec<PathBuf> = match std::env::var_os("DEPMATRIX_PATH") {
            Some(val) => std::env::split_paths(&val)
                .filter(|p| !p.as_os_str().is_empty())
                .collect(),
            None => Vec::new(),
        };
        if roots.is_empty() {
            return Self::new(vec![PathBuf::from(".")]);
        }
        Self::new(roots)
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

impl PathResolver for SearchPathResolver {
    fn resolve(&self, module: &str) -> Option<PathBuf> {
        let relative: PathBuf = module.split('.').collect();
        for root in &self.roots {
            let candidate = root.join(&relative);
            if candidate.is_dir() {
                // The first matching directory decides, like the interpreter's search.
                let init = candidate.join(INITIALIZER_FILE);
                return if init.is_file() { Some(init) } else { None };
            }
            let mut file = candidate.into_os_string();
            file.push(".");
            file.push(SOURCE_EXTENSION);
            let file = PathBuf::from(file);
            if file.is_file() {
                return Some(file);
            }
        }
        None
    }
}

/// Convert a path relative to a package directory to a dotted module name.
pub fn module_name_for(package: &str, relative: &Path) -> String {
    let without_ext = relative.with_extension("");
    let mut name = package.to_string();
    for component in without_ext.components() {
        if let std::path::Component::Normal(part) = component {
            name.push('.');
            name.push_str(&part.to_string_lossy());
        }
    }
    name
}

fn is_source_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == SOURCE_EXTENSION)
        .unwrap_or(false)
}

/// Recursively collect every source file under `root` as a module of `package`.
pub fn walk_package(
    package: &str,
    root: &Path,
    group_index: usize,
    group_name: &str,
) -> Vec<Module> {
    let mut modules = Vec::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {e}", root.display());
                continue;
            }
        };
        if !entry.file_type().is_file() || !is_source_file(entry.path()) {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        modules.push(Module {
            name: module_name_for(package, relative),
            path: Some(entry.path().to_path_buf()),
            group_index,
            group_name: group_name.to_string(),
        });
    }
    modules
}

/// Module inventory together with the packages it was built from.
#[derive(Clone, Debug, Default)]
pub struct Discovery {
    pub modules: Vec<Module>,
    /// Configured packages the resolver located, in configuration order.
    pub resolved: Vec<String>,
}

/// Build the module inventory for every package of every group.
///
/// Packages the resolver cannot locate are skipped and left out of
/// [`Discovery::resolved`].
pub fn discover_modules(groups: &PackageGroups, resolver: &dyn PathResolver) -> Discovery {
    let mut modules = Vec::new();
    let mut resolved = Vec::new();
    for (group_index, group) in groups.groups().iter().enumerate() {
        for package in &group.packages {
            let location = match resolver.resolve(package) {
                Some(l) => l,
                None => {
                    warn!("Package {package:?} could not be resolved, skipping");
                    continue;
                }
            };
            resolved.push(package.clone());
            let is_package = location
                .file_name()
                .map(|f| f == INITIALIZER_FILE)
                .unwrap_or(false);
            if !is_package {
                modules.push(Module {
                    name: package.clone(),
                    path: Some(location),
                    group_index,
                    group_name: group.label.clone(),
                });
                continue;
            }
            let root = location.parent().unwrap_or(Path::new("."));
            let found = walk_package(package, root, group_index, &group.label);
            debug!("Discovered {} modules in package {package:?}", found.len());
            modules.extend(found);
        }
    }
    Discovery { modules, resolved }
}

/// Largest number of dot-separated segments among module names.
pub fn max_depth(modules: &[Module]) -> usize {
    modules.iter().map(Module::depth).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_resolver_finds_package_initializer() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "app/__init__.py");
        let resolver = SearchPathResolver::new(vec![dir.path().to_path_buf()]);
        assert_eq!(
            resolver.resolve("app"),
            Some(dir.path().join("app").join("__init__.py"))
        );
    }

    #[test]
    fn test_resolver_rejects_directory_without_initializer() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "loose/mod.py");
        let resolver = SearchPathResolver::new(vec![dir.path().to_path_buf()]);
        assert_eq!(resolver.resolve("loose"), None);
    }

    #[test]
    fn test_resolver_finds_leaf_module_and_nested_names() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "app/__init__.py");
        touch(dir.path(), "app/sub/__init__.py");
        touch(dir.path(), "app/sub/leaf.py");
        let resolver = SearchPathResolver::new(vec![dir.path().to_path_buf()]);
        assert_eq!(
            resolver.resolve("app.sub.leaf"),
            Some(dir.path().join("app").join("sub").join("leaf.py"))
        );
        assert_eq!(resolver.resolve("app.missing"), None);
    }

    #[test]
    fn test_module_name_for_nested_path() {
        let name = module_name_for("app", Path::new("sub/inner/mod.py"));
        assert_eq!(name, "app.sub.inner.mod");
        assert_eq!(module_name_for("app", Path::new("__init__.py")), "app.__init__");
    }

    #[test]
    fn test_discover_modules_walks_in_sorted_order() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "app/__init__.py");
        touch(dir.path(), "app/util.py");
        touch(dir.path(), "app/core.py");
        touch(dir.path(), "app/sub/__init__.py");
        touch(dir.path(), "app/sub/deep.py");
        touch(dir.path(), "app/README.txt");
        let resolver = SearchPathResolver::new(vec![dir.path().to_path_buf()]);
        let groups = PackageGroups::from_single_package("app");

        let modules = discover_modules(&groups, &resolver).modules;
        let names: Vec<&str> = modules.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "app.__init__",
                "app.core",
                "app.sub.__init__",
                "app.sub.deep",
                "app.util",
            ]
        );
        assert_eq!(max_depth(&modules), 3);
    }

    #[test]
    fn test_discover_modules_skips_missing_and_tags_groups() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "one/__init__.py");
        touch(dir.path(), "two/__init__.py");
        touch(dir.path(), "single.py");
        let resolver = SearchPathResolver::new(vec![dir.path().to_path_buf()]);
        let groups = PackageGroups::from_labeled_groups([
            ("first", vec!["one", "ghost"]),
            ("second", vec!["two", "single"]),
        ]);

        let discovery = discover_modules(&groups, &resolver);
        assert_eq!(discovery.resolved, vec!["one", "two", "single"]);
        let tagged: Vec<(&str, usize, &str)> = discovery
            .modules
            .iter()
            .map(|m| (m.name.as_str(), m.group_index, m.group_name.as_str()))
            .collect();
        assert_eq!(
            tagged,
            vec![
                ("one.__init__", 0, "first"),
                ("two.__init__", 1, "second"),
                ("single", 1, "second"),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_follows_symlinked_files_and_packages() {
        use std::os::unix::fs::symlink;

        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "app/__init__.py");
        touch(dir.path(), "shared/real.py");
        touch(dir.path(), "vendored/__init__.py");
        touch(dir.path(), "vendored/tool.py");
        symlink(
            dir.path().join("shared").join("real.py"),
            dir.path().join("app").join("linked.py"),
        )
        .unwrap();
        symlink(dir.path().join("vendored"), dir.path().join("app").join("vend")).unwrap();
        let resolver = SearchPathResolver::new(vec![dir.path().to_path_buf()]);

        let discovery = discover_modules(&PackageGroups::from_single_package("app"), &resolver);
        let names: Vec<&str> = discovery.modules.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "app.__init__",
                "app.linked",
                "app.vend.__init__",
                "app.vend.tool",
            ]
        );
        assert_eq!(
            discovery.modules[1].path,
            Some(dir.path().join("app").join("linked.py"))
        );
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |name: &str| -> Option<PathBuf> {
            (name == "x").then(|| PathBuf::from("/nowhere/x.py"))
        };
        assert!(PathResolver::resolve(&resolver, "x").is_some());
        assert!(PathResolver::resolve(&resolver, "y").is_none());
    }

    #[test]
    fn test_max_depth_of_empty_inventory() {
        assert_eq!(max_depth(&[]), 0);
    }
}
