//! Resolution of profile file identifiers to files on disk.
//!
//! Profiles name files by import path (`example.com/mod/pkg/file.go`), by a
//! path relative to the module, or by an absolute path. [`GoSourceLocator`]
//! tries the main module declared in `go.mod`, its `vendor/` tree, the
//! module download cache for required dependencies, then GOPATH and GOROOT
//! source trees.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::core::config::SourceConfig;
use crate::core::errors::{CoverError, Result};

/// Maps a profile file identifier to a readable source path
pub trait SourceResolver: Send + Sync {
    fn resolve(&self, file_name: &str) -> Result<PathBuf>;
}

/// A `require` entry of `go.mod`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRequirement {
    pub path: String,
    pub version: String,
}

/// The parts of `go.mod` used for lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoModFile {
    pub module: Option<String>,
    pub requires: Vec<ModuleRequirement>,
}

impl GoModFile {
    /// Parse `module` and `require` directives (single-line and block form).
    pub fn parse(content: &str) -> Self {
        let mut go_mod = GoModFile::default();
        let mut in_require_block = false;

        for raw_line in content.lines() {
            let line = match raw_line.find("//") {
                Some(index) => &raw_line[..index],
                None => raw_line,
            }
            .trim();
            if line.is_empty() {
                continue;
            }

            if in_require_block {
                if line == ")" {
                    in_require_block = false;
                } else if let Some(requirement) = parse_requirement(line) {
                    go_mod.requires.push(requirement);
                }
                continue;
            }

            if let Some(rest) = directive_argument(line, "module") {
                let module = unquote(rest);
                if !module.is_empty() {
                    go_mod.module = Some(module.to_string());
                }
            } else if let Some(rest) = directive_argument(line, "require") {
                if rest == "(" {
                    in_require_block = true;
                } else if let Some(requirement) = parse_requirement(rest) {
                    go_mod.requires.push(requirement);
                }
            }
        }

        go_mod
    }

    /// Longest required module whose path prefixes `import_path` at a `/`.
    fn requirement_for<'a, 'b>(&'a self, import_path: &'b str) -> Option<(&'a ModuleRequirement, &'b str)> {
        self.requires
            .iter()
            .filter_map(|requirement| {
                strip_path_prefix(import_path, &requirement.path).map(|rest| (requirement, rest))
            })
            .max_by_key(|(requirement, _)| requirement.path.len())
    }
}

/// Locator for Go module and GOPATH layouts
#[derive(Debug, Clone)]
pub struct GoSourceLocator {
    module_root: PathBuf,
    go_mod: GoModFile,
    gopath: Vec<PathBuf>,
    goroot: Option<PathBuf>,
    module_cache: Option<PathBuf>,
}

impl GoSourceLocator {
    /// The module cache defaults to `<first GOPATH>/pkg/mod`.
    pub fn new(
        module_root: impl Into<PathBuf>,
        gopath: Vec<PathBuf>,
        goroot: Option<PathBuf>,
    ) -> Self {
        let module_root = module_root.into();
        let go_mod = read_go_mod(&module_root);
        match &go_mod.module {
            Some(path) => debug!(
                "Module {} rooted at {} ({} requirements)",
                path,
                module_root.display(),
                go_mod.requires.len()
            ),
            None => debug!("No go.mod module found in {}", module_root.display()),
        }
        let module_cache = gopath.first().map(|first| first.join("pkg").join("mod"));

        Self {
            module_root,
            go_mod,
            gopath,
            goroot,
            module_cache,
        }
    }

    pub fn with_module_cache(mut self, module_cache: Option<PathBuf>) -> Self {
        self.module_cache = module_cache;
        self
    }

    /// Build from configuration, filling unset paths from the environment.
    pub fn from_config(config: &SourceConfig) -> Self {
        Self::new(
            config.module_root.clone(),
            config.effective_gopath(),
            config.effective_goroot(),
        )
        .with_module_cache(config.effective_module_cache())
    }

    pub fn module_path(&self) -> Option<&str> {
        self.go_mod.module.as_deref()
    }

    /// Candidate paths in lookup order
    pub fn candidates(&self, file_name: &str) -> Vec<PathBuf> {
        let path = Path::new(file_name);
        if path.is_absolute() {
            return vec![path.to_path_buf()];
        }
        if file_name.starts_with("./") || file_name.starts_with("../") {
            return vec![self.module_root.join(path)];
        }

        let mut candidates = Vec::new();
        if let Some(relative) = self
            .module_path()
            .and_then(|module| strip_path_prefix(file_name, module))
        {
            candidates.push(self.module_root.join(relative));
        }
        candidates.push(self.module_root.join("vendor").join(path));
        if let (Some(cache), Some((requirement, rest))) =
            (&self.module_cache, self.go_mod.requirement_for(file_name))
        {
            let module_dir = format!(
                "{}@{}",
                escape_module_path(&requirement.path),
                escape_module_path(&requirement.version)
            );
            candidates.push(cache.join(module_dir).join(rest));
        }
        for gopath in &self.gopath {
            candidates.push(gopath.join("src").join(path));
        }
        if let Some(goroot) = &self.goroot {
            candidates.push(goroot.join("src").join(path));
        }
        candidates.push(self.module_root.join(path));
        candidates
    }
}

impl SourceResolver for GoSourceLocator {
    fn resolve(&self, file_name: &str) -> Result<PathBuf> {
        let candidates = self.candidates(file_name);
        match candidates.iter().find(|candidate| candidate.is_file()) {
            Some(found) => {
                debug!("Resolved {} -> {}", file_name, found.display());
                Ok(found.clone())
            }
            None => Err(CoverError::source_resolution(file_name, candidates)),
        }
    }
}

/// Read `<root>/go.mod`; a missing file yields an empty description.
fn read_go_mod(root: &Path) -> GoModFile {
    let go_mod = root.join("go.mod");
    match fs::read_to_string(&go_mod) {
        Ok(content) => GoModFile::parse(&content),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => GoModFile::default(),
        Err(err) => {
            warn!("Failed to read {}: {}", go_mod.display(), err);
            GoModFile::default()
        }
    }
}

fn directive_argument<'a>(line: &'a str, directive: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(directive)?;
    if !rest.starts_with(char::is_whitespace) && !rest.starts_with('(') {
        return None;
    }
    Some(rest.trim())
}

fn parse_requirement(text: &str) -> Option<ModuleRequirement> {
    let mut fields = text.split_whitespace();
    let path = unquote(fields.next()?);
    let version = unquote(fields.next()?);
    (!path.is_empty() && !version.is_empty()).then(|| ModuleRequirement {
        path: path.to_string(),
        version: version.to_string(),
    })
}

fn unquote(text: &str) -> &str {
    text.trim_matches(|c| c == '"' || c == '`')
}

/// `rest` when `path` is `prefix/rest`
fn strip_path_prefix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    path.strip_prefix(prefix)?.strip_prefix('/')
}

/// Module cache directory escaping: each upper-case letter becomes `!` plus
/// its lower-case form.
fn escape_module_path(path: &str) -> String {
    let mut escaped = String::with_capacity(path.len());
    for c in path.chars() {
        if c.is_ascii_uppercase() {
            escaped.push('!');
            escaped.push(c.to_ascii_lowercase());
        } else {
            escaped.push(c);
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn module_fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(
            &dir.path().join("go.mod"),
            "module example.com/greeter\n\ngo 1.21\n",
        );
        write(&dir.path().join("main.go"), "package main\n");
        write(&dir.path().join("internal/util/util.go"), "package util\n");
        dir
    }

    #[test]
    fn test_parse_module_directive_variants() {
        let module = |content: &str| GoModFile::parse(content).module;
        assert_eq!(
            module("module example.com/a\n"),
            Some("example.com/a".to_string())
        );
        assert_eq!(
            module("// header\nmodule \"example.com/b\" // trailing\n"),
            Some("example.com/b".to_string())
        );
        assert_eq!(module("modules are fun\n"), None);
        assert_eq!(module("go 1.21\n"), None);
    }

    #[test]
    fn test_parse_require_directives() {
        let go_mod = GoModFile::parse(
            "module example.com/app\n\
             \n\
             require github.com/single/dep v1.2.3\n\
             \n\
             require (\n\
             \tgithub.com/Azure/go-autorest v14.2.0+incompatible\n\
             \tgolang.org/x/tools v0.21.0 // indirect\n\
             )\n",
        );

        assert_eq!(go_mod.module.as_deref(), Some("example.com/app"));
        let requires: Vec<_> = go_mod
            .requires
            .iter()
            .map(|r| (r.path.as_str(), r.version.as_str()))
            .collect();
        assert_eq!(
            requires,
            vec![
                ("github.com/single/dep", "v1.2.3"),
                ("github.com/Azure/go-autorest", "v14.2.0+incompatible"),
                ("golang.org/x/tools", "v0.21.0"),
            ]
        );
    }

    #[test]
    fn test_escape_module_path() {
        assert_eq!(
            escape_module_path("github.com/Azure/go-autorest"),
            "github.com/!azure/go-autorest"
        );
        assert_eq!(escape_module_path("golang.org/x/tools"), "golang.org/x/tools");
    }

    #[test]
    fn test_resolves_module_import_paths() {
        let dir = module_fixture();
        let locator = GoSourceLocator::new(dir.path(), Vec::new(), None);
        assert_eq!(locator.module_path(), Some("example.com/greeter"));

        assert_eq!(
            locator.resolve("example.com/greeter/main.go").unwrap(),
            dir.path().join("main.go")
        );
        assert_eq!(
            locator
                .resolve("example.com/greeter/internal/util/util.go")
                .unwrap(),
            dir.path().join("internal/util/util.go")
        );
    }

    #[test]
    fn test_module_prefix_must_end_at_path_separator() {
        let dir = module_fixture();
        let locator = GoSourceLocator::new(dir.path(), Vec::new(), None);
        let candidates = locator.candidates("example.com/greeterx/main.go");
        assert!(!candidates.contains(&dir.path().join("x/main.go")));
        assert!(locator.resolve("example.com/greeterx/main.go").is_err());
    }

    #[test]
    fn test_resolves_vendored_dependency() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join("go.mod"), "module example.com/app\n");
        let vendored = dir.path().join("vendor/github.com/dep/pkg/file.go");
        write(&vendored, "package pkg\n");

        let locator = GoSourceLocator::new(dir.path(), Vec::new(), None);
        assert_eq!(locator.resolve("github.com/dep/pkg/file.go").unwrap(), vendored);
    }

    #[test]
    fn test_resolves_dependency_from_module_cache() {
        let dir = TempDir::new().unwrap();
        write(
            &dir.path().join("go.mod"),
            "module example.com/app\n\n\
             require (\n\
             \tgithub.com/Acme/tool v1.4.0\n\
             \tgithub.com/Acme/tool/v2 v2.0.1\n\
             )\n",
        );
        let cache = TempDir::new().unwrap();
        let cached = cache
            .path()
            .join("github.com/!acme/tool/v2@v2.0.1/internal/run.go");
        write(&cached, "package internal\n");

        let locator = GoSourceLocator::new(dir.path(), Vec::new(), None)
            .with_module_cache(Some(cache.path().to_path_buf()));
        assert_eq!(
            locator.resolve("github.com/Acme/tool/v2/internal/run.go").unwrap(),
            cached
        );

        let v1 = locator.candidates("github.com/Acme/tool/cmd/main.go");
        assert!(v1.contains(&cache.path().join("github.com/!acme/tool@v1.4.0/cmd/main.go")));
    }

    #[test]
    fn test_module_cache_defaults_under_first_gopath() {
        let dir = TempDir::new().unwrap();
        write(
            &dir.path().join("go.mod"),
            "module example.com/app\nrequire golang.org/x/text v0.14.0\n",
        );
        let gopath = TempDir::new().unwrap();
        let cached = gopath
            .path()
            .join("pkg/mod/golang.org/x/text@v0.14.0/language/tags.go");
        write(&cached, "package language\n");

        let locator = GoSourceLocator::new(dir.path(), vec![gopath.path().to_path_buf()], None);
        assert_eq!(
            locator.resolve("golang.org/x/text/language/tags.go").unwrap(),
            cached
        );
    }

    #[test]
    fn test_resolves_through_gopath() {
        let gopath = TempDir::new().unwrap();
        let file = gopath.path().join("src/github.com/acme/tool/tool.go");
        write(&file, "package tool\n");

        let root = TempDir::new().unwrap();
        let locator = GoSourceLocator::new(root.path(), vec![gopath.path().to_path_buf()], None);
        assert_eq!(locator.resolve("github.com/acme/tool/tool.go").unwrap(), file);
    }

    #[test]
    fn test_resolves_absolute_and_relative_names() {
        let dir = module_fixture();
        let locator = GoSourceLocator::new(dir.path(), Vec::new(), None);

        let absolute = dir.path().join("main.go");
        assert_eq!(
            locator.resolve(absolute.to_str().unwrap()).unwrap(),
            absolute
        );
        assert_eq!(
            locator.resolve("./main.go").unwrap(),
            dir.path().join("./main.go")
        );
    }

    #[test]
    fn test_missing_file_lists_candidates() {
        let dir = module_fixture();
        let gopath = TempDir::new().unwrap();
        let locator = GoSourceLocator::new(
            dir.path(),
            vec![gopath.path().to_path_buf()],
            Some(PathBuf::from("/usr/local/go")),
        );

        let err = locator.resolve("example.com/greeter/missing.go").unwrap_err();
        match err {
            CoverError::SourceResolution {
                file_name,
                candidates,
            } => {
                assert_eq!(file_name, "example.com/greeter/missing.go");
                assert_eq!(
                    candidates,
                    vec![
                        dir.path().join("missing.go"),
                        dir.path().join("vendor/example.com/greeter/missing.go"),
                        gopath.path().join("src/example.com/greeter/missing.go"),
                        PathBuf::from("/usr/local/go/src/example.com/greeter/missing.go"),
                        dir.path().join("example.com/greeter/missing.go"),
                    ]
                );
            }
            other => panic!("Expected SourceResolution, got {other:?}"),
        }
    }
}
