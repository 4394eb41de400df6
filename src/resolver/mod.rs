//! Remaps paths under a named OneDrive business folder onto the location that
//! folder has on the current machine.
//!
//! The same shared folder is mounted at different places depending on the
//! user account and drive layout, so a path stored by the portal
//! (`C:\Users\alice\OneDrive - Example Corp\Sales\q1.xlsx`) is rewritten to
//! this machine's root (`D:\bob\OneDrive - Example Corp\Sales\q1.xlsx`).

pub mod environment;
pub mod expand;
#[cfg(windows)]
mod registry;

pub use environment::{HostEnvironment, SystemEnvironment};
pub use expand::expand_env_vars;

use crate::shared::RuntimeLog;
use std::path::Path;
use std::sync::OnceLock;

pub const COMMERCIAL_ENV_VAR: &str = "OneDriveCommercial";
pub const CONSUMER_ENV_VAR: &str = "OneDrive";
pub const ENV_VAR_PREFIX: &str = "OneDrive";
pub const MAX_BUSINESS_ACCOUNTS: u32 = 9;

pub struct PathResolver {
    env: Box<dyn HostEnvironment>,
    root_folder: Option<String>,
    root: OnceLock<String>,
    log: RuntimeLog,
}

impl PathResolver {
    pub fn new(root_folder: Option<String>, log: RuntimeLog) -> Self {
        Self::with_environment(Box::new(SystemEnvironment), root_folder, log)
    }

    pub fn with_environment(
        env: Box<dyn HostEnvironment>,
        root_folder: Option<String>,
        log: RuntimeLog,
    ) -> Self {
        Self {
            env,
            root_folder: root_folder
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
            root: OnceLock::new(),
            log,
        }
    }

    pub fn root_folder(&self) -> Option<&str> {
        self.root_folder.as_deref()
    }

    /// The discovered root, if a discovery has succeeded on this instance.
    pub fn cached_root(&self) -> Option<&str> {
        self.root.get().map(String::as_str)
    }

    pub fn expand(&self, path: &str) -> String {
        expand_env_vars(path, |name| self.env.var(name))
    }

    /// Returns a path usable on this machine. Existence of the result is the
    /// caller's concern: an unresolvable path comes back expanded but
    /// otherwise unchanged.
    pub fn resolve(&self, path: &str) -> String {
        if path.is_empty() {
            return String::new();
        }

        let expanded = self.expand(path);
        if Path::new(&expanded).exists() {
            return expanded;
        }

        let Some(root_folder) = self.root_folder.as_deref() else {
            return expanded;
        };
        let Some(suffix_start) = marker_suffix_start(&expanded, root_folder) else {
            return expanded;
        };

        let Some(root) = self.discover_root() else {
            self.log.warn(
                "resolver.unresolved",
                &format!("WARNING: cannot resolve path (no cloud root detected): {expanded}"),
            );
            return expanded;
        };

        let resolved = format!("{root}{}", &expanded[suffix_start..]);
        if Path::new(&resolved).exists() {
            self.log.info(
                "resolver.resolved",
                &format!("resolved {path} -> {resolved} (root {root})"),
            );
        } else {
            self.log.warn(
                "resolver.resolved_missing",
                &format!("WARNING: resolved path does not exist: {path} -> {resolved} (root {root})"),
            );
        }
        resolved
    }

    pub fn resolve_all(&self, paths: &[String]) -> Vec<String> {
        paths.iter().map(|path| self.resolve(path)).collect()
    }

    /// Finds the cloud root folder on this machine; the first success is kept
    /// for the lifetime of the resolver.
    pub fn discover_root(&self) -> Option<String> {
        if let Some(root) = self.root.get() {
            return Some(root.clone());
        }
        let root_folder = self.root_folder.as_deref()?;

        let candidates = self.root_candidates(root_folder);
        self.log.info(
            "resolver.discover",
            &format!("checking {} cloud root candidates", candidates.len()),
        );

        let found = candidates
            .into_iter()
            .map(|candidate| candidate.trim_end_matches(['\\', '/']).to_string())
            .find(|candidate| qualifies_as_root(candidate, root_folder));

        match found {
            Some(root) => {
                self.log
                    .info("resolver.root_found", &format!("cloud root: {root}"));
                Some(self.root.get_or_init(|| root).clone())
            }
            None => {
                self.log
                    .warn("resolver.root_missing", "no cloud root folder found");
                None
            }
        }
    }

    fn root_candidates(&self, root_folder: &str) -> Vec<String> {
        let mut bases = Vec::new();
        bases.extend(self.env.var(COMMERCIAL_ENV_VAR));
        bases.extend(self.env.var(CONSUMER_ENV_VAR));
        bases.extend(
            self.env
                .vars()
                .into_iter()
                .filter(|(key, value)| key.starts_with(ENV_VAR_PREFIX) && !value.is_empty())
                .map(|(_, value)| value),
        );
        bases.extend(self.env.business_account_folders());

        let mut candidates = Vec::with_capacity(bases.len() * 2);
        for base in bases {
            if base.trim().is_empty() {
                continue;
            }
            let joined = Path::new(&base)
                .join(root_folder)
                .to_string_lossy()
                .into_owned();
            candidates.push(base);
            candidates.push(joined);
        }
        candidates
    }
}

fn is_separator(ch: char) -> bool {
    ch == '\\' || ch == '/'
}

fn last_segment(path: &str) -> &str {
    path.rsplit(is_separator).next().unwrap_or(path)
}

fn qualifies_as_root(candidate: &str, root_folder: &str) -> bool {
    last_segment(candidate) == root_folder && Path::new(candidate).is_dir()
}

/// Byte offset right after the first segment equal (ignoring case) to
/// `root_folder` that is preceded by a separator.
fn marker_suffix_start(path: &str, root_folder: &str) -> Option<usize> {
    let wanted = root_folder.to_lowercase();
    let mut segment_start = 0;
    let boundaries = path
        .char_indices()
        .filter(|(_, ch)| is_separator(*ch))
        .map(|(idx, _)| idx)
        .chain(std::iter::once(path.len()));

    for idx in boundaries {
        if segment_start > 0 && path[segment_start..idx].to_lowercase() == wanted {
            return Some(idx);
        }
        segment_start = idx + 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::tempdir;

    const ROOT: &str = "OneDrive - Example Corp";

    #[derive(Default)]
    struct FakeEnv {
        vars: BTreeMap<String, String>,
        accounts: Vec<String>,
    }

    impl HostEnvironment for FakeEnv {
        fn var(&self, name: &str) -> Option<String> {
            self.vars.get(name).cloned()
        }

        fn vars(&self) -> Vec<(String, String)> {
            self.vars
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        }

        fn business_account_folders(&self) -> Vec<String> {
            self.accounts.clone()
        }
    }

    fn resolver(env: FakeEnv) -> PathResolver {
        PathResolver::with_environment(Box::new(env), Some(ROOT.to_string()), RuntimeLog::disabled())
    }

    #[test]
    fn marker_must_be_a_whole_segment() {
        assert_eq!(
            marker_suffix_start(r"C:\Users\a\onedrive - example corp\x.xlsx", ROOT),
            Some(r"C:\Users\a\onedrive - example corp".len())
        );
        assert_eq!(
            marker_suffix_start(r"C:\Users\a\OneDrive - Example Corporate\x", ROOT),
            None
        );
        assert_eq!(marker_suffix_start(r"OneDrive - Example Corp\x", ROOT), None);
        assert_eq!(
            marker_suffix_start("/home/a/OneDrive - Example Corp", ROOT),
            Some("/home/a/OneDrive - Example Corp".len())
        );
    }

    #[test]
    fn remaps_onto_root_found_under_onedrive_variable() {
        let dir = tempdir().expect("tempdir");
        let base = dir.path().join("profile");
        let root = base.join(ROOT);
        fs::create_dir_all(root.join("Sales")).expect("create root");

        let mut env = FakeEnv::default();
        env.vars
            .insert("OneDrive".to_string(), base.display().to_string());
        let resolver = resolver(env);

        let resolved = resolver.resolve(r"C:\Users\other\ONEDRIVE - example corp/Sales/Q1 Plan.xlsx");
        assert_eq!(
            resolved,
            format!("{}/Sales/Q1 Plan.xlsx", root.display())
        );
        assert_eq!(resolver.cached_root(), Some(root.display().to_string().as_str()));
    }

    #[test]
    fn registry_accounts_are_candidates() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path().join(ROOT);
        fs::create_dir_all(&root).expect("create root");

        let env = FakeEnv {
            accounts: vec![root.display().to_string()],
            ..FakeEnv::default()
        };
        let resolver = resolver(env);
        assert_eq!(resolver.discover_root(), Some(root.display().to_string()));
    }

    #[test]
    fn prefixed_variables_cover_additional_accounts() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path().join(ROOT);
        fs::create_dir_all(&root).expect("create root");

        let mut env = FakeEnv::default();
        env.vars
            .insert("OneDrive".to_string(), dir.path().join("personal").display().to_string());
        env.vars
            .insert("OneDriveSecondary".to_string(), root.display().to_string());
        let resolver = resolver(env);
        assert_eq!(resolver.discover_root(), Some(root.display().to_string()));
    }

    #[test]
    fn missing_candidates_do_not_qualify() {
        let dir = tempdir().expect("tempdir");
        let mut env = FakeEnv::default();
        env.vars.insert(
            "OneDriveCommercial".to_string(),
            dir.path().join(ROOT).display().to_string(),
        );
        let resolver = resolver(env);
        assert_eq!(resolver.discover_root(), None);
        assert_eq!(resolver.cached_root(), None);
    }

    #[test]
    fn root_is_cached_after_first_success() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path().join(ROOT);
        fs::create_dir_all(&root).expect("create root");

        let mut env = FakeEnv::default();
        env.vars
            .insert("OneDriveCommercial".to_string(), root.display().to_string());
        let resolver = resolver(env);
        let first = resolver.discover_root().expect("found");
        fs::remove_dir_all(&root).expect("remove root");
        assert_eq!(resolver.discover_root(), Some(first));
    }

    #[test]
    fn without_root_folder_only_expansion_happens() {
        let mut env = FakeEnv::default();
        env.vars.insert("DATA".to_string(), "/srv/data".to_string());
        let resolver =
            PathResolver::with_environment(Box::new(env), None, RuntimeLog::disabled());
        assert_eq!(resolver.resolve("%DATA%/x/OneDrive - Example Corp/y"), "/srv/data/x/OneDrive - Example Corp/y");
    }
}
