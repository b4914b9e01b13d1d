//! The fixed rule set applied to every plugin directory.
//!
//! Each rule is a plain function from a [`PluginSource`] to a
//! [`CheckResult`]. [`CHECKS`] is the ordered registry the validator walks;
//! rules share no state and can be called and tested on their own.
//!
//! Rules differ in strictness on purpose. Structural files, lifecycle hooks
//! and hook coverage must be complete. Platform variables only need one hit,
//! since most plugins touch a small part of the `kong.*` PDK.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::source::{PluginSource, HANDLER_FILE};

/// Files every plugin directory must contain.
pub const REQUIRED_FILES: &[&str] = &[
    HANDLER_FILE,
    "schema.lua",
    "daos.lua",
    "access.lua",
    "init.lua",
    "LICENSE",
    "README.md",
];

/// Lifecycle hooks a handler must define.
pub const LIFECYCLE_HOOKS: &[&str] = &[
    "init_worker",
    "access",
    "header_filter",
    "body_filter",
    "log",
    "certificate",
    "rewrite",
];

/// Hook names that must at least be mentioned somewhere in the handler.
pub const ESSENTIAL_FUNCTIONS: &[&str] = &[
    "access",
    "init_worker",
    "header_filter",
    "body_filter",
    "log",
    "certificate",
    "rewrite",
];

/// Kong PDK namespaces; one of them is enough.
pub const PLATFORM_VARIABLES: &[&str] = &[
    "kong.ctx",
    "kong.request",
    "kong.response",
    "kong.service",
    "kong.log",
    "kong.db",
    "kong.configuration",
    "kong.router",
    "kong.cache",
    "kong.cluster",
    "kong.worker_events",
];

/// Raw nginx calls that are not supported on Kong 3.x.
pub const DEPRECATED_APIS: &[&str] = &["ngx.req.get_headers", "ngx.req.get_uri_args"];

/// Calls a 3.x compatible handler is expected to use.
pub const REQUIRED_APIS: &[&str] = &["kong.ctx", "kong.request"];

/// Validation category, one per rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Required files are present.
    Structure,
    /// Lifecycle hook functions are declared.
    LifecycleHooks,
    /// Kong PDK namespaces are referenced.
    PlatformVariables,
    /// No deprecated calls, some 3.x calls.
    VersionCompatibility,
    /// Hook names appear in the handler.
    FunctionalityCoverage,
}

impl Category {
    /// Stable snake_case name, as used in reports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Structure => "structure",
            Category::LifecycleHooks => "lifecycle_hooks",
            Category::PlatformVariables => "platform_variables",
            Category::VersionCompatibility => "version_compatibility",
            Category::FunctionalityCoverage => "functionality_coverage",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    /// Presence of every item the rule looks for.
    pub found: BTreeMap<String, bool>,
    /// Items that were looked for and not found, in rule order.
    pub missing: Vec<String>,
    /// Deprecated calls detected (version compatibility only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated_found: Option<Vec<String>>,
    /// Verdict under the rule's own policy.
    pub valid: bool,
}

impl CheckResult {
    /// Tally `items` with `present`, keeping the missing ones in order.
    fn tally(items: &[&str], present: impl Fn(&str) -> bool) -> Self {
        let mut found = BTreeMap::new();
        let mut missing = Vec::new();
        for item in items {
            let ok = present(item);
            if !ok {
                missing.push((*item).to_string());
            }
            found.insert((*item).to_string(), ok);
        }
        Self {
            found,
            missing,
            deprecated_found: None,
            valid: false,
        }
    }

    fn with_valid(mut self, valid: bool) -> Self {
        self.valid = valid;
        self
    }
}

/// Signature shared by every rule.
pub type CheckFn = fn(&PluginSource) -> CheckResult;

/// Ordered rule registry.
pub const CHECKS: &[(Category, CheckFn)] = &[
    (Category::Structure, check_structure),
    (Category::LifecycleHooks, check_lifecycle_hooks),
    (Category::PlatformVariables, check_platform_variables),
    (Category::VersionCompatibility, check_version_compatibility),
    (Category::FunctionalityCoverage, check_functionality_coverage),
];

/// Every file in [`REQUIRED_FILES`] exists.
#[must_use]
pub fn check_structure(src: &PluginSource) -> CheckResult {
    let result = CheckResult::tally(REQUIRED_FILES, |f| src.has_file(f));
    let valid = result.missing.is_empty();
    result.with_valid(valid)
}

/// Every hook in [`LIFECYCLE_HOOKS`] is declared as a function.
#[must_use]
pub fn check_lifecycle_hooks(src: &PluginSource) -> CheckResult {
    let result = CheckResult::tally(LIFECYCLE_HOOKS, |h| src.defines_function(h));
    let valid = result.missing.is_empty();
    result.with_valid(valid)
}

/// At least one of [`PLATFORM_VARIABLES`] is referenced.
#[must_use]
pub fn check_platform_variables(src: &PluginSource) -> CheckResult {
    let result = CheckResult::tally(PLATFORM_VARIABLES, |v| src.contains(v));
    let valid = result.missing.len() < PLATFORM_VARIABLES.len();
    result.with_valid(valid)
}

/// No [`DEPRECATED_APIS`] call and at least one [`REQUIRED_APIS`] call.
#[must_use]
pub fn check_version_compatibility(src: &PluginSource) -> CheckResult {
    let deprecated: Vec<String> = DEPRECATED_APIS
        .iter()
        .filter(|api| src.contains(api))
        .map(|api| (*api).to_string())
        .collect();

    let mut result = CheckResult::tally(REQUIRED_APIS, |api| src.contains(api));
    for api in DEPRECATED_APIS {
        result
            .found
            .insert((*api).to_string(), deprecated.iter().any(|d| d == api));
    }

    let valid = deprecated.is_empty() && result.missing.len() < REQUIRED_APIS.len();
    result.deprecated_found = Some(deprecated);
    result.with_valid(valid)
}

/// Every name in [`ESSENTIAL_FUNCTIONS`] occurs somewhere in the handler.
#[must_use]
pub fn check_functionality_coverage(src: &PluginSource) -> CheckResult {
    let result = CheckResult::tally(ESSENTIAL_FUNCTIONS, |f| src.contains(f));
    let valid = result.missing.is_empty();
    result.with_valid(valid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn handler(text: &str) -> PluginSource {
        PluginSource::from_handler(Path::new("plugin"), Some(text.to_string()))
    }

    fn no_handler() -> PluginSource {
        PluginSource::from_handler(Path::new("plugin"), None)
    }

    fn all_hooks_defined() -> String {
        LIFECYCLE_HOOKS
            .iter()
            .map(|h| format!("function Handler.{h}(self, conf)\nend\n"))
            .collect()
    }

    #[test]
    fn registry_order_is_stable() {
        let names: Vec<&str> = CHECKS.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(
            names,
            [
                "structure",
                "lifecycle_hooks",
                "platform_variables",
                "version_compatibility",
                "functionality_coverage",
            ]
        );
    }

    // ── structure ───────────────────────────────────────────────────

    #[test]
    fn structure_empty_dir_misses_everything() {
        let dir = tempdir().unwrap();
        let src = PluginSource::load(dir.path()).unwrap();
        let result = check_structure(&src);
        assert!(!result.valid);
        assert_eq!(result.missing, REQUIRED_FILES);
    }

    #[test]
    fn structure_all_files_present() {
        let dir = tempdir().unwrap();
        for name in REQUIRED_FILES {
            fs::write(dir.path().join(name), "-- dummy").unwrap();
        }
        let src = PluginSource::load(dir.path()).unwrap();
        let result = check_structure(&src);
        assert!(result.valid);
        assert!(result.missing.is_empty());
        assert!(result.found.values().all(|ok| *ok));
    }

    #[test]
    fn structure_reports_partial_subset() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("handler.lua"), "").unwrap();
        fs::write(dir.path().join("schema.lua"), "").unwrap();
        let src = PluginSource::load(dir.path()).unwrap();
        let result = check_structure(&src);
        assert!(!result.valid);
        assert_eq!(
            result.missing,
            ["daos.lua", "access.lua", "init.lua", "LICENSE", "README.md"]
        );
        assert!(result.found["handler.lua"]);
    }

    #[test]
    fn structure_filename_match_is_exact() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("readme.md"), "").unwrap();
        let src = PluginSource::load(dir.path()).unwrap();
        // Case-insensitive filesystems would see README.md here.
        if !dir.path().join("README.md").exists() {
            assert!(check_structure(&src)
                .missing
                .contains(&"README.md".to_string()));
        }
    }

    // ── lifecycle_hooks ─────────────────────────────────────────────

    #[test]
    fn lifecycle_hooks_all_defined() {
        let result = check_lifecycle_hooks(&handler(&all_hooks_defined()));
        assert!(result.valid, "missing: {:?}", result.missing);
    }

    #[test]
    fn lifecycle_hooks_partial() {
        let result =
            check_lifecycle_hooks(&handler("function access() end\nfunction init_worker() end"));
        assert!(result.found["access"]);
        assert!(result.found["init_worker"]);
        assert!(!result.valid);
        assert_eq!(
            result.missing,
            ["header_filter", "body_filter", "log", "certificate", "rewrite"]
        );
    }

    #[test]
    fn lifecycle_hooks_without_handler() {
        let result = check_lifecycle_hooks(&no_handler());
        assert!(!result.valid);
        assert_eq!(result.missing, LIFECYCLE_HOOKS);
    }

    // ── platform_variables ──────────────────────────────────────────

    #[test]
    fn platform_variables_partial_presence_is_valid() {
        let result = check_platform_variables(&handler("kong.ctx\nkong.request"));
        assert!(result.valid);
        assert_eq!(result.missing.len(), PLATFORM_VARIABLES.len() - 2);
    }

    #[test]
    fn platform_variables_none_present_is_invalid() {
        let result = check_platform_variables(&handler("return {}"));
        assert!(!result.valid);
        assert_eq!(result.missing, PLATFORM_VARIABLES);
    }

    #[test]
    fn platform_variables_without_handler() {
        assert!(!check_platform_variables(&no_handler()).valid);
    }

    // ── version_compatibility ───────────────────────────────────────

    #[test]
    fn version_compatibility_required_without_deprecated() {
        let result = check_version_compatibility(&handler("kong.ctx\nkong.request"));
        assert!(result.valid);
        assert_eq!(result.deprecated_found.as_deref(), Some(&[][..]));
    }

    #[test]
    fn version_compatibility_deprecated_flips_verdict() {
        let result = check_version_compatibility(&handler(
            "kong.ctx\nkong.request\nlocal h = ngx.req.get_headers()",
        ));
        assert!(!result.valid);
        assert_eq!(
            result.deprecated_found.as_deref(),
            Some(&["ngx.req.get_headers".to_string()][..])
        );
        assert!(result.found["ngx.req.get_headers"]);
        assert!(!result.found["ngx.req.get_uri_args"]);
    }

    #[test]
    fn version_compatibility_one_required_suffices() {
        let result = check_version_compatibility(&handler("kong.request.get_header('x')"));
        assert!(result.valid);
        assert_eq!(result.missing, ["kong.ctx"]);
    }

    #[test]
    fn version_compatibility_no_required_is_invalid() {
        let result = check_version_compatibility(&handler("return {}"));
        assert!(!result.valid);
        assert_eq!(result.missing, REQUIRED_APIS);
    }

    #[test]
    fn deprecated_found_only_serialized_for_version_compatibility() {
        let src = handler("kong.ctx");
        let structure = serde_json::to_value(check_structure(&src)).unwrap();
        assert!(structure.get("deprecated_found").is_none());
        let version = serde_json::to_value(check_version_compatibility(&src)).unwrap();
        assert!(version["deprecated_found"].is_array());
    }

    // ── functionality_coverage ──────────────────────────────────────

    #[test]
    fn functionality_coverage_plain_identifiers() {
        let result = check_functionality_coverage(&handler(
            "access\ninit_worker\nheader_filter\nbody_filter\nlog\ncertificate\nrewrite",
        ));
        assert!(result.valid);
    }

    #[test]
    fn functionality_coverage_is_looser_than_hooks() {
        let src = handler("-- access log rewrite certificate init_worker header_filter body_filter");
        assert!(check_functionality_coverage(&src).valid);
        assert!(!check_lifecycle_hooks(&src).valid);
    }

    #[test]
    fn functionality_coverage_without_handler() {
        let result = check_functionality_coverage(&no_handler());
        assert_eq!(result.missing, ESSENTIAL_FUNCTIONS);
    }
}
