//! Engine settings: strict defaults, overridable from the environment and the CLI.

/// Knobs for one [`crate::PatchOrchestrator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOptions {
    /// Try the external tool before the manual parser.
    pub use_external: bool,
    /// Program invoked as `<program> apply`.
    pub external_program: String,
    /// Require context and deleted lines to match the file.
    pub verify_context: bool,
    /// Commit every file or none of them.
    pub atomic: bool,
    /// Compute outcomes without touching the workspace.
    pub dry_run: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            use_external: true,
            external_program: "git".to_string(),
            verify_context: true,
            atomic: true,
            dry_run: false,
        }
    }
}

impl ApplyOptions {
    /// Defaults overridden by `MEND_EXTERNAL`, `MEND_GIT` and `MEND_LENIENT`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut options = Self::default();
        if let Some(v) = lookup("MEND_EXTERNAL").and_then(|v| parse_flag(&v)) {
            options.use_external = v;
        }
        if let Some(program) = lookup("MEND_GIT") {
            let program = program.trim();
            if !program.is_empty() {
                options.external_program = program.to_string();
            }
        }
        if lookup("MEND_LENIENT").and_then(|v| parse_flag(&v)) == Some(true) {
            options = options.lenient();
        }
        options
    }

    /// Skip context checks and write files one by one instead of staging them.
    pub fn lenient(mut self) -> Self {
        self.verify_context = false;
        self.atomic = false;
        self
    }
}

fn parse_flag(v: &str) -> Option<bool> {
    let v = v.trim().to_lowercase();
    match v.as_str() {
        "1" | "on" | "true" => Some(true),
        "0" | "off" | "false" => Some(false),
        _ if v.starts_with('y') => Some(true),
        _ if v.starts_with('n') => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> ApplyOptions {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApplyOptions::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_are_strict() {
        let options = from_pairs(&[]);
        assert_eq!(options, ApplyOptions::default());
        assert!(options.verify_context);
        assert!(options.atomic);
        assert!(options.use_external);
    }

    #[test]
    fn env_overrides() {
        let options = from_pairs(&[
            ("MEND_EXTERNAL", "off"),
            ("MEND_GIT", " /opt/git/bin/git "),
            ("MEND_LENIENT", "yes"),
        ]);
        assert!(!options.use_external);
        assert_eq!(options.external_program, "/opt/git/bin/git");
        assert!(!options.verify_context);
        assert!(!options.atomic);
    }

    #[test]
    fn unknown_flag_values_are_ignored() {
        let options = from_pairs(&[("MEND_EXTERNAL", "maybe"), ("MEND_GIT", "  ")]);
        assert!(options.use_external);
        assert_eq!(options.external_program, "git");
    }
}
