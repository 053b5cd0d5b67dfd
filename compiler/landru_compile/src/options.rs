//! Compiler configuration.

/// Libraries the engine's standard registry provides.
pub const STANDARD_LIBRARIES: &[&str] = &["io", "math", "time"];

/// Options controlling compilation.
#[derive(Clone, Debug)]
pub struct CompileOptions {
    /// Library names `(require ...)` accepts.
    libraries: Vec<String>,
    /// Collect `UnreachableInstructions` warnings.
    warn_unreachable: bool,
}

impl CompileOptions {
    /// Standard libraries allowed, warnings on.
    pub fn new() -> Self {
        CompileOptions {
            libraries: STANDARD_LIBRARIES.iter().map(|s| (*s).to_string()).collect(),
            warn_unreachable: true,
        }
    }

    /// Allow an additional library name.
    #[must_use]
    pub fn with_library(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.libraries.contains(&name) {
            self.libraries.push(name);
        }
        self
    }

    /// Start from an empty allow-list.
    #[must_use]
    pub fn without_standard_libraries(mut self) -> Self {
        self.libraries.clear();
        self
    }

    #[must_use]
    pub fn warn_unreachable(mut self, enabled: bool) -> Self {
        self.warn_unreachable = enabled;
        self
    }

    /// Whether `(require name)` is accepted.
    pub fn allows(&self, name: &str) -> bool {
        self.libraries.iter().any(|l| l == name)
    }

    pub fn warns_unreachable(&self) -> bool {
        self.warn_unreachable
    }
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self::new()
    }
}
