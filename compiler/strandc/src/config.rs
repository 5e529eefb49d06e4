//! Compiler configuration.

use strand_async::AsyncConfig;
use strand_diagnostic::DiagnosticConfig;

/// Everything [`compile`](crate::compile) takes besides the program.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CompilerConfig {
    /// Blocking primitives, synchronous allow-list and closed-world flag.
    pub async_config: AsyncConfig,
    pub diagnostics: DiagnosticConfig,
    /// Run the boxing and async analyses on the rayon pool.
    pub parallel: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            async_config: AsyncConfig::default(),
            diagnostics: DiagnosticConfig::default(),
            parallel: true,
        }
    }
}

impl CompilerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_async_config(mut self, async_config: AsyncConfig) -> Self {
        self.async_config = async_config;
        self
    }

    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: DiagnosticConfig) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Trust `name` (`pkg.Func`, `pkg.(*Type).Method`) to be synchronous.
    #[must_use]
    pub fn with_sync(mut self, name: impl Into<String>) -> Self {
        self.async_config.sync_allowlist.push(name.into());
        self
    }

    #[must_use]
    pub fn with_closed_world(mut self, closed_world: bool) -> Self {
        self.async_config.closed_world = closed_world;
        self
    }
}
