//! Inputs that are not derivable from the program itself.

use rustc_hash::FxHashSet;

/// Standard-library calls that wait on another task.
pub const DEFAULT_BLOCKING_PRIMITIVES: &[&str] = &[
    "sync.(*Mutex).Lock",
    "sync.(*RWMutex).Lock",
    "sync.(*RWMutex).RLock",
    "sync.(*WaitGroup).Wait",
    "sync.(*Cond).Wait",
    "sync.(*Once).Do",
    "time.Sleep",
];

/// Configuration of the async analysis.
///
/// Names are fully qualified the way [`Program::qualified_name`] prints
/// them: `pkg.Func`, `pkg.Type.Method` or `pkg.(*Type).Method`.
///
/// [`Program::qualified_name`]: strand_ir::Program::qualified_name
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AsyncConfig {
    /// Functions that block their caller.
    pub blocking_primitives: Vec<String>,
    /// Functions trusted to be synchronous whatever their body or callees
    /// do. Overrides everything else.
    pub sync_allowlist: Vec<String>,
    /// Every implementation of every interface is in the program. When
    /// false, interface calls and calls through function values of unknown
    /// origin are async.
    pub closed_world: bool,
}

impl Default for AsyncConfig {
    fn default() -> Self {
        AsyncConfig {
            blocking_primitives: DEFAULT_BLOCKING_PRIMITIVES
                .iter()
                .map(|&s| s.to_owned())
                .collect(),
            sync_allowlist: Vec::new(),
            closed_world: true,
        }
    }
}

impl AsyncConfig {
    /// No blocking primitives, empty allow-list, closed world.
    pub fn empty() -> Self {
        AsyncConfig {
            blocking_primitives: Vec::new(),
            sync_allowlist: Vec::new(),
            closed_world: true,
        }
    }

    #[must_use]
    pub fn with_blocking_primitive(mut self, name: impl Into<String>) -> Self {
        self.blocking_primitives.push(name.into());
        self
    }

    #[must_use]
    pub fn with_sync(mut self, name: impl Into<String>) -> Self {
        self.sync_allowlist.push(name.into());
        self
    }

    #[must_use]
    pub fn with_closed_world(mut self, closed_world: bool) -> Self {
        self.closed_world = closed_world;
        self
    }

    pub(crate) fn primitive_set(&self) -> FxHashSet<&str> {
        self.blocking_primitives.iter().map(String::as_str).collect()
    }

    pub(crate) fn allowlist_set(&self) -> FxHashSet<&str> {
        self.sync_allowlist.iter().map(String::as_str).collect()
    }
}
