//! Command kind → executor dispatch table.

use indexmap::IndexMap;
use skirmish_core::{CommandError, QueuedCommand};

use crate::executors;
use crate::transform::ExecContext;

/// Applies one kind of command.
///
/// Executors mutate only through the [`ExecContext`]. Returning `Err`
/// means the command was not applied; the queue logs it and carries on.
pub trait CommandExecutor {
    /// Apply a single command.
    fn execute(&mut self, cmd: &QueuedCommand, ctx: &mut ExecContext<'_>)
        -> Result<(), CommandError>;

    /// Apply every command of this kind ready in one pass, in order.
    ///
    /// Returns the position and error of each command that failed. The
    /// default calls [`execute`](Self::execute) per command; override it
    /// when a kind can be applied in bulk.
    fn execute_batch(
        &mut self,
        cmds: &[QueuedCommand],
        ctx: &mut ExecContext<'_>,
    ) -> Vec<(usize, CommandError)> {
        cmds.iter()
            .enumerate()
            .filter_map(|(i, cmd)| self.execute(cmd, ctx).err().map(|e| (i, e)))
            .collect()
    }
}

/// Adapts a closure into a [`CommandExecutor`].
///
/// ```
/// use skirmish_core::QueuedCommand;
/// use skirmish_engine::{CommandRegistry, FnExecutor};
///
/// let mut registry = CommandRegistry::new();
/// registry.register(
///     "echo",
///     FnExecutor::new(|cmd: &QueuedCommand, ctx| {
///         ctx.enqueue(cmd.clone());
///         Ok(())
///     }),
/// );
/// assert!(registry.contains("echo"));
/// ```
pub struct FnExecutor<F>(F);

impl<F> FnExecutor<F>
where
    F: FnMut(&QueuedCommand, &mut ExecContext<'_>) -> Result<(), CommandError>,
{
    /// Wrap `f`.
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> CommandExecutor for FnExecutor<F>
where
    F: FnMut(&QueuedCommand, &mut ExecContext<'_>) -> Result<(), CommandError>,
{
    fn execute(
        &mut self,
        cmd: &QueuedCommand,
        ctx: &mut ExecContext<'_>,
    ) -> Result<(), CommandError> {
        (self.0)(cmd, ctx)
    }
}

/// Executors by command kind, in registration order.
#[derive(Default)]
pub struct CommandRegistry {
    executors: IndexMap<String, Box<dyn CommandExecutor>>,
}

impl CommandRegistry {
    /// A registry with no executors.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every standard executor installed.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        executors::register_standard(&mut registry);
        registry
    }

    /// Install `executor` for `kind`, replacing any previous one.
    pub fn register(&mut self, kind: impl Into<String>, executor: impl CommandExecutor + 'static) {
        self.executors.insert(kind.into(), Box::new(executor));
    }

    /// Remove the executor for `kind`.
    pub fn unregister(&mut self, kind: &str) -> bool {
        self.executors.shift_remove(kind).is_some()
    }

    /// Whether `kind` has an executor.
    pub fn contains(&self, kind: &str) -> bool {
        self.executors.contains_key(kind)
    }

    /// Registered kinds.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.executors.keys().map(String::as_str)
    }

    /// Number of registered kinds.
    pub fn len(&self) -> usize {
        self.executors.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.executors.is_empty()
    }

    pub(crate) fn get_mut(&mut self, kind: &str) -> Option<&mut (dyn CommandExecutor + 'static)> {
        self.executors.get_mut(kind).map(|e| e.as_mut())
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("kinds", &self.executors.keys().collect::<Vec<_>>())
            .finish()
    }
}
