//! The common interface every pipeline layer implements.

use crate::{Decision, Message, ValidationContext, WardenError};

/// Stable name of a layer, used in log records and [`BlockOutcome::layer_name`](crate::BlockOutcome).
pub type LayerName = &'static str;

/// A single stage of the validation pipeline.
///
/// A small, closed interface — `{enabled(), name(), validate(msg, ctx) ->
/// Result}` — covers every layer kind, each independently enableable, each
/// returning a [`Decision`]. [`warden-pipeline`] holds an ordered
/// `Vec<Box<dyn Layer>>` and runs them in sequence, short-circuiting on the
/// first [`Decision::Block`].
///
/// # Security Notes
///
/// `validate` must be a pure, CPU-bound function: pattern matching,
/// canonicalization, and policy checks must not suspend. Implementors
/// must not perform I/O or `.await` inside `validate`.
pub trait Layer: Send + Sync {
    /// Stable, human-readable layer name (e.g. `"Layer1-Structure"`).
    fn name(&self) -> LayerName;

    /// Whether this layer is currently enabled. A disabled layer is skipped
    /// entirely by the pipeline (treated as an automatic pass).
    fn enabled(&self) -> bool {
        true
    }

    /// Validates a message against this layer's rules.
    ///
    /// # Errors
    ///
    /// Returns `Err` only for layer-internal failures (e.g. a poisoned lock)
    /// that are distinct from "the message fails validation" — those are
    /// represented as `Ok(Decision::Block(..))`, not an `Err`. The pipeline
    /// converts any `Err` into a `CRITICAL ValidationError` decision.
    fn validate(&self, message: &Message, context: &mut ValidationContext) -> Result<Decision, WardenError>;
}

/// Lets an `Arc<L>` stand in for `Box<dyn Layer>` in a pipeline, so a host
/// can keep its own handle to a layer (e.g. to register L5 validators on a
/// running [`warden-transport`]'s `ContextualLayer`) while the pipeline holds
/// the same instance.
impl<T: Layer + ?Sized> Layer for std::sync::Arc<T> {
    fn name(&self) -> LayerName {
        (**self).name()
    }

    fn enabled(&self) -> bool {
        (**self).enabled()
    }

    fn validate(&self, message: &Message, context: &mut ValidationContext) -> Result<Decision, WardenError> {
        (**self).validate(message, context)
    }
}
