//! Type reflector.
//!
//! Maps an [`Input`] (type shape or example value) to a [`Schema`] node by
//! walking a priority-ordered table of [`Rule`]s. The first rule whose
//! matcher accepts the input builds the node; anything no rule claims falls
//! through to a generic object.
//!
//! Default order:
//!
//! ```text
//! union → schema → scalar_type → scalar_value → sequence_value
//!       → mapping_value → mapping_type → sequence_type → enum_type
//!       → (fallback) object
//! ```

mod rules;

use std::sync::LazyLock;

use crate::reflectable::Reflectable;
use crate::schema::{Attributes, Schema};
use crate::shape::Input;

/// Predicate over a reflector input.
pub type Matcher = fn(&Input) -> bool;

/// Node builder for inputs a [`Matcher`] accepted.
pub type Builder = fn(&Reflector, &mut Scope, &Input, Attributes) -> Schema;

/// One matcher→builder entry of the dispatch table.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub matches: Matcher,
    pub build: Builder,
}

impl Rule {
    #[must_use]
    pub const fn new(name: &'static str, matches: Matcher, build: Builder) -> Self {
        Self {
            name,
            matches,
            build,
        }
    }
}

/// Per-call reflection state: the models currently being expanded.
///
/// Re-entering a model already on the stack is a cycle; the reflector emits
/// a `$ref` back-reference instead of recursing.
#[derive(Debug, Default)]
pub struct Scope {
    models: Vec<String>,
}

impl Scope {
    #[must_use]
    pub fn is_expanding(&self, model: &str) -> bool {
        self.models.iter().any(|name| name == model)
    }

    /// Current nesting depth of model expansion.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.models.len()
    }

    fn enter(&mut self, model: &str) {
        self.models.push(model.to_string());
    }

    fn exit(&mut self) {
        self.models.pop();
    }
}

static DEFAULT_REFLECTOR: LazyLock<Reflector> = LazyLock::new(Reflector::new);

/// Reflect `input` with the shared default rule table.
#[must_use]
pub fn reflect(input: impl Into<Input>, overrides: Attributes) -> Schema {
    DEFAULT_REFLECTOR.reflect(input, overrides)
}

/// Priority-ordered rule table plus an object fallback.
#[derive(Debug, Clone)]
pub struct Reflector {
    rules: Vec<Rule>,
    fallback: Rule,
}

impl Reflector {
    /// Reflector with the default rule table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: rules::defaults(),
            fallback: rules::OBJECT_FALLBACK,
        }
    }

    /// Add a rule after the existing ones, still ahead of the fallback.
    pub fn register(&mut self, rule: Rule) -> &mut Self {
        self.rules.push(rule);
        self
    }

    /// Add a rule ahead of every existing one.
    pub fn register_first(&mut self, rule: Rule) -> &mut Self {
        self.rules.insert(0, rule);
        self
    }

    /// Rule names in dispatch order, fallback last.
    #[must_use]
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules
            .iter()
            .chain(std::iter::once(&self.fallback))
            .map(|rule| rule.name)
            .collect()
    }

    /// Reflect `input`, applying `overrides` to the top-level node.
    #[must_use]
    pub fn reflect(&self, input: impl Into<Input>, overrides: Attributes) -> Schema {
        let mut scope = Scope::default();
        self.reflect_in(&mut scope, &input.into(), overrides)
    }

    /// Reflect a [`Reflectable`] type with no overrides.
    #[must_use]
    pub fn reflect_type<T: Reflectable + ?Sized>(&self) -> Schema {
        self.reflect(T::shape(), Attributes::new())
    }

    /// Reflect within an existing scope. Builders use this to recurse.
    #[must_use]
    pub fn reflect_in(&self, scope: &mut Scope, input: &Input, overrides: Attributes) -> Schema {
        let rule = self
            .rules
            .iter()
            .find(|rule| (rule.matches)(input))
            .unwrap_or(&self.fallback);
        tracing::trace!(rule = rule.name, depth = scope.depth(), "reflecting");
        (rule.build)(self, scope, input, overrides)
    }
}

impl Default for Reflector {
    fn default() -> Self {
        Self::new()
    }
}
