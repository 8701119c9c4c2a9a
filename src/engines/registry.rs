//! Engine registry for managing available search engines

use super::traits::Engine;
use crate::error::SearchError;
use crate::results::Category;
use once_cell::sync::OnceCell;
use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Builds an engine instance on first use
pub type EngineFactory = Box<dyn Fn() -> Result<Arc<dyn Engine>, SearchError> + Send + Sync>;

/// Engine that is always moved to the front of automatic text selections
const PINNED_TEXT_ENGINE: &str = "wikipedia";

struct Entry {
    name: String,
    factory: EngineFactory,
    instance: OnceCell<Arc<dyn Engine>>,
    /// Settings override for the engine's own `disabled()`
    disabled: Option<bool>,
}

impl Entry {
    /// The shared instance, built on first call
    fn instance(&self) -> Result<&Arc<dyn Engine>, SearchError> {
        self.instance.get_or_try_init(|| {
            debug!("Initializing engine: {}", self.name);
            (self.factory)()
        })
    }

    fn is_disabled(&self) -> Result<bool, SearchError> {
        match self.disabled {
            Some(disabled) => Ok(disabled),
            None => Ok(self.instance()?.disabled()),
        }
    }
}

/// Registry of all available search engines, per category.
///
/// Each entry holds one lazily built instance that is shared by every search
/// for the life of the registry.
#[derive(Default)]
pub struct EngineRegistry {
    entries: BTreeMap<Category, Vec<Entry>>,
}

impl EngineRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an engine constructor under `name` in `category`.
    /// A later registration with the same name replaces the earlier one.
    pub fn register<F>(&mut self, name: impl Into<String>, category: Category, factory: F)
    where
        F: Fn() -> Result<Arc<dyn Engine>, SearchError> + Send + Sync + 'static,
    {
        let name = name.into();
        let entries = self.entries.entry(category).or_default();
        entries.retain(|e| e.name != name);
        entries.push(Entry {
            name,
            factory: Box::new(factory),
            instance: OnceCell::new(),
            disabled: None,
        });
    }

    /// Register an already built engine
    pub fn register_engine(&mut self, engine: Arc<dyn Engine>) {
        let name = engine.name().to_string();
        let category = engine.category();
        let instance = OnceCell::with_value(engine.clone());
        let entries = self.entries.entry(category).or_default();
        entries.retain(|e| e.name != name);
        entries.push(Entry {
            name,
            factory: Box::new(move || Ok(engine.clone())),
            instance,
            disabled: None,
        });
    }

    /// Override an engine's disabled flag. Returns `false` if it is not registered.
    pub fn set_disabled(&mut self, name: &str, category: Category, disabled: bool) -> bool {
        match self
            .entries
            .get_mut(&category)
            .and_then(|entries| entries.iter_mut().find(|e| e.name == name))
        {
            Some(entry) => {
                entry.disabled = Some(disabled);
                true
            }
            None => false,
        }
    }

    /// Names of the enabled engines in a category, in registration order
    pub fn names(&self, category: Category) -> Result<Vec<&str>, SearchError> {
        let mut names = Vec::new();
        for entry in self.entries.get(&category).into_iter().flatten() {
            if !entry.is_disabled()? {
                names.push(entry.name.as_str());
            }
        }
        Ok(names)
    }

    /// Categories with at least one registered engine
    pub fn categories(&self) -> Vec<Category> {
        self.entries.keys().copied().collect()
    }

    /// Check if an engine exists
    pub fn contains(&self, name: &str, category: Category) -> bool {
        self.entries
            .get(&category)
            .map(|entries| entries.iter().any(|e| e.name == name))
            .unwrap_or(false)
    }

    /// Get number of registered engines
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve a backend selector into the engines to consult, in order.
    ///
    /// `selector` is `auto`, `all` or a comma-separated list of names.
    /// Unknown or disabled names fall back to `auto`.
    pub fn resolve(
        &self,
        category: Category,
        selector: &str,
    ) -> Result<Vec<Arc<dyn Engine>>, SearchError> {
        self.resolve_with_rng(category, selector, &mut rand::thread_rng())
    }

    pub fn resolve_with_rng<R: Rng + ?Sized>(
        &self,
        category: Category,
        selector: &str,
        rng: &mut R,
    ) -> Result<Vec<Arc<dyn Engine>>, SearchError> {
        let Some(entries) = self.entries.get(&category) else {
            return Ok(Vec::new());
        };

        let mut enabled = Vec::with_capacity(entries.len());
        for entry in entries {
            if !entry.is_disabled()? {
                enabled.push(entry);
            }
        }

        let selector = selector.to_ascii_lowercase();
        let names: Vec<&str> = selector
            .split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .collect();

        let mut selected: Vec<&Entry> = Vec::new();
        if names.is_empty() || names.iter().any(|n| *n == "auto" || *n == "all") {
            selected = enabled;
            selected.shuffle(rng);
            if category == Category::Text {
                if let Some(pos) = selected.iter().position(|e| e.name == PINNED_TEXT_ENGINE) {
                    let pinned = selected.remove(pos);
                    selected.insert(0, pinned);
                }
            }
        } else {
            for name in names {
                match enabled.iter().find(|e| e.name == name) {
                    Some(&entry) => {
                        if !selected.iter().any(|e| e.name == entry.name) {
                            selected.push(entry);
                        }
                    }
                    None => {
                        let available: Vec<&str> = enabled.iter().map(|e| e.name.as_str()).collect();
                        warn!(
                            "Unknown or disabled {} engine '{}'. Available: {}. Using 'auto'",
                            category,
                            name,
                            available.join(", ")
                        );
                        return self.resolve_with_rng(category, "auto", rng);
                    }
                }
            }
        }

        let mut engines = Vec::with_capacity(selected.len());
        for entry in selected {
            engines.push(entry.instance()?.clone());
        }

        // Stable: equal priorities keep the order above
        engines.sort_by(|a, b| {
            b.priority()
                .partial_cmp(&a.priority())
                .unwrap_or(Ordering::Equal)
        });
        Ok(engines)
    }
}
