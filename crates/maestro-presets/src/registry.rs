use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::handle::PresetHandle;
use crate::params::PresetParams;
use crate::recipe::{self, PresetRecipe};
use crate::recipes;

/// A table of named, compile-time-registered voice constructors, replacing
/// directory-scan-and-reload discovery with an explicit, deterministic
/// registration call: a recipe either registers or the call fails, there is
/// no partial reload to race against.
pub struct PresetRegistry {
    recipes: Arc<RwLock<HashMap<String, Arc<dyn PresetRecipe>>>>,
}

impl Clone for PresetRegistry {
    fn clone(&self) -> Self {
        Self {
            recipes: Arc::clone(&self.recipes),
        }
    }
}

impl PresetRegistry {
    pub fn empty() -> Self {
        Self {
            recipes: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn register(&self, name: impl Into<String>, recipe: Arc<dyn PresetRecipe>) -> Result<()> {
        let name = name.into();
        let mut guard = self.recipes.write();
        if guard.contains_key(&name) {
            warn!(preset = %name, "duplicate preset registration rejected");
            return Err(Error::DuplicateName(name));
        }
        info!(preset = %name, "registered preset");
        guard.insert(name, recipe);
        Ok(())
    }

    pub fn create(&self, name: &str, params: &PresetParams) -> Result<PresetHandle> {
        let recipe = {
            let guard = self.recipes.read();
            guard
                .get(name)
                .cloned()
                .ok_or_else(|| Error::UnknownPreset(name.to_string()))?
        };
        recipe::play(recipe.as_ref(), params)
    }

    pub fn list_types(&self) -> Vec<String> {
        self.recipes.read().keys().cloned().collect()
    }

    pub fn has_type(&self, name: &str) -> bool {
        self.recipes.read().contains_key(name)
    }

    pub fn params_of(&self, name: &str) -> Option<&'static [&'static str]> {
        self.recipes.read().get(name).map(|recipe| recipe.schema())
    }

    pub fn unregister(&self, name: &str) {
        self.recipes.write().remove(name);
    }

    pub fn clear(&self) {
        self.recipes.write().clear();
    }

    /// Registers every built-in voice. Returns the set of names that were
    /// skipped because something with that name was already registered, the
    /// way a recipe that fails to load is logged and omitted rather than
    /// aborting the whole load.
    pub fn load_all(&self) -> Vec<String> {
        let mut skipped = Vec::new();
        for (name, recipe) in recipes::builtin_recipes() {
            if self.register(name, recipe).is_err() {
                skipped.push(name.to_string());
            }
        }
        skipped
    }

    pub fn reload(&self) -> Vec<String> {
        self.clear();
        self.load_all()
    }
}

impl Default for PresetRegistry {
    fn default() -> Self {
        let registry = Self::empty();
        registry.load_all();
        registry
    }
}
