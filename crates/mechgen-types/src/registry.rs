//! Id-indexed arena of canonical mechanism templates.
//!
//! Instances never hold a reference to their template; they carry the
//! template's [`MechanismId`] and the merge engine resolves it here. This
//! keeps template ↔ instance correlation stable across renames and across
//! serialization round trips.

use serde::{Deserialize, Serialize};

use crate::model::{Mechanism, MechanismId, MechanismInstance};

/// Arena of mechanism templates, keyed by [`MechanismId`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateRegistry {
    mechanisms: Vec<Mechanism>,
    next_id: u64,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self {
            mechanisms: Vec::new(),
            next_id: 1,
        }
    }

    /// Register a new template. The mechanism's id field is assigned here;
    /// any id the caller put on it is replaced.
    pub fn register(&mut self, mut mechanism: Mechanism) -> MechanismId {
        let id = MechanismId(self.next_id);
        self.next_id += 1;
        mechanism.id = id;
        self.mechanisms.push(mechanism);
        id
    }

    pub fn get(&self, id: MechanismId) -> Option<&Mechanism> {
        self.mechanisms.iter().find(|m| m.id == id)
    }

    pub fn get_mut(&mut self, id: MechanismId) -> Option<&mut Mechanism> {
        self.mechanisms.iter_mut().find(|m| m.id == id)
    }

    /// Templates in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Mechanism> {
        self.mechanisms.iter()
    }

    pub fn len(&self) -> usize {
        self.mechanisms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mechanisms.is_empty()
    }

    /// Deep-clone a template into a named instance ("add to robot").
    ///
    /// Returns `None` if the id is not registered.
    pub fn instantiate(
        &self,
        id: MechanismId,
        instance_name: impl Into<String>,
    ) -> Option<MechanismInstance> {
        self.get(id).map(|template| MechanismInstance {
            name: instance_name.into(),
            mechanism: template.clone(),
        })
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_assigns_distinct_ids() {
        let mut reg = TemplateRegistry::new();
        let a = reg.register(Mechanism::new(MechanismId(0), "arm"));
        let b = reg.register(Mechanism::new(MechanismId(0), "intake"));
        assert_ne!(a, b);
        assert_eq!(reg.get(a).unwrap().name, "arm");
        assert_eq!(reg.get(b).unwrap().name, "intake");
    }

    #[test]
    fn instantiate_deep_clones_with_template_id() {
        let mut reg = TemplateRegistry::new();
        let id = reg.register(Mechanism::new(MechanismId(0), "arm"));

        let inst = reg.instantiate(id, "frontArm").unwrap();
        assert_eq!(inst.name, "frontArm");
        assert_eq!(inst.mechanism.id, id);
        assert_eq!(inst.mechanism.name, "arm");
    }

    #[test]
    fn instantiate_unknown_id_returns_none() {
        let reg = TemplateRegistry::new();
        assert!(reg.instantiate(MechanismId(42), "x").is_none());
    }
}
