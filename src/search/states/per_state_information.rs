use crate::search::states::{State, StateId};

/// Associates a value with every state of one registry, like a map from
/// states to `T` that yields a default for states it has not seen.
///
/// The first state it is used with binds it to that state's registry. When
/// it later sees a state of another registry, all stored entries belong to a
/// registry that is no longer in use, so they are dropped and the information
/// binds to the new registry.
#[derive(Debug, Clone)]
pub struct PerStateInformation<T: Clone> {
    default_value: T,
    registry_id: Option<usize>,
    entries: Vec<T>,
}

impl<T: Clone> PerStateInformation<T> {
    pub fn new(default_value: T) -> Self {
        Self {
            default_value,
            registry_id: None,
            entries: Vec::new(),
        }
    }

    fn bind(&mut self, registry_id: usize) {
        if self.registry_id != Some(registry_id) {
            self.registry_id = Some(registry_id);
            self.entries.clear();
        }
    }

    pub fn get(&self, state: &State) -> &T {
        if self.registry_id != Some(state.registry_id()) {
            return &self.default_value;
        }
        self.get_by_id(state.id())
    }

    /// Looks up an entry of the bound registry.
    pub fn get_by_id(&self, id: StateId) -> &T {
        self.entries
            .get(id.index())
            .unwrap_or(&self.default_value)
    }

    pub fn get_mut(&mut self, state: &State) -> &mut T {
        self.bind(state.registry_id());
        let index = state.id().index();
        if index >= self.entries.len() {
            self.entries.resize(index + 1, self.default_value.clone());
        }
        &mut self.entries[index]
    }

    pub fn set(&mut self, state: &State, value: T) {
        *self.get_mut(state) = value;
    }
}
