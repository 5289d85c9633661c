use crate::search::{
    states::{int_packer::Bin, IntPacker, State, StateId},
    OperatorId, Result, Task,
};
use segvec::{Linear, SegVec};
use std::{
    collections::HashMap,
    rc::Rc,
    sync::atomic::{AtomicUsize, Ordering},
};

static NEXT_REGISTRY_ID: AtomicUsize = AtomicUsize::new(0);

/// Interns packed states. The registry is the only owner of state buffers,
/// everything else refers to states by [`StateId`].
#[derive(Debug)]
pub struct StateRegistry {
    /// Unique across all registries of the process, see
    /// [`PerStateInformation`](crate::search::states::PerStateInformation).
    id: usize,
    task: Rc<Task>,
    packer: IntPacker,
    buffers: SegVec<Rc<[Bin]>, Linear>,
    registered: HashMap<Rc<[Bin]>, StateId>,
}

impl StateRegistry {
    pub fn new(task: Rc<Task>) -> Result<Self> {
        let packer = IntPacker::new(&task.domain_sizes())?;
        Ok(Self {
            id: NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed),
            task,
            packer,
            buffers: SegVec::new(),
            registered: HashMap::new(),
        })
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn task(&self) -> &Rc<Task> {
        &self.task
    }

    pub fn packer(&self) -> &IntPacker {
        &self.packer
    }

    /// Number of distinct states registered so far.
    pub fn size(&self) -> usize {
        self.buffers.len()
    }

    fn insert(&mut self, buffer: Vec<Bin>) -> StateId {
        let buffer: Rc<[Bin]> = buffer.into();
        if let Some(&id) = self.registered.get(&buffer) {
            return id;
        }
        let id = StateId::new(self.buffers.len());
        self.buffers.push(buffer.clone());
        self.registered.insert(buffer, id);
        id
    }

    fn buffer(&self, id: StateId) -> &[Bin] {
        self.buffers.get(id.index()).expect("Invalid state id")
    }

    pub fn initial_state(&mut self) -> State {
        let buffer = self.packer.pack(&self.task.initial_state);
        let id = self.insert(buffer);
        State::new(self.id, id, self.task.initial_state.clone())
    }

    /// Registers the state from a full assignment of values.
    pub fn register_values(&mut self, values: &[usize]) -> State {
        let buffer = self.packer.pack(values);
        let id = self.insert(buffer);
        State::new(self.id, id, values.to_vec())
    }

    /// Applies `op` to `predecessor`: the predecessor's buffer is copied and
    /// every effect whose conditions hold in the predecessor is written.
    pub fn successor_state(&mut self, predecessor: &State, op: OperatorId) -> State {
        debug_assert_eq!(predecessor.registry_id(), self.id);
        let operator = self.task.operator(op);
        debug_assert!(operator.is_applicable(predecessor.values()));
        let mut buffer = self.buffer(predecessor.id()).to_vec();
        let mut values = predecessor.values().to_vec();
        for effect in &operator.effects {
            if effect.does_fire(predecessor.values()) {
                self.packer
                    .set(&mut buffer, effect.fact.var, effect.fact.value);
                values[effect.fact.var] = effect.fact.value;
            }
        }
        let id = self.insert(buffer);
        State::new(self.id, id, values)
    }

    pub fn lookup_state(&self, id: StateId) -> State {
        State::new(self.id, id, self.packer.unpack(self.buffer(id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn states_are_interned() {
        let task = Rc::new(Task::from_text(SWITCH_SAS_TEXT).unwrap());
        let mut registry = StateRegistry::new(task).unwrap();
        let initial = registry.initial_state();
        assert_eq!(initial.id().index(), 0);
        let up = registry.successor_state(&initial, OperatorId(0));
        assert_eq!(up.values(), &[1, 1, 0]);
        let down = registry.successor_state(&up, OperatorId(1));
        assert_eq!(down.id(), initial.id());
        assert_eq!(registry.size(), 2);
        assert_eq!(registry.lookup_state(up.id()), up);
    }

    #[test]
    fn registry_ids_are_unique_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                std::thread::spawn(|| {
                    (0..50)
                        .map(|_| {
                            let task = Rc::new(Task::from_text(SWITCH_SAS_TEXT).unwrap());
                            StateRegistry::new(task).unwrap().id()
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        let mut ids: Vec<usize> = handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 200);
    }

    #[test]
    fn conditional_effect_is_skipped() {
        let task = Rc::new(Task::from_text(SWITCH_SAS_TEXT).unwrap());
        let mut registry = StateRegistry::new(task).unwrap();
        let broken = registry.register_values(&[0, 0, 1]);
        let up = registry.successor_state(&broken, OperatorId(0));
        assert_eq!(up.values(), &[0, 1, 1]);
    }

    #[test]
    fn registries_have_distinct_ids() {
        let task = Rc::new(Task::from_text(BLOCKS_SAS_TEXT).unwrap());
        let first = StateRegistry::new(task.clone()).unwrap();
        let second = StateRegistry::new(task).unwrap();
        assert_ne!(first.id(), second.id());
    }
}
