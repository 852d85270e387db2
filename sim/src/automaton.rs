use crate::action::ActionFlags;
use crate::event::{EventKind, InputEvent};
use common::chain::Chain;
use std::collections::VecDeque;

/// Caller-chosen state label. Several states may share one.
pub type StateId = u8;

/// Identity of a state inside its automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateRef(u32);

impl StateRef {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Transition {
    kind: EventKind,
    symbol: i32,
    actions: ActionFlags,
    to: StateRef,
}

#[derive(Debug, Clone)]
struct State {
    id: StateId,
    // Newest first; the first match wins.
    transitions: Chain<Transition>,
}

impl State {
    fn new(id: StateId) -> Self {
        State {
            id,
            transitions: Chain::new(),
        }
    }
}

/// Per-entity state machine driven by input events.
///
/// States are kept in an arena and never freed individually; the live states
/// are the ones reachable from the current state.
#[derive(Debug, Clone)]
pub struct Automaton {
    states: Vec<State>,
    current: StateRef,
}

impl Default for Automaton {
    fn default() -> Self {
        Self::new()
    }
}

impl Automaton {
    /// A single state with id 0 and no transitions.
    pub fn new() -> Self {
        Automaton {
            states: vec![State::new(0)],
            current: StateRef(0),
        }
    }

    pub fn current(&self) -> StateRef {
        self.current
    }

    pub fn current_id(&self) -> StateId {
        self.id_of(self.current)
    }

    pub fn id_of(&self, state: StateRef) -> StateId {
        self.states[state.index()].id
    }

    pub fn transition_count(&self, state: StateRef) -> usize {
        self.states[state.index()].transitions.len()
    }

    /// Destinations of the transitions leaving `state`, newest first.
    pub fn successors(&self, state: StateRef) -> impl Iterator<Item = StateRef> + '_ {
        self.states[state.index()].transitions.iter().map(|transition| transition.to)
    }

    /// Every state reachable from the current one, the current one included,
    /// each exactly once.
    pub fn reachable_states(&self) -> Chain<StateRef> {
        let mut reachable = Chain::new();
        let mut visited = vec![false; self.states.len()];
        let mut queue = VecDeque::new();

        visited[self.current.index()] = true;
        reachable.push(self.current);
        queue.push_back(self.current);
        while let Some(state) = queue.pop_front() {
            for transition in self.states[state.index()].transitions.iter() {
                let to = transition.to;
                if !visited[to.index()] {
                    visited[to.index()] = true;
                    reachable.push(to);
                    queue.push_back(to);
                }
            }
        }
        reachable
    }

    /// Adds `from --(kind, symbol)/actions--> to` to every reachable state
    /// labelled `from`.
    ///
    /// The destination is the reachable state labelled `to`, or a fresh one.
    /// Returns how many states received the transition. When no reachable
    /// state is labelled `from` nothing changes and 0 is returned.
    pub fn add_transition(
        &mut self,
        from: StateId,
        kind: EventKind,
        symbol: i32,
        actions: ActionFlags,
        to: StateId,
    ) -> usize {
        let reachable = self.reachable_states();
        let sources: Vec<StateRef> = reachable
            .iter()
            .copied()
            .filter(|state| self.id_of(*state) == from)
            .collect();
        if sources.is_empty() {
            log::warn!(
                "transition {} -> {} on {:?}/{} dropped: no reachable state {}",
                from,
                to,
                kind,
                symbol,
                from
            );
            return 0;
        }

        let existing = reachable.iter().copied().find(|state| self.id_of(*state) == to);
        let target = match existing {
            Some(target) => target,
            None => {
                self.states.push(State::new(to));
                StateRef((self.states.len() - 1) as u32)
            }
        };

        let transition = Transition {
            kind,
            symbol,
            actions,
            to: target,
        };
        for source in sources.iter() {
            self.states[source.index()].transitions.push(transition);
        }
        sources.len()
    }

    /// Takes the newest transition of the current state matching `event`,
    /// moves to its destination and returns its actions. No match leaves the
    /// state alone and returns no actions.
    pub fn fire(&mut self, event: &InputEvent) -> ActionFlags {
        let matched = self.states[self.current.index()]
            .transitions
            .iter()
            .find(|transition| event.matches(transition.kind, transition.symbol))
            .copied();
        match matched {
            Some(transition) => {
                self.current = transition.to;
                transition.actions
            }
            None => ActionFlags::NONE,
        }
    }
}
