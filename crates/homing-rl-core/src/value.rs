//! Tabular action-value function Q(s, a)

use std::collections::HashMap;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{persist, Action, Discretizer, Reward, State};

/// Q-learning coefficients
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QLearningParams {
    /// Learning rate (alpha)
    pub learning_rate: f64,
    /// Discount factor (gamma)
    pub discount: f64,
}

impl Default for QLearningParams {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount: 0.9,
        }
    }
}

/// Value estimates of the four actions in one state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ActionValues([f64; Action::COUNT]);

impl ActionValues {
    /// Value of `action`
    #[must_use]
    pub fn get(&self, action: Action) -> f64 {
        self.0[action.index()]
    }

    /// Overwrite the value of `action`
    pub fn set(&mut self, action: Action, value: f64) {
        self.0[action.index()] = value;
    }

    /// Largest value over all actions
    #[must_use]
    pub fn max(&self) -> f64 {
        self.0.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Action with the largest value; ties go to the earliest action
    #[must_use]
    pub fn best_action(&self) -> Action {
        let mut best = Action::Forward;
        for action in Action::ALL {
            if self.get(action) > self.get(best) {
                best = action;
            }
        }
        best
    }

    /// Iterate `(action, value)` pairs in enumeration order
    pub fn iter(&self) -> impl Iterator<Item = (Action, f64)> + '_ {
        Action::ALL.into_iter().map(move |a| (a, self.get(a)))
    }
}

type TableDocument = IndexMap<String, IndexMap<String, f64>>;

/// Q-table keyed by discretized state.
///
/// Missing entries read as 0.0. [`QTable::update`] is the only way values
/// change.
#[derive(Debug, Clone)]
pub struct QTable {
    entries: HashMap<State, ActionValues>,
    params: QLearningParams,
    discretizer: Discretizer,
}

impl QTable {
    /// Create an empty table
    #[must_use]
    pub fn new(params: QLearningParams, discretizer: Discretizer) -> Self {
        Self {
            entries: HashMap::new(),
            params,
            discretizer,
        }
    }

    /// Learning coefficients in use
    #[must_use]
    pub fn params(&self) -> QLearningParams {
        self.params
    }

    /// Discretizer used to parse persisted keys
    #[must_use]
    pub fn discretizer(&self) -> Discretizer {
        self.discretizer
    }

    /// Value of `(state, action)`, creating a zeroed entry for an unseen state
    pub fn get_value(&mut self, state: State, action: Action) -> f64 {
        self.entries.entry(state).or_default().get(action)
    }

    /// Value of `(state, action)` without touching the table
    #[must_use]
    pub fn peek(&self, state: &State, action: Action) -> f64 {
        self.entries.get(state).map_or(0.0, |values| values.get(action))
    }

    /// `max_a Q(state, a)`, 0.0 for an unseen state
    #[must_use]
    pub fn best_future_value(&self, state: &State) -> f64 {
        self.entries.get(state).map_or(0.0, ActionValues::max)
    }

    /// Greedy action for a visited state
    #[must_use]
    pub fn greedy_action(&self, state: &State) -> Option<Action> {
        self.entries.get(state).map(ActionValues::best_action)
    }

    /// Apply `Q(s,a) += α · (r + γ · max_a' Q(s',a') − Q(s,a))` and return the new value
    pub fn update(&mut self, state: State, action: Action, reward: Reward, next_state: State) -> f64 {
        let max_future = self.best_future_value(&next_state);
        let current = self.get_value(state, action);
        let target = reward.value() + self.params.discount * max_future;
        let updated = current + self.params.learning_rate * (target - current);
        self.entries.entry(state).or_default().set(action, updated);
        debug!(state = %state, action = %action, current, updated, "q update");
        updated
    }

    /// Number of states with an entry
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no state has been visited
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all entries in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (&State, &ActionValues)> {
        self.entries.iter()
    }

    /// Load a table from `path`; a missing file yields an empty table
    pub async fn load(
        path: &Path,
        params: QLearningParams,
        discretizer: Discretizer,
    ) -> crate::Result<Self> {
        let mut table = Self::new(params, discretizer);
        let Some(document) = persist::read_json_if_exists::<TableDocument>(path).await? else {
            debug!(path = %path.display(), "no q-table on disk, starting empty");
            return Ok(table);
        };

        for (key, actions) in document {
            let state = discretizer.parse_key(&key)?;
            let values = table.entries.entry(state).or_default();
            for (name, value) in actions {
                values.set(name.parse()?, value);
            }
        }
        Ok(table)
    }

    /// Write the whole table to `path`, replacing any previous file
    pub async fn save(&self, path: &Path) -> crate::Result<()> {
        persist::write_json_atomic(path, &self.to_document(), false).await
    }

    fn to_document(&self) -> TableDocument {
        let mut states: Vec<_> = self.entries.iter().collect();
        states.sort_by_key(|(state, _)| **state);
        states
            .into_iter()
            .map(|(state, values)| {
                let actions = values
                    .iter()
                    .map(|(action, value)| (action.name().to_string(), value))
                    .collect();
                (state.key(), actions)
            })
            .collect()
    }
}

impl Default for QTable {
    fn default() -> Self {
        Self::new(QLearningParams::default(), Discretizer::default())
    }
}
