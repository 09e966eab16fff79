use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcState {
    Pending,
    Active,
    Completed,
    Skipped,
}

impl ProcState {
    fn icon(&self) -> &'static str {
        match self {
            ProcState::Pending => "⏳",
            ProcState::Active => "🔄",
            ProcState::Completed => "✅",
            ProcState::Skipped => "⏭️",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ProcState::Pending => "Pending",
            ProcState::Active => "Currently analyzing...",
            ProcState::Completed => "Completed",
            ProcState::Skipped => "Skipped",
        }
    }
}

/// Per-procedure progress, kept in source order.
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    order: Vec<String>,
    states: HashMap<String, ProcState>,
}

impl ProgressTracker {
    pub fn new<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut t = Self::default();
        for n in names {
            t.add(n);
        }
        t
    }

    /// Registers a name as pending. A repeated name is marked skipped instead.
    pub fn add(&mut self, name: &str) {
        self.order.push(name.to_string());
        self.states
            .entry(name.to_string())
            .or_insert(ProcState::Pending);
    }

    pub fn set(&mut self, name: &str, state: ProcState) {
        if let Some(s) = self.states.get_mut(name) {
            *s = state;
        }
    }

    pub fn state(&self, name: &str) -> Option<ProcState> {
        self.states.get(name).copied()
    }

    pub fn count(&self, state: ProcState) -> usize {
        self.entries().filter(|(_, s)| *s == state).count()
    }

    pub fn total(&self) -> usize {
        self.order.len()
    }

    /// Entries in registration order. Repeats of an earlier name report as skipped.
    pub fn entries(&self) -> impl Iterator<Item = (&str, ProcState)> + '_ {
        let mut seen = std::collections::HashSet::new();
        self.order.iter().map(move |n| {
            let state = if seen.insert(n.as_str()) {
                self.states.get(n).copied().unwrap_or(ProcState::Pending)
            } else {
                ProcState::Skipped
            };
            (n.as_str(), state)
        })
    }
}

impl fmt::Display for ProgressTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, state)) in self.entries().enumerate() {
            writeln!(f, "{} {}. {} - {}", state.icon(), i + 1, name, state.label())?;
        }
        Ok(())
    }
}
