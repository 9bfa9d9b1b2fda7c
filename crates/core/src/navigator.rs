/// Index of the question currently shown, bounded by `[0, total_steps - 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepNavigator {
    current: usize,
    total: usize,
}

impl StepNavigator {
    /// `total_steps` of zero yields a navigator that never moves.
    #[must_use]
    pub fn new(total_steps: usize) -> Self {
        Self {
            current: 0,
            total: total_steps,
        }
    }

    #[must_use]
    pub fn current_step(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn total_steps(&self) -> usize {
        self.total
    }

    /// Advance one step; no-op on the last step.
    pub fn next(&mut self) -> bool {
        if self.is_last_step() {
            return false;
        }
        self.current += 1;
        true
    }

    /// Go back one step; no-op on the first step.
    pub fn previous(&mut self) -> bool {
        if self.is_first_step() {
            return false;
        }
        self.current -= 1;
        true
    }

    /// Jump directly to `index`; no-op if it is out of bounds.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index >= self.total {
            return false;
        }
        self.current = index;
        true
    }

    #[must_use]
    pub fn is_first_step(&self) -> bool {
        self.current == 0
    }

    #[must_use]
    pub fn is_last_step(&self) -> bool {
        self.current + 1 >= self.total
    }

    /// Last valid index, `0` when there are no steps.
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.total.saturating_sub(1)
    }
}
