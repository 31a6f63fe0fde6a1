use crate::error::WizardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Pending,
    Active,
    Completed,
}

/// One entry of the step indicator bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepIndicator {
    pub step: u8,
    pub status: StepStatus,
    /// Last validity reported for this step, if any.
    pub valid: Option<bool>,
}

/// Navigation state of the wizard.
///
/// `current_step` is always within `1..=total_steps`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardState {
    current_step: u8,
    total_steps: u8,
    pub is_loading: bool,
    pub pending_step_request: Option<u8>,
    indicators: Vec<StepIndicator>,
}

impl WizardState {
    pub fn new(total_steps: u8) -> Self {
        let total_steps = total_steps.max(1);
        let mut state = Self {
            current_step: 1,
            total_steps,
            is_loading: false,
            pending_step_request: None,
            indicators: (1..=total_steps)
                .map(|step| StepIndicator {
                    step,
                    status: StepStatus::Pending,
                    valid: None,
                })
                .collect(),
        };
        state.refresh_indicators();
        state
    }

    pub fn current_step(&self) -> u8 {
        self.current_step
    }

    pub fn total_steps(&self) -> u8 {
        self.total_steps
    }

    pub fn is_first(&self) -> bool {
        self.current_step == 1
    }

    pub fn is_last(&self) -> bool {
        self.current_step == self.total_steps
    }

    pub fn check_step(&self, step: u8) -> Result<(), WizardError> {
        if (1..=self.total_steps).contains(&step) {
            Ok(())
        } else {
            Err(WizardError::StepOutOfRange {
                step,
                total: self.total_steps,
            })
        }
    }

    /// Moves to `step` and refreshes the indicators. Returns the previous step.
    pub fn set_current(&mut self, step: u8) -> Result<u8, WizardError> {
        self.check_step(step)?;
        let previous = self.current_step;
        self.current_step = step;
        self.refresh_indicators();
        Ok(previous)
    }

    fn refresh_indicators(&mut self) {
        let current = self.current_step;
        for indicator in &mut self.indicators {
            indicator.status = match indicator.step {
                s if s < current => StepStatus::Completed,
                s if s == current => StepStatus::Active,
                _ => StepStatus::Pending,
            };
        }
    }

    pub fn indicators(&self) -> &[StepIndicator] {
        &self.indicators
    }

    pub fn indicator(&self, step: u8) -> Option<&StepIndicator> {
        self.indicators.iter().find(|i| i.step == step)
    }

    pub fn mark_validity(&mut self, step: u8, valid: bool) {
        if let Some(indicator) = self.indicators.iter_mut().find(|i| i.step == step) {
            indicator.valid = Some(valid);
        }
    }

    /// Text rendering of the indicator bar, e.g. `[✓1]─[●2]─[ 3]`.
    pub fn render_indicators(&self) -> String {
        self.indicators
            .iter()
            .map(|i| {
                let mark = match (i.status, i.valid) {
                    (_, Some(false)) => '!',
                    (StepStatus::Completed, _) => '✓',
                    (StepStatus::Active, _) => '●',
                    (StepStatus::Pending, _) => ' ',
                };
                format!("[{}{}]", mark, i.step)
            })
            .collect::<Vec<_>>()
            .join("─")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicators_follow_current_step() {
        let mut state = WizardState::new(5);
        assert_eq!(state.set_current(3), Ok(1));
        let statuses: Vec<_> = state.indicators().iter().map(|i| i.status).collect();
        assert_eq!(
            statuses,
            vec![
                StepStatus::Completed,
                StepStatus::Completed,
                StepStatus::Active,
                StepStatus::Pending,
                StepStatus::Pending
            ]
        );
        assert_eq!(state.render_indicators(), "[✓1]─[✓2]─[●3]─[ 4]─[ 5]");
    }

    #[test]
    fn out_of_range_is_rejected() {
        let mut state = WizardState::new(5);
        assert_eq!(
            state.set_current(6),
            Err(WizardError::StepOutOfRange { step: 6, total: 5 })
        );
        assert!(state.set_current(0).is_err());
        assert_eq!(state.current_step(), 1);
    }
}
