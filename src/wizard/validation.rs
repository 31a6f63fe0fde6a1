//! Per-step validators and their registry.

use crate::model::FormModel;
use ahash::AHashMap;

pub const MAX_TITLE_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepValidation {
    pub is_valid: bool,
    pub error_message: Option<String>,
}

impl StepValidation {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            error_message: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error_message: Some(message.into()),
        }
    }

    fn from_check(result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Self::valid(),
            Err(message) => Self::invalid(message),
        }
    }
}

/// What a validator can look at.
pub struct ValidationContext<'a> {
    pub model: &'a FormModel,
    /// The last `validation_result` the step's own frame reported, if any.
    pub frame_report: Option<&'a StepValidation>,
}

/// Decides whether one wizard step is complete.
pub trait StepValidator {
    fn step(&self) -> u8;
    fn validate(&self, ctx: &ValidationContext<'_>) -> StepValidation;
    /// Whether the verdict depends on the step frame's own report, so the
    /// host must post `validate` to the frame before it goes away.
    fn asks_frame(&self) -> bool {
        false
    }
}

macro_rules! define_step_validators {
    ( $( ($name:ident, $step:expr, $( asks_frame = $asks:literal, )? |$ctx:ident| $body:expr) ),* $(,)? ) => {
        $(
            pub struct $name;
            impl StepValidator for $name {
                fn step(&self) -> u8 { $step }
                fn validate(&self, $ctx: &ValidationContext<'_>) -> StepValidation { $body }
                $( fn asks_frame(&self) -> bool { $asks } )?
            }
        )*

        fn register_default_validators(registry: &mut AHashMap<u8, Box<dyn StepValidator>>) {
            $( registry.insert($step, Box::new($name)); )*
        }
    };
}

define_step_validators! {
    (BasicInfoValidator, 1, |ctx| {
        let title = ctx.model.title.trim();
        if title.is_empty() {
            StepValidation::invalid("please enter a form title")
        } else if ctx.model.title.chars().count() > MAX_TITLE_CHARS {
            StepValidation::invalid(format!(
                "form title cannot exceed {} characters",
                MAX_TITLE_CHARS
            ))
        } else {
            StepValidation::valid()
        }
    }),
    (FieldListValidator, 2, |ctx| {
        if ctx.model.fields.is_empty() {
            StepValidation::invalid("please add at least one form field")
        } else {
            StepValidation::valid()
        }
    }),
    // Styling is optional; only a negative report from the designer frame fails it.
    (DesignStepValidator, 3, asks_frame = true, |ctx| match ctx.frame_report {
        Some(report) if !report.is_valid => report.clone(),
        _ => StepValidation::valid(),
    }),
    (LogicRulesValidator, 4, |ctx| {
        match ctx.model.dangling_rules().first() {
            Some(rule) => StepValidation::invalid(format!(
                "logic rule '{}' refers to a field that no longer exists",
                rule.id
            )),
            None => StepValidation::valid(),
        }
    }),
    (PublishSettingsValidator, 5, |ctx| {
        StepValidation::from_check(ctx.model.publish_settings.check())
    }),
}

/// Validators keyed by step number. Steps without a validator always pass.
pub struct ValidatorRegistry {
    validators: AHashMap<u8, Box<dyn StepValidator>>,
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        let mut validators = AHashMap::new();
        register_default_validators(&mut validators);
        Self { validators }
    }
}

impl ValidatorRegistry {
    pub fn empty() -> Self {
        Self {
            validators: AHashMap::new(),
        }
    }

    /// Adds a validator, replacing any existing one for the same step.
    pub fn with_validator(mut self, validator: Box<dyn StepValidator>) -> Self {
        self.validators.insert(validator.step(), validator);
        self
    }

    pub fn asks_frame(&self, step: u8) -> bool {
        self.validators.get(&step).is_some_and(|v| v.asks_frame())
    }

    pub fn validate(&self, step: u8, ctx: &ValidationContext<'_>) -> StepValidation {
        self.validators
            .get(&step)
            .map(|v| v.validate(ctx))
            .unwrap_or_else(StepValidation::valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldKind;

    fn check(registry: &ValidatorRegistry, step: u8, model: &FormModel) -> StepValidation {
        registry.validate(
            step,
            &ValidationContext {
                model,
                frame_report: None,
            },
        )
    }

    #[test]
    fn title_rules() {
        let registry = ValidatorRegistry::default();
        let mut model = FormModel::default();
        model.title = "   ".into();
        assert!(!check(&registry, 1, &model).is_valid);
        model.title = "题".repeat(100);
        assert!(check(&registry, 1, &model).is_valid);
        model.title.push('x');
        assert!(!check(&registry, 1, &model).is_valid);
    }

    #[test]
    fn step_two_needs_a_field() {
        let registry = ValidatorRegistry::default();
        let mut model = FormModel::default();
        assert!(!check(&registry, 2, &model).is_valid);
        model.add_field(FieldKind::Text);
        assert!(check(&registry, 2, &model).is_valid);
    }

    #[test]
    fn design_step_uses_frame_report() {
        let registry = ValidatorRegistry::default();
        let model = FormModel::default();
        let report = StepValidation::invalid("no controls");
        let result = registry.validate(
            3,
            &ValidationContext {
                model: &model,
                frame_report: Some(&report),
            },
        );
        assert_eq!(result, report);
        assert!(check(&registry, 3, &model).is_valid);
        assert!(registry.asks_frame(3));
        assert!(!registry.asks_frame(2));
    }

    struct AlwaysFails;

    impl StepValidator for AlwaysFails {
        fn step(&self) -> u8 {
            4
        }
        fn validate(&self, _ctx: &ValidationContext<'_>) -> StepValidation {
            StepValidation::invalid("nope")
        }
    }

    #[test]
    fn custom_validator_replaces_default() {
        let registry = ValidatorRegistry::default().with_validator(Box::new(AlwaysFails));
        let model = FormModel::default();
        assert_eq!(check(&registry, 4, &model), StepValidation::invalid("nope"));
        assert!(check(&registry, 9, &model).is_valid);
        assert!(!registry.asks_frame(4));
    }
}
