use std::fmt;

use crate::numeric::{Numeric, NumericKind, StateValue};
use crate::parse::ParsedValue;
use crate::slot::Slot;

type Setter = Box<dyn Fn(Numeric)>;

enum Validator {
    /// The representable range of a kind, checked exactly for whole numbers.
    Range(NumericKind),
    Custom(Box<dyn Fn(f64) -> bool>),
}

impl Validator {
    fn accepts(&self, value: &ParsedValue) -> bool {
        match (self, value.whole) {
            (Validator::Range(kind), Some(whole)) => kind.accepts_whole(whole),
            (Validator::Range(kind), None) => kind.accepts(value.value),
            (Validator::Custom(validator), _) => validator(value.value),
        }
    }
}

/// How wire values for an argument are classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgumentKind {
    /// Only strict integer forms are accepted.
    Integer,
    /// Integer and real forms are accepted alike.
    Real,
}

impl ArgumentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ArgumentKind::Integer => "int",
            ArgumentKind::Real => "float",
        }
    }
}

impl fmt::Display for ArgumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Describes one named argument of a command.
///
/// Arguments are optional unless marked [`ArgumentSpec::required`]. The
/// setter runs at most once per dispatched line and only after the whole
/// line validated.
pub struct ArgumentSpec {
    required: bool,
    value_kind: NumericKind,
    validator: Option<Validator>,
    setter: Setter,
}

impl ArgumentSpec {
    /// Argument writing into `slot`. No predicate is attached.
    pub fn bind<T: StateValue>(slot: &Slot<T>) -> Self {
        let slot = slot.clone();
        Self::from_numeric_setter(T::KIND, move |value| slot.set(T::from_numeric(value)))
    }

    /// Argument of `value_kind` handing accepted values to `setter`.
    pub fn from_setter(value_kind: NumericKind, setter: impl Fn(f64) + 'static) -> Self {
        Self::from_numeric_setter(value_kind, move |value| setter(value.to_f64()))
    }

    /// Argument of `value_kind` handing accepted values, already converted
    /// to that kind, to `setter`.
    pub fn from_numeric_setter(
        value_kind: NumericKind,
        setter: impl Fn(Numeric) + 'static,
    ) -> Self {
        Self {
            required: false,
            value_kind,
            validator: None,
            setter: Box::new(setter),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Attach an acceptance predicate, replacing any previous one.
    pub fn with_validator(mut self, validator: impl Fn(f64) -> bool + 'static) -> Self {
        self.validator = Some(Validator::Custom(Box::new(validator)));
        self
    }

    /// Attach the range predicate of the argument's numeric kind.
    pub fn with_default_validator(mut self) -> Self {
        self.validator = Some(Validator::Range(self.value_kind));
        self
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn kind(&self) -> ArgumentKind {
        self.value_kind.argument_kind()
    }

    pub fn value_kind(&self) -> NumericKind {
        self.value_kind
    }

    pub fn has_validator(&self) -> bool {
        self.validator.is_some()
    }

    /// Evaluate the predicate; arguments without one accept everything.
    pub fn accepts(&self, value: f64) -> bool {
        self.accepts_parsed(&ParsedValue { value, whole: None })
    }

    pub(crate) fn accepts_parsed(&self, value: &ParsedValue) -> bool {
        self.validator
            .as_ref()
            .is_none_or(|validator| validator.accepts(value))
    }

    /// Registration summary, e.g. `optional,int`.
    pub fn describe(&self) -> String {
        let presence = if self.required { "required" } else { "optional" };
        format!("{presence},{}", self.kind())
    }

    pub(crate) fn apply(&self, value: ParsedValue) {
        (self.setter)(Numeric::from_parsed(self.value_kind, value));
    }
}

impl fmt::Debug for ArgumentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgumentSpec")
            .field("required", &self.required)
            .field("value_kind", &self.value_kind)
            .field("validator", &self.validator.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_writes_through_slot() {
        let slot = Slot::new(0i32);
        let spec = ArgumentSpec::bind(&slot);
        assert_eq!(spec.kind(), ArgumentKind::Integer);
        assert!(!spec.is_required());
        spec.apply(ParsedValue { value: 42.0, whole: Some(42) });
        assert_eq!(slot.get(), 42);

        let real = Slot::new(0.0f32);
        let spec = ArgumentSpec::bind(&real).required();
        assert_eq!(spec.kind(), ArgumentKind::Real);
        spec.apply(ParsedValue { value: 2.5, whole: None });
        assert_eq!(real.get(), 2.5);
        assert_eq!(spec.describe(), "required,float");
    }

    #[test]
    fn validators() {
        let slot = Slot::new(0u8);
        let spec = ArgumentSpec::bind(&slot);
        assert!(!spec.has_validator());
        assert!(spec.accepts(1000.0));

        let spec = spec.with_default_validator();
        assert!(spec.accepts(255.0));
        assert!(!spec.accepts(256.0));

        let spec = spec.with_validator(|v| v > 300.0);
        assert!(spec.accepts(1000.0));
        assert!(!spec.accepts(255.0));
    }

    #[test]
    fn default_validator_checks_whole_numbers_exactly() {
        let slot = Slot::new(0i64);
        let spec = ArgumentSpec::bind(&slot).with_default_validator();
        let above = ParsedValue {
            value: 9_223_372_036_854_775_808.0,
            whole: Some(i64::MAX as i128 + 1),
        };
        assert!(!spec.accepts_parsed(&above));

        let exact = ParsedValue {
            value: 9_007_199_254_740_992.0,
            whole: Some(9_007_199_254_740_993),
        };
        assert!(spec.accepts_parsed(&exact));
        spec.apply(exact);
        assert_eq!(slot.get(), 9_007_199_254_740_993);
    }

    #[test]
    fn f64_setter_sees_converted_value() {
        let seen = Slot::new(0.0f64);
        let target = seen.clone();
        let spec = ArgumentSpec::from_setter(NumericKind::U8, move |value| target.set(value));
        spec.apply(ParsedValue { value: 300.0, whole: Some(300) });
        assert_eq!(seen.get(), 255.0);
    }

    #[test]
    fn describe_and_toggle_presence() {
        let slot = Slot::new(false);
        let spec = ArgumentSpec::bind(&slot).required().optional();
        assert_eq!(spec.describe(), "optional,int");
        assert!(format!("{spec:?}").contains("Bool"));
    }
}
