//! The closed set of numeric kinds a protocol value can take.
//!
//! Every kind carries its own acceptance range and rendering. The kind of a
//! bound value is fixed once, at registration time, through [`StateValue`].

use std::fmt;

use serde_json::Value;

use crate::argument::ArgumentKind;
use crate::parse::ParsedValue;

/// Numeric kind of a bound value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericKind {
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
}

impl NumericKind {
    /// Whether values of this kind are whole numbers.
    pub fn is_integer(self) -> bool {
        !matches!(self, NumericKind::F32 | NumericKind::F64)
    }

    /// How an argument bound to this kind classifies wire values.
    pub fn argument_kind(self) -> ArgumentKind {
        if self.is_integer() {
            ArgumentKind::Integer
        } else {
            ArgumentKind::Real
        }
    }

    /// Inclusive representable range, or `None` for real kinds.
    pub fn range(self) -> Option<(f64, f64)> {
        let range = match self {
            NumericKind::Bool => (0.0, 1.0),
            NumericKind::I8 => (i8::MIN as f64, i8::MAX as f64),
            NumericKind::U8 => (0.0, u8::MAX as f64),
            NumericKind::I16 => (i16::MIN as f64, i16::MAX as f64),
            NumericKind::U16 => (0.0, u16::MAX as f64),
            NumericKind::I32 => (i32::MIN as f64, i32::MAX as f64),
            NumericKind::U32 => (0.0, u32::MAX as f64),
            NumericKind::I64 => (i64::MIN as f64, i64::MAX as f64),
            NumericKind::U64 => (0.0, u64::MAX as f64),
            NumericKind::F32 | NumericKind::F64 => return None,
        };
        Some(range)
    }

    /// Default acceptance predicate for this kind.
    ///
    /// `Bool` accepts only 0 and 1, bounded integer kinds accept whole
    /// numbers inside their range, real kinds accept any value.
    pub fn accepts(self, value: f64) -> bool {
        match self.range() {
            Some((min, max)) => value.fract() == 0.0 && value >= min && value <= max,
            None => true,
        }
    }

    /// Exact inclusive range, or `None` for real kinds.
    pub fn whole_range(self) -> Option<(i128, i128)> {
        let range = match self {
            NumericKind::Bool => (0, 1),
            NumericKind::I8 => (i8::MIN.into(), i8::MAX.into()),
            NumericKind::U8 => (0, u8::MAX.into()),
            NumericKind::I16 => (i16::MIN.into(), i16::MAX.into()),
            NumericKind::U16 => (0, u16::MAX.into()),
            NumericKind::I32 => (i32::MIN.into(), i32::MAX.into()),
            NumericKind::U32 => (0, u32::MAX.into()),
            NumericKind::I64 => (i64::MIN.into(), i64::MAX.into()),
            NumericKind::U64 => (0, u64::MAX.into()),
            NumericKind::F32 | NumericKind::F64 => return None,
        };
        Some(range)
    }

    /// Default acceptance predicate evaluated on an exact whole number.
    pub fn accepts_whole(self, value: i128) -> bool {
        self.whole_range()
            .is_none_or(|(min, max)| (min..=max).contains(&value))
    }

    /// Short type name.
    pub fn name(self) -> &'static str {
        match self {
            NumericKind::Bool => "bool",
            NumericKind::I8 => "i8",
            NumericKind::U8 => "u8",
            NumericKind::I16 => "i16",
            NumericKind::U16 => "u16",
            NumericKind::I32 => "i32",
            NumericKind::U32 => "u32",
            NumericKind::I64 => "i64",
            NumericKind::U64 => "u64",
            NumericKind::F32 => "f32",
            NumericKind::F64 => "f64",
        }
    }
}

impl fmt::Display for NumericKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value tagged with its kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Bool(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
}

impl Numeric {
    /// The zero value of `kind`.
    pub fn zero(kind: NumericKind) -> Self {
        Self::from_f64(kind, 0.0)
    }

    /// Convert a canonical wire value into `kind`, saturating at the kind's
    /// bounds. Any non-zero value is `true` for `Bool`.
    pub fn from_f64(kind: NumericKind, value: f64) -> Self {
        match kind {
            NumericKind::Bool => Numeric::Bool(value != 0.0),
            NumericKind::I8 => Numeric::I8(value as i8),
            NumericKind::U8 => Numeric::U8(value as u8),
            NumericKind::I16 => Numeric::I16(value as i16),
            NumericKind::U16 => Numeric::U16(value as u16),
            NumericKind::I32 => Numeric::I32(value as i32),
            NumericKind::U32 => Numeric::U32(value as u32),
            NumericKind::I64 => Numeric::I64(value as i64),
            NumericKind::U64 => Numeric::U64(value as u64),
            NumericKind::F32 => Numeric::F32(value as f32),
            NumericKind::F64 => Numeric::F64(value),
        }
    }

    /// Convert an exact whole number into `kind`, saturating at the kind's
    /// bounds.
    pub fn from_whole(kind: NumericKind, value: i128) -> Self {
        let clamp = |min: i128, max: i128| value.clamp(min, max);
        match kind {
            NumericKind::Bool => Numeric::Bool(value != 0),
            NumericKind::I8 => Numeric::I8(clamp(i8::MIN.into(), i8::MAX.into()) as i8),
            NumericKind::U8 => Numeric::U8(clamp(0, u8::MAX.into()) as u8),
            NumericKind::I16 => Numeric::I16(clamp(i16::MIN.into(), i16::MAX.into()) as i16),
            NumericKind::U16 => Numeric::U16(clamp(0, u16::MAX.into()) as u16),
            NumericKind::I32 => Numeric::I32(clamp(i32::MIN.into(), i32::MAX.into()) as i32),
            NumericKind::U32 => Numeric::U32(clamp(0, u32::MAX.into()) as u32),
            NumericKind::I64 => Numeric::I64(clamp(i64::MIN.into(), i64::MAX.into()) as i64),
            NumericKind::U64 => Numeric::U64(clamp(0, u64::MAX.into()) as u64),
            NumericKind::F32 => Numeric::F32(value as f32),
            NumericKind::F64 => Numeric::F64(value as f64),
        }
    }

    /// Convert a parsed wire value, preferring its exact whole form.
    pub fn from_parsed(kind: NumericKind, value: ParsedValue) -> Self {
        match value.whole {
            Some(whole) => Self::from_whole(kind, whole),
            None => Self::from_f64(kind, value.value),
        }
    }

    /// The canonical wire value.
    pub fn to_f64(self) -> f64 {
        match self {
            Numeric::Bool(v) => {
                if v {
                    1.0
                } else {
                    0.0
                }
            }
            Numeric::I8(v) => v as f64,
            Numeric::U8(v) => v as f64,
            Numeric::I16(v) => v as f64,
            Numeric::U16(v) => v as f64,
            Numeric::I32(v) => v as f64,
            Numeric::U32(v) => v as f64,
            Numeric::I64(v) => v as f64,
            Numeric::U64(v) => v as f64,
            Numeric::F32(v) => v as f64,
            Numeric::F64(v) => v,
        }
    }

    pub fn kind(self) -> NumericKind {
        match self {
            Numeric::Bool(_) => NumericKind::Bool,
            Numeric::I8(_) => NumericKind::I8,
            Numeric::U8(_) => NumericKind::U8,
            Numeric::I16(_) => NumericKind::I16,
            Numeric::U16(_) => NumericKind::U16,
            Numeric::I32(_) => NumericKind::I32,
            Numeric::U32(_) => NumericKind::U32,
            Numeric::I64(_) => NumericKind::I64,
            Numeric::U64(_) => NumericKind::U64,
            Numeric::F32(_) => NumericKind::F32,
            Numeric::F64(_) => NumericKind::F64,
        }
    }

    /// Render for a response payload.
    ///
    /// Booleans render as `0`/`1` and integers without a fractional part.
    /// Reals use the shortest exact rendering of their own width, or
    /// exactly `precision` decimals when one is given.
    pub fn render(self, precision: Option<usize>) -> String {
        match (self, precision) {
            (Numeric::Bool(v), _) => u8::from(v).to_string(),
            (Numeric::I8(v), _) => v.to_string(),
            (Numeric::U8(v), _) => v.to_string(),
            (Numeric::I16(v), _) => v.to_string(),
            (Numeric::U16(v), _) => v.to_string(),
            (Numeric::I32(v), _) => v.to_string(),
            (Numeric::U32(v), _) => v.to_string(),
            (Numeric::I64(v), _) => v.to_string(),
            (Numeric::U64(v), _) => v.to_string(),
            (Numeric::F32(v), Some(p)) => format!("{v:.p$}"),
            (Numeric::F32(v), None) => v.to_string(),
            (Numeric::F64(v), Some(p)) => format!("{v:.p$}"),
            (Numeric::F64(v), None) => v.to_string(),
        }
    }

    /// JSON number carrying the same digits as [`Numeric::render`].
    pub fn to_json(self, precision: Option<usize>) -> Value {
        serde_json::from_str::<serde_json::Number>(&self.render(precision))
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(None))
    }
}

/// Rust scalar types usable as protocol values.
pub trait StateValue: Copy + Default + 'static {
    /// Kind selected for this type.
    const KIND: NumericKind;

    fn into_numeric(self) -> Numeric;

    /// Convert back, saturating if `value` has a different kind.
    fn from_numeric(value: Numeric) -> Self;
}

impl StateValue for bool {
    const KIND: NumericKind = NumericKind::Bool;

    fn into_numeric(self) -> Numeric {
        Numeric::Bool(self)
    }

    fn from_numeric(value: Numeric) -> Self {
        match value {
            Numeric::Bool(v) => v,
            other => other.to_f64() != 0.0,
        }
    }
}

macro_rules! impl_state_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl StateValue for $ty {
                const KIND: NumericKind = NumericKind::$variant;

                fn into_numeric(self) -> Numeric {
                    Numeric::$variant(self)
                }

                fn from_numeric(value: Numeric) -> Self {
                    match value {
                        Numeric::$variant(v) => v,
                        other => other.to_f64() as $ty,
                    }
                }
            }
        )*
    };
}

impl_state_value!(
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
);
