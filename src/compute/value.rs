//! Typed variable values.
use std::fmt;

/// Declared value type of a variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueType {
    Bool,
    Int,
    Float,
    /// An enumeration; the first possible value is the default.
    Enum(Vec<String>),
}

impl ValueType {
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Enum(_) => "enum",
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, ValueType::Enum(_))
    }

    pub fn default_value(&self) -> Value {
        match self {
            ValueType::Bool => Value::Bool(false),
            ValueType::Int => Value::Int(0),
            ValueType::Float => Value::Float(0.0),
            ValueType::Enum(values) => Value::Enum(values.first().cloned().unwrap_or_default()),
        }
    }
}

/// The atomic unit of data in the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Enum(String),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Enum(_) => "enum",
        }
    }

    /// Numeric view of the value; booleans count as 0 or 1.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Enum(_) => None,
        }
    }

    /// Truthiness of a numeric or boolean value: anything non-zero is true.
    pub fn truthy(&self) -> Option<bool> {
        self.as_f64().map(|x| x != 0.0)
    }

    pub fn as_enum(&self) -> Option<&str> {
        match self {
            Value::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Converts the value to the declared type, or `None` when the two are
    /// incompatible.
    ///
    /// Numbers become booleans by truthiness, since eligibility predicates
    /// are often combined arithmetically. Floats only become integers when
    /// they carry no fractional part.
    pub fn conform(self, ty: &ValueType) -> Option<Value> {
        match (ty, self) {
            (ValueType::Bool, v @ Value::Bool(_)) => Some(v),
            (ValueType::Bool, v @ (Value::Int(_) | Value::Float(_))) => v.truthy().map(Value::Bool),
            (ValueType::Int, v @ Value::Int(_)) => Some(v),
            (ValueType::Int, Value::Bool(b)) => Some(Value::Int(b as i64)),
            (ValueType::Int, Value::Float(f)) if f.is_finite() && f.fract() == 0.0 => Some(Value::Int(f as i64)),
            (ValueType::Float, v) => v.as_f64().map(Value::Float),
            (ValueType::Enum(values), Value::Enum(s)) if values.contains(&s) => Some(Value::Enum(s)),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Enum(v.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:.3}", x),
            Value::Enum(s) => f.write_str(s),
        }
    }
}
