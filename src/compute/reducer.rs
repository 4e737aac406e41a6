//! Aggregation of member values into a group value.
use super::value::{Value, ValueType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reducer {
    #[default]
    Sum,
    Any,
    All,
    Min,
    Max,
    CountTrue,
}

impl Reducer {
    /// Folds member values of type `ty`. Returns `None` when the reducer
    /// cannot apply to the type (enumerations only support counting).
    ///
    /// Summing booleans counts the true ones. `Min` and `Max` over no
    /// members yield the type's default.
    pub fn reduce(self, values: &[Value], ty: &ValueType) -> Option<Value> {
        let numbers = || values.iter().map(Value::as_f64).collect::<Option<Vec<f64>>>();
        match self {
            Reducer::Any => Some(Value::Bool(numbers()?.iter().any(|&x| x != 0.0))),
            Reducer::All => Some(Value::Bool(numbers()?.iter().all(|&x| x != 0.0))),
            Reducer::CountTrue => {
                let count = values.iter().filter(|v| v.truthy().unwrap_or(false)).count();
                Some(Value::Int(count as i64))
            }
            Reducer::Sum => {
                let total: f64 = numbers()?.iter().sum();
                match ty {
                    ValueType::Float => Some(Value::Float(total)),
                    ValueType::Int | ValueType::Bool => Some(Value::Int(total as i64)),
                    ValueType::Enum(_) => None,
                }
            }
            Reducer::Min | Reducer::Max => {
                if !ty.is_numeric() {
                    return None;
                }
                let xs = numbers()?;
                let folded = if self == Reducer::Min {
                    xs.into_iter().reduce(f64::min)
                } else {
                    xs.into_iter().reduce(f64::max)
                };
                match folded {
                    None => Some(ty.default_value()),
                    Some(x) => Value::Float(x).conform(ty),
                }
            }
        }
    }
}
