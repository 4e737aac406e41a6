//! Boolean arithmetic helpers.
//!
//! Eligibility rules combine conditions arithmetically: a product of flags
//! is a conjunction, a sum is a disjunction. These helpers keep that
//! convention in one place, working on anything that reads as a number.

/// Anything a rule may combine arithmetically. Booleans count as 0 or 1.
pub trait Numeric: Copy {
    fn to_f64(self) -> f64;
}

impl Numeric for bool {
    #[inline(always)]
    fn to_f64(self) -> f64 {
        if self { 1.0 } else { 0.0 }
    }
}

impl Numeric for f64 {
    #[inline(always)]
    fn to_f64(self) -> f64 {
        self
    }
}

impl Numeric for i64 {
    #[inline(always)]
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Numeric for i32 {
    #[inline(always)]
    fn to_f64(self) -> f64 {
        self as f64
    }
}

pub fn product<T: Numeric>(terms: &[T]) -> f64 {
    terms.iter().map(|t| t.to_f64()).product()
}

pub fn sum<T: Numeric>(terms: &[T]) -> f64 {
    terms.iter().map(|t| t.to_f64()).sum()
}

/// Conjunction: the product of all terms is non-zero.
pub fn and<T: Numeric>(terms: &[T]) -> bool {
    product(terms) != 0.0
}

/// Disjunction: the sum of all terms is non-zero.
pub fn or<T: Numeric>(terms: &[T]) -> bool {
    sum(terms) != 0.0
}

pub fn not<T: Numeric>(term: T) -> bool {
    term.to_f64() == 0.0
}

/// Picks the choice paired with the first true condition, `default` if none.
pub fn select<T: Numeric>(conditions: &[bool], choices: &[T], default: T) -> f64 {
    conditions
        .iter()
        .zip(choices)
        .find(|(c, _)| **c)
        .map(|(_, v)| v.to_f64())
        .unwrap_or_else(|| default.to_f64())
}

pub fn max_<A: Numeric, B: Numeric>(a: A, b: B) -> f64 {
    a.to_f64().max(b.to_f64())
}

pub fn min_<A: Numeric, B: Numeric>(a: A, b: B) -> f64 {
    a.to_f64().min(b.to_f64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_flags_as_numbers() {
        let flags = [true, false, true];
        assert_eq!(product(&flags), 0.0);
        assert_eq!(sum(&flags), 2.0);
        assert!(!and(&flags));
        assert!(or(&flags));
    }

    #[rstest]
    #[case(&[true, true], true, true)]
    #[case(&[false, false], false, false)]
    #[case(&[], true, false)]
    fn test_and_or(#[case] flags: &[bool], #[case] all: bool, #[case] any: bool) {
        assert_eq!(and(flags), all);
        assert_eq!(or(flags), any);
    }

    #[test]
    fn test_mixed_terms() {
        assert!(and(&[2.0, 0.5]));
        assert!(!and(&[3_i64, 0]));
        assert!(not(0.0));
        assert!(!not(true));
        assert_eq!(max_(0, -12.5), 0.0);
        assert_eq!(min_(true, 3.0), 1.0);
    }

    #[test]
    fn test_select() {
        assert_eq!(select(&[false, true, true], &[10.0, 20.0, 30.0], 0.0), 20.0);
        assert_eq!(select(&[false, false], &[10.0, 20.0], -1.0), -1.0);
    }
}
