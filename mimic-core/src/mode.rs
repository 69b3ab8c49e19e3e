#![forbid(unsafe_code)]

use std::fmt;

use serde::{Deserialize, Serialize};

/// What a mock does when an intercepted call has no matching answer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MockMode {
    /// Fail the call with `CallNotMocked`.
    #[default]
    Strict,
    /// Return the default value of the erased return type.
    Autofill,
    /// Return unit for unit-returning calls, otherwise behave like `Strict`.
    AutoUnit,
}

impl fmt::Display for MockMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MockMode::Strict => write!(f, "strict"),
            MockMode::Autofill => write!(f, "autofill"),
            MockMode::AutoUnit => write!(f, "autoUnit"),
        }
    }
}

/// How a verification run matches its templates against recorded calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyMode {
    /// Every template matches at least one call.
    #[default]
    Soft,
    /// Like `Soft`, and every call of the verified mocks is consumed.
    Exhaustive,
    /// Templates match calls with strictly increasing order stamps.
    Order,
    /// Like `Order`, and every call of the verified mocks is consumed.
    ExhaustiveOrder,
    Exactly(usize),
    AtLeast(usize),
    AtMost(usize),
    InRange { min: usize, max: usize },
    /// No call matches any template.
    Not,
}

impl VerifyMode {
    /// Inclusive bounds on the number of calls each template must match, for counting modes.
    pub fn count_bounds(&self) -> Option<(usize, usize)> {
        match *self {
            VerifyMode::Exactly(n) => Some((n, n)),
            VerifyMode::AtLeast(n) => Some((n, usize::MAX)),
            VerifyMode::AtMost(n) => Some((0, n)),
            VerifyMode::InRange { min, max } => Some((min, max)),
            VerifyMode::Not => Some((0, 0)),
            VerifyMode::Soft
            | VerifyMode::Exhaustive
            | VerifyMode::Order
            | VerifyMode::ExhaustiveOrder => None,
        }
    }

    pub fn is_ordered(&self) -> bool {
        matches!(self, VerifyMode::Order | VerifyMode::ExhaustiveOrder)
    }

    pub fn is_exhaustive(&self) -> bool {
        matches!(self, VerifyMode::Exhaustive | VerifyMode::ExhaustiveOrder)
    }
}

impl fmt::Display for VerifyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyMode::Soft => write!(f, "soft"),
            VerifyMode::Exhaustive => write!(f, "exhaustive"),
            VerifyMode::Order => write!(f, "order"),
            VerifyMode::ExhaustiveOrder => write!(f, "exhaustiveOrder"),
            VerifyMode::Exactly(n) => write!(f, "exactly({n})"),
            VerifyMode::AtLeast(n) => write!(f, "atLeast({n})"),
            VerifyMode::AtMost(n) => write!(f, "atMost({n})"),
            VerifyMode::InRange { min, max } => write!(f, "inRange({min}..={max})"),
            VerifyMode::Not => write!(f, "not"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counting_modes_have_bounds() {
        assert_eq!(VerifyMode::Exactly(2).count_bounds(), Some((2, 2)));
        assert_eq!(VerifyMode::AtLeast(1).count_bounds(), Some((1, usize::MAX)));
        assert_eq!(VerifyMode::Not.count_bounds(), Some((0, 0)));
        assert_eq!(VerifyMode::Order.count_bounds(), None);
    }

    #[test]
    fn exhaustive_order_is_both() {
        let mode = VerifyMode::ExhaustiveOrder;
        assert!(mode.is_ordered());
        assert!(mode.is_exhaustive());
        assert!(!VerifyMode::Soft.is_ordered());
    }

    #[test]
    fn display_forms() {
        assert_eq!(VerifyMode::InRange { min: 1, max: 3 }.to_string(), "inRange(1..=3)");
        assert_eq!(MockMode::AutoUnit.to_string(), "autoUnit");
    }
}
