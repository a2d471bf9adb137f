//! # Vulnerability Detector Catalogue
//!
//! @title Vulnerability Detection Framework
//! @author Anchor Sentinel Static Analysis Team
//!
//! Defines the uniform [`Detector`] contract and the six concrete
//! detectors consumed by [`crate::engine::Engine`].
//!
//! ## Architecture
//!
//! Every detector implements [`Detector`], compiling its `Regex`/
//! `fancy_regex::Regex` set once in `new()` and reusing it across the run.
//! Each check walks the source looking for candidate sites, builds a
//! local window (a line-context or a derived function-body substring) via
//! [`crate::navigator::Navigator`], and emits a [`crate::report::Finding`]
//! when an expected safeguard is absent from that window.
//!
//! ## Catalogue
//!
//! | Category | Detector |
//! |----------|----------|
//! | access-control | [`access_control::AccessControlDetector`] |
//! | account-validation | [`account_validation::AccountValidationDetector`] |
//! | arithmetic | [`arithmetic::ArithmeticDetector`] |
//! | economic-attacks | [`economic_attacks::EconomicAttackDetector`] |
//! | input-validation | [`input_validation::InputValidationDetector`] |
//! | state-manipulation | [`state_manipulation::StateManipulationDetector`] |

pub mod access_control;
pub mod account_validation;
pub mod arithmetic;
pub mod economic_attacks;
pub mod input_validation;
pub mod state_manipulation;
pub mod utils;

pub use access_control::AccessControlDetector;
pub use account_validation::AccountValidationDetector;
pub use arithmetic::ArithmeticDetector;
pub use economic_attacks::EconomicAttackDetector;
pub use input_validation::InputValidationDetector;
pub use state_manipulation::StateManipulationDetector;

use crate::report::Finding;
use crate::source::SourceView;

/// Uniform contract all vulnerability detectors implement.
///
/// A detector is constructed once per run, bound to nothing but its own
/// precompiled patterns; it receives the shared [`SourceView`] on every
/// call to [`Detector::detect`] rather than owning it, so a single
/// instance can in principle be reused across files.
pub trait Detector {
    /// Name used in detector-fault diagnostics (`Error in detector <name>: ...`).
    fn name(&self) -> &'static str;

    /// Runs every check this detector implements against `view` and
    /// returns the findings produced, in check-enumeration order.
    fn detect(&self, view: &SourceView) -> Vec<Finding>;
}

/// Builds the fixed detector set in the declaration order that fixes
/// tie-breaks within equal severity and deduplication preference.
pub fn default_detectors() -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(AccessControlDetector::new()),
        Box::new(AccountValidationDetector::new()),
        Box::new(ArithmeticDetector::new()),
        Box::new(EconomicAttackDetector::new()),
        Box::new(InputValidationDetector::new()),
        Box::new(StateManipulationDetector::new()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_detectors_is_the_fixed_six() {
        let detectors = default_detectors();
        assert_eq!(detectors.len(), 6);
        let names: Vec<_> = detectors.iter().map(|d| d.name()).collect();
        assert_eq!(
            names,
            vec![
                "AccessControlDetector",
                "AccountValidationDetector",
                "ArithmeticDetector",
                "EconomicAttackDetector",
                "InputValidationDetector",
                "StateManipulationDetector",
            ]
        );
    }
}
