//! Strength functions mapping distance-from-seed to an influence weight.

use serde::{Deserialize, Serialize};

use crate::error::FlowError;

/// How a seed's influence decays between its centre and its radius.
///
/// Every variant satisfies `strength(0) = 1`, `strength(d) = 0` for
/// `d >= radius`, and is non-increasing in between.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Falloff {
    /// `1 - d/r`
    Linear,
    /// `(1 - d/r)^2`: fades faster near the edge but reaches zero at the same radius.
    #[default]
    Quadratic,
    /// `(1 - d/r)^exponent`, exponent > 0.
    Power(f64),
}

impl Falloff {
    /// Names accepted by [`Falloff::from_name`].
    pub const NAMES: &'static [&'static str] = &["linear", "quadratic"];

    /// Parses `"linear"` or `"quadratic"`.
    pub fn from_name(name: &str) -> Result<Self, FlowError> {
        match name {
            "linear" => Ok(Falloff::Linear),
            "quadratic" => Ok(Falloff::Quadratic),
            other => Err(FlowError::InvalidConfiguration(format!(
                "unknown falloff '{other}' (expected one of: {})",
                Self::NAMES.join(", ")
            ))),
        }
    }

    /// Exponent applied to the linear ramp.
    pub fn exponent(&self) -> f64 {
        match self {
            Falloff::Linear => 1.0,
            Falloff::Quadratic => 2.0,
            Falloff::Power(e) => *e,
        }
    }

    /// Influence weight in `[0, 1]` at `distance` from a seed of `radius`.
    ///
    /// Negative distances count as 0. A non-positive radius has no influence.
    pub fn strength(&self, distance: f64, radius: f64) -> f64 {
        if radius <= 0.0 || distance >= radius {
            return 0.0;
        }
        let s = 1.0 - distance.max(0.0) / radius;
        match self {
            Falloff::Linear => s,
            Falloff::Quadratic => s * s,
            Falloff::Power(e) => s.powf(*e).clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_hits_both_endpoints() {
        assert_eq!(Falloff::Linear.strength(0.0, 500.0), 1.0);
        assert_eq!(Falloff::Linear.strength(500.0, 500.0), 0.0);
        assert!((Falloff::Linear.strength(250.0, 500.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn quadratic_is_square_of_linear() {
        let lin = Falloff::Linear.strength(100.0, 300.0);
        let quad = Falloff::Quadratic.strength(100.0, 300.0);
        assert!((quad - lin * lin).abs() < 1e-12);
    }

    #[test]
    fn beyond_radius_is_zero() {
        for f in [Falloff::Linear, Falloff::Quadratic, Falloff::Power(0.5)] {
            assert_eq!(f.strength(301.0, 300.0), 0.0, "{f:?}");
        }
    }

    #[test]
    fn non_positive_radius_has_no_influence() {
        assert_eq!(Falloff::Linear.strength(0.0, 0.0), 0.0);
        assert_eq!(Falloff::Quadratic.strength(0.0, -5.0), 0.0);
    }

    #[test]
    fn negative_distance_treated_as_centre() {
        assert_eq!(Falloff::Quadratic.strength(-3.0, 10.0), 1.0);
    }

    #[test]
    fn from_name_parses_known_names() {
        assert_eq!(Falloff::from_name("linear").unwrap(), Falloff::Linear);
        assert_eq!(Falloff::from_name("quadratic").unwrap(), Falloff::Quadratic);
    }

    #[test]
    fn from_name_rejects_unknown() {
        let err = Falloff::from_name("cubic").unwrap_err();
        assert!(matches!(err, FlowError::InvalidConfiguration(_)));
        assert!(err.to_string().contains("cubic"));
    }

    #[test]
    fn power_serializes_with_exponent() {
        let json = serde_json::to_value(Falloff::Power(1.5)).unwrap();
        assert_eq!(json, serde_json::json!({"power": 1.5}));
        assert_eq!(serde_json::to_value(Falloff::Linear).unwrap(), "linear");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn falloff() -> impl Strategy<Value = Falloff> {
            prop_oneof![
                Just(Falloff::Linear),
                Just(Falloff::Quadratic),
                (0.1_f64..8.0).prop_map(Falloff::Power),
            ]
        }

        proptest! {
            #[test]
            fn strength_in_unit_interval(
                f in falloff(),
                radius in 1.0_f64..2000.0,
                t in 0.0_f64..=1.0,
            ) {
                let s = f.strength(t * radius, radius);
                prop_assert!((0.0..=1.0).contains(&s), "strength = {s}");
            }

            #[test]
            fn strength_endpoints(f in falloff(), radius in 1.0_f64..2000.0) {
                prop_assert_eq!(f.strength(0.0, radius), 1.0);
                prop_assert_eq!(f.strength(radius, radius), 0.0);
            }

            #[test]
            fn strength_non_increasing(
                f in falloff(),
                radius in 1.0_f64..2000.0,
                a in 0.0_f64..=1.0,
                b in 0.0_f64..=1.0,
            ) {
                let (near, far) = if a <= b { (a, b) } else { (b, a) };
                prop_assert!(f.strength(near * radius, radius) >= f.strength(far * radius, radius));
            }
        }
    }
}
