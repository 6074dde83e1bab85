//! Client-side filtering of aircraft states.
//!
//! [IdentityFilter] selects specific airframes and is also handed to the
//! adapters so providers that can filter server-side do so.  [StateFilter]
//! trims a fetched batch on attributes no provider filters on.
//!

use skywatch_formats::AircraftState;

/// Identity of one or more airframes, any criterion matching is enough.
/// Matching is case-insensitive and exact.
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IdentityFilter {
    /// ICAO 24-bit hex address
    pub icao: Option<String>,
    /// Tail registration
    pub registration: Option<String>,
    /// Flight callsign
    pub callsign: Option<String>,
}

impl IdentityFilter {
    pub fn icao(icao: &str) -> Self {
        IdentityFilter {
            icao: Some(icao.to_owned()),
            ..Default::default()
        }
    }

    pub fn registration(reg: &str) -> Self {
        IdentityFilter {
            registration: Some(reg.to_owned()),
            ..Default::default()
        }
    }

    pub fn callsign(callsign: &str) -> Self {
        IdentityFilter {
            callsign: Some(callsign.to_owned()),
            ..Default::default()
        }
    }

    /// True when no criterion is set.
    ///
    pub fn is_empty(&self) -> bool {
        self.icao.is_none() && self.registration.is_none() && self.callsign.is_none()
    }

    /// Does this state match any of the criteria?
    ///
    pub fn matches(&self, state: &AircraftState) -> bool {
        let eq = |a: &str, b: &str| !a.is_empty() && a.eq_ignore_ascii_case(b);

        self.icao.as_deref().is_some_and(|v| eq(v, &state.icao))
            || self
                .registration
                .as_deref()
                .is_some_and(|v| eq(v, &state.registration))
            || self
                .callsign
                .as_deref()
                .is_some_and(|v| eq(v, &state.callsign))
    }
}

/// Attribute filter applied after fetching.  All set criteria must hold.
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StateFilter {
    /// Keep only aircraft on the ground
    pub ground_only: bool,
    /// Keep only airborne aircraft
    pub airborne_only: bool,
    /// Keep only aircraft with the SPI flag set
    pub interesting_only: bool,
    /// Keep only military airframes
    pub military_only: bool,
    /// Keep only aircraft squawking an emergency code
    pub emergency_only: bool,
    /// Keep only aircraft squawking exactly this code
    pub squawk: Option<String>,
}

impl StateFilter {
    /// Trim the batch in place.  Applying the same filter twice is a no-op.
    ///
    pub fn apply(&self, states: &mut Vec<AircraftState>) {
        states.retain(|s| self.keeps(s));
    }

    fn keeps(&self, s: &AircraftState) -> bool {
        if self.ground_only && !s.on_ground {
            return false;
        }
        if self.airborne_only && s.on_ground {
            return false;
        }
        if self.interesting_only && !s.spi {
            return false;
        }
        if self.military_only && !s.military {
            return false;
        }
        if self.emergency_only && !s.emergency() {
            return false;
        }
        if let Some(sq) = &self.squawk {
            if s.squawk != *sq {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sample() -> AircraftState {
        AircraftState {
            icao: "484B16".into(),
            registration: "PH-BXE".into(),
            callsign: "KLM182".into(),
            ..Default::default()
        }
    }

    #[rstest]
    #[case(IdentityFilter::icao("484b16"), true)]
    #[case(IdentityFilter::icao("484B16"), true)]
    #[case(IdentityFilter::icao("AAAAAA"), false)]
    #[case(IdentityFilter::registration("ph-bxe"), true)]
    #[case(IdentityFilter::callsign("klm182"), true)]
    #[case(IdentityFilter::callsign("KLM18"), false)]
    #[case(IdentityFilter::default(), false)]
    fn test_identity_matches(#[case] filter: IdentityFilter, #[case] expected: bool) {
        assert_eq!(expected, filter.matches(&sample()));
    }

    #[test]
    fn test_identity_any_criterion() {
        // wrong icao but right callsign still matches
        let f = IdentityFilter {
            icao: Some("FFFFFF".into()),
            callsign: Some("KLM182".into()),
            ..Default::default()
        };
        assert!(f.matches(&sample()));
    }

    #[test]
    fn test_identity_empty_never_matches() {
        assert!(IdentityFilter::default().is_empty());
        assert!(!IdentityFilter::default().matches(&sample()));
    }

    #[test]
    fn test_state_filter_idempotent() {
        let mut batch = vec![
            AircraftState {
                icao: "A".into(),
                on_ground: true,
                ..Default::default()
            },
            AircraftState {
                icao: "B".into(),
                military: true,
                ..Default::default()
            },
            AircraftState {
                icao: "C".into(),
                squawk: "7700".into(),
                ..Default::default()
            },
        ];
        let filter = StateFilter {
            airborne_only: true,
            ..Default::default()
        };

        filter.apply(&mut batch);
        assert_eq!(2, batch.len());
        let once = batch.clone();
        filter.apply(&mut batch);
        assert_eq!(once, batch);
    }

    #[test]
    fn test_state_filter_conjunction() {
        let mut batch = vec![
            AircraftState {
                icao: "B".into(),
                military: true,
                ..Default::default()
            },
            AircraftState {
                icao: "C".into(),
                military: true,
                squawk: "7700".into(),
                ..Default::default()
            },
        ];
        let filter = StateFilter {
            military_only: true,
            emergency_only: true,
            ..Default::default()
        };
        filter.apply(&mut batch);
        assert_eq!(1, batch.len());
        assert_eq!("C", batch[0].icao);
    }

    #[test]
    fn test_state_filter_squawk_equality() {
        let mut batch = vec![
            AircraftState {
                icao: "A".into(),
                squawk: "7000".into(),
                ..Default::default()
            },
            AircraftState {
                icao: "B".into(),
                squawk: "0645".into(),
                ..Default::default()
            },
        ];
        let filter = StateFilter {
            squawk: Some("0645".into()),
            ..Default::default()
        };
        filter.apply(&mut batch);
        assert_eq!(1, batch.len());
        assert_eq!("B", batch[0].icao);
    }
}
