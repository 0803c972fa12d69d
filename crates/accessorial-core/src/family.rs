//! # Pricing Families
//!
//! Every line item is priced by exactly one of five families. The family is
//! either chosen explicitly by the caller ([`ResolutionRequest`]) or inferred
//! from the tariff code plus which optional fields were supplied ([`classify`]).
//!
//! ## Classification (first match wins)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. DimensionedVolume  code ∈ crating codes                             │
//! │                        AND item dims AND crate dims                     │
//! │  2. CappedCost         code = capped cost code                          │
//! │                        AND any of { reason, estimate, actual }          │
//! │  3. ActualCost         code = actual cost code                          │
//! │                        AND any of { description, reason, actual }       │
//! │  4. DatedLocation      code starts with the dated-location prefix       │
//! │                        AND any of { reason, date, time, address }       │
//! │  5. GenericManual      everything else                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A specialized code that arrives without any of its trigger fields falls
//! through to GenericManual. [`TariffCodes::family_for_code`] tells callers
//! which family the code alone points at, so the fall-through can be reported.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;
use crate::types::{AddressInput, AdditionalParams, DimensionsInput};

// =============================================================================
// Tariff Codes
// =============================================================================

/// The tariff codes that select the specialized families.
///
/// ## Defaults
/// ```text
/// crating_codes          ["105B", "105E"]   item + crate dimensions
/// capped_cost_code       "35A"              third-party service, capped
/// actual_cost_code       "226A"             reimbursed actual cost
/// dated_location_prefix  "125"              125A, 125B, ... dated stops
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct TariffCodes {
    pub crating_codes: Vec<String>,
    pub capped_cost_code: String,
    pub actual_cost_code: String,
    pub dated_location_prefix: String,
}

impl Default for TariffCodes {
    fn default() -> Self {
        TariffCodes {
            crating_codes: vec!["105B".to_string(), "105E".to_string()],
            capped_cost_code: "35A".to_string(),
            actual_cost_code: "226A".to_string(),
            dated_location_prefix: "125".to_string(),
        }
    }
}

impl TariffCodes {
    pub fn is_crating(&self, code: &str) -> bool {
        self.crating_codes.iter().any(|c| c == code)
    }

    pub fn is_capped_cost(&self, code: &str) -> bool {
        self.capped_cost_code == code
    }

    pub fn is_actual_cost(&self, code: &str) -> bool {
        self.actual_cost_code == code
    }

    pub fn is_dated_location(&self, code: &str) -> bool {
        !self.dated_location_prefix.is_empty() && code.starts_with(&self.dated_location_prefix)
    }

    /// The family a code points at on its own, ignoring supplied fields.
    /// `None` for codes with no specialized family.
    pub fn family_for_code(&self, code: &str) -> Option<PricingFamily> {
        if self.is_crating(code) {
            Some(PricingFamily::DimensionedVolume)
        } else if self.is_capped_cost(code) {
            Some(PricingFamily::CappedCost)
        } else if self.is_actual_cost(code) {
            Some(PricingFamily::ActualCost)
        } else if self.is_dated_location(code) {
            Some(PricingFamily::DatedLocationFlatRate)
        } else {
            None
        }
    }

    /// Whether `code` is listed in `family`'s table. GenericManual prices
    /// anything.
    pub fn accepts(&self, family: PricingFamily, code: &str) -> bool {
        match family {
            PricingFamily::DimensionedVolume => self.is_crating(code),
            PricingFamily::CappedCost => self.is_capped_cost(code),
            PricingFamily::ActualCost => self.is_actual_cost(code),
            PricingFamily::DatedLocationFlatRate => self.is_dated_location(code),
            PricingFamily::GenericManual => true,
        }
    }
}

// =============================================================================
// Pricing Family
// =============================================================================

/// The five resolution families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PricingFamily {
    /// Crating: quantity1 = crate volume in cubic feet.
    DimensionedVolume,
    /// Pre-approved cost: quantity1 = min(actual, estimate) dollars.
    CappedCost,
    /// After-the-fact cost: quantity1 = actual dollars.
    ActualCost,
    /// Dated stop at an address: quantity1 = 1.
    DatedLocationFlatRate,
    /// Anything else: quantity1 entered by hand.
    GenericManual,
}

impl PricingFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            PricingFamily::DimensionedVolume => "dimensioned_volume",
            PricingFamily::CappedCost => "capped_cost",
            PricingFamily::ActualCost => "actual_cost",
            PricingFamily::DatedLocationFlatRate => "dated_location_flat_rate",
            PricingFamily::GenericManual => "generic_manual",
        }
    }
}

impl fmt::Display for PricingFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Picks the family for an untyped request bag.
pub fn classify(codes: &TariffCodes, item_code: &str, params: &AdditionalParams) -> PricingFamily {
    if codes.is_crating(item_code)
        && params.item_dimensions.is_some()
        && params.crate_dimensions.is_some()
    {
        return PricingFamily::DimensionedVolume;
    }

    if codes.is_capped_cost(item_code)
        && (params.reason.is_some()
            || params.estimate_amount.is_some()
            || params.actual_amount.is_some())
    {
        return PricingFamily::CappedCost;
    }

    if codes.is_actual_cost(item_code)
        && (params.description.is_some()
            || params.reason.is_some()
            || params.actual_amount.is_some())
    {
        return PricingFamily::ActualCost;
    }

    if codes.is_dated_location(item_code)
        && (params.reason.is_some()
            || params.date.is_some()
            || params.time.is_some()
            || params.address.is_some())
    {
        return PricingFamily::DatedLocationFlatRate;
    }

    PricingFamily::GenericManual
}

// =============================================================================
// Explicit Requests
// =============================================================================

/// Crating request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct DimensionedVolumeRequest {
    pub description: Option<String>,
    pub item_dimensions: Option<DimensionsInput>,
    pub crate_dimensions: Option<DimensionsInput>,
}

/// Pre-approved, capped cost request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct CappedCostRequest {
    pub description: Option<String>,
    pub reason: Option<String>,
    pub estimate_amount: Option<Money>,
    pub actual_amount: Option<Money>,
}

/// Reimbursed actual cost request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct ActualCostRequest {
    pub description: Option<String>,
    pub reason: Option<String>,
    pub actual_amount: Option<Money>,
}

/// Dated stop at an address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct DatedLocationRequest {
    pub reason: Option<String>,
    #[ts(as = "Option<String>")]
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub address: Option<AddressInput>,
}

/// A request whose family was chosen by the caller.
///
/// Manual requests take quantity1 from the base parameters.
///
/// ## JSON
/// ```json
/// { "family": "capped_cost", "reason": "piano", "estimate_amount": 10000 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum ResolutionRequest {
    DimensionedVolume(DimensionedVolumeRequest),
    CappedCost(CappedCostRequest),
    ActualCost(ActualCostRequest),
    DatedLocationFlatRate(DatedLocationRequest),
    GenericManual,
}

impl ResolutionRequest {
    /// Builds the request the classifier would pick for an untyped bag.
    pub fn from_params(codes: &TariffCodes, item_code: &str, params: &AdditionalParams) -> Self {
        match classify(codes, item_code, params) {
            PricingFamily::DimensionedVolume => {
                ResolutionRequest::DimensionedVolume(DimensionedVolumeRequest {
                    description: params.description.clone(),
                    item_dimensions: params.item_dimensions,
                    crate_dimensions: params.crate_dimensions,
                })
            }
            PricingFamily::CappedCost => ResolutionRequest::CappedCost(CappedCostRequest {
                description: params.description.clone(),
                reason: params.reason.clone(),
                estimate_amount: params.estimate_amount,
                actual_amount: params.actual_amount,
            }),
            PricingFamily::ActualCost => ResolutionRequest::ActualCost(ActualCostRequest {
                description: params.description.clone(),
                reason: params.reason.clone(),
                actual_amount: params.actual_amount,
            }),
            PricingFamily::DatedLocationFlatRate => {
                ResolutionRequest::DatedLocationFlatRate(DatedLocationRequest {
                    reason: params.reason.clone(),
                    date: params.date,
                    time: params.time.clone(),
                    address: params.address.clone(),
                })
            }
            PricingFamily::GenericManual => ResolutionRequest::GenericManual,
        }
    }

    pub fn family(&self) -> PricingFamily {
        match self {
            ResolutionRequest::DimensionedVolume(_) => PricingFamily::DimensionedVolume,
            ResolutionRequest::CappedCost(_) => PricingFamily::CappedCost,
            ResolutionRequest::ActualCost(_) => PricingFamily::ActualCost,
            ResolutionRequest::DatedLocationFlatRate(_) => PricingFamily::DatedLocationFlatRate,
            ResolutionRequest::GenericManual => PricingFamily::GenericManual,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::ThousandthInches;

    fn dims() -> DimensionsInput {
        let foot = ThousandthInches::from_inches(12);
        DimensionsInput::new(foot, foot, foot)
    }

    fn address() -> AddressInput {
        AddressInput {
            street_address_1: "1 Main St".to_string(),
            street_address_2: None,
            street_address_3: None,
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            postal_code: "62701".to_string(),
            country: None,
        }
    }

    #[test]
    fn test_crating_needs_both_dimensions() {
        let codes = TariffCodes::default();
        let mut params = AdditionalParams {
            item_dimensions: Some(dims()),
            crate_dimensions: Some(dims()),
            ..Default::default()
        };
        assert_eq!(classify(&codes, "105B", &params), PricingFamily::DimensionedVolume);
        assert_eq!(classify(&codes, "105E", &params), PricingFamily::DimensionedVolume);

        params.item_dimensions = None;
        assert_eq!(classify(&codes, "105B", &params), PricingFamily::GenericManual);
    }

    #[test]
    fn test_capped_cost_triggers() {
        let codes = TariffCodes::default();
        for params in [
            AdditionalParams {
                reason: Some("piano".into()),
                ..Default::default()
            },
            AdditionalParams {
                estimate_amount: Some(Money::from_cents(100)),
                ..Default::default()
            },
            AdditionalParams {
                actual_amount: Some(Money::from_cents(100)),
                ..Default::default()
            },
        ] {
            assert_eq!(classify(&codes, "35A", &params), PricingFamily::CappedCost);
        }

        // Description alone does not trigger the capped family.
        let params = AdditionalParams {
            description: Some("desc".into()),
            ..Default::default()
        };
        assert_eq!(classify(&codes, "35A", &params), PricingFamily::GenericManual);
    }

    #[test]
    fn test_actual_cost_triggers() {
        let codes = TariffCodes::default();
        let params = AdditionalParams {
            description: Some("toll".into()),
            ..Default::default()
        };
        assert_eq!(classify(&codes, "226A", &params), PricingFamily::ActualCost);

        let params = AdditionalParams {
            estimate_amount: Some(Money::from_cents(100)),
            ..Default::default()
        };
        assert_eq!(classify(&codes, "226A", &params), PricingFamily::GenericManual);
    }

    #[test]
    fn test_dated_location_prefix() {
        let codes = TariffCodes::default();
        let params = AdditionalParams {
            address: Some(address()),
            ..Default::default()
        };
        assert_eq!(classify(&codes, "125A", &params), PricingFamily::DatedLocationFlatRate);
        assert_eq!(classify(&codes, "125D", &params), PricingFamily::DatedLocationFlatRate);
        assert_eq!(classify(&codes, "12A", &params), PricingFamily::GenericManual);

        let params = AdditionalParams {
            time: Some("0800".into()),
            ..Default::default()
        };
        assert_eq!(classify(&codes, "125B", &params), PricingFamily::DatedLocationFlatRate);
    }

    #[test]
    fn test_precedence_first_match_wins() {
        // A crating code that also happens to start with a configured prefix
        // is still priced by volume.
        let codes = TariffCodes {
            dated_location_prefix: "105".to_string(),
            ..Default::default()
        };
        let params = AdditionalParams {
            reason: Some("fragile".into()),
            item_dimensions: Some(dims()),
            crate_dimensions: Some(dims()),
            ..Default::default()
        };
        assert_eq!(classify(&codes, "105B", &params), PricingFamily::DimensionedVolume);

        let params = AdditionalParams {
            reason: Some("fragile".into()),
            ..Default::default()
        };
        assert_eq!(classify(&codes, "105B", &params), PricingFamily::DatedLocationFlatRate);
    }

    #[test]
    fn test_empty_bag_falls_through_to_manual() {
        let codes = TariffCodes::default();
        let params = AdditionalParams::default();
        for code in ["105B", "35A", "226A", "125A", "4A"] {
            assert_eq!(classify(&codes, code, &params), PricingFamily::GenericManual);
        }
        assert_eq!(codes.family_for_code("35A"), Some(PricingFamily::CappedCost));
        assert_eq!(codes.family_for_code("4A"), None);
    }

    #[test]
    fn test_accepts() {
        let codes = TariffCodes::default();
        assert!(codes.accepts(PricingFamily::CappedCost, "35A"));
        assert!(!codes.accepts(PricingFamily::CappedCost, "226A"));
        assert!(codes.accepts(PricingFamily::GenericManual, "35A"));
        assert!(codes.accepts(PricingFamily::DatedLocationFlatRate, "125C"));

        // Table membership, not the code's first-ranked family.
        let overlapping = TariffCodes {
            dated_location_prefix: "105".to_string(),
            ..Default::default()
        };
        assert!(overlapping.accepts(PricingFamily::DimensionedVolume, "105B"));
        assert!(overlapping.accepts(PricingFamily::DatedLocationFlatRate, "105B"));
    }

    #[test]
    fn test_request_from_params_carries_fields() {
        let codes = TariffCodes::default();
        let params = AdditionalParams {
            reason: Some("stairs".into()),
            date: NaiveDate::from_ymd_opt(2026, 5, 4),
            address: Some(address()),
            ..Default::default()
        };
        match ResolutionRequest::from_params(&codes, "125A", &params) {
            ResolutionRequest::DatedLocationFlatRate(req) => {
                assert_eq!(req.reason.as_deref(), Some("stairs"));
                assert_eq!(req.date, params.date);
                assert_eq!(req.address, params.address);
            }
            other => panic!("unexpected request {:?}", other),
        }
    }

    #[test]
    fn test_request_json_tagging() {
        let req: ResolutionRequest = serde_json::from_str(
            r#"{ "family": "capped_cost", "reason": "piano", "estimate_amount": 10000 }"#,
        )
        .unwrap();
        assert_eq!(req.family(), PricingFamily::CappedCost);

        let req: ResolutionRequest = serde_json::from_str(r#"{ "family": "generic_manual" }"#).unwrap();
        assert_eq!(req, ResolutionRequest::GenericManual);
    }
}
