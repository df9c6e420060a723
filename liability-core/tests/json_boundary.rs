//! JSON boundary tests: money enters and leaves as exact decimal strings,
//! never floating-point numbers, and every output money field carries
//! exactly two decimal places.

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use serde_json::Value;

use liability_core::{
    BracketSchedule, FilingStatus, IncomeProfile, TaxBracket, TaxBreakdown, TaxYearConfig,
    compute_tax,
};

fn config_single_2025() -> TaxYearConfig {
    TaxYearConfig {
        tax_year: 2025,
        filing_status: FilingStatus::Single,
        ordinary_brackets: BracketSchedule::new(vec![
            TaxBracket {
                lower: dec!(0),
                upper: Some(dec!(11925)),
                rate: dec!(0.10),
            },
            TaxBracket {
                lower: dec!(11925),
                upper: Some(dec!(48475)),
                rate: dec!(0.12),
            },
            TaxBracket {
                lower: dec!(48475),
                upper: None,
                rate: dec!(0.22),
            },
        ]),
        capital_gains_brackets: BracketSchedule::new(vec![
            TaxBracket {
                lower: dec!(0),
                upper: Some(dec!(48350)),
                rate: dec!(0),
            },
            TaxBracket {
                lower: dec!(48350),
                upper: None,
                rate: dec!(0.15),
            },
        ]),
        standard_deduction: dec!(15000),
        salt_cap: dec!(10000),
        amt_exemption_base: dec!(88100),
        amt_phaseout_start: dec!(626350),
        amt_rate_threshold: dec!(239100),
        qbi_threshold: dec!(197300),
        qbi_phase_in_range: dec!(50000),
        standard_wins_ties: true,
    }
}

const PROFILE_JSON: &str = r#"{
    "filing_status": "Single",
    "wages": "65000.00",
    "interest": "0",
    "ordinary_dividends": "0",
    "qualified_dividends": "0",
    "net_long_term_capital_gain": "0",
    "businesses": [],
    "itemized": {
        "state_local_taxes": "0",
        "mortgage_interest": "0",
        "charitable_contributions": "0",
        "medical_expenses": "0",
        "other": "0"
    },
    "force_itemized": false,
    "amt_preferences": {
        "iso_exercise_spread": "0",
        "private_activity_bond_interest": "0",
        "depreciation_adjustment": "0",
        "passive_activity_adjustment": "0",
        "loss_limitation_adjustment": "0",
        "other_preferences": "0"
    },
    "prior_year_minimum_tax_credit": "0"
}"#;

#[test]
fn profile_deserializes_money_from_strings() {
    let profile: IncomeProfile = serde_json::from_str(PROFILE_JSON).unwrap();

    assert_eq!(profile.wages, dec!(65000.00));
    assert_eq!(profile.filing_status, FilingStatus::Single);
}

#[test]
fn breakdown_serializes_money_with_two_decimal_places() {
    let profile: IncomeProfile = serde_json::from_str(PROFILE_JSON).unwrap();
    let breakdown = compute_tax(&profile, &config_single_2025()).unwrap();

    let json = serde_json::to_value(&breakdown).unwrap();

    let money_fields = [
        "adjusted_gross_income",
        "deduction",
        "qbi_deduction",
        "taxable_income",
        "ordinary_tax",
        "preferential_tax",
        "regular_tax",
        "amti",
        "amt_exemption",
        "tentative_minimum_tax",
        "alternative_minimum_tax",
        "total_tax_before_credits",
    ];
    for field in money_fields {
        let Value::String(text) = &json[field] else {
            panic!("{field} must serialize as a string, got {:?}", json[field]);
        };
        let (_, fraction) = text
            .split_once('.')
            .unwrap_or_else(|| panic!("{field} = {text} has no decimal point"));
        assert_eq!(fraction.len(), 2, "{field} = {text}");
    }

    assert_eq!(json["regular_tax"], Value::String("5914.00".to_string()));
}

#[test]
fn breakdown_round_trips_through_json() {
    let profile: IncomeProfile = serde_json::from_str(PROFILE_JSON).unwrap();
    let breakdown = compute_tax(&profile, &config_single_2025()).unwrap();

    let json = serde_json::to_string(&breakdown).unwrap();
    let restored: TaxBreakdown = serde_json::from_str(&json).unwrap();

    assert_eq!(restored, breakdown);
}

#[test]
fn config_round_trips_through_json() {
    let config = config_single_2025();

    let json = serde_json::to_string(&config).unwrap();
    let restored: TaxYearConfig = serde_json::from_str(&json).unwrap();

    assert_eq!(restored, config);
    assert_eq!(restored.validate(), Ok(()));
}
