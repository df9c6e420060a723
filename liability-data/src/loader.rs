use std::collections::HashMap;
use std::io::Read;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use liability_core::{
    BracketSchedule, ConfigError, ConfigTable, FilingStatus, TaxBracket, TaxYearConfig,
};

/// Errors that can occur when loading configuration data.
///
/// Any malformed entry fails the whole load: configuration errors are fatal
/// at startup, never recoverable per-request.
#[derive(Debug, Error)]
pub enum ConfigLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("Invalid bracket kind: {0} (expected 'ordinary' or 'capital_gains')")]
    InvalidKind(String),

    #[error("No {kind} brackets for tax year {tax_year} schedule {schedule}")]
    MissingBrackets {
        tax_year: i32,
        schedule: String,
        kind: &'static str,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl From<csv::Error> for ConfigLoaderError {
    fn from(err: csv::Error) -> Self {
        ConfigLoaderError::CsvParse(err.to_string())
    }
}

/// Maps IRS schedule codes to filing statuses.
///
/// - Schedule X → Single
/// - Schedule Y-1 → Married Filing Jointly and Qualifying Surviving Spouse
/// - Schedule Y-2 → Married Filing Separately
/// - Schedule Z → Head of Household
fn schedule_to_filing_statuses(
    schedule: &str
) -> Result<Vec<FilingStatus>, ConfigLoaderError> {
    match schedule {
        "X" => Ok(vec![FilingStatus::Single]),
        "Y-1" => Ok(vec![
            FilingStatus::MarriedFilingJointly,
            FilingStatus::QualifyingSurvivingSpouse,
        ]),
        "Y-2" => Ok(vec![FilingStatus::MarriedFilingSeparately]),
        "Z" => Ok(vec![FilingStatus::HeadOfHousehold]),
        _ => Err(ConfigLoaderError::InvalidSchedule(schedule.to_string())),
    }
}

/// A single record from the brackets CSV file.
///
/// Columns:
/// - `tax_year`: The tax year (e.g., 2025)
/// - `schedule`: The IRS schedule code (X, Y-1, Y-2, Z)
/// - `kind`: Which schedule the bracket belongs to (`ordinary` or
///   `capital_gains`)
/// - `lower`: The bracket's lower bound
/// - `upper`: The bracket's upper bound (empty for unbounded)
/// - `rate`: The marginal rate as a decimal (e.g., 0.10 for 10%)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketRecord {
    pub tax_year: i32,
    pub schedule: String,
    pub kind: String,
    pub lower: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub upper: Option<Decimal>,
    pub rate: Decimal,
}

/// A single record from the year parameters CSV file.
///
/// One row per (tax_year, schedule) carrying every scalar constant of a
/// [`TaxYearConfig`].
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct YearParamRecord {
    pub tax_year: i32,
    pub schedule: String,
    pub standard_deduction: Decimal,
    pub salt_cap: Decimal,
    pub amt_exemption_base: Decimal,
    pub amt_phaseout_start: Decimal,
    pub amt_rate_threshold: Decimal,
    pub qbi_threshold: Decimal,
    pub qbi_phase_in_range: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for tax year configuration from CSV files.
///
/// Two files feed the table: a brackets file holding both ordinary and
/// capital-gains schedules, and a parameters file holding the scalar
/// constants. Schedule codes are expanded to filing statuses (Y-1 rows
/// produce both MFJ and QSS configurations) and every assembled
/// [`TaxYearConfig`] is validated on insert.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Parse bracket records from a CSV reader.
    pub fn parse_brackets<R: Read>(
        reader: R
    ) -> Result<Vec<BracketRecord>, ConfigLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: BracketRecord = result?;
            if record.kind != "ordinary" && record.kind != "capital_gains" {
                return Err(ConfigLoaderError::InvalidKind(record.kind));
            }
            records.push(record);
        }

        Ok(records)
    }

    /// Parse year parameter records from a CSV reader.
    pub fn parse_params<R: Read>(
        reader: R
    ) -> Result<Vec<YearParamRecord>, ConfigLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: YearParamRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Assembles a validated [`ConfigTable`] from parsed records.
    ///
    /// Every parameter row must be matched by both an ordinary and a
    /// capital-gains bracket group for its (tax_year, schedule); bracket
    /// rows are sorted by lower bound before schedule assembly, so file
    /// order does not matter.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigLoaderError`] on an unknown schedule code, a missing
    /// bracket group, or a configuration that fails validation.
    pub fn build_table(
        brackets: &[BracketRecord],
        params: &[YearParamRecord],
    ) -> Result<ConfigTable, ConfigLoaderError> {
        let mut groups: HashMap<(i32, &str, &str), Vec<&BracketRecord>> = HashMap::new();
        for record in brackets {
            groups
                .entry((record.tax_year, record.schedule.as_str(), record.kind.as_str()))
                .or_default()
                .push(record);
        }

        let mut table = ConfigTable::new();
        for param in params {
            let ordinary = Self::schedule_for(&groups, param, "ordinary")?;
            let capital_gains = Self::schedule_for(&groups, param, "capital_gains")?;

            for filing_status in schedule_to_filing_statuses(&param.schedule)? {
                info!(
                    tax_year = param.tax_year,
                    filing_status = %filing_status,
                    "loaded tax year configuration"
                );
                table.insert(TaxYearConfig {
                    tax_year: param.tax_year,
                    filing_status,
                    ordinary_brackets: ordinary.clone(),
                    capital_gains_brackets: capital_gains.clone(),
                    standard_deduction: param.standard_deduction,
                    salt_cap: param.salt_cap,
                    amt_exemption_base: param.amt_exemption_base,
                    amt_phaseout_start: param.amt_phaseout_start,
                    amt_rate_threshold: param.amt_rate_threshold,
                    qbi_threshold: param.qbi_threshold,
                    qbi_phase_in_range: param.qbi_phase_in_range,
                    standard_wins_ties: true,
                })?;
            }
        }

        Ok(table)
    }

    fn schedule_for(
        groups: &HashMap<(i32, &str, &str), Vec<&BracketRecord>>,
        param: &YearParamRecord,
        kind: &'static str,
    ) -> Result<BracketSchedule, ConfigLoaderError> {
        let mut records = groups
            .get(&(param.tax_year, param.schedule.as_str(), kind))
            .cloned()
            .ok_or(ConfigLoaderError::MissingBrackets {
                tax_year: param.tax_year,
                schedule: param.schedule.clone(),
                kind,
            })?;
        records.sort_by(|a, b| a.lower.cmp(&b.lower));

        Ok(BracketSchedule::new(
            records
                .into_iter()
                .map(|record| TaxBracket {
                    lower: record.lower,
                    upper: record.upper,
                    rate: record.rate,
                })
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const BRACKETS_CSV: &str = r#"tax_year,schedule,kind,lower,upper,rate
2025,X,ordinary,0,11925,0.10
2025,X,ordinary,11925,48475,0.12
2025,X,ordinary,48475,,0.22
2025,X,capital_gains,0,48350,0
2025,X,capital_gains,48350,,0.15
"#;

    const PARAMS_CSV: &str = r#"tax_year,schedule,standard_deduction,salt_cap,amt_exemption_base,amt_phaseout_start,amt_rate_threshold,qbi_threshold,qbi_phase_in_range
2025,X,15000,10000,88100,626350,239100,197300,50000
"#;

    #[test]
    fn parse_brackets_single_record() {
        let csv = "tax_year,schedule,kind,lower,upper,rate\n2025,X,ordinary,0,11925,0.10";

        let records = ConfigLoader::parse_brackets(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0],
            BracketRecord {
                tax_year: 2025,
                schedule: "X".to_string(),
                kind: "ordinary".to_string(),
                lower: dec!(0),
                upper: Some(dec!(11925)),
                rate: dec!(0.10),
            }
        );
    }

    #[test]
    fn parse_brackets_empty_upper_is_unbounded() {
        let csv = "tax_year,schedule,kind,lower,upper,rate\n2025,X,ordinary,626350,,0.37";

        let records = ConfigLoader::parse_brackets(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records[0].upper, None);
        assert_eq!(records[0].rate, dec!(0.37));
    }

    #[test]
    fn parse_brackets_rejects_unknown_kind() {
        let csv = "tax_year,schedule,kind,lower,upper,rate\n2025,X,payroll,0,11925,0.10";

        let result = ConfigLoader::parse_brackets(csv.as_bytes());

        match result {
            Err(ConfigLoaderError::InvalidKind(kind)) => assert_eq!(kind, "payroll"),
            other => panic!("expected InvalidKind, got {other:?}"),
        }
    }

    #[test]
    fn parse_brackets_rejects_bad_decimal() {
        let csv = "tax_year,schedule,kind,lower,upper,rate\n2025,X,ordinary,abc,11925,0.10";

        let result = ConfigLoader::parse_brackets(csv.as_bytes());

        let err = result.expect_err("Should fail for invalid decimal");
        let ConfigLoaderError::CsvParse(msg) = err else {
            panic!("Expected CsvParse error, got: {err:?}");
        };
        assert!(msg.contains("invalid"), "got: {msg}");
    }

    #[test]
    fn parse_params_reads_all_constants() {
        let records = ConfigLoader::parse_params(PARAMS_CSV.as_bytes()).expect("Failed to parse");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].standard_deduction, dec!(15000));
        assert_eq!(records[0].amt_rate_threshold, dec!(239100));
        assert_eq!(records[0].qbi_phase_in_range, dec!(50000));
    }

    #[test]
    fn build_table_assembles_config() {
        let brackets = ConfigLoader::parse_brackets(BRACKETS_CSV.as_bytes()).unwrap();
        let params = ConfigLoader::parse_params(PARAMS_CSV.as_bytes()).unwrap();

        let table = ConfigLoader::build_table(&brackets, &params).unwrap();

        let config = table.get(2025, FilingStatus::Single).unwrap();
        assert_eq!(config.ordinary_brackets.brackets.len(), 3);
        assert_eq!(config.capital_gains_brackets.brackets.len(), 2);
        assert_eq!(config.standard_deduction, dec!(15000));
    }

    #[test]
    fn build_table_sorts_brackets_by_lower_bound() {
        let shuffled = r#"tax_year,schedule,kind,lower,upper,rate
2025,X,ordinary,48475,,0.22
2025,X,ordinary,0,11925,0.10
2025,X,ordinary,11925,48475,0.12
2025,X,capital_gains,48350,,0.15
2025,X,capital_gains,0,48350,0
"#;
        let brackets = ConfigLoader::parse_brackets(shuffled.as_bytes()).unwrap();
        let params = ConfigLoader::parse_params(PARAMS_CSV.as_bytes()).unwrap();

        let table = ConfigLoader::build_table(&brackets, &params).unwrap();

        let config = table.get(2025, FilingStatus::Single).unwrap();
        assert_eq!(config.ordinary_brackets.brackets[0].lower, dec!(0));
        assert_eq!(config.ordinary_brackets.brackets[2].upper, None);
    }

    #[test]
    fn build_table_expands_y1_to_mfj_and_qss() {
        let brackets_csv = BRACKETS_CSV.replace(",X,", ",Y-1,");
        let params_csv = PARAMS_CSV.replace(",X,", ",Y-1,");
        let brackets = ConfigLoader::parse_brackets(brackets_csv.as_bytes()).unwrap();
        let params = ConfigLoader::parse_params(params_csv.as_bytes()).unwrap();

        let table = ConfigLoader::build_table(&brackets, &params).unwrap();

        assert_eq!(table.len(), 2);
        assert!(table.get(2025, FilingStatus::MarriedFilingJointly).is_ok());
        assert!(
            table
                .get(2025, FilingStatus::QualifyingSurvivingSpouse)
                .is_ok()
        );
    }

    #[test]
    fn build_table_reports_missing_capital_gains_group() {
        let ordinary_only = r#"tax_year,schedule,kind,lower,upper,rate
2025,X,ordinary,0,,0.10
"#;
        let brackets = ConfigLoader::parse_brackets(ordinary_only.as_bytes()).unwrap();
        let params = ConfigLoader::parse_params(PARAMS_CSV.as_bytes()).unwrap();

        let result = ConfigLoader::build_table(&brackets, &params);

        match result {
            Err(ConfigLoaderError::MissingBrackets {
                tax_year,
                schedule,
                kind,
            }) => {
                assert_eq!(tax_year, 2025);
                assert_eq!(schedule, "X");
                assert_eq!(kind, "capital_gains");
            }
            other => panic!("expected MissingBrackets, got {other:?}"),
        }
    }

    #[test]
    fn build_table_rejects_unknown_schedule() {
        let brackets_csv = BRACKETS_CSV.replace(",X,", ",W,");
        let params_csv = PARAMS_CSV.replace(",X,", ",W,");
        let brackets = ConfigLoader::parse_brackets(brackets_csv.as_bytes()).unwrap();
        let params = ConfigLoader::parse_params(params_csv.as_bytes()).unwrap();

        let result = ConfigLoader::build_table(&brackets, &params);

        match result {
            Err(ConfigLoaderError::InvalidSchedule(schedule)) => assert_eq!(schedule, "W"),
            other => panic!("expected InvalidSchedule, got {other:?}"),
        }
    }

    #[test]
    fn build_table_surfaces_validation_failure() {
        // Gap between the first and second ordinary brackets.
        let gapped = r#"tax_year,schedule,kind,lower,upper,rate
2025,X,ordinary,0,11925,0.10
2025,X,ordinary,12000,,0.12
2025,X,capital_gains,0,48350,0
2025,X,capital_gains,48350,,0.15
"#;
        let brackets = ConfigLoader::parse_brackets(gapped.as_bytes()).unwrap();
        let params = ConfigLoader::parse_params(PARAMS_CSV.as_bytes()).unwrap();

        let result = ConfigLoader::build_table(&brackets, &params);

        assert!(matches!(result, Err(ConfigLoaderError::Config(_))));
    }

    #[test]
    fn parse_empty_brackets_file() {
        let csv = "tax_year,schedule,kind,lower,upper,rate\n";

        let records = ConfigLoader::parse_brackets(csv.as_bytes()).expect("Failed to parse CSV");

        assert!(records.is_empty());
    }
}
