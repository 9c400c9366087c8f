//! Brazilian tax identifiers
//!
//! CPF (natural persons, 11 digits) and CNPJ (legal entities, 14 digits)
//! both carry two check digits computed with a modulus-11 weighted sum.
//! Validation happens here, at the domain boundary, so no party record
//! ever holds a malformed identifier.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::PartyError;

/// A validated CPF or CNPJ
///
/// Stored as bare digits; formatting (dots, slashes, dashes) is applied
/// on display only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TaxId {
    /// Cadastro de Pessoas Fisicas - 11 digits
    Cpf(String),
    /// Cadastro Nacional da Pessoa Juridica - 14 digits
    Cnpj(String),
}

impl TaxId {
    /// Parses and validates a CPF or CNPJ from user input
    ///
    /// Punctuation is stripped; the variant is chosen by digit count.
    pub fn parse(input: &str) -> Result<Self, PartyError> {
        let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
        match digits.len() {
            11 => {
                validate_cpf(&digits)?;
                Ok(TaxId::Cpf(digits))
            }
            14 => {
                validate_cnpj(&digits)?;
                Ok(TaxId::Cnpj(digits))
            }
            n => Err(PartyError::InvalidTaxId(format!(
                "expected 11 (CPF) or 14 (CNPJ) digits, got {n}"
            ))),
        }
    }

    /// Returns the bare digits
    pub fn digits(&self) -> &str {
        match self {
            TaxId::Cpf(d) | TaxId::Cnpj(d) => d,
        }
    }

    /// Returns true for legal-entity identifiers
    pub fn is_company(&self) -> bool {
        matches!(self, TaxId::Cnpj(_))
    }
}

impl fmt::Display for TaxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.digits();
        match self {
            TaxId::Cpf(_) => write!(f, "{}.{}.{}-{}", &d[0..3], &d[3..6], &d[6..9], &d[9..11]),
            TaxId::Cnpj(_) => write!(
                f,
                "{}.{}.{}/{}-{}",
                &d[0..2],
                &d[2..5],
                &d[5..8],
                &d[8..12],
                &d[12..14]
            ),
        }
    }
}

impl TryFrom<String> for TaxId {
    type Error = PartyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TaxId::parse(&value)
    }
}

impl From<TaxId> for String {
    fn from(id: TaxId) -> String {
        id.digits().to_string()
    }
}

fn digit_values(digits: &str) -> Vec<u32> {
    digits.chars().filter_map(|c| c.to_digit(10)).collect()
}

fn all_same(values: &[u32]) -> bool {
    values.iter().all(|&v| v == values[0])
}

/// Modulus-11 check digit over the given weights
fn check_digit(values: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = values.iter().zip(weights).map(|(v, w)| v * w).sum();
    let rem = sum % 11;
    if rem < 2 {
        0
    } else {
        11 - rem
    }
}

fn validate_cpf(digits: &str) -> Result<(), PartyError> {
    let values = digit_values(digits);
    if all_same(&values) {
        return Err(PartyError::InvalidTaxId(
            "CPF with repeated digits".to_string(),
        ));
    }

    let first = check_digit(&values[0..9], &[10, 9, 8, 7, 6, 5, 4, 3, 2]);
    let second = check_digit(&values[0..10], &[11, 10, 9, 8, 7, 6, 5, 4, 3, 2]);
    if values[9] != first || values[10] != second {
        return Err(PartyError::InvalidTaxId(format!(
            "CPF check digits do not match: {digits}"
        )));
    }
    Ok(())
}

fn validate_cnpj(digits: &str) -> Result<(), PartyError> {
    let values = digit_values(digits);
    if all_same(&values) {
        return Err(PartyError::InvalidTaxId(
            "CNPJ with repeated digits".to_string(),
        ));
    }

    let first = check_digit(&values[0..12], &[5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2]);
    let second = check_digit(&values[0..13], &[6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2]);
    if values[12] != first || values[13] != second {
        return Err(PartyError::InvalidTaxId(format!(
            "CNPJ check digits do not match: {digits}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_cpf() {
        // Well-known fixture CPF with valid check digits
        let id = TaxId::parse("529.982.247-25").unwrap();
        assert_eq!(id.digits(), "52998224725");
        assert!(!id.is_company());
    }

    #[test]
    fn test_valid_cnpj() {
        let id = TaxId::parse("11.222.333/0001-81").unwrap();
        assert_eq!(id.digits(), "11222333000181");
        assert!(id.is_company());
    }

    #[test]
    fn test_cpf_bad_check_digit() {
        assert!(TaxId::parse("529.982.247-26").is_err());
    }

    #[test]
    fn test_repeated_digits_rejected() {
        assert!(TaxId::parse("111.111.111-11").is_err());
        assert!(TaxId::parse("00.000.000/0000-00").is_err());
    }

    #[test]
    fn test_wrong_length_rejected() {
        assert!(TaxId::parse("1234").is_err());
    }

    #[test]
    fn test_display_formats_punctuation() {
        let cpf = TaxId::parse("52998224725").unwrap();
        assert_eq!(cpf.to_string(), "529.982.247-25");

        let cnpj = TaxId::parse("11222333000181").unwrap();
        assert_eq!(cnpj.to_string(), "11.222.333/0001-81");
    }
}
