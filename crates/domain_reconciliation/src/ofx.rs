//! OFX statement parsing
//!
//! Banks export statements as OFX 1.x (SGML with `KEY:VALUE` headers,
//! leaf tags often left unclosed) or OFX 2.x (an XML document). Both
//! share the same tag vocabulary, so a single tolerant tag scanner
//! covers them: headers are skipped, `<STMTTRN>` blocks become
//! transactions, and only the tags the reconciliation flow needs are
//! read. Unknown tags are ignored.
//!
//! A transaction must carry `DTPOSTED` and `TRNAMT`; everything else is
//! optional. Dates are read from the leading `YYYYMMDD` digits,
//! tolerating time-of-day and timezone suffixes like
//! `20250131120000[-3:BRT]`. Amounts accept `.` or `,` as the decimal
//! separator; the sign encodes direction (credits positive, debits
//! negative).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ReconciliationError;

/// One `<STMTTRN>` block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfxTransaction {
    pub posted_at: NaiveDate,
    /// Signed amount as exported by the bank
    pub amount: Decimal,
    pub fit_id: String,
    pub trn_type: String,
    pub name: String,
    pub memo: String,
    pub check_number: String,
}

/// A parsed OFX statement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfxDocument {
    pub bank_id: String,
    pub account_id: String,
    pub currency: String,
    pub statement_start: Option<NaiveDate>,
    pub statement_end: Option<NaiveDate>,
    pub transactions: Vec<OfxTransaction>,
}

impl OfxDocument {
    /// Parses OFX 1.x or 2.x text
    pub fn parse(input: &str) -> Result<Self, ReconciliationError> {
        let body = strip_sgml_headers(input);
        if !body.contains('<') {
            return Err(ReconciliationError::OfxParse(
                "no OFX tags found".to_string(),
            ));
        }

        let mut doc = OfxDocument::default();
        let mut current: Option<TransactionBuilder> = None;
        let mut txn_index = 0usize;

        for token in TagScanner::new(body) {
            match token {
                Token::Open(tag, value) => {
                    let tag = tag.to_ascii_uppercase();
                    match tag.as_str() {
                        "STMTTRN" => {
                            // Tolerate a bank that never closes blocks
                            if let Some(builder) = current.take() {
                                doc.transactions.push(builder.build(txn_index)?);
                                txn_index += 1;
                            }
                            current = Some(TransactionBuilder::default());
                        }
                        _ => {
                            let value = decode_entities(value.trim());
                            if let Some(builder) = current.as_mut() {
                                builder.set(&tag, value);
                            } else {
                                doc.set_header_field(&tag, value, txn_index)?;
                            }
                        }
                    }
                }
                Token::Close(tag) => {
                    if tag.eq_ignore_ascii_case("STMTTRN") {
                        let builder = current.take().ok_or_else(|| {
                            ReconciliationError::OfxParse(
                                "</STMTTRN> without matching open tag".to_string(),
                            )
                        })?;
                        doc.transactions.push(builder.build(txn_index)?);
                        txn_index += 1;
                    }
                }
            }
        }

        // EOF closes a dangling block
        if let Some(builder) = current.take() {
            doc.transactions.push(builder.build(txn_index)?);
        }

        Ok(doc)
    }

    fn set_header_field(
        &mut self,
        tag: &str,
        value: String,
        index: usize,
    ) -> Result<(), ReconciliationError> {
        match tag {
            "BANKID" => self.bank_id = value,
            "ACCTID" => self.account_id = value,
            "CURDEF" => self.currency = value,
            "DTSTART" => self.statement_start = Some(parse_ofx_date(&value, index)?),
            "DTEND" => self.statement_end = Some(parse_ofx_date(&value, index)?),
            _ => {}
        }
        Ok(())
    }
}

#[derive(Default)]
struct TransactionBuilder {
    posted_at: Option<String>,
    amount: Option<String>,
    fit_id: String,
    trn_type: String,
    name: String,
    memo: String,
    check_number: String,
}

impl TransactionBuilder {
    fn set(&mut self, tag: &str, value: String) {
        match tag {
            "DTPOSTED" => self.posted_at = Some(value),
            "TRNAMT" => self.amount = Some(value),
            "FITID" => self.fit_id = value,
            "TRNTYPE" => self.trn_type = value,
            "NAME" => self.name = value,
            "MEMO" => self.memo = value,
            "CHECKNUM" => self.check_number = value,
            _ => {}
        }
    }

    fn build(self, index: usize) -> Result<OfxTransaction, ReconciliationError> {
        let posted_raw = self
            .posted_at
            .ok_or(ReconciliationError::OfxMissingTag {
                index,
                tag: "DTPOSTED",
            })?;
        let amount_raw = self.amount.ok_or(ReconciliationError::OfxMissingTag {
            index,
            tag: "TRNAMT",
        })?;

        Ok(OfxTransaction {
            posted_at: parse_ofx_date(&posted_raw, index)?,
            amount: parse_ofx_amount(&amount_raw, index)?,
            fit_id: self.fit_id,
            trn_type: self.trn_type,
            name: self.name,
            memo: self.memo,
            check_number: self.check_number,
        })
    }
}

enum Token<'a> {
    /// Opening tag and the text that follows it, up to the next tag
    Open(&'a str, &'a str),
    Close(&'a str),
}

/// Minimal tag scanner shared by the SGML and XML flavors
struct TagScanner<'a> {
    rest: &'a str,
}

impl<'a> TagScanner<'a> {
    fn new(input: &'a str) -> Self {
        Self { rest: input }
    }
}

impl<'a> Iterator for TagScanner<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let open = self.rest.find('<')?;
            let after = &self.rest[open + 1..];
            let close = match after.find('>') {
                Some(c) => c,
                None => {
                    self.rest = "";
                    return None;
                }
            };
            let tag = after[..close].trim();
            let remainder = &after[close + 1..];
            let value_end = remainder.find('<').unwrap_or(remainder.len());
            let value = &remainder[..value_end];
            self.rest = remainder;

            // Skip processing instructions and declarations
            if tag.starts_with('?') || tag.starts_with('!') {
                continue;
            }
            if let Some(name) = tag.strip_prefix('/') {
                return Some(Token::Close(name.trim()));
            }
            // Self-closing XML leaf, e.g. <BALAMT/>
            let name = tag.strip_suffix('/').unwrap_or(tag).trim();
            return Some(Token::Open(name, value));
        }
    }
}

/// Drops OFX 1.x `KEY:VALUE` header lines preceding the first tag
fn strip_sgml_headers(input: &str) -> &str {
    match input.find('<') {
        Some(pos) => &input[pos..],
        None => input,
    }
}

fn decode_entities(value: &str) -> String {
    value
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&apos;", "'")
        .replace("&quot;", "\"")
}

/// Reads the `YYYYMMDD` prefix of an OFX date value
fn parse_ofx_date(value: &str, index: usize) -> Result<NaiveDate, ReconciliationError> {
    let digits: String = value.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.len() < 8 {
        return Err(ReconciliationError::OfxInvalidDate {
            index,
            value: value.to_string(),
        });
    }
    NaiveDate::parse_from_str(&digits[..8], "%Y%m%d").map_err(|_| {
        ReconciliationError::OfxInvalidDate {
            index,
            value: value.to_string(),
        }
    })
}

/// Parses a signed OFX amount, accepting `.` or `,` decimals
fn parse_ofx_amount(value: &str, index: usize) -> Result<Decimal, ReconciliationError> {
    let normalized = value.trim().replace(',', ".");
    Decimal::from_str(&normalized).map_err(|_| ReconciliationError::OfxInvalidAmount {
        index,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const OFX_V1: &str = "\
OFXHEADER:100
DATA:OFXSGML
VERSION:102
SECURITY:NONE
ENCODING:USASCII
CHARSET:1252
COMPRESSION:NONE
OLDFILEUID:NONE
NEWFILEUID:NONE

<OFX>
<BANKMSGSRSV1>
<STMTTRNRS>
<STMTRS>
<CURDEF>BRL
<BANKACCTFROM>
<BANKID>0341
<ACCTID>45678-9
</BANKACCTFROM>
<BANKTRANLIST>
<DTSTART>20250101
<DTEND>20250131120000[-3:BRT]
<STMTTRN>
<TRNTYPE>CREDIT
<DTPOSTED>20250110120000[-3:BRT]
<TRNAMT>1500.00
<FITID>202501100001
<NAME>TED RECEBIDA
<MEMO>ACME LTDA
</STMTTRN>
<STMTTRN>
<TRNTYPE>DEBIT
<DTPOSTED>20250115
<TRNAMT>-230,50
<FITID>202501150007
<MEMO>TARIFA BANCARIA
<CHECKNUM>000123
</STMTTRN>
</BANKTRANLIST>
</STMTRS>
</STMTTRNRS>
</BANKMSGSRSV1>
</OFX>
";

    #[test]
    fn test_parse_ofx_v1_statement() {
        let doc = OfxDocument::parse(OFX_V1).unwrap();
        assert_eq!(doc.bank_id, "0341");
        assert_eq!(doc.account_id, "45678-9");
        assert_eq!(doc.currency, "BRL");
        assert_eq!(
            doc.statement_start,
            Some(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
        );
        assert_eq!(
            doc.statement_end,
            Some(NaiveDate::from_ymd_opt(2025, 1, 31).unwrap())
        );
        assert_eq!(doc.transactions.len(), 2);

        let credit = &doc.transactions[0];
        assert_eq!(credit.amount, dec!(1500.00));
        assert_eq!(credit.fit_id, "202501100001");
        assert_eq!(credit.name, "TED RECEBIDA");
        assert_eq!(
            credit.posted_at,
            NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()
        );

        let debit = &doc.transactions[1];
        assert_eq!(debit.amount, dec!(-230.50));
        assert_eq!(debit.check_number, "000123");
    }

    #[test]
    fn test_parse_ofx_v2_xml() {
        let xml = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
<?OFX OFXHEADER=\"200\" VERSION=\"211\"?>\n\
<OFX><BANKMSGSRSV1><STMTTRNRS><STMTRS>\
<CURDEF>BRL</CURDEF>\
<BANKACCTFROM><BANKID>0260</BANKID><ACCTID>1234</ACCTID></BANKACCTFROM>\
<BANKTRANLIST>\
<STMTTRN><TRNTYPE>PIX</TRNTYPE><DTPOSTED>20250203</DTPOSTED>\
<TRNAMT>99.90</TRNAMT><FITID>A1</FITID><MEMO>Pix recebido</MEMO></STMTTRN>\
</BANKTRANLIST></STMTRS></STMTTRNRS></BANKMSGSRSV1></OFX>";

        let doc = OfxDocument::parse(xml).unwrap();
        assert_eq!(doc.bank_id, "0260");
        assert_eq!(doc.transactions.len(), 1);
        assert_eq!(doc.transactions[0].amount, dec!(99.90));
        assert_eq!(doc.transactions[0].memo, "Pix recebido");
    }

    #[test]
    fn test_transaction_without_amount_fails() {
        let ofx = "<OFX><STMTTRN><DTPOSTED>20250101<FITID>X</STMTTRN></OFX>";
        let err = OfxDocument::parse(ofx).unwrap_err();
        assert!(matches!(
            err,
            ReconciliationError::OfxMissingTag { tag: "TRNAMT", .. }
        ));
    }

    #[test]
    fn test_invalid_date_fails() {
        let ofx = "<OFX><STMTTRN><DTPOSTED>January<TRNAMT>1.00</STMTTRN></OFX>";
        assert!(matches!(
            OfxDocument::parse(ofx).unwrap_err(),
            ReconciliationError::OfxInvalidDate { .. }
        ));
    }

    #[test]
    fn test_unclosed_final_block_is_tolerated() {
        let ofx = "<OFX><STMTTRN><DTPOSTED>20250101<TRNAMT>10.00<FITID>F1";
        let doc = OfxDocument::parse(ofx).unwrap();
        assert_eq!(doc.transactions.len(), 1);
        assert_eq!(doc.transactions[0].fit_id, "F1");
    }

    #[test]
    fn test_no_tags_is_an_error() {
        assert!(matches!(
            OfxDocument::parse("OFXHEADER:100\n").unwrap_err(),
            ReconciliationError::OfxParse(_)
        ));
    }

    #[test]
    fn test_entities_decoded_in_memo() {
        let ofx = "<OFX><STMTTRN><DTPOSTED>20250101<TRNAMT>10.00<MEMO>P&amp;D LTDA</STMTTRN></OFX>";
        let doc = OfxDocument::parse(ofx).unwrap();
        assert_eq!(doc.transactions[0].memo, "P&D LTDA");
    }
}
