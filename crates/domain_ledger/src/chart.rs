//! Chart of accounts
//!
//! Ledger entries and bank movements carry a chart-of-accounts
//! classification; the DRE report is grouped by the classification's
//! DRE metadata (group, subgroup, order, sign). Chart templates are
//! maintained as spreadsheets by the accounting team and imported from
//! CSV, so the importer is tolerant about header spelling (accents,
//! Portuguese/English aliases) but strict about values.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;

use core_kernel::ChartAccountId;
use crate::error::LedgerError;

/// Accounting type of a chart account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Asset,
    Liability,
    Equity,
    Revenue,
    Cost,
    Expense,
    Other,
}

/// Natural balance side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountNature {
    Debit,
    Credit,
}

/// How the account contributes to the DRE result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DreSign {
    Add,
    Subtract,
}

/// Chart account lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Active,
    Inactive,
    Pending,
}

/// One account in a chart-of-accounts template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartAccount {
    pub id: ChartAccountId,
    pub code: String,
    pub description: String,
    /// Hierarchy depth; 1 for roots
    pub level: u8,
    pub parent_code: Option<String>,
    pub account_type: AccountType,
    pub nature: AccountNature,
    /// Analytic accounts take postings; synthetic accounts only group
    pub is_analytic: bool,
    pub status: AccountStatus,
    pub dre_group: String,
    pub dre_subgroup: String,
    pub dre_order: u16,
    pub dre_sign: DreSign,
}

/// A named chart-of-accounts template and its accounts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartTemplate {
    pub name: String,
    accounts: Vec<ChartAccount>,
}

impl ChartTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            accounts: Vec::new(),
        }
    }

    /// Adds an account, enforcing code uniqueness and hierarchy rules
    pub fn add(&mut self, account: ChartAccount) -> Result<(), LedgerError> {
        let mut issues = Vec::new();

        if self.find(&account.code).is_some() {
            issues.push(format!("code: duplicate within template: {}", account.code));
        }
        if account.level < 1 {
            issues.push("level: must be at least 1".to_string());
        }
        match &account.parent_code {
            None => {
                if account.level > 1 {
                    issues.push("parent: required for levels above 1".to_string());
                }
            }
            Some(parent_code) => {
                if account.level == 1 {
                    issues.push("parent: must be empty for level 1".to_string());
                }
                if parent_code.eq_ignore_ascii_case(&account.code) {
                    issues.push("parent: account cannot be its own parent".to_string());
                }
                match self.find(parent_code) {
                    None => issues.push(format!("parent: not found: {parent_code}")),
                    Some(parent) => {
                        if account.level <= parent.level {
                            issues.push(
                                "level: must be greater than the parent's level".to_string(),
                            );
                        }
                    }
                }
            }
        }

        if !issues.is_empty() {
            return Err(LedgerError::Validation(issues));
        }
        self.accounts.push(account);
        Ok(())
    }

    /// Finds an account by code, case-insensitively
    pub fn find(&self, code: &str) -> Option<&ChartAccount> {
        self.accounts
            .iter()
            .find(|a| a.code.eq_ignore_ascii_case(code))
    }

    pub fn accounts(&self) -> &[ChartAccount] {
        &self.accounts
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

/// Result of a chart template CSV import
#[derive(Debug, Default)]
pub struct ChartImportOutcome {
    /// Imported templates keyed by template name
    pub templates: HashMap<String, ChartTemplate>,
    pub imported: usize,
}

/// CSV importer for chart-of-accounts templates
///
/// Accepts the accounting team's spreadsheet export: one row per
/// account, a header row naming the columns in Portuguese or English.
/// The import is all-or-nothing: any invalid line fails the whole file
/// with a per-line error report, so a template is never half-loaded.
pub struct ChartCsvImporter;

const REQUIRED_FIELDS: &[&str] = &[
    "template",
    "code",
    "description",
    "level",
    "account_type",
    "nature",
    "is_analytic",
    "dre_group",
    "dre_order",
    "dre_sign",
];

impl ChartCsvImporter {
    /// Imports chart templates from CSV text
    pub fn import<R: Read>(reader: R) -> Result<ChartImportOutcome, LedgerError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| LedgerError::ChartImport(vec![format!("unreadable header: {e}")]))?
            .clone();

        let header_map = build_header_map(&headers)?;

        let mut errors: Vec<String> = Vec::new();
        let mut drafts: Vec<(usize, RowDraft)> = Vec::new();

        for (index, record) in csv_reader.records().enumerate() {
            let line = index + 2;
            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    errors.push(format!("line {line}: {e}"));
                    continue;
                }
            };
            if record.iter().all(|field| field.trim().is_empty()) {
                continue;
            }
            match parse_row(&record, &header_map) {
                Ok(draft) => drafts.push((line, draft)),
                Err(issues) => {
                    for issue in issues {
                        errors.push(format!("line {line}: {issue}"));
                    }
                }
            }
        }

        if !errors.is_empty() {
            return Err(LedgerError::ChartImport(errors));
        }

        let mut outcome = ChartImportOutcome::default();
        for (line, draft) in drafts {
            let template = outcome
                .templates
                .entry(draft.template.clone())
                .or_insert_with(|| ChartTemplate::new(draft.template.clone()));
            let account = draft.into_account();
            if let Err(e) = template.add(account) {
                errors.push(format!("line {line}: {e}"));
            } else {
                outcome.imported += 1;
            }
        }

        if !errors.is_empty() {
            return Err(LedgerError::ChartImport(errors));
        }
        Ok(outcome)
    }
}

struct RowDraft {
    template: String,
    code: String,
    description: String,
    level: u8,
    parent_code: Option<String>,
    account_type: AccountType,
    nature: AccountNature,
    is_analytic: bool,
    status: AccountStatus,
    dre_group: String,
    dre_subgroup: String,
    dre_order: u16,
    dre_sign: DreSign,
}

impl RowDraft {
    fn into_account(self) -> ChartAccount {
        ChartAccount {
            id: ChartAccountId::new_v7(),
            code: self.code,
            description: self.description,
            level: self.level,
            parent_code: self.parent_code,
            account_type: self.account_type,
            nature: self.nature,
            is_analytic: self.is_analytic,
            status: self.status,
            dre_group: self.dre_group,
            dre_subgroup: self.dre_subgroup,
            dre_order: self.dre_order,
            dre_sign: self.dre_sign,
        }
    }
}

/// Lowercases, strips accents and collapses whitespace
fn normalize(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut last_space = false;
    for c in value.trim().to_lowercase().chars() {
        let folded = match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        };
        if folded.is_whitespace() {
            if !last_space && !out.is_empty() {
                out.push(' ');
            }
            last_space = true;
        } else {
            out.push(folded);
            last_space = false;
        }
    }
    out.trim_end().to_string()
}

fn column_alias(normalized: &str) -> Option<&'static str> {
    let field = match normalized {
        "modelo" | "nome do modelo" | "template" | "plano de contas" => "template",
        "codigo" => "code",
        "conta" | "descricao" | "descricao da conta" | "description" => "description",
        "nivel" | "level" => "level",
        "conta pai" | "codigo conta pai" | "codigo pai" | "parent" => "parent_code",
        "tipo" | "tipo de conta" | "type" => "account_type",
        "natureza" | "nature" => "nature",
        "analitica" | "analytic" => "is_analytic",
        "status" => "status",
        "grupo dre" | "dre group" => "dre_group",
        "linha dre" | "dre line" => "dre_subgroup",
        "ordem dre" | "dre order" => "dre_order",
        "sinal dre" | "dre sign" => "dre_sign",
        _ => return None,
    };
    Some(field)
}

fn build_header_map(headers: &csv::StringRecord) -> Result<HashMap<usize, &'static str>, LedgerError> {
    let mut map = HashMap::new();
    for (idx, header) in headers.iter().enumerate() {
        if let Some(field) = column_alias(&normalize(header)) {
            map.insert(idx, field);
        }
    }
    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .filter(|f| !map.values().any(|v| v == *f))
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(LedgerError::ChartImport(vec![format!(
            "missing required columns: {}",
            missing.join(", ")
        )]));
    }
    Ok(map)
}

fn parse_row(
    record: &csv::StringRecord,
    header_map: &HashMap<usize, &'static str>,
) -> Result<RowDraft, Vec<String>> {
    let mut fields: HashMap<&str, &str> = HashMap::new();
    for (idx, field) in header_map {
        if let Some(value) = record.get(*idx) {
            fields.insert(field, value);
        }
    }

    let mut issues = Vec::new();
    let get = |name: &str| fields.get(name).map(|v| v.trim()).unwrap_or("");

    let mut require = |name: &str| {
        let value = get(name);
        if value.is_empty() {
            issues.push(format!("{name}: required"));
        }
        value.to_string()
    };

    let template = require("template");
    let code = require("code");
    let description = require("description");
    let dre_group = require("dre_group");
    let dre_subgroup = get("dre_subgroup").to_string();
    let parent_code = {
        let value = get("parent_code");
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    };

    let level = match get("level").parse::<u8>() {
        Ok(n) if n >= 1 => n,
        _ => {
            issues.push("level: must be a number >= 1".to_string());
            0
        }
    };
    let dre_order = match get("dre_order").parse::<u16>() {
        Ok(n) => n,
        Err(_) => {
            issues.push("dre_order: must be a number".to_string());
            0
        }
    };

    let account_type = parse_account_type(get("account_type")).unwrap_or_else(|e| {
        issues.push(e);
        AccountType::Other
    });
    let nature = parse_nature(get("nature")).unwrap_or_else(|e| {
        issues.push(e);
        AccountNature::Debit
    });
    let is_analytic = parse_bool(get("is_analytic")).unwrap_or_else(|e| {
        issues.push(e);
        true
    });
    let status = parse_status(get("status")).unwrap_or_else(|e| {
        issues.push(e);
        AccountStatus::Active
    });
    let dre_sign = parse_dre_sign(get("dre_sign")).unwrap_or_else(|e| {
        issues.push(e);
        DreSign::Add
    });

    if issues.is_empty() {
        Ok(RowDraft {
            template,
            code,
            description,
            level,
            parent_code,
            account_type,
            nature,
            is_analytic,
            status,
            dre_group,
            dre_subgroup,
            dre_order,
            dre_sign,
        })
    } else {
        Err(issues)
    }
}

fn parse_account_type(value: &str) -> Result<AccountType, String> {
    match normalize(value).as_str() {
        "asset" | "ativo" => Ok(AccountType::Asset),
        "liability" | "passivo" => Ok(AccountType::Liability),
        "equity" | "patrimonio" | "patrimonio liquido" => Ok(AccountType::Equity),
        "revenue" | "receita" => Ok(AccountType::Revenue),
        "cost" | "custo" => Ok(AccountType::Cost),
        "expense" | "despesa" => Ok(AccountType::Expense),
        "other" | "outro" | "outros" => Ok(AccountType::Other),
        other => Err(format!("account_type: invalid value: {other}")),
    }
}

fn parse_nature(value: &str) -> Result<AccountNature, String> {
    match normalize(value).as_str() {
        "debit" | "debito" | "d" => Ok(AccountNature::Debit),
        "credit" | "credito" | "c" => Ok(AccountNature::Credit),
        other => Err(format!("nature: invalid value: {other}")),
    }
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match normalize(value).as_str() {
        "true" | "1" | "yes" | "y" | "sim" | "s" | "x" => Ok(true),
        "false" | "0" | "no" | "n" | "nao" => Ok(false),
        other => Err(format!("is_analytic: must be yes/no, got: {other}")),
    }
}

fn parse_status(value: &str) -> Result<AccountStatus, String> {
    match normalize(value).as_str() {
        "" | "active" | "ativo" => Ok(AccountStatus::Active),
        "inactive" | "inativo" => Ok(AccountStatus::Inactive),
        "pending" | "pendente" => Ok(AccountStatus::Pending),
        other => Err(format!("status: invalid value: {other}")),
    }
}

fn parse_dre_sign(value: &str) -> Result<DreSign, String> {
    match normalize(value).as_str() {
        "add" | "somar" | "soma" | "adicionar" | "positivo" | "+" => Ok(DreSign::Add),
        "subtract" | "subtrair" | "subtracao" | "negativo" | "-" => Ok(DreSign::Subtract),
        other => Err(format!("dre_sign: invalid value: {other}")),
    }
}
