use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::identity::ClientRecord;

/// Transaction direction as reported by the banking service.
///
/// The service emits upper-case kinds; the lower-case aliases cover the
/// ledger's storage spelling which older responses leak through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    #[serde(alias = "deposit")]
    Deposit,
    #[serde(alias = "withdraw", alias = "withdrawal")]
    Withdrawal,
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Deposit => write!(f, "DEPOSIT"),
            TransactionKind::Withdrawal => write!(f, "WITHDRAWAL"),
        }
    }
}

/// A single ledger entry from `GET /transactions`.
///
/// Order is preserved exactly as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Decimal,
    #[serde(rename = "transactionDate", default)]
    pub transaction_date: Option<NaiveDateTime>,
}

/// Response from `GET /balance`.
#[derive(Debug, Clone, Deserialize)]
pub struct BalanceResponse {
    pub balance: Decimal,
}

/// Merged point-in-time view of the account.
///
/// Only the aggregated fetcher mutates this, and always as a whole-snapshot
/// replace. `client_roster` stays empty for non-privileged identities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub balance: Decimal,
    pub transactions: Vec<Transaction>,
    pub client_roster: Vec<ClientRecord>,
}

/// Parse user input into a strictly positive amount.
///
/// Returns `None` for non-numeric input and for amounts of zero or less;
/// callers reject those locally without a network call.
pub fn parse_positive_amount(input: &str) -> Option<Decimal> {
    let amount: Decimal = input.trim().parse().ok()?;
    (amount > Decimal::ZERO).then_some(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn transaction_kind_parses_both_casings() {
        let upper: TransactionKind = serde_json::from_str("\"DEPOSIT\"").expect("upper");
        assert_eq!(upper, TransactionKind::Deposit);
        let lower: TransactionKind = serde_json::from_str("\"withdraw\"").expect("lower");
        assert_eq!(lower, TransactionKind::Withdrawal);
        let long: TransactionKind = serde_json::from_str("\"WITHDRAWAL\"").expect("long");
        assert_eq!(long, TransactionKind::Withdrawal);
    }

    #[test]
    fn transaction_parses_with_and_without_metadata() {
        let json = r#"{"type":"DEPOSIT","amount":120.5}"#;
        let tx: Transaction = serde_json::from_str(json).expect("bare transaction");
        assert_eq!(tx.kind, TransactionKind::Deposit);
        assert_eq!(tx.amount, Decimal::from_str("120.5").expect("decimal"));
        assert!(tx.id.is_none());

        let json = r#"{"id":3,"type":"withdraw","amount":50,"accountId":1,"transactionDate":"2025-05-01T09:30:00"}"#;
        let tx: Transaction = serde_json::from_str(json).expect("full transaction");
        assert_eq!(tx.id, Some(3));
        assert_eq!(tx.kind, TransactionKind::Withdrawal);
        assert!(tx.transaction_date.is_some());
    }

    #[test]
    fn balance_response_parses_fractional_number() {
        let parsed: BalanceResponse =
            serde_json::from_str(r#"{"balance":120.5}"#).expect("balance");
        assert_eq!(parsed.balance, Decimal::from_str("120.5").expect("decimal"));
    }

    #[test]
    fn positive_amounts_only() {
        assert_eq!(
            parse_positive_amount("50"),
            Some(Decimal::from_str("50").expect("decimal"))
        );
        assert_eq!(
            parse_positive_amount(" 12.75 "),
            Some(Decimal::from_str("12.75").expect("decimal"))
        );
        assert_eq!(parse_positive_amount("0"), None);
        assert_eq!(parse_positive_amount("-3"), None);
        assert_eq!(parse_positive_amount("abc"), None);
        assert_eq!(parse_positive_amount(""), None);
    }

    #[test]
    fn empty_snapshot_is_default() {
        let snapshot = AccountSnapshot::default();
        assert_eq!(snapshot.balance, Decimal::ZERO);
        assert!(snapshot.transactions.is_empty());
        assert!(snapshot.client_roster.is_empty());
    }
}
