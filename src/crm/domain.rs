//! CRM records as seen by Contrivance and the mapping of their fields onto
//! pipeline columns.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// An account held by the external CRM. Only the opaque identifier and the
/// display name are kept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CrmAccount {
    /// CRM account identifier.
    pub id: String,
    /// Account display name.
    pub name: String,
}

impl CrmAccount {
    /// Creates an account record.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// An opportunity read from the external CRM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrmOpportunity {
    /// CRM opportunity identifier.
    pub id: String,
    /// Opportunity name.
    pub name: String,
    /// Deal amount, when set.
    pub amount: Option<f64>,
    /// Sales stage.
    pub stage: String,
    /// Expected close date as sent by the CRM.
    pub close_date: Option<String>,
    /// Owning account.
    pub account: Option<CrmAccount>,
    /// Display name of the opportunity owner.
    pub owner_name: Option<String>,
}

impl CrmOpportunity {
    /// Creates an opportunity with the required fields.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, stage: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            amount: None,
            stage: stage.into(),
            close_date: None,
            account: None,
            owner_name: None,
        }
    }

    /// Sets the amount.
    #[must_use]
    pub const fn with_amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Sets the close date.
    #[must_use]
    pub fn with_close_date(mut self, date: impl Into<String>) -> Self {
        self.close_date = Some(date.into());
        self
    }

    /// Sets the owning account.
    #[must_use]
    pub fn for_account(mut self, account: CrmAccount) -> Self {
        self.account = Some(account);
        self
    }

    /// Sets the owner's display name.
    #[must_use]
    pub fn owned_by(mut self, owner: impl Into<String>) -> Self {
        self.owner_name = Some(owner.into());
        self
    }

    /// Reads a field by its CRM name (`Id`, `Name`, `Amount`, `StageName`,
    /// `CloseDate`, `Account.Id`, `Account.Name`, `Owner.Name`). Unset or
    /// unknown fields are `None`.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<Value> {
        match name {
            "Id" => Some(Value::String(self.id.clone())),
            "Name" => Some(Value::String(self.name.clone())),
            "Amount" => self.amount.map(Value::from),
            "StageName" => Some(Value::String(self.stage.clone())),
            "CloseDate" => self.close_date.clone().map(Value::String),
            "Account.Id" => self.account.as_ref().map(|acct| Value::String(acct.id.clone())),
            "Account.Name" => self
                .account
                .as_ref()
                .map(|acct| Value::String(acct.name.clone())),
            "Owner.Name" => self.owner_name.clone().map(Value::String),
            _ => None,
        }
    }
}

/// Maps CRM field names onto pipeline column names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping(BTreeMap<String, String>);

impl FieldMapping {
    /// Creates an empty mapping.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// The mapping used for opportunity imports when none is supplied.
    #[must_use]
    pub fn opportunity_defaults() -> Self {
        Self::new()
            .map("Account.Name", "Account")
            .map("Name", "Opportunity")
            .map("Amount", "Amount")
            .map("StageName", "Stage")
            .map("CloseDate", "Close Date")
            .map("Owner.Name", "Owner")
    }

    /// Adds or replaces one field to column pair.
    #[must_use]
    pub fn map(mut self, field: impl Into<String>, column: impl Into<String>) -> Self {
        self.0.insert(field.into(), column.into());
        self
    }

    /// Returns `true` when no field is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Builds raw row data keyed by column name. Fields the opportunity
    /// does not carry are left out so column defaults apply.
    #[must_use]
    pub fn apply(&self, opportunity: &CrmOpportunity) -> Value {
        let mut row = Map::new();
        for (field, column) in &self.0 {
            if let Some(value) = opportunity.field(field) {
                row.insert(column.clone(), value);
            }
        }
        Value::Object(row)
    }
}

impl From<BTreeMap<String, String>> for FieldMapping {
    fn from(pairs: BTreeMap<String, String>) -> Self {
        Self(pairs)
    }
}
