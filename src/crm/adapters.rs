//! Fixed, in-memory CRM directory.

use super::{
    domain::{CrmAccount, CrmOpportunity},
    ports::{AccountDirectory, CrmResult, OpportunitySource},
};
use async_trait::async_trait;

/// CRM adapter serving a fixed set of accounts and opportunities.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticCrmDirectory {
    accounts: Vec<CrmAccount>,
    opportunities: Vec<CrmOpportunity>,
}

impl StaticCrmDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an account.
    #[must_use]
    pub fn with_account(mut self, account: CrmAccount) -> Self {
        self.accounts.push(account);
        self
    }

    /// Adds an opportunity. Its account, if any, is added too.
    #[must_use]
    pub fn with_opportunity(mut self, opportunity: CrmOpportunity) -> Self {
        if let Some(account) = &opportunity.account
            && !self.accounts.iter().any(|known| known.id == account.id)
        {
            self.accounts.push(account.clone());
        }
        self.opportunities.push(opportunity);
        self
    }
}

#[async_trait]
impl AccountDirectory for StaticCrmDirectory {
    async fn list_accounts(&self) -> CrmResult<Vec<CrmAccount>> {
        Ok(self.accounts.clone())
    }

    async fn find_account(&self, id: &str) -> CrmResult<Option<CrmAccount>> {
        Ok(self.accounts.iter().find(|account| account.id == id).cloned())
    }
}

#[async_trait]
impl OpportunitySource for StaticCrmDirectory {
    async fn list_opportunities(&self) -> CrmResult<Vec<CrmOpportunity>> {
        Ok(self.opportunities.clone())
    }
}
