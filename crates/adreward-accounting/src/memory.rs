//! In-process [`Accounting`] that records every call.
//!
//! Used by tests to assert exactly which collaborator calls a viewing
//! session produced, and by the demo so it runs without a server.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use adreward_protocol::{Account, Ad, AdId, Credits, UserId};

use crate::{Accounting, AccountingError};

/// The operations of the [`Accounting`] trait, for failure injection and
/// call counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    BeginView,
    ConfirmView,
    CancelView,
    UpdateBalance,
    ListAds,
    FetchAccount,
}

/// One recorded call, with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountingCall {
    BeginView(AdId),
    ConfirmView(AdId),
    CancelView(AdId),
    UpdateBalance { user_id: UserId, balance: Credits },
    ListAds,
    FetchAccount,
}

impl AccountingCall {
    /// Which operation this call was.
    pub fn operation(&self) -> Operation {
        match self {
            Self::BeginView(_) => Operation::BeginView,
            Self::ConfirmView(_) => Operation::ConfirmView,
            Self::CancelView(_) => Operation::CancelView,
            Self::UpdateBalance { .. } => Operation::UpdateBalance,
            Self::ListAds => Operation::ListAds,
            Self::FetchAccount => Operation::FetchAccount,
        }
    }
}

#[derive(Debug)]
struct Ledger {
    ads: Vec<Ad>,
    account: Account,
    calls: Vec<AccountingCall>,
    failing: HashSet<Operation>,
}

/// A fake accounting service holding one account and a list of ads.
///
/// Calls are recorded whether or not they succeed: a failed call was still
/// *made*, which is what tests about at-most-once dispatch care about.
#[derive(Debug)]
pub struct MemoryAccounting {
    ledger: Mutex<Ledger>,
}

impl MemoryAccounting {
    pub fn new(account: Account, ads: Vec<Ad>) -> Self {
        Self {
            ledger: Mutex::new(Ledger {
                ads,
                account,
                calls: Vec::new(),
                failing: HashSet::new(),
            }),
        }
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Makes every future call of `op` fail until [`heal`](Self::heal).
    pub fn fail(&self, op: Operation) {
        self.ledger().failing.insert(op);
    }

    /// Undoes [`fail`](Self::fail).
    pub fn heal(&self, op: Operation) {
        self.ledger().failing.remove(&op);
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<AccountingCall> {
        self.ledger().calls.clone()
    }

    /// How many times `op` was called.
    pub fn count(&self, op: Operation) -> usize {
        self.ledger()
            .calls
            .iter()
            .filter(|c| c.operation() == op)
            .count()
    }

    /// The account as the fake server currently sees it.
    pub fn account(&self) -> Account {
        self.ledger().account.clone()
    }

    /// Replaces the ad list served by `list_ads`.
    pub fn set_ads(&self, ads: Vec<Ad>) {
        self.ledger().ads = ads;
    }

    /// Records `call` and returns an error if its operation is failing.
    fn record(&self, call: AccountingCall) -> Result<MutexGuard<'_, Ledger>, AccountingError> {
        let op = call.operation();
        let mut ledger = self.ledger();
        ledger.calls.push(call);
        if ledger.failing.contains(&op) {
            return Err(AccountingError::Unavailable(format!("{op:?} is failing")));
        }
        Ok(ledger)
    }
}

impl Accounting for MemoryAccounting {
    async fn begin_view(&self, ad_id: &AdId) -> Result<(), AccountingError> {
        self.record(AccountingCall::BeginView(ad_id.clone())).map(drop)
    }

    async fn confirm_view(&self, ad_id: &AdId) -> Result<(), AccountingError> {
        self.record(AccountingCall::ConfirmView(ad_id.clone())).map(drop)
    }

    async fn cancel_view(&self, ad_id: &AdId) -> Result<(), AccountingError> {
        self.record(AccountingCall::CancelView(ad_id.clone())).map(drop)
    }

    async fn update_balance(
        &self,
        user_id: &UserId,
        new_balance: Credits,
    ) -> Result<(), AccountingError> {
        let mut ledger = self.record(AccountingCall::UpdateBalance {
            user_id: user_id.clone(),
            balance: new_balance,
        })?;
        if ledger.account.user_id != *user_id {
            return Err(AccountingError::Status {
                endpoint: format!("PUT /users/{user_id}/balance"),
                status: 404,
            });
        }
        ledger.account.balance = new_balance;
        Ok(())
    }

    async fn list_ads(&self) -> Result<Vec<Ad>, AccountingError> {
        let ledger = self.record(AccountingCall::ListAds)?;
        Ok(ledger.ads.clone())
    }

    async fn fetch_account(&self) -> Result<Account, AccountingError> {
        let ledger = self.record(AccountingCall::FetchAccount)?;
        Ok(ledger.account.clone())
    }
}
