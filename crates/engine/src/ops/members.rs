use chrono::{DateTime, Utc};
use sea_orm::{
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
};
use serde::Serialize;

use crate::{
    BankDetails, EngineError, GlobalSettings, Investment, Money, PollingHints, Profile,
    ResultEngine, Session, Transaction, TransactionKind, TransactionStatus,
    commands::WithdrawalCmd,
    compute_daily_earnings, compute_progress, profiles, transactions,
    util::{
        REFERRAL_CODE_LEN, new_referral_code, normalize_optional_text, normalize_required_text,
        require_positive,
    },
    verification::{ACCOUNT_NUMBER_LEN, PaymentVerifier, is_account_number},
};

use super::{Engine, with_retry, with_tx};

/// Codes drawn before registration gives up on finding a free one.
const REFERRAL_CODE_ATTEMPTS: usize = 5;

/// Number of ledger rows shown on the dashboard.
const RECENT_TRANSACTIONS: u64 = 10;

/// An investment together with the figures the dashboard renders for it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InvestmentView {
    pub investment: Investment,
    pub daily_earnings: Money,
    /// Percent elapsed, `0.0..=100.0`.
    pub progress: f64,
}

impl InvestmentView {
    pub fn at(investment: Investment, now: DateTime<Utc>) -> Self {
        Self {
            daily_earnings: compute_daily_earnings(&investment),
            progress: compute_progress(&investment, now),
            investment,
        }
    }
}

/// Everything a member's home screen polls for.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Dashboard {
    pub profile: Profile,
    pub active_investment: Option<InvestmentView>,
    pub recent_transactions: Vec<Transaction>,
    pub referral_count: u64,
    pub settings: GlobalSettings,
    pub polling: PollingHints,
}

/// Bank fields a payout can be sent to, trimmed. Any gap is a
/// `VerificationFailed`.
fn verified_bank(bank: &BankDetails) -> ResultEngine<BankDetails> {
    let verification = |err: EngineError| EngineError::VerificationFailed(err.to_string());
    let account_number = bank.account_number.trim().to_string();
    if !is_account_number(&account_number) {
        return Err(EngineError::VerificationFailed(format!(
            "account number must be {ACCOUNT_NUMBER_LEN} digits"
        )));
    }
    Ok(BankDetails {
        bank_name: normalize_required_text(&bank.bank_name, "bank name").map_err(verification)?,
        bank_code: normalize_optional_text(bank.bank_code.as_deref()),
        account_number,
        account_name: normalize_required_text(&bank.account_name, "account name")
            .map_err(verification)?,
    })
}

impl Engine {
    /// Create the profile for a freshly authenticated identity.
    ///
    /// `referred_by` is a referral code; codes that match no profile are
    /// dropped rather than rejected.
    pub async fn register_profile(
        &self,
        profile_id: &str,
        email: &str,
        referred_by: Option<&str>,
        now: DateTime<Utc>,
    ) -> ResultEngine<Profile> {
        let profile_id = normalize_required_text(profile_id, "profile id")?;
        let email = normalize_required_text(email, "email")?.to_lowercase();
        let referred_by = normalize_optional_text(referred_by).map(|code| code.to_uppercase());

        let profile = with_tx!(self, |db_tx| {
            let taken = profiles::Entity::find()
                .filter(
                    profiles::Column::Id
                        .eq(profile_id.clone())
                        .or(profiles::Column::Email.eq(email.clone())),
                )
                .one(&db_tx)
                .await?
                .is_some();
            if taken {
                return Err(EngineError::ExistingKey(email.clone()));
            }

            let referred_by = match referred_by.as_deref() {
                Some(code) => profiles::Entity::find()
                    .filter(profiles::Column::ReferralCode.eq(code))
                    .one(&db_tx)
                    .await?
                    .map(|referrer| referrer.referral_code),
                None => None,
            };

            let mut referral_code = None;
            for _ in 0..REFERRAL_CODE_ATTEMPTS {
                let candidate = new_referral_code();
                let clash = profiles::Entity::find()
                    .filter(profiles::Column::ReferralCode.eq(candidate.clone()))
                    .one(&db_tx)
                    .await?
                    .is_some();
                if !clash {
                    referral_code = Some(candidate);
                    break;
                }
            }
            let referral_code = referral_code.ok_or_else(|| {
                EngineError::ExistingKey(format!(
                    "no free {REFERRAL_CODE_LEN}-character referral code"
                ))
            })?;

            let profile = Profile::new(
                profile_id.clone(),
                email.clone(),
                referral_code,
                referred_by,
                now,
            );
            profiles::ActiveModel::try_from(&profile)?
                .insert(&db_tx)
                .await?;
            Ok(profile)
        })?;
        tracing::info!(
            profile_id = %profile.id,
            referred = profile.referred_by.is_some(),
            "profile registered"
        );
        Ok(profile)
    }

    /// How many profiles signed up with the session's referral code.
    pub async fn referral_count(&self, session: &Session) -> ResultEngine<u64> {
        let profile = self
            .require_profile(&self.database, session.profile_id())
            .await?;
        Ok(profiles::Entity::find()
            .filter(profiles::Column::ReferredBy.eq(profile.referral_code))
            .count(&self.database)
            .await?)
    }

    /// Request a payout to a bank account.
    ///
    /// The amount leaves the balance immediately and sits in a `pending`
    /// withdrawal until an admin pays or rejects it.
    pub async fn request_withdrawal(
        &self,
        session: &Session,
        cmd: WithdrawalCmd,
    ) -> ResultEngine<Transaction> {
        require_positive(cmd.amount, "withdrawal amount")?;
        let tx = with_retry!(self, |db_tx| {
            let settings = self.load_settings(&db_tx).await?;
            if settings.withdrawals_paused {
                return Err(EngineError::MaintenanceLocked(
                    "withdrawals are paused".to_string(),
                ));
            }
            let mut profile = self
                .require_member_writable(&db_tx, session, &settings)
                .await?;
            if profile.is_restricted {
                return Err(EngineError::WithdrawalRestricted(
                    "withdrawals are restricted for this account".to_string(),
                ));
            }
            if cmd.amount < settings.withdrawal_min {
                return Err(EngineError::InvalidAmount(format!(
                    "minimum withdrawal is {}",
                    settings.withdrawal_min
                )));
            }

            let bank = verified_bank(&cmd.bank)?;
            let tx = Transaction::new(
                profile.id.clone(),
                cmd.amount,
                TransactionKind::Withdrawal,
                TransactionStatus::Pending,
                format!("Withdrawal to {} ({})", bank.bank_name, bank.account_number),
                cmd.occurred_at,
            )?
            .with_bank(bank);
            self.debit_in(&db_tx, &mut profile, &tx).await?;
            Ok(tx)
        })?;
        tracing::info!(
            user_id = %tx.user_id,
            amount = %tx.amount,
            tx_id = %tx.id,
            "withdrawal requested"
        );
        Ok(tx)
    }

    /// Record a bank transfer the member claims to have made. Nothing is
    /// credited until an admin approves it.
    pub async fn submit_manual_deposit(
        &self,
        session: &Session,
        amount: Money,
        proof_url: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<Transaction> {
        require_positive(amount, "deposit amount")?;
        let proof_url = normalize_required_text(proof_url, "proof of payment")?;
        let tx = with_tx!(self, |db_tx| {
            let settings = self.load_settings(&db_tx).await?;
            let profile = self
                .require_member_writable(&db_tx, session, &settings)
                .await?;
            let tx = Transaction::new(
                profile.id,
                amount,
                TransactionKind::ManualDeposit,
                TransactionStatus::Pending,
                "Manual deposit".to_string(),
                now,
            )?
            .with_proof(proof_url.clone());
            self.insert_transaction(&db_tx, &tx).await?;
            Ok(tx)
        })?;
        tracing::info!(user_id = %tx.user_id, amount = %tx.amount, "manual deposit submitted");
        Ok(tx)
    }

    /// Credit a card payment once the gateway confirms it.
    ///
    /// The reference is checked with `verifier` and the gateway's amount is
    /// credited; `expected` must match it. Keyed on the gateway `reference`:
    /// replaying a confirmation returns the original ledger row and credits
    /// nothing.
    pub async fn confirm_payment<V: PaymentVerifier>(
        &self,
        session: &Session,
        verifier: &V,
        expected: Money,
        reference: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<Transaction> {
        require_positive(expected, "payment amount")?;
        let reference = normalize_required_text(reference, "payment reference")?;
        let payment = verifier.verify(&reference).await.map_err(|err| match err {
            EngineError::VerificationFailed(msg) => EngineError::VerificationFailed(msg),
            other => EngineError::VerificationFailed(other.to_string()),
        })?;
        if payment.reference != reference {
            return Err(EngineError::VerificationFailed(format!(
                "gateway answered for {} instead of {reference}",
                payment.reference
            )));
        }
        if payment.amount != expected {
            return Err(EngineError::VerificationFailed(format!(
                "gateway settled {} for {reference}, not {expected}",
                payment.amount
            )));
        }
        let amount = payment.amount;

        let (tx, replayed) = with_retry!(self, |db_tx| {
            let existing = transactions::Entity::find()
                .filter(transactions::Column::Reference.eq(reference.clone()))
                .one(&db_tx)
                .await?;
            if let Some(existing) = existing {
                let existing = Transaction::try_from(existing)?;
                if existing.user_id != session.profile_id() {
                    return Err(EngineError::ExistingKey(format!(
                        "payment reference {reference} belongs to another profile"
                    )));
                }
                return Ok((existing, true));
            }

            let settings = self.load_settings(&db_tx).await?;
            let mut profile = self
                .require_member_writable(&db_tx, session, &settings)
                .await?;
            let tx = Transaction::new(
                profile.id.clone(),
                amount,
                TransactionKind::Deposit,
                TransactionStatus::Paid,
                "Card deposit".to_string(),
                now,
            )?
            .with_reference(reference.clone());
            self.credit_in(&db_tx, &mut profile, &tx).await?;
            Ok((tx, false))
        })?;
        if replayed {
            tracing::debug!(%reference, "payment confirmation replayed");
        } else {
            tracing::info!(user_id = %tx.user_id, amount = %tx.amount, %reference, "payment credited");
        }
        Ok(tx)
    }

    /// Ledger rows of the session's own profile, newest first.
    pub async fn transactions(&self, session: &Session) -> ResultEngine<Vec<Transaction>> {
        self.transactions_for(session, session.profile_id()).await
    }

    /// Ledger rows of `user_id`, newest first.
    pub async fn transactions_for(
        &self,
        session: &Session,
        user_id: &str,
    ) -> ResultEngine<Vec<Transaction>> {
        Self::require_owner_or_admin(session, user_id)?;
        self.recent_transactions(user_id, None).await
    }

    async fn recent_transactions(
        &self,
        user_id: &str,
        limit: Option<u64>,
    ) -> ResultEngine<Vec<Transaction>> {
        transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id.to_string()))
            .order_by_desc(transactions::Column::CreatedAt)
            .limit(limit)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }

    /// The member home screen in one read.
    pub async fn dashboard(&self, session: &Session, now: DateTime<Utc>) -> ResultEngine<Dashboard> {
        let user_id = session.profile_id();
        let profile = self.require_profile(&self.database, user_id).await?;
        let active_investment = self
            .active_investment(session, user_id, now)
            .await?
            .map(|investment| InvestmentView::at(investment, now));

        Ok(Dashboard {
            recent_transactions: self
                .recent_transactions(user_id, Some(RECENT_TRANSACTIONS))
                .await?,
            referral_count: self.referral_count(session).await?,
            settings: self.load_settings(&self.database).await?,
            polling: PollingHints::default(),
            active_investment,
            profile,
        })
    }
}
