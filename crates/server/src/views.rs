//! Mapping from engine types to wire types.

use api_types::{
    Role as ApiRole,
    chat::MessageView,
    coupon::CouponView,
    dashboard::Dashboard as DashboardView,
    investment::{InvestmentStatus as ApiInvestmentStatus, InvestmentView},
    product::ProductView,
    profile::ProfileView,
    settings::{Polling, Settings},
    transaction::{
        TransactionKind as ApiKind, TransactionStatus as ApiStatus, TransactionView,
    },
};
use chrono::{DateTime, Utc};
use engine::{
    ChatMessage, Coupon, DepositAccount, GlobalSettings, Investment, InvestmentStatus, Money,
    PollingHints, Product, Profile, Role, Transaction, TransactionKind, TransactionStatus,
};

pub(crate) fn map_role(role: Role) -> ApiRole {
    match role {
        Role::User => ApiRole::User,
        Role::Admin => ApiRole::Admin,
    }
}

pub(crate) fn map_kind(kind: TransactionKind) -> ApiKind {
    match kind {
        TransactionKind::Deposit => ApiKind::Deposit,
        TransactionKind::ManualDeposit => ApiKind::ManualDeposit,
        TransactionKind::Withdrawal => ApiKind::Withdrawal,
        TransactionKind::Earnings => ApiKind::Earnings,
        TransactionKind::InvestmentPurchase => ApiKind::InvestmentPurchase,
    }
}

pub(crate) fn unmap_kind(kind: ApiKind) -> TransactionKind {
    match kind {
        ApiKind::Deposit => TransactionKind::Deposit,
        ApiKind::ManualDeposit => TransactionKind::ManualDeposit,
        ApiKind::Withdrawal => TransactionKind::Withdrawal,
        ApiKind::Earnings => TransactionKind::Earnings,
        ApiKind::InvestmentPurchase => TransactionKind::InvestmentPurchase,
    }
}

pub(crate) fn map_status(status: TransactionStatus) -> ApiStatus {
    match status {
        TransactionStatus::Pending => ApiStatus::Pending,
        TransactionStatus::Approved => ApiStatus::Approved,
        TransactionStatus::Rejected => ApiStatus::Rejected,
        TransactionStatus::Paid => ApiStatus::Paid,
    }
}

pub(crate) fn profile_view(profile: Profile) -> ProfileView {
    ProfileView {
        role: map_role(profile.role),
        balance: profile.balance.kobo(),
        used_coupons: profile.used_coupons.into_iter().collect(),
        id: profile.id,
        email: profile.email,
        is_frozen: profile.is_frozen,
        is_restricted: profile.is_restricted,
        warning_message: profile.warning_message,
        referral_code: profile.referral_code,
        referred_by: profile.referred_by,
        created_at: profile.created_at,
    }
}

pub(crate) fn product_view(product: Product) -> ProductView {
    ProductView {
        id: product.id,
        name: product.name,
        price: product.price.kobo(),
        daily_roi: product.daily_roi,
        duration_days: product.duration_days,
        image_url: product.image_url,
        created_at: product.created_at,
    }
}

pub(crate) fn investment_view(investment: Investment, now: DateTime<Utc>) -> InvestmentView {
    let daily_earnings = engine::compute_daily_earnings(&investment).kobo();
    let progress = engine::compute_progress(&investment, now);
    InvestmentView {
        status: match investment.effective_status(now) {
            InvestmentStatus::Active => ApiInvestmentStatus::Active,
            InvestmentStatus::Completed => ApiInvestmentStatus::Completed,
        },
        id: investment.id,
        user_id: investment.user_id,
        product_id: investment.product_id,
        product_name: investment.product_name,
        amount: investment.amount.kobo(),
        daily_roi: investment.daily_roi,
        start_date: investment.start_date,
        end_date: investment.end_date,
        daily_earnings,
        progress,
    }
}

pub(crate) fn transaction_view(tx: Transaction) -> TransactionView {
    let (bank_name, bank_code, account_number, account_name) = match tx.bank {
        Some(bank) => (
            Some(bank.bank_name),
            bank.bank_code,
            Some(bank.account_number),
            Some(bank.account_name),
        ),
        None => (None, None, None, None),
    };
    TransactionView {
        id: tx.id,
        user_id: tx.user_id,
        amount: tx.amount.kobo(),
        kind: map_kind(tx.kind),
        status: map_status(tx.status),
        description: tx.description,
        created_at: tx.created_at,
        bank_name,
        bank_code,
        account_number,
        account_name,
        proof_url: tx.proof_url,
        reference: tx.reference,
        reviewed_by: tx.reviewed_by,
        reviewed_at: tx.reviewed_at,
    }
}

pub(crate) fn coupon_view(coupon: Coupon) -> CouponView {
    CouponView {
        id: coupon.id,
        code: coupon.code,
        amount: coupon.amount.kobo(),
        created_at: coupon.created_at,
    }
}

pub(crate) fn message_view(message: ChatMessage) -> MessageView {
    MessageView {
        id: message.id,
        user_id: message.user_id,
        sender: map_role(message.sender),
        body: message.body,
        created_at: message.created_at,
    }
}

pub(crate) fn settings_view(settings: GlobalSettings) -> Settings {
    Settings {
        withdrawal_min: settings.withdrawal_min.kobo(),
        maintenance_mode: settings.maintenance_mode,
        withdrawals_paused: settings.withdrawals_paused,
        deposit_bank_name: settings.deposit_account.bank_name,
        deposit_account_number: settings.deposit_account.account_number,
        deposit_account_name: settings.deposit_account.account_name,
        support_url: settings.support_url,
        community_url: settings.community_url,
        background_media_url: settings.background_media_url,
        updated_at: settings.updated_at,
    }
}

pub(crate) fn settings_from_view(settings: Settings) -> GlobalSettings {
    GlobalSettings {
        withdrawal_min: Money::new(settings.withdrawal_min),
        maintenance_mode: settings.maintenance_mode,
        withdrawals_paused: settings.withdrawals_paused,
        deposit_account: DepositAccount {
            bank_name: settings.deposit_bank_name,
            account_number: settings.deposit_account_number,
            account_name: settings.deposit_account_name,
        },
        support_url: settings.support_url,
        community_url: settings.community_url,
        background_media_url: settings.background_media_url,
        updated_at: None,
    }
}

pub(crate) fn polling_view(polling: PollingHints) -> Polling {
    Polling {
        admin_secs: polling.admin_secs,
        dashboard_secs: polling.dashboard_secs,
        chat_secs: polling.chat_secs,
    }
}

pub(crate) fn dashboard_view(dashboard: engine::Dashboard, now: DateTime<Utc>) -> DashboardView {
    DashboardView {
        profile: profile_view(dashboard.profile),
        active_investment: dashboard
            .active_investment
            .map(|view| investment_view(view.investment, now)),
        recent_transactions: dashboard
            .recent_transactions
            .into_iter()
            .map(transaction_view)
            .collect(),
        referral_count: dashboard.referral_count,
        settings: settings_view(dashboard.settings),
        polling: polling_view(dashboard.polling),
    }
}
