//! Покупка VIP-статуса и движение токенов.

use chrono::NaiveDateTime;
use rusqlite::{Connection, TransactionBehavior};

use crate::core::config;
use crate::core::error::DomainError;
use crate::storage::transactions;
use crate::storage::users;

/// Покупает VIP-статус за токены.
///
/// Срок считается от `vip_until`, если VIP еще активен, иначе от `now`:
/// повторная покупка продлевает статус, а не сбрасывает его.
///
/// # Errors
///
/// * `NotFound` — пользователь не существует;
/// * `InsufficientTokens` — на балансе меньше `vip::COST_TOKENS`.
pub fn purchase_vip(
    conn: &mut Connection,
    user_id: i64,
    now: NaiveDateTime,
) -> Result<NaiveDateTime, DomainError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let user = users::get_user_by_id(&tx, user_id)?.ok_or(DomainError::NotFound)?;

    let cost = config::vip::COST_TOKENS;
    if !users::spend_tokens(&tx, user_id, cost)? {
        return Err(DomainError::InsufficientTokens {
            have: user.tokens,
            need: cost,
        });
    }

    let base = match user.vip_until {
        Some(until) if user.is_vip(now) => until,
        _ => now,
    };
    let until = base + chrono::Duration::days(config::vip::DURATION_DAYS);

    users::set_vip(&tx, user_id, until)?;
    transactions::record_transaction(&tx, user_id, -cost, "Покупка VIP-статуса")?;

    tx.commit()?;
    log::info!("User {} purchased VIP until {}", user_id, until);
    Ok(until)
}

/// Зачисляет токены на баланс и пишет запись в журнал.
pub fn top_up_tokens(
    conn: &mut Connection,
    user_id: i64,
    amount: i64,
    description: &str,
) -> Result<(), DomainError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    if users::get_user_by_id(&tx, user_id)?.is_none() {
        return Err(DomainError::NotFound);
    }

    users::add_tokens(&tx, user_id, amount)?;
    transactions::record_transaction(&tx, user_id, amount, description)?;

    tx.commit()?;
    log::info!("User {} topped up {} tokens", user_id, amount);
    Ok(())
}
