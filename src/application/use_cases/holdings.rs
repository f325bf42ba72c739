//! Holding mutations: validate, send, invalidate, notify.

use crate::application::context::AppContext;
use crate::application::keys;
use crate::domain::errors::{AppError, AppResult, FetchError};
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::portfolio::{Holding, HoldingForm, HoldingId, Identity, UserId};

fn require_identity(ctx: &AppContext, message: &str) -> AppResult<Identity> {
    ctx.session.identity().ok_or_else(|| {
        ctx.notifications.error(message);
        AppError::NotAuthenticated
    })
}

/// Refreshes every query that shows this user's holdings.
pub(super) fn invalidate_user(ctx: &AppContext, user_id: UserId) -> usize {
    keys_for_user(user_id)
        .iter()
        .map(|key| ctx.queries.invalidate(key))
        .sum()
}

fn keys_for_user(user_id: UserId) -> [crate::domain::query::QueryKey; 3] {
    [
        keys::holdings(user_id),
        keys::portfolio_value(user_id),
        keys::user_holdings_prefix(user_id),
    ]
}

fn report(ctx: &AppContext, error: FetchError, fallback: &str) -> AppError {
    let message = error.message();
    get_logger().error(LogComponent::Application("Holdings"), &format!("{fallback} {message}"));
    ctx.notifications.error(if message.trim().is_empty() { fallback.to_string() } else { message });
    error.into()
}

/// Field errors come back as [`AppError::Validation`] without any request.
pub async fn add_holding(ctx: &AppContext, form: &HoldingForm) -> AppResult<Holding> {
    let draft = form.validate()?;
    let identity = require_identity(ctx, "Please login to add a stock.")?;

    match ctx.api.add_holding(identity.id, draft).await {
        Ok(holding) => {
            let touched = invalidate_user(ctx, identity.id);
            get_logger().debug(
                LogComponent::Application("Holdings"),
                &format!("➕ Added {} ({touched} queries invalidated)", holding.ticker),
            );
            ctx.notifications.success("Stock added successfully.");
            Ok(holding)
        }
        Err(e) => Err(report(ctx, e, "Failed to add stock.")),
    }
}

pub async fn update_holding(ctx: &AppContext, id: HoldingId, form: &HoldingForm) -> AppResult<Holding> {
    let draft = form.validate()?;
    let identity = require_identity(ctx, "Please login to update a stock.")?;

    match ctx.api.update_holding(id, draft).await {
        Ok(holding) => {
            invalidate_user(ctx, identity.id);
            ctx.notifications.success("Stock updated successfully.");
            Ok(holding)
        }
        Err(e) => Err(report(ctx, e, "Failed to update stock.")),
    }
}

pub async fn delete_holding(ctx: &AppContext, id: HoldingId) -> AppResult<()> {
    let identity = require_identity(ctx, "Please login to delete a stock.")?;

    match ctx.api.delete_holding(id).await {
        Ok(()) => {
            invalidate_user(ctx, identity.id);
            get_logger().info(LogComponent::Application("Holdings"), &format!("🗑️ Deleted holding {id}"));
            ctx.notifications.success("Stock deleted successfully.");
            Ok(())
        }
        Err(e) => Err(report(ctx, e, "Failed to delete stock.")),
    }
}
