use super::holdings::invalidate_user;
use crate::application::context::AppContext;
use crate::domain::errors::{AppError, AppResult, FetchError, ValidationError};
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::portfolio::Identity;

fn normalized_username(raw: &str) -> Result<String, ValidationError> {
    let username = raw.trim();
    if username.is_empty() {
        return Err(ValidationError::EmptyUsername);
    }
    Ok(username.to_string())
}

/// Stores `identity` as the active session and reports the outcome.
fn sign_in(ctx: &AppContext, identity: Identity, success_message: &str) -> AppResult<Identity> {
    if let Err(e) = ctx.session.set_identity(Some(identity.clone())) {
        ctx.notifications.error(format!("Could not save session: {e}"));
        return Err(e.into());
    }
    ctx.notifications.success(success_message);
    Ok(identity)
}

fn report_failure(ctx: &AppContext, error: FetchError, fallback: &str) -> AppError {
    let message = error.message();
    get_logger().warn(LogComponent::Application("Auth"), &format!("{fallback} {message}"));
    ctx.notifications.error(if message.trim().is_empty() { fallback.to_string() } else { message });
    error.into()
}

/// Looks the user up by name and makes them the active identity.
///
/// An empty username is rejected before any request is sent.
pub async fn login(ctx: &AppContext, username: &str) -> AppResult<Identity> {
    let username = normalized_username(username)?;
    get_logger().info(LogComponent::Application("Auth"), &format!("🔑 Login as '{username}'"));

    let identity = match ctx.api.fetch_user_by_username(username).await {
        Ok(identity) => identity,
        Err(e) => return Err(report_failure(ctx, e, "Failed to login user.")),
    };
    sign_in(ctx, identity, "User logged in successfully.")
}

/// Creates the user, then initializes their portfolio, then signs in.
///
/// The second call is only made after the first succeeded; a failure of
/// either leaves the session untouched.
pub async fn register(ctx: &AppContext, username: &str) -> AppResult<Identity> {
    let username = normalized_username(username)?;
    get_logger().info(LogComponent::Application("Auth"), &format!("📝 Register '{username}'"));

    let identity = match ctx.api.create_user(username.clone()).await {
        Ok(identity) => identity,
        Err(e) => return Err(report_failure(ctx, e, "Failed to register user.")),
    };
    if let Err(e) = ctx.api.initialize_portfolio(username).await {
        return Err(report_failure(ctx, e, "Failed to initialize portfolio."));
    }
    sign_in(ctx, identity, "User registered successfully.")
}

/// Clears the session and the queries that belong to the signed-out user.
/// Symbol-only entries (metadata, intraday) stay cached.
pub fn logout(ctx: &AppContext) -> AppResult<()> {
    let previous = ctx.session.identity();
    if let Err(e) = ctx.session.set_identity(None) {
        ctx.notifications.error(format!("Could not clear session: {e}"));
        return Err(e.into());
    }
    let dropped = previous.map_or(0, |identity| invalidate_user(ctx, identity.id));
    get_logger().debug(LogComponent::Application("Auth"), &format!("👋 Logged out, {dropped} queries reset"));
    ctx.notifications.info("Logged out.");
    Ok(())
}
