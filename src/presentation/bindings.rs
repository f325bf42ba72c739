//! Bridges between the stores and Leptos signals.
//!
//! Every binding subscribes on creation and unsubscribes when the owning
//! reactive scope is cleaned up.

use crate::application::AppContext;
use crate::domain::notifications::Notification;
use crate::domain::session::SessionGate;
use leptos::*;

pub fn provide_app_context(ctx: AppContext) {
    provide_context(ctx);
}

/// The context provided by [`provide_app_context`], if any.
pub fn use_app_context() -> Option<AppContext> {
    use_context::<AppContext>()
}

pub fn session_signal(ctx: &AppContext) -> ReadSignal<SessionGate> {
    let (gate, set_gate) = create_signal(ctx.session.gate());
    let listener = ctx.session.subscribe(move |next| set_gate.set(next.clone()));

    let session = ctx.session.clone();
    on_cleanup(move || session.unsubscribe(listener));
    gate
}

pub fn notifications_signal(ctx: &AppContext) -> ReadSignal<Vec<Notification>> {
    let (notifications, set_notifications) = create_signal(ctx.notifications.notifications());
    let listener = ctx
        .notifications
        .subscribe(move |queue| set_notifications.set(queue.to_vec()));

    let center = ctx.notifications.clone();
    on_cleanup(move || center.unsubscribe(listener));
    notifications
}

/// A trigger that fires whenever `subscribe` reports a change. Used for
/// the view objects that expose snapshots rather than values.
pub fn change_trigger(subscribe: impl FnOnce(Box<dyn Fn()>)) -> Trigger {
    let trigger = create_trigger();
    subscribe(Box::new(move || trigger.notify()));
    trigger
}
