use futures::FutureExt;
use leptos::*;
use std::rc::Rc;

use crate::{
    application::{AppContext, DashboardView, StockView, login, logout, register},
    domain::{
        errors::AppError,
        logging::{LogComponent, get_logger},
        notifications::{Notification, NotificationKind},
        portfolio::{Holding, Symbol},
        session::SessionGate as Gate,
    },
    presentation::{change_trigger, notifications_signal, provide_app_context, session_signal},
    time_utils::format_time_label,
};

fn app_context() -> AppContext {
    expect_context::<AppContext>()
}

/// 🦀 Root component: notifications on top, the dashboard behind the session gate.
#[component]
pub fn App(ctx: AppContext) -> impl IntoView {
    provide_app_context(ctx);

    view! {
        <style>
            {r#"
            .portfolio-app { font-family: -apple-system, BlinkMacSystemFont, sans-serif; padding: 20px; }
            .notifications { position: fixed; top: 16px; right: 16px; list-style: none; z-index: 10; }
            .notification { padding: 10px 14px; margin-bottom: 8px; border-radius: 6px; color: white; cursor: pointer; }
            .notification.success { background: #2e7d32; }
            .notification.error { background: #c62828; }
            .notification.info { background: #1565c0; }
            .notification.warning { background: #ef6c00; }
            .stats { display: grid; grid-template-columns: repeat(4, 1fr); gap: 8px; }
            "#}
        </style>
        <main class="portfolio-app">
            <NotificationList/>
            <SessionGate>
                <DashboardPanel/>
            </SessionGate>
        </main>
    }
}

/// Current notifications in insertion order; a click dismisses one.
#[component]
pub fn NotificationList() -> impl IntoView {
    let ctx = app_context();
    let notifications = notifications_signal(&ctx);

    view! {
        <ul class="notifications">
            <For
                each=move || notifications.get()
                key=|notification: &Notification| notification.id
                children=move |notification: Notification| {
                    let center = ctx.notifications.clone();
                    let id = notification.id;
                    let class = format!("notification {}", notification.kind);
                    let role = if notification.kind == NotificationKind::Error { "alert" } else { "status" };
                    view! {
                        <li class=class role=role on:click=move |_| { center.dismiss(id); }>
                            {notification.message}
                        </li>
                    }
                }
            />
        </ul>
    }
}

/// Renders `children` only for a signed-in user. While the persisted
/// session is still being read nothing redirects; afterwards an anonymous
/// visitor gets the login form.
#[component]
pub fn SessionGate(children: ChildrenFn) -> impl IntoView {
    let ctx = app_context();
    let gate = session_signal(&ctx);

    move || match gate.get() {
        Gate::Hydrating => view! { <p class="session-loading">"Loading session..."</p> }.into_view(),
        Gate::Anonymous => view! { <LoginForm/> }.into_view(),
        Gate::Authenticated(_) => children().into_view(),
    }
}

#[component]
pub fn LoginForm() -> impl IntoView {
    let ctx = app_context();
    let (username, set_username) = create_signal(String::new());
    let (field_error, set_field_error) = create_signal(None::<String>);

    let submit = move |create_account: bool| {
        let ctx = ctx.clone();
        let name = username.get_untracked();
        let spawner = ctx.spawner();
        spawner.spawn(
            async move {
                let result = if create_account {
                    register(&ctx, &name).await
                } else {
                    login(&ctx, &name).await
                };
                match result {
                    Err(AppError::Validation(errors)) => {
                        set_field_error.set(errors.for_field("username").map(ToString::to_string));
                    }
                    _ => set_field_error.set(None),
                }
            }
            .boxed_local(),
        );
    };
    let submit_register = submit.clone();

    view! {
        <div class="login">
            <p>"Enter your username and remember it for every login."</p>
            <label>"Username"</label>
            <input
                type="text"
                prop:value=username
                on:input=move |ev| set_username.set(event_target_value(&ev))
            />
            {move || field_error.get().map(|message| view! { <p class="field-error">{message}</p> })}
            <button on:click=move |_| submit(false)>"Login"</button>
            <button on:click=move |_| submit_register(true)>"Register"</button>
        </div>
    }
}

/// Portfolio value and holdings of the signed-in user.
#[component]
pub fn DashboardPanel() -> impl IntoView {
    let ctx = app_context();
    let dashboard = Rc::new(DashboardView::open(&ctx));
    let trigger = change_trigger(|notify| dashboard.on_change(notify));
    let (selected, set_selected) = create_signal(None::<Symbol>);

    let value_view = dashboard.clone();
    let value = move || {
        trigger.track();
        let state = value_view.portfolio_value();
        match state.data() {
            Some(value) => format!("${value:.2}"),
            None if state.is_error() => "unavailable".to_string(),
            None => "...".to_string(),
        }
    };

    let holdings_view = dashboard.clone();
    let holdings = move || {
        trigger.track();
        holdings_view
            .holdings()
            .data()
            .map(|holdings| holdings.to_vec())
            .unwrap_or_default()
    };

    let logout_ctx = ctx.clone();
    on_cleanup(move || drop(dashboard));

    view! {
        <section class="dashboard">
            <header>
                <h2>"Portfolio value: " {value}</h2>
                <button on:click=move |_| { let _ = logout(&logout_ctx); }>"Logout"</button>
            </header>
            <ul class="holdings">
                <For
                    each=holdings
                    key=|holding: &Holding| holding.id
                    children=move |holding: Holding| {
                        let symbol = holding.ticker.clone();
                        view! {
                            <li on:click=move |_| set_selected.set(Some(symbol.clone()))>
                                {format!("{} × {} @ ${:.2}", holding.ticker, holding.quantity, holding.buy_price)}
                            </li>
                        }
                    }
                />
            </ul>
            {move || selected.get().map(|symbol| view! { <StockStatsPanel symbol=symbol/> })}
        </section>
    }
}

/// Metadata, position and intraday statistics of one symbol.
#[component]
pub fn StockStatsPanel(symbol: Symbol) -> impl IntoView {
    let ctx = app_context();
    get_logger().debug(LogComponent::Presentation("StockStatsPanel"), &format!("Mounting {symbol}"));

    let stock = Rc::new(StockView::open(&ctx, symbol));
    let trigger = change_trigger(|notify| stock.on_change(notify));

    let header_view = stock.clone();
    let header = move || {
        trigger.track();
        let detail = header_view.detail();
        match detail.data() {
            Some(detail) => format!("{} ({}) · {}", detail.name, detail.symbol, detail.sector),
            None if detail.is_error() => format!("{} unavailable", header_view.symbol()),
            None => format!("Loading {}...", header_view.symbol()),
        }
    };

    let position_view = stock.clone();
    let position = move || {
        trigger.track();
        position_view
            .holding()
            .data()
            .map(|h| format!("{} shares, cost basis ${:.2}", h.quantity, h.cost_basis()))
    };

    let stats_view = stock.clone();
    let stats = move || {
        trigger.track();
        let last_point = stats_view
            .intraday()
            .data()
            .and_then(|series| series.chronological().last().map(|p| format_time_label(p.timestamp, true)));
        match stats_view.stats() {
            Some(Ok(stats)) => view! {
                <div class="stats">
                    <span>{format!("High {:.2}", stats.high)}</span>
                    <span>{format!("Low {:.2}", stats.low)}</span>
                    <span>{format!("Open {:.2}", stats.open)}</span>
                    <span>{format!("Close {:.2}", stats.close)}</span>
                </div>
                <p>{last_point.map(|label| format!("as of {label}"))}</p>
            }
            .into_view(),
            Some(Err(e)) => view! { <p>{e.to_string()}</p> }.into_view(),
            None => view! { <p>"No intraday data yet."</p> }.into_view(),
        }
    };

    on_cleanup(move || drop(stock));

    view! {
        <article class="stock">
            <h3>{header}</h3>
            <p>{position}</p>
            {stats}
        </article>
    }
}
