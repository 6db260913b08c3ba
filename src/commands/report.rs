//! The read-only commands: dashboard, trend, mom, allocation and categories.
//!
//! Each one loads what it needs from the ledger, runs it through the analytics functions and
//! returns both a text rendering (amounts in the configured currency) and the structured result.

use crate::analytics::{self, AllocationShare, Dashboard, MomPoint, NetWorthPoint};
use crate::api::Ledger;
use crate::args::{KindArgs, MomArgs};
use crate::commands::{Backend, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::{normalize, Amount, Categories, Entry, EntryKind};
use crate::session::Session;
use crate::Result;
use rust_decimal::Decimal;
use tracing::debug;

/// Loads both collections and builds every dashboard figure.
pub async fn dashboard(backend: &Backend, session: &Session) -> Result<Out<Dashboard>> {
    let mut ledger = backend.ledger().await?;
    let assets = entries(ledger.as_mut(), EntryKind::Asset, session).await?;
    let liabilities = entries(ledger.as_mut(), EntryKind::Liability, session).await?;
    let dashboard = Dashboard::build(&assets, &liabilities);
    let message = render_dashboard(&dashboard, backend.config().currency());
    Ok(Out::new(message, dashboard))
}

/// Assets, liabilities and net worth for every month.
pub async fn trend(backend: &Backend, session: &Session) -> Result<Out<Vec<NetWorthPoint>>> {
    let mut ledger = backend.ledger().await?;
    let assets = entries(ledger.as_mut(), EntryKind::Asset, session).await?;
    let liabilities = entries(ledger.as_mut(), EntryKind::Liability, session).await?;
    let breakdown = Dashboard::build(&assets, &liabilities).breakdown;
    let message = if breakdown.is_empty() {
        EMPTY.to_string()
    } else {
        render_breakdown(&breakdown, backend.config().currency())
    };
    Ok(Out::new(message, breakdown))
}

/// Month-over-month history of total assets, or of one asset category.
pub async fn mom(
    backend: &Backend,
    session: &Session,
    args: &MomArgs,
) -> Result<Out<Vec<MomPoint>>> {
    let mut ledger = backend.ledger().await?;
    let assets = entries(ledger.as_mut(), EntryKind::Asset, session).await?;
    let history = analytics::mom_history(&assets, args.category());
    let title = match args.category() {
        Some(category) => format!("Month-over-month history of {category}"),
        None => "Month-over-month history of all assets".to_string(),
    };
    let message = if history.is_empty() {
        format!("{title}: no data")
    } else {
        render_history(&title, &history, backend.config().currency())
    };
    Ok(Out::new(message, history))
}

/// How the assets or the liabilities are split across categories.
pub async fn allocation(
    backend: &Backend,
    session: &Session,
    args: &KindArgs,
) -> Result<Out<Vec<AllocationShare>>> {
    let kind = args.kind();
    let mut ledger = backend.ledger().await?;
    let entries = entries(ledger.as_mut(), kind, session).await?;
    let shares = analytics::allocation_shares(&entries);
    let message = if shares.is_empty() {
        format!("There is no {kind} data")
    } else {
        let title = format!("{} allocation", title_case(kind));
        render_allocation(&title, &shares, backend.config().currency())
    };
    Ok(Out::new(message, shares))
}

/// The category vocabulary for assets or liabilities.
pub async fn categories(
    backend: &Backend,
    session: &Session,
    args: &KindArgs,
) -> Result<Out<Categories>> {
    let kind = args.kind();
    let mut ledger = backend.ledger().await?;
    let rows = ledger
        .read(kind.categories(), session)
        .await
        .pub_result(ErrorType::Sheet)?;
    let categories = Categories::from_rows(kind, &rows);
    let message = if categories.is_empty() {
        format!(
            "There are no {kind} categories, add some to the '{}' tab",
            kind.categories()
        )
    } else {
        format!(
            "{} categories: {}",
            title_case(kind),
            categories.names().join(", ")
        )
    };
    Ok(Out::new(message, categories))
}

const EMPTY: &str = "Welcome! There are no assets or liabilities yet. Record one with \
    'networth add asset' or 'networth add liability'.";

/// Reads and normalizes the entries of `kind`.
pub(super) async fn entries(
    ledger: &mut (dyn Ledger + Send),
    kind: EntryKind,
    session: &Session,
) -> Result<Vec<Entry>> {
    let rows = ledger
        .read(kind.entries(), session)
        .await
        .pub_result(ErrorType::Sheet)?;
    let entries = normalize(kind, &rows);
    debug!("Normalized {} of {} {kind} rows", entries.len(), rows.len());
    Ok(entries)
}

fn title_case(kind: EntryKind) -> &'static str {
    match kind {
        EntryKind::Asset => "Asset",
        EntryKind::Liability => "Liability",
    }
}

fn money(value: Decimal, currency: &str) -> String {
    Amount::new(value).display(currency)
}

fn pct(value: Decimal) -> String {
    let value = value.round_dp(2);
    let sign = if value.is_sign_positive() && !value.is_zero() {
        "+"
    } else {
        ""
    };
    format!("{sign}{value:.2}%")
}

fn render_dashboard(dashboard: &Dashboard, currency: &str) -> String {
    if dashboard.is_empty {
        return EMPTY.to_string();
    }
    let growth = &dashboard.net_worth_growth;
    let mut s = format!(
        "Net worth:         {}\nTotal assets:      {}\nTotal liabilities: {}\n",
        money(dashboard.net_worth, currency),
        money(dashboard.total_assets, currency),
        money(dashboard.total_liabilities, currency)
    );
    s.push_str(&format!(
        "Net worth MoM:     {} (previous {}, change {} points)\n\n",
        pct(growth.latest),
        pct(growth.previous),
        pct(growth.delta).trim_end_matches('%')
    ));
    s.push_str(&render_breakdown(&dashboard.breakdown, currency));

    for (kind, growth) in [
        (EntryKind::Asset, &dashboard.asset_category_growth),
        (EntryKind::Liability, &dashboard.liability_category_growth),
    ] {
        let (Some(latest), Some(prev)) = (growth.latest_month, growth.prev_month) else {
            continue;
        };
        s.push_str(&format!(
            "\n{} categories, {} vs {}\n",
            title_case(kind),
            latest.label(),
            prev.label()
        ));
        for category in &growth.categories {
            s.push_str(&format!(
                "  {:<20} {:>16} {:>16} {:>10}\n",
                category.category,
                money(category.latest_value, currency),
                money(category.prev_value, currency),
                pct(category.mom_pct)
            ));
        }
    }

    for (kind, shares) in [
        (EntryKind::Asset, &dashboard.asset_allocation),
        (EntryKind::Liability, &dashboard.liability_allocation),
    ] {
        if !shares.is_empty() {
            s.push('\n');
            s.push_str(&render_allocation(
                &format!("{} allocation", title_case(kind)),
                shares,
                currency,
            ));
        }
    }
    s.trim_end().to_string()
}

fn render_breakdown(breakdown: &[NetWorthPoint], currency: &str) -> String {
    let mut s = format!(
        "{:<10} {:>16} {:>16} {:>16}\n",
        "Month", "Assets", "Liabilities", "Net worth"
    );
    for point in breakdown {
        s.push_str(&format!(
            "{:<10} {:>16} {:>16} {:>16}\n",
            point.month.label(),
            money(point.assets, currency),
            money(point.liabilities, currency),
            money(point.net, currency)
        ));
    }
    s
}

fn render_history(title: &str, history: &[MomPoint], currency: &str) -> String {
    let mut s = format!(
        "{title}\n{:<10} {:>16} {:>16} {:>10}\n",
        "Month", "Value", "Change", "Change %"
    );
    for point in history {
        s.push_str(&format!(
            "{:<10} {:>16} {:>16} {:>10}\n",
            point.month.label(),
            money(point.value, currency),
            money(point.change, currency),
            pct(point.change_pct)
        ));
    }
    s.trim_end().to_string()
}

fn render_allocation(title: &str, shares: &[AllocationShare], currency: &str) -> String {
    let mut s = format!("{title}\n");
    for share in shares {
        s.push_str(&format!(
            "  {:<20} {:>16} {:>8}\n",
            share.category,
            money(share.total, currency),
            format!("{:.1}%", share.share_pct.round_dp(1))
        ));
    }
    s
}
