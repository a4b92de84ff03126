//! Telegram HTML message bodies. Pure functions, timestamp passed in.

use chrono::{DateTime, Utc};

use crate::config::{Config, OPINION_TOPIC_URL, POLYMARKET_EVENT_URL, SUMMARY_MAX_ITEMS};
use crate::types::{AnalyzedOpportunity, Recommendation};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Escape the three characters Telegram's HTML parse mode reserves.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn format_startup_message(cfg: &Config) -> String {
    format!(
        "🚀 <b>Arbitrage scanner started</b>\n\n\
         📡 Venues: Opinion ↔ Polymarket\n\
         💰 Cost threshold: ≤{:.0}¢\n\
         ⏱️ Scan interval: {}s\n\
         📨 Max alerts per cycle: {}",
        cfg.threshold * 100.0,
        cfg.poll_interval_ms / 1000,
        cfg.max_notifications_per_cycle,
    )
}

pub fn format_opportunity_message(analyzed: &AnalyzedOpportunity, at: DateTime<Utc>) -> String {
    let opp = &analyzed.opportunity;
    let returns = &analyzed.returns;
    let emoji = if analyzed.recommendation == Recommendation::Recommended {
        "🔥"
    } else {
        "💰"
    };

    let opinion_link = format!(
        "<a href=\"{}/{}\">Opinion</a>",
        OPINION_TOPIC_URL, opp.pair.opinion.id
    );
    let poly = &opp.pair.polymarket;
    let polymarket_link = match poly.event_slug.as_deref().or(poly.slug.as_deref()) {
        Some(slug) => format!("<a href=\"{POLYMARKET_EVENT_URL}/{slug}\">Polymarket</a>"),
        None => "Polymarket".to_string(),
    };

    format!(
        "{emoji} <b>Arbitrage opportunity</b>\n\n\
         📊 <b>Market:</b> {market}\n\
         🎯 <b>Option:</b> {option}\n\n\
         <b>Legs:</b>\n\
         ├ Opinion: buy <b>{op_side}</b> @ <code>{op_price:.4}</code>\n\
         └ Polymarket: buy <b>{pm_side}</b> @ <code>{pm_price:.4}</code>\n\n\
         💵 <b>Total cost:</b> <code>${cost:.4}</code>\n\
         📈 <b>Profit:</b> <code>${profit:.4}</code> (<b>{pct:.2}%</b>)\n\
         🧮 <b>Net on ${inv:.0}:</b> <code>${net:.2}</code> ({net_pct:.2}% after ${fees:.2} fees)\n\
         💧 <b>Liquidity:</b> {rating}\n\
         {recommendation}\n\n\
         🔗 {opinion_link} | {polymarket_link}\n\n\
         ⏰ {time}",
        market = escape_html(&opp.pair.opinion.parent_title),
        option = escape_html(&opp.pair.opinion.title),
        op_side = opp.opinion_side,
        op_price = opp.opinion_price,
        pm_side = opp.polymarket_side,
        pm_price = opp.polymarket_price,
        cost = opp.total_cost,
        profit = opp.profit,
        pct = opp.profit_percent,
        inv = returns.investment,
        net = returns.net_profit,
        net_pct = returns.net_profit_percent,
        fees = returns.fees,
        rating = analyzed.liquidity.rating,
        recommendation = analyzed.recommendation,
        time = at.format(TIME_FORMAT),
    )
}

/// Header plus the first five opportunities; `None` for an empty batch.
pub fn format_summary_message(opportunities: &[AnalyzedOpportunity]) -> Option<String> {
    if opportunities.is_empty() {
        return None;
    }

    let items: Vec<String> = opportunities
        .iter()
        .take(SUMMARY_MAX_ITEMS)
        .enumerate()
        .map(|(i, a)| {
            format!(
                "{}. {}\n   cost: ${:.3} | profit: {:.2}%",
                i + 1,
                escape_html(&a.opportunity.pair.opinion.title),
                a.opportunity.total_cost,
                a.opportunity.profit_percent,
            )
        })
        .collect();

    let mut message = format!(
        "🎰 <b>{} arbitrage opportunities found</b>\n\n{}",
        opportunities.len(),
        items.join("\n\n")
    );
    if opportunities.len() > SUMMARY_MAX_ITEMS {
        message.push_str(&format!(
            "\n\n... and {} more",
            opportunities.len() - SUMMARY_MAX_ITEMS
        ));
    }
    Some(message)
}

pub fn format_error_message(error: &str, at: DateTime<Utc>) -> String {
    format!(
        "⚠️ <b>Arbitrage scanner error</b>\n\n{}\n\n⏰ {}",
        escape_html(error),
        at.format(TIME_FORMAT)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::full_analysis;
    use crate::types::{round2, MarketRecord, MatchedPair, Opportunity, Platform, Side, Strategy};
    use chrono::TimeZone;

    fn analyzed(title: &str, op_price: f64, pm_price: f64) -> AnalyzedOpportunity {
        let total_cost = op_price + pm_price;
        let opp = Opportunity {
            strategy: Strategy::OpinionYesPolyNo,
            pair: MatchedPair {
                opinion: MarketRecord {
                    id: "2741".into(),
                    title: title.into(),
                    parent_title: "US FOMC Interest Rate".into(),
                    volume: 150_000.0,
                    ..Default::default()
                },
                polymarket: MarketRecord {
                    platform: Platform::Polymarket,
                    id: "p".into(),
                    event_slug: Some("fed-decision-in-march".into()),
                    volume: 200_000.0,
                    ..Default::default()
                },
                match_score: 10,
                match_reason: String::new(),
            },
            opinion_side: Side::Yes,
            polymarket_side: Side::No,
            opinion_price: op_price,
            polymarket_price: pm_price,
            total_cost,
            profit: 1.0 - total_cost,
            profit_percent: round2((1.0 - total_cost) / total_cost * 100.0),
            description: String::new(),
        };
        full_analysis(opp, 100.0, 0.02)
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 0)
            .single()
            .unwrap_or_default()
    }

    #[test]
    fn detail_message_carries_legs_links_and_economics() {
        let msg = format_opportunity_message(&analyzed("No change", 0.40, 0.50), at());
        assert!(msg.starts_with("🔥"));
        assert!(msg.contains("buy <b>YES</b> @ <code>0.4000</code>"));
        assert!(msg.contains("buy <b>NO</b> @ <code>0.5000</code>"));
        assert!(msg.contains("<code>$0.9000</code>"));
        assert!(msg.contains("<b>11.11%</b>"));
        assert!(msg.contains("9.11% after $2.00 fees"));
        assert!(msg.contains("Liquidity:</b> HIGH"));
        assert!(msg.contains("https://app.opinion.trade/topic/2741"));
        assert!(msg.contains("https://polymarket.com/event/fed-decision-in-march"));
        assert!(msg.contains("2025-03-01 12:30:00 UTC"));
    }

    #[test]
    fn titles_are_html_escaped() {
        let msg = format_opportunity_message(&analyzed("<25 bps & more>", 0.40, 0.50), at());
        assert!(msg.contains("&lt;25 bps &amp; more&gt;"));
    }

    #[test]
    fn summary_lists_five_and_counts_the_rest() {
        let batch: Vec<AnalyzedOpportunity> =
            (0..7).map(|i| analyzed(&format!("opt{i}"), 0.40, 0.50)).collect();
        let msg = format_summary_message(&batch).unwrap_or_default();
        assert!(msg.contains("7 arbitrage opportunities found"));
        assert!(msg.contains("5. opt4"));
        assert!(!msg.contains("6. opt5"));
        assert!(msg.ends_with("... and 2 more"));
        assert!(msg.contains("cost: $0.900 | profit: 11.11%"));
    }

    #[test]
    fn summary_of_nothing_is_none() {
        assert!(format_summary_message(&[]).is_none());
        let msg = format_summary_message(&[analyzed("a", 0.4, 0.5)]).unwrap_or_default();
        assert!(!msg.contains("more"));
    }

    #[test]
    fn startup_and_error_messages() {
        let startup = format_startup_message(&Config::default());
        assert!(startup.contains("≤97¢"));
        assert!(startup.contains("30s"));

        let err = format_error_message("Opinion errno 500: <down>", at());
        assert!(err.contains("Opinion errno 500: &lt;down&gt;"));
    }
}
