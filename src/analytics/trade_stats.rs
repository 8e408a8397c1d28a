use crate::models::{CostBreakdown, StreakStats, Trade, TradeSide, TradingCosts};

/// Win/loss figures over closed (sell) trades. A trade with P&L <= 0 counts
/// as a loss.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeSummary {
    pub closed_trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub gross_profit: f64,
    pub gross_loss: f64,
    pub profit_factor: Option<f64>,
    pub avg_return_pct: f64,
}

fn closed(trades: &[Trade]) -> impl Iterator<Item = &Trade> {
    trades.iter().filter(|t| t.side == TradeSide::Sell && t.pnl.is_some())
}

pub fn summarize(trades: &[Trade]) -> TradeSummary {
    let pnls: Vec<f64> = closed(trades).filter_map(|t| t.pnl).collect();
    let closed_trades = pnls.len();
    if closed_trades == 0 {
        return TradeSummary::default();
    }

    let wins = pnls.iter().filter(|&&p| p > 0.0).count();
    let gross_profit: f64 = pnls.iter().filter(|&&p| p > 0.0).sum();
    let gross_loss: f64 = pnls.iter().filter(|&&p| p < 0.0).map(|p| p.abs()).sum();

    let profit_factor = if gross_loss > 0.0 {
        Some(gross_profit / gross_loss)
    } else {
        None
    };

    let pcts: Vec<f64> = closed(trades).filter_map(|t| t.pnl_percent).collect();
    let avg_return_pct = if pcts.is_empty() {
        0.0
    } else {
        pcts.iter().sum::<f64>() / pcts.len() as f64
    };

    TradeSummary {
        closed_trades,
        wins,
        losses: closed_trades - wins,
        win_rate: wins as f64 / closed_trades as f64 * 100.0,
        gross_profit,
        gross_loss,
        profit_factor,
        avg_return_pct,
    }
}

pub fn streaks(trades: &[Trade]) -> StreakStats {
    let mut max_wins = 0usize;
    let mut max_losses = 0usize;
    let mut wins = 0usize;
    let mut losses = 0usize;

    for pnl in closed(trades).filter_map(|t| t.pnl) {
        if pnl > 0.0 {
            wins += 1;
            losses = 0;
        } else {
            losses += 1;
            wins = 0;
        }
        max_wins = max_wins.max(wins);
        max_losses = max_losses.max(losses);
    }

    let holding: Vec<f64> = closed(trades)
        .filter_map(|t| t.holding_days)
        .map(f64::from)
        .collect();
    let avg_holding_days = if holding.is_empty() {
        None
    } else {
        Some(holding.iter().sum::<f64>() / holding.len() as f64)
    };

    StreakStats {
        max_consecutive_wins: max_wins,
        max_consecutive_losses: max_losses,
        avg_holding_days,
    }
}

/// Estimated costs of the reported fills. Slippage uses the base rate for
/// every model; the finer models only exist server-side.
pub fn trading_costs(trades: &[Trade], costs: &TradingCosts) -> CostBreakdown {
    let mut commission = 0.0;
    let mut tax = 0.0;
    let mut slippage = 0.0;

    for t in trades {
        let notional = t.amount.abs();
        commission += notional * costs.commission_rate;
        slippage += notional * costs.base_slippage;
        if t.side == TradeSide::Sell {
            tax += notional * costs.tax_rate;
        }
    }

    let gross_profit: f64 = closed(trades).filter_map(|t| t.pnl).sum();
    let total = commission + tax + slippage;

    CostBreakdown {
        commission,
        tax,
        slippage,
        total,
        gross_profit,
        net_profit: gross_profit - total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SlippageModel;
    use crate::test_helpers::{make_round_trips, date};

    #[test]
    fn summary_over_sells_only() {
        let trades = make_round_trips(&[10_000.0, -5_000.0, 20_000.0, 0.0]);
        let s = summarize(&trades);
        assert_eq!(s.closed_trades, 4);
        assert_eq!(s.wins, 2);
        assert_eq!(s.losses, 2);
        assert!((s.win_rate - 50.0).abs() < 1e-9);
        assert!((s.profit_factor.unwrap() - 6.0).abs() < 1e-9);
        assert_eq!(s.gross_profit, 30_000.0);
        assert_eq!(s.gross_loss, 5_000.0);
    }

    #[test]
    fn no_losses_means_no_profit_factor() {
        let s = summarize(&make_round_trips(&[1.0, 2.0]));
        assert_eq!(s.profit_factor, None);
        assert_eq!(s.win_rate, 100.0);
    }

    #[test]
    fn empty_trade_list() {
        let s = summarize(&[]);
        assert_eq!(s, TradeSummary::default());
        let st = streaks(&[]);
        assert_eq!(st.max_consecutive_wins, 0);
        assert_eq!(st.avg_holding_days, None);
    }

    #[test]
    fn streak_lengths() {
        let trades = make_round_trips(&[1.0, 2.0, 3.0, -1.0, -1.0, 5.0, -2.0, -2.0, -2.0]);
        let st = streaks(&trades);
        assert_eq!(st.max_consecutive_wins, 3);
        assert_eq!(st.max_consecutive_losses, 3);
        assert_eq!(st.avg_holding_days, Some(10.0));
    }

    #[test]
    fn costs_apply_tax_to_sells_only() {
        let trades = vec![
            Trade::buy(date(2023, 1, 2), "005930", 10.0, 1_000.0),
            Trade::sell(
                date(2023, 1, 9),
                "005930",
                10.0,
                1_100.0,
                1_000.0,
                10.0,
                7,
                crate::models::ExitReason::TakeProfit,
            ),
        ];
        let costs = TradingCosts {
            commission_rate: 0.001,
            tax_rate: 0.002,
            slippage_model: SlippageModel::Linear,
            base_slippage: 0.0005,
        };
        let c = trading_costs(&trades, &costs);
        assert!((c.commission - 21.0).abs() < 1e-9);
        assert!((c.tax - 22.0).abs() < 1e-9);
        assert!((c.slippage - 10.5).abs() < 1e-9);
        assert!((c.total - 53.5).abs() < 1e-9);
        assert!((c.net_profit - (1_000.0 - 53.5)).abs() < 1e-9);
    }
}
