use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::price_levels::PriceLevels;
use crate::types::{Order, Side, Trade, TradeId};

/// Resting quantity aggregated at a single price.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: f64,
    pub qty: i64,
}

/// A depth-limited view of one symbol's book, best price first on each side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub symbol: String,
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
}

/// Central limit order book with separate bid/ask sides for one symbol.
///
/// Price-time priority: better prices match first, then earliest order at a
/// price. Not thread-safe on its own — `MatchingEngine` wraps each book in
/// a `tokio::sync::RwLock` and funnels all writes through a single task.
pub struct OrderBook {
    pub bids: PriceLevels,
    pub asks: PriceLevels,
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderBook {
    pub fn new() -> Self {
        Self {
            bids: PriceLevels::new(Side::Buy),
            asks: PriceLevels::new(Side::Sell),
        }
    }

    /// Submits a limit order, returning any immediate trades.
    ///
    /// The order matches against the opposite side first, at the resting
    /// maker's price, and any unfilled residual then rests in the book.
    pub fn submit(&mut self, mut taker: Order) -> Vec<Trade> {
        let mut trades = Vec::new();
        let ts_ns = taker.ts_ns;

        match taker.side {
            Side::Buy => {
                while taker.qty > 0 {
                    let Some(best_ask) = self.asks.best_price() else {
                        break;
                    };
                    if taker.price < best_ask {
                        break;
                    }
                    let Some(mut maker) = self.asks.pop_best() else {
                        break;
                    };

                    let fill = taker.qty.min(maker.qty);
                    taker.qty -= fill;
                    maker.qty -= fill;

                    trades.push(Trade {
                        id: TradeId(Uuid::new_v4()),
                        symbol: taker.symbol.clone(),
                        buy_order: taker.id,
                        sell_order: maker.id,
                        price: best_ask,
                        qty: fill,
                        ts_ns,
                        aggressor: taker.side,
                    });

                    if maker.qty > 0 {
                        self.asks.push_front(maker);
                    }
                }

                if taker.qty > 0 {
                    self.bids.push(taker);
                }
            }

            Side::Sell => {
                while taker.qty > 0 {
                    let Some(best_bid) = self.bids.best_price() else {
                        break;
                    };
                    if taker.price > best_bid {
                        break;
                    }
                    let Some(mut maker) = self.bids.pop_best() else {
                        break;
                    };

                    let fill = taker.qty.min(maker.qty);
                    taker.qty -= fill;
                    maker.qty -= fill;

                    trades.push(Trade {
                        id: TradeId(Uuid::new_v4()),
                        symbol: taker.symbol.clone(),
                        buy_order: maker.id,
                        sell_order: taker.id,
                        price: best_bid,
                        qty: fill,
                        ts_ns,
                        aggressor: taker.side,
                    });

                    if maker.qty > 0 {
                        self.bids.push_front(maker);
                    }
                }

                if taker.qty > 0 {
                    self.asks.push(taker);
                }
            }
        }

        trades
    }

    pub fn best_bid(&self) -> Option<f64> {
        self.bids.best_price()
    }

    pub fn best_ask(&self) -> Option<f64> {
        self.asks.best_price()
    }

    /// Mid price, or `None` if either side is empty.
    pub fn mid_price(&self) -> Option<f64> {
        Some((self.best_bid()? + self.best_ask()?) / 2.0)
    }

    /// Builds a depth-limited snapshot.
    ///
    /// Aggregates every resting order at a price into one `PriceLevel`
    /// first, THEN sorts best-first, THEN truncates to `depth` — grouping
    /// ahead of truncation is what keeps a thin, many-order best level from
    /// being starved by a single deep level counted first.
    pub fn snapshot(&self, symbol: &str, depth: usize) -> BookSnapshot {
        let mut bids: Vec<PriceLevel> = self
            .bids
            .levels()
            .iter()
            .map(|(px, q)| PriceLevel {
                price: px.0,
                qty: q.iter().map(|o| o.qty).sum(),
            })
            .collect();
        bids.sort_by(|a, b| b.price.partial_cmp(&a.price).unwrap());
        bids.truncate(depth);

        let mut asks: Vec<PriceLevel> = self
            .asks
            .levels()
            .iter()
            .map(|(px, q)| PriceLevel {
                price: px.0,
                qty: q.iter().map(|o| o.qty).sum(),
            })
            .collect();
        asks.sort_by(|a, b| a.price.partial_cmp(&b.price).unwrap());
        asks.truncate(depth);

        BookSnapshot {
            symbol: symbol.to_string(),
            bids,
            asks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OrderId;

    fn order(id: u128, side: Side, price: f64, qty: i64, ts_ns: u128) -> Order {
        Order {
            id: OrderId(Uuid::from_u128(id)),
            user_id: "u".into(),
            symbol: "AAPL".into(),
            side,
            price,
            qty,
            ts_ns,
        }
    }

    /// Scenario A — crossing orders with partial fills, maker-price priority.
    #[test]
    fn crossing_and_partials() {
        let mut ob = OrderBook::new();

        ob.submit(order(1, Side::Sell, 100.0, 50, 1));
        ob.submit(order(2, Side::Sell, 100.0, 40, 2));

        let trades = ob.submit(order(10, Side::Buy, 100.0, 70, 3));

        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].sell_order.0.as_u128(), 1);
        assert_eq!(trades[0].qty, 50);
        assert_eq!(trades[0].price, 100.0);
        assert_eq!(trades[1].sell_order.0.as_u128(), 2);
        assert_eq!(trades[1].qty, 20);

        assert_eq!(ob.best_ask(), Some(100.0));
        assert_eq!(ob.asks.best_level_size(), 1);
    }

    /// Scenario B — non-crossing orders rest on their respective sides.
    #[test]
    fn non_crossing_rests() {
        let mut ob = OrderBook::new();

        ob.submit(order(1, Side::Sell, 105.0, 10, 1));
        let trades = ob.submit(order(2, Side::Buy, 104.0, 10, 2));

        assert!(trades.is_empty());
        assert_eq!(ob.best_bid(), Some(104.0));
        assert_eq!(ob.best_ask(), Some(105.0));
    }

    /// Scenario C — trades always execute at the resting maker's price,
    /// never at the incoming taker's price.
    #[test]
    fn trades_execute_at_maker_price() {
        let mut ob = OrderBook::new();
        ob.submit(order(1, Side::Sell, 99.0, 10, 1));
        let trades = ob.submit(order(2, Side::Buy, 101.0, 10, 2));
        assert_eq!(trades[0].price, 99.0);
    }

    /// Scenario D — a marketable order can walk multiple price levels.
    #[test]
    fn walks_multiple_price_levels() {
        let mut ob = OrderBook::new();
        ob.submit(order(1, Side::Sell, 100.0, 10, 1));
        ob.submit(order(2, Side::Sell, 101.0, 10, 2));
        ob.submit(order(3, Side::Sell, 102.0, 10, 3));

        let trades = ob.submit(order(10, Side::Buy, 102.0, 25, 4));
        assert_eq!(trades.len(), 3);
        assert_eq!(trades[0].price, 100.0);
        assert_eq!(trades[1].price, 101.0);
        assert_eq!(trades[2].price, 102.0);
        assert_eq!(trades[2].qty, 5);
    }

    /// Scenario E — empty book produces no trades and no panics.
    #[test]
    fn empty_book_is_safe() {
        let mut ob = OrderBook::new();
        let trades = ob.submit(order(1, Side::Buy, 100.0, 10, 1));
        assert!(trades.is_empty());
        assert_eq!(ob.best_bid(), Some(100.0));
        assert_eq!(ob.best_ask(), None);
        assert_eq!(ob.mid_price(), None);
    }

    #[test]
    fn snapshot_aggregates_by_price_before_truncating() {
        let mut ob = OrderBook::new();
        // Three distinct orders at the same best bid price — a naive
        // per-order truncation to depth=1 would only ever show one of them.
        ob.submit(order(1, Side::Buy, 100.0, 10, 1));
        ob.submit(order(2, Side::Buy, 100.0, 20, 2));
        ob.submit(order(3, Side::Buy, 100.0, 30, 3));
        ob.submit(order(4, Side::Buy, 99.0, 5, 4));

        let snap = ob.snapshot("AAPL", 1);
        assert_eq!(snap.bids.len(), 1);
        assert_eq!(snap.bids[0].price, 100.0);
        assert_eq!(snap.bids[0].qty, 60);
    }

    #[test]
    fn snapshot_orders_bids_desc_and_asks_asc() {
        let mut ob = OrderBook::new();
        ob.submit(order(1, Side::Buy, 99.0, 10, 1));
        ob.submit(order(2, Side::Buy, 100.0, 10, 2));
        ob.submit(order(3, Side::Sell, 102.0, 10, 3));
        ob.submit(order(4, Side::Sell, 101.0, 10, 4));

        let snap = ob.snapshot("AAPL", 10);
        assert_eq!(
            snap.bids.iter().map(|l| l.price).collect::<Vec<_>>(),
            vec![100.0, 99.0]
        );
        assert_eq!(
            snap.asks.iter().map(|l| l.price).collect::<Vec<_>>(),
            vec![101.0, 102.0]
        );
    }

    use proptest::prelude::*;

    proptest! {
        /// Invariant 1 — quantity is conserved: the sum of every resting
        /// order's qty plus every trade's filled qty equals the sum of all
        /// submitted qty, no matter the order of submission.
        #[test]
        fn conserves_quantity(
            sides in prop::collection::vec(prop_oneof![Just(Side::Buy), Just(Side::Sell)], 1..200),
            prices in prop::collection::vec(1..50i64, 1..200),
            qtys in prop::collection::vec(1..100i64, 1..200),
        ) {
            let n = sides.len().min(prices.len()).min(qtys.len());
            let mut ob = OrderBook::new();
            let mut submitted = 0i64;
            let mut traded = 0i64;

            for i in 0..n {
                let o = order(i as u128, sides[i], prices[i] as f64, qtys[i], i as u128);
                submitted += o.qty;
                let trades = ob.submit(o);
                traded += trades.iter().map(|t| t.qty).sum::<i64>();
            }

            let resting: i64 = ob.bids.levels().values().flatten().map(|o| o.qty).sum::<i64>()
                + ob.asks.levels().values().flatten().map(|o| o.qty).sum::<i64>();

            // Each unit of `traded` qty was deducted once from the taker
            // and once from the resting maker it matched against.
            prop_assert_eq!(resting + 2 * traded, submitted);
        }
    }
}
