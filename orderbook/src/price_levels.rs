use std::collections::{BTreeMap, VecDeque};

use ordered_float::OrderedFloat;

use crate::types::{Order, Side};

/// FIFO-within-price-level structure shared by both sides of the book.
///
/// - Asks: lowest price is best (front of the map).
/// - Bids: highest price is best (back of the map).
pub struct PriceLevels {
    side: Side,
    levels: BTreeMap<OrderedFloat<f64>, VecDeque<Order>>,
}

impl PriceLevels {
    /// Creates empty price levels for the given side.
    pub fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
        }
    }

    /// Adds an order at its price level, preserving FIFO order within it.
    pub fn push(&mut self, order: Order) {
        self.levels
            .entry(OrderedFloat(order.price))
            .or_default()
            .push_back(order);
    }

    /// Restores a partially-filled maker to the front of its level — price
    /// and timestamp are unchanged, so this does not disturb time priority.
    pub fn push_front(&mut self, order: Order) {
        self.levels
            .entry(OrderedFloat(order.price))
            .or_default()
            .push_front(order);
    }

    /// All price levels and their resting orders, for snapshot aggregation.
    pub fn levels(&self) -> &BTreeMap<OrderedFloat<f64>, VecDeque<Order>> {
        &self.levels
    }

    /// Best price for this side, or `None` if empty.
    pub fn best_price(&self) -> Option<f64> {
        match self.side {
            Side::Sell => self.levels.first_key_value().map(|(px, _)| px.0),
            Side::Buy => self.levels.last_key_value().map(|(px, _)| px.0),
        }
    }

    /// Returns how many orders are waiting at the best price. 0 if empty.
    pub fn best_level_size(&self) -> usize {
        match self.best_price() {
            Some(px) => self.levels.get(&OrderedFloat(px)).map_or(0, VecDeque::len),
            None => 0,
        }
    }

    /// Peeks the single highest-priority order without removing it.
    pub fn peek(&self) -> Option<&Order> {
        let px = OrderedFloat(self.best_price()?);
        self.levels.get(&px).and_then(|q| q.front())
    }

    /// Removes and returns the highest-priority order, cleaning up an
    /// emptied level.
    pub fn pop_best(&mut self) -> Option<Order> {
        let px = OrderedFloat(self.best_price()?);
        let q = self.levels.get_mut(&px)?;
        let order = q.pop_front();
        if q.is_empty() {
            self.levels.remove(&px);
        }
        order
    }

    /// Total number of resting orders across all levels on this side.
    pub fn len(&self) -> usize {
        self.levels.values().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OrderId;
    use uuid::Uuid;

    fn order(id: u128, side: Side, price: f64, qty: i64, ts_ns: u128) -> Order {
        Order {
            id: OrderId(Uuid::from_u128(id)),
            user_id: "u".into(),
            symbol: "NVDA".into(),
            side,
            price,
            qty,
            ts_ns,
        }
    }

    #[test]
    fn new_is_empty() {
        let bids = PriceLevels::new(Side::Buy);
        assert!(bids.is_empty());
        let asks = PriceLevels::new(Side::Sell);
        assert!(asks.is_empty());
        assert_eq!(bids.best_price(), None);
    }

    #[test]
    fn push_preserves_fifo_within_a_price() {
        let mut levels = PriceLevels::new(Side::Buy);
        levels.push(order(1, Side::Buy, 101.0, 10, 1));
        levels.push(order(2, Side::Buy, 101.0, 20, 2));
        levels.push(order(3, Side::Buy, 101.0, 30, 3));

        let q = &levels.levels()[&OrderedFloat(101.0)];
        let ids: Vec<u128> = q.iter().map(|o| o.id.0.as_u128()).collect();
        assert_eq!(ids, vec![1, 2, 3], "FIFO must be preserved at a single price");
    }

    #[test]
    fn best_level_size_zero_when_empty() {
        let bids = PriceLevels::new(Side::Buy);
        let asks = PriceLevels::new(Side::Sell);
        assert_eq!(bids.best_level_size(), 0);
        assert_eq!(asks.best_level_size(), 0);
    }

    #[test]
    fn best_level_size_counts_orders_ask() {
        let mut asks = PriceLevels::new(Side::Sell);
        asks.push(order(1, Side::Sell, 102.0, 10, 1));
        asks.push(order(2, Side::Sell, 102.5, 20, 2));
        asks.push(order(3, Side::Sell, 103.0, 30, 3));
        assert_eq!(asks.best_level_size(), 1);

        asks.push(order(4, Side::Sell, 102.0, 40, 4));
        assert_eq!(asks.best_level_size(), 2);
        assert_eq!(asks.best_price(), Some(102.0));
    }

    #[test]
    fn best_level_size_counts_orders_bid() {
        let mut bids = PriceLevels::new(Side::Buy);
        bids.push(order(1, Side::Buy, 101.0, 10, 1));
        bids.push(order(2, Side::Buy, 100.5, 20, 2));
        assert_eq!(bids.best_level_size(), 1);

        bids.push(order(3, Side::Buy, 101.0, 30, 3));
        assert_eq!(bids.best_level_size(), 2);
        assert_eq!(bids.best_price(), Some(101.0));
    }

    #[test]
    fn pop_best_on_empty_is_none() {
        let mut bids = PriceLevels::new(Side::Buy);
        assert!(bids.pop_best().is_none());
        let mut asks = PriceLevels::new(Side::Sell);
        assert!(asks.pop_best().is_none());
    }

    #[test]
    fn pop_best_removes_order_fifo_ask() {
        let mut asks = PriceLevels::new(Side::Sell);
        asks.push(order(1, Side::Sell, 102.0, 10, 1));
        asks.push(order(2, Side::Sell, 102.0, 20, 2));
        asks.push(order(3, Side::Sell, 103.0, 30, 3));

        let o = asks.pop_best().expect("order exists");
        assert_eq!(o.id.0.as_u128(), 1);
        assert_eq!(asks.best_price(), Some(102.0));
        assert_eq!(asks.best_level_size(), 1);

        let o = asks.pop_best().expect("second best");
        assert_eq!(o.id.0.as_u128(), 2);
        assert_eq!(asks.best_price(), Some(103.0));
        assert_eq!(asks.best_level_size(), 1);
    }

    #[test]
    fn pop_best_removes_order_fifo_bid() {
        let mut bids = PriceLevels::new(Side::Buy);
        bids.push(order(1, Side::Buy, 102.0, 10, 1));
        bids.push(order(2, Side::Buy, 102.0, 20, 2));
        bids.push(order(3, Side::Buy, 101.0, 30, 3));

        let o = bids.pop_best().expect("order exists");
        assert_eq!(o.id.0.as_u128(), 1);
        assert_eq!(bids.best_price(), Some(102.0));
        assert_eq!(bids.best_level_size(), 1);

        let o = bids.pop_best().expect("second best");
        assert_eq!(o.id.0.as_u128(), 2);
        assert_eq!(bids.best_price(), Some(101.0));
        assert_eq!(bids.best_level_size(), 1);
    }

    #[test]
    fn push_front_preserves_time_priority_of_partial_fill() {
        let mut asks = PriceLevels::new(Side::Sell);
        asks.push(order(1, Side::Sell, 100.0, 10, 1));
        asks.push(order(2, Side::Sell, 100.0, 20, 2));

        let mut maker = asks.pop_best().unwrap();
        maker.qty = 4;
        asks.push_front(maker);

        let next = asks.pop_best().unwrap();
        assert_eq!(next.id.0.as_u128(), 1);
        assert_eq!(next.qty, 4);
    }

    #[test]
    fn len_counts_across_levels() {
        let mut bids = PriceLevels::new(Side::Buy);
        assert_eq!(bids.len(), 0);
        bids.push(order(1, Side::Buy, 100.0, 10, 1));
        bids.push(order(2, Side::Buy, 101.0, 10, 2));
        assert_eq!(bids.len(), 2);
    }
}
