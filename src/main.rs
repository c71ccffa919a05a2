//! Performance lab and demo for the `orderbook` matching core.
//!
//! Runs a battery of latency/throughput microbenchmarks directly against
//! `OrderBook`, bypassing the async engine, followed by a small scripted
//! demo of crossing and resting orders.

use orderbook::{OrderBook, Side};


fn main() {
    tracing_subscriber::fmt::init();

    println!("=== NanoPulse Performance Lab ===");

    latency_test::run_latency_tests();
    latency_test::run_throughput_test();

    println!("\n=== 1-Minute Sustained Throughput Test ===");
    latency_test::run_throughput_test_1min();

    println!("\n=== Basic Demo ===");
    run_basic_demo();
}

/// Demonstrates basic order book functionality with trade execution.
fn run_basic_demo() {
    let mut ob = OrderBook::new();

    println!("NanoPulse - Order Book Demo");

    let ask_order = orderbook::Order::new("AAPL", Side::Sell, 150.00, 100, "market-maker").unwrap();
    let bid_order = orderbook::Order::new("AAPL", Side::Buy, 149.50, 50, "alice").unwrap();

    println!("Submitting ask order: {} @ {}", ask_order.qty, ask_order.price);
    ob.submit(ask_order);

    println!("Submitting bid order: {} @ {}", bid_order.qty, bid_order.price);
    ob.submit(bid_order);

    println!("Best bid: {:?}", ob.best_bid());
    println!("Best ask: {:?}", ob.best_ask());

    // Crossing bid that will partially execute against the resting ask.
    let crossing_bid = orderbook::Order::new("AAPL", Side::Buy, 150.00, 75, "bob").unwrap();

    println!("Submitting crossing bid: {} @ {}", crossing_bid.qty, crossing_bid.price);
    let trades = ob.submit(crossing_bid);

    println!("Trades executed: {}", trades.len());
    for trade in trades {
        // Execution price is the resting ask's price (150.00), not the taker's.
        println!("  Trade: {} shares @ {}", trade.qty, trade.price);
    }

    println!("Final best bid: {:?}", ob.best_bid());
    println!("Final best ask: {:?}", ob.best_ask());
}
