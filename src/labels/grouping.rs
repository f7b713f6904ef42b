use std::collections::{BTreeMap, BTreeSet};

use crate::core::types::Order;

/// Orders keyed by article, articles in ascending order.
pub type GroupedOrders = BTreeMap<String, Vec<Order>>;

/// Partitions orders by article in one pass.
///
/// Every order lands in exactly one group and keeps its relative position within it.
pub fn group_orders_by_article(orders: impl IntoIterator<Item = Order>) -> GroupedOrders {
    let mut grouped = GroupedOrders::new();
    for order in orders {
        grouped.entry(order.article.clone()).or_default().push(order);
    }
    grouped
}

/// Articles referenced by `orders`, deduplicated and sorted.
pub fn distinct_articles(orders: &[Order]) -> Vec<String> {
    orders
        .iter()
        .map(|order| order.article.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
