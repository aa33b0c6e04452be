//! Built-in side-topic snippets (weather, traffic, restaurants, cost).
//!
//! These are not derived from the corpus. They let a question about the
//! weather in Hanoi still surface something useful next to the FAQ bank.

use std::collections::BTreeSet;

use crate::models::TopicSnippet;

const BUILTIN_TOPICS: &[(&str, &str, &[&str])] = &[
    (
        "weather",
        "Weather: Hanoi is 38°C with 65% humidity, sunny with light wind. \
         Ho Chi Minh City is 39°C with 70% humidity, hot and humid. \
         Da Nang is 30°C with a pleasant coastal breeze.",
        &["weather", "temperature", "forecast", "humidity", "rain", "sunny", "nhiệt độ"],
    ),
    (
        "traffic",
        "Traffic: Hanoi is moderate with some congestion in the city center. \
         Ho Chi Minh City is heavy during rush hours; alternative routes recommended. \
         Da Nang is generally light with good flow on main roads.",
        &["traffic", "congestion", "rush hour", "road", "commute", "tắc đường"],
    ),
    (
        "restaurant",
        "Restaurants: Hanoi is known for pho (Pho Bat Dan, Pho Thin) and bun cha. \
         Ho Chi Minh City offers everything from street food to upscale dining. \
         Da Nang is famous for fresh seafood, Mi Quang and Cao Lau.",
        &["restaurant", "food", "dining", "pho", "seafood", "món ăn"],
    ),
    (
        "cost",
        "Cost: Auto Scaling can reduce EC2 spend by scaling in during low usage; \
         savings are typically 15-30% for steady medium load and 30-50% for variable load.",
        &["cost", "price", "pricing", "saving", "savings", "billing", "budget"],
    ),
];

/// The built-in topic snippets, in declaration order.
pub fn builtin_topics() -> Vec<TopicSnippet> {
    BUILTIN_TOPICS
        .iter()
        .map(|(id, content, keywords)| TopicSnippet {
            id: id.to_string(),
            content: content.to_string(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect::<BTreeSet<_>>(),
        })
        .collect()
}
