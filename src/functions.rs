//! Side functions the answer generator can call.
//!
//! The set is closed: [`FunctionName`] lists every function, [`FunctionCall`]
//! carries its typed arguments, and [`execute`] dispatches through an
//! explicit `match` to static lookup tables. Nothing is resolved by string at
//! call time except in [`FunctionCall::parse`], which is the boundary where a
//! `(name, JSON arguments)` pair from a model or the CLI is validated.

use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::knowledge::KnowledgeBase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionName {
    SearchFaqDatabase,
    GetWeatherInfo,
    GetTrafficInfo,
    RecommendRestaurants,
    AnalyzeAwsCosts,
}

impl FunctionName {
    pub const ALL: [FunctionName; 5] = [
        FunctionName::SearchFaqDatabase,
        FunctionName::GetWeatherInfo,
        FunctionName::GetTrafficInfo,
        FunctionName::RecommendRestaurants,
        FunctionName::AnalyzeAwsCosts,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FunctionName::SearchFaqDatabase => "search_faq_database",
            FunctionName::GetWeatherInfo => "get_weather_info",
            FunctionName::GetTrafficInfo => "get_traffic_info",
            FunctionName::RecommendRestaurants => "recommend_restaurants",
            FunctionName::AnalyzeAwsCosts => "analyze_aws_costs",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            FunctionName::SearchFaqDatabase => {
                "Search the internal FAQ database for AWS Auto Scaling questions and answers"
            }
            FunctionName::GetWeatherInfo => "Get current weather information for Vietnamese cities",
            FunctionName::GetTrafficInfo => "Get current traffic information for Vietnamese cities",
            FunctionName::RecommendRestaurants => {
                "Get restaurant recommendations for Vietnamese cities"
            }
            FunctionName::AnalyzeAwsCosts => {
                "Analyze AWS Auto Scaling cost implications and recommendations"
            }
        }
    }

    /// JSON-schema tool definition in the chat-completions `tools` shape.
    pub fn definition(&self) -> Value {
        let city = json!({
            "type": "string",
            "enum": ["hanoi", "ho_chi_minh", "da_nang"],
            "description": "The city to get information for"
        });
        let (properties, required) = match self {
            FunctionName::SearchFaqDatabase => (
                json!({
                    "query": {
                        "type": "string",
                        "description": "The search query to find relevant FAQ entries"
                    },
                    "language": {
                        "type": "string",
                        "enum": ["english", "vietnamese"],
                        "description": "The language of the query"
                    }
                }),
                vec!["query"],
            ),
            FunctionName::GetWeatherInfo | FunctionName::GetTrafficInfo => {
                (json!({ "city": city }), vec!["city"])
            }
            FunctionName::RecommendRestaurants => (
                json!({
                    "city": city,
                    "cuisine_type": {
                        "type": "string",
                        "enum": ["vietnamese", "seafood", "pho", "any"],
                        "description": "Type of cuisine preferred"
                    }
                }),
                vec!["city"],
            ),
            FunctionName::AnalyzeAwsCosts => (
                json!({
                    "instance_type": {
                        "type": "string",
                        "description": "EC2 instance type (e.g., t3.micro, m5.large)"
                    },
                    "expected_load": {
                        "type": "string",
                        "enum": ["low", "medium", "high", "variable"],
                        "description": "Expected application load pattern"
                    }
                }),
                vec!["expected_load"],
            ),
        };
        json!({
            "type": "function",
            "function": {
                "name": self.as_str(),
                "description": self.description(),
                "parameters": {
                    "type": "object",
                    "properties": properties,
                    "required": required
                }
            }
        })
    }
}

impl fmt::Display for FunctionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FunctionName {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        FunctionName::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .with_context(|| format!("Unknown function: {}", s))
    }
}

/// Tool definitions for every function, in declaration order.
pub fn definitions() -> Vec<Value> {
    FunctionName::ALL.iter().map(FunctionName::definition).collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    English,
    Vietnamese,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::English => f.write_str("english"),
            Language::Vietnamese => f.write_str("vietnamese"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum City {
    #[default]
    Hanoi,
    HoChiMinh,
    DaNang,
}

impl City {
    pub fn display_name(&self) -> &'static str {
        match self {
            City::Hanoi => "Hanoi",
            City::HoChiMinh => "Ho Chi Minh City",
            City::DaNang => "Da Nang",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cuisine {
    Vietnamese,
    Seafood,
    Pho,
    #[default]
    Any,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Load {
    Low,
    #[default]
    Medium,
    High,
    Variable,
}

fn default_instance_type() -> String {
    "t3.micro".to_string()
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
    #[serde(default)]
    language: Language,
}

#[derive(Debug, Deserialize)]
struct CityArgs {
    #[serde(default)]
    city: City,
}

#[derive(Debug, Deserialize)]
struct RestaurantArgs {
    #[serde(default)]
    city: City,
    #[serde(default)]
    cuisine_type: Cuisine,
}

#[derive(Debug, Deserialize)]
struct CostArgs {
    #[serde(default = "default_instance_type")]
    instance_type: String,
    #[serde(default)]
    expected_load: Load,
}

/// A validated function invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "name", content = "arguments", rename_all = "snake_case")]
pub enum FunctionCall {
    SearchFaqDatabase { query: String, language: Language },
    GetWeatherInfo { city: City },
    GetTrafficInfo { city: City },
    RecommendRestaurants { city: City, cuisine_type: Cuisine },
    AnalyzeAwsCosts { instance_type: String, expected_load: Load },
}

impl FunctionCall {
    /// Validate a `(name, arguments)` pair. Missing optional arguments take
    /// the defaults `hanoi`, `any`, `t3.micro`, and `medium`.
    pub fn parse(name: &str, arguments: &Value) -> Result<Self> {
        let function: FunctionName = name.parse()?;
        let args = if arguments.is_null() {
            json!({})
        } else {
            arguments.clone()
        };
        let bad_args = || format!("Invalid arguments for {}", function);

        let call = match function {
            FunctionName::SearchFaqDatabase => {
                let a: SearchArgs = serde_json::from_value(args).with_context(bad_args)?;
                FunctionCall::SearchFaqDatabase {
                    query: a.query,
                    language: a.language,
                }
            }
            FunctionName::GetWeatherInfo => {
                let a: CityArgs = serde_json::from_value(args).with_context(bad_args)?;
                FunctionCall::GetWeatherInfo { city: a.city }
            }
            FunctionName::GetTrafficInfo => {
                let a: CityArgs = serde_json::from_value(args).with_context(bad_args)?;
                FunctionCall::GetTrafficInfo { city: a.city }
            }
            FunctionName::RecommendRestaurants => {
                let a: RestaurantArgs = serde_json::from_value(args).with_context(bad_args)?;
                FunctionCall::RecommendRestaurants {
                    city: a.city,
                    cuisine_type: a.cuisine_type,
                }
            }
            FunctionName::AnalyzeAwsCosts => {
                let a: CostArgs = serde_json::from_value(args).with_context(bad_args)?;
                if a.instance_type.trim().is_empty() {
                    bail!("instance_type must not be empty");
                }
                FunctionCall::AnalyzeAwsCosts {
                    instance_type: a.instance_type,
                    expected_load: a.expected_load,
                }
            }
        };
        Ok(call)
    }

    pub fn name(&self) -> FunctionName {
        match self {
            FunctionCall::SearchFaqDatabase { .. } => FunctionName::SearchFaqDatabase,
            FunctionCall::GetWeatherInfo { .. } => FunctionName::GetWeatherInfo,
            FunctionCall::GetTrafficInfo { .. } => FunctionName::GetTrafficInfo,
            FunctionCall::RecommendRestaurants { .. } => FunctionName::RecommendRestaurants,
            FunctionCall::AnalyzeAwsCosts { .. } => FunctionName::AnalyzeAwsCosts,
        }
    }

    /// The arguments as a JSON object.
    pub fn arguments(&self) -> Value {
        match serde_json::to_value(self) {
            Ok(mut v) => v
                .get_mut("arguments")
                .map(Value::take)
                .unwrap_or_else(|| json!({})),
            Err(_) => json!({}),
        }
    }
}

/// Run a function call against the static tables (and, for FAQ search,
/// the knowledge base).
pub fn execute(call: &FunctionCall, kb: &KnowledgeBase, top_k: usize) -> String {
    match call {
        FunctionCall::SearchFaqDatabase { query, .. } => search_faq(kb, query, top_k),
        FunctionCall::GetWeatherInfo { city } => weather(*city).to_string(),
        FunctionCall::GetTrafficInfo { city } => traffic(*city).to_string(),
        FunctionCall::RecommendRestaurants { city, cuisine_type } => {
            match restaurants(*city, *cuisine_type) {
                Some(s) => s.to_string(),
                None => format!(
                    "Restaurant recommendations not available for {}",
                    city.display_name()
                ),
            }
        }
        FunctionCall::AnalyzeAwsCosts {
            instance_type,
            expected_load,
        } => analyze_costs(instance_type, *expected_load),
    }
}

fn search_faq(kb: &KnowledgeBase, query: &str, top_k: usize) -> String {
    let result = kb.context(query, top_k);
    if !result.is_found() {
        return "No relevant FAQ entries found for this query.".to_string();
    }
    match result.best_faq() {
        Some(best) => format!(
            "FAQ search successful. Found relevant information for query: {}\n{}",
            query, best.content
        ),
        None => "No relevant FAQ entries found for this query.".to_string(),
    }
}

fn weather(city: City) -> &'static str {
    match city {
        City::Hanoi => {
            "Current temperature in Hanoi is 38°C with 65% humidity. It's sunny with light wind."
        }
        City::HoChiMinh => {
            "Current temperature in Ho Chi Minh City is 39°C with 70% humidity. Hot and humid."
        }
        City::DaNang => "Current temperature in Da Nang is 30°C with pleasant coastal breeze.",
    }
}

fn traffic(city: City) -> &'static str {
    match city {
        City::Hanoi => "Traffic in Hanoi is moderate with some congestion in the city center.",
        City::HoChiMinh => {
            "Traffic in Ho Chi Minh City is heavy during rush hours. Alternative routes recommended."
        }
        City::DaNang => "Traffic in Da Nang is generally light with good flow on main roads.",
    }
}

fn restaurants(city: City, cuisine: Cuisine) -> Option<&'static str> {
    let s = match (city, cuisine) {
        (City::Hanoi, Cuisine::Vietnamese) => {
            "Top Vietnamese restaurants in Hanoi: Pho Gia Truyen, Bun Cha Huong Lien"
        }
        (City::Hanoi, Cuisine::Pho) => "Best pho in Hanoi: Pho Bat Dan, Pho Thin, Pho Gia Truyen",
        (City::Hanoi, Cuisine::Any) => {
            "Popular restaurants in Hanoi include traditional pho shops and French-influenced cuisine"
        }
        (City::HoChiMinh, Cuisine::Vietnamese) => {
            "Top Vietnamese restaurants in Ho Chi Minh City: Nha Hang Ngon, Com Nieu Saigon"
        }
        (City::HoChiMinh, Cuisine::Seafood) => {
            "Best seafood in Ho Chi Minh City: Oc Thanh Da, Quan 94"
        }
        (City::HoChiMinh, Cuisine::Any) => {
            "Ho Chi Minh City offers diverse dining from street food to upscale restaurants"
        }
        (City::DaNang, Cuisine::Seafood) => {
            "Top seafood restaurants in Da Nang specialize in fresh coastal dishes"
        }
        (City::DaNang, Cuisine::Vietnamese) => {
            "Da Nang offers excellent local specialties like Mi Quang and Cao Lau"
        }
        (City::DaNang, Cuisine::Any) => "Da Nang is famous for fresh seafood and unique local dishes",
        _ => return None,
    };
    Some(s)
}

fn analyze_costs(instance_type: &str, load: Load) -> String {
    match load {
        Load::Low => format!(
            "For {} with low load: Auto Scaling can reduce costs by 20-40% by scaling down during low usage periods.",
            instance_type
        ),
        Load::Medium => format!(
            "For {} with medium load: Auto Scaling provides balanced cost optimization with 15-30% savings.",
            instance_type
        ),
        Load::High => format!(
            "For {} with high load: Auto Scaling ensures performance while optimizing costs during peak/off-peak cycles.",
            instance_type
        ),
        Load::Variable => format!(
            "For {} with variable load: Auto Scaling is highly beneficial, potentially saving 30-50% in costs.",
            instance_type
        ),
    }
}
