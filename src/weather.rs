//! The `weather` tool offered to the model by the tool-calling demo.
//!
//! There is no real forecast behind it: the handler reports a temperature
//! drawn uniformly from [`TEMPERATURE_RANGE`].

use gateway_sdk::{Tool, ToolSet};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::ops::RangeInclusive;

/// Name the model calls the tool by.
pub const TOOL_NAME: &str = "weather";

/// Tool description shown to the model.
pub const DESCRIPTION: &str = "Get the weather in a location";

/// Reported temperatures, in °F (72 ± 10).
pub const TEMPERATURE_RANGE: RangeInclusive<i64> = 62..=82;

/// Arguments the model supplies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherInput {
    /// The location to get the weather for.
    pub location: String,
}

/// What the tool returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherReport {
    /// Location echoed from the input.
    pub location: String,
    /// Temperature in °F.
    pub temperature: i64,
}

/// JSON Schema of [`WeatherInput`].
pub fn input_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "location": {
                "type": "string",
                "description": "The location to get the weather for"
            }
        },
        "required": ["location"],
        "additionalProperties": false
    })
}

/// Produce a report for the requested location.
pub fn forecast(input: WeatherInput) -> WeatherReport {
    let temperature = rand::thread_rng().gen_range(TEMPERATURE_RANGE);
    tracing::debug!(location = %input.location, temperature, "Generated weather report");
    WeatherReport {
        location: input.location,
        temperature,
    }
}

/// The weather tool.
pub fn weather_tool() -> Tool {
    Tool::typed(DESCRIPTION, input_schema(), forecast)
}

/// A tool set holding only the weather tool.
pub fn tools() -> ToolSet {
    ToolSet::new().with(TOOL_NAME, weather_tool())
}
