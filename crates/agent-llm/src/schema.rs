//! Helpers to build JSON schemas for structured outputs
//!
//! # Example
//!
//! ```
//! use agent_llm::schema;
//! use serde_json::json;
//!
//! let schema = schema::object(
//!     json!({
//!         "subject": schema::string("Company or topic name"),
//!         "keywords": schema::array("Context keywords", schema::string("Keyword")),
//!     }),
//!     vec!["subject", "keywords"],
//! );
//! assert_eq!(schema["additionalProperties"], false);
//! ```

use serde_json::{Value, json};

/// Create a JSON schema for a closed object with properties
///
/// Unknown properties are disallowed, matching the strict deserialization
/// applied to the answer.
pub fn object(properties: Value, required: Vec<&str>) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

/// String property schema
pub fn string(description: &str) -> Value {
    json!({
        "type": "string",
        "description": description,
    })
}

/// Boolean property schema
pub fn boolean(description: &str) -> Value {
    json!({
        "type": "boolean",
        "description": description,
    })
}

/// Array property schema
pub fn array(description: &str, items: Value) -> Value {
    json!({
        "type": "array",
        "description": description,
        "items": items,
    })
}

/// Array property schema with length bounds
pub fn bounded_array(description: &str, items: Value, min_items: usize, max_items: usize) -> Value {
    json!({
        "type": "array",
        "description": description,
        "items": items,
        "minItems": min_items,
        "maxItems": max_items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_is_closed() {
        let schema = object(json!({ "query": string("Search query") }), vec!["query"]);
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"][0], "query");
        assert_eq!(schema["additionalProperties"], false);
    }

    #[test]
    fn test_schema_builders() {
        assert_eq!(string("test")["type"], "string");
        assert_eq!(boolean("flag")["type"], "boolean");

        let arr = bounded_array("angles", string("angle"), 3, 4);
        assert_eq!(arr["minItems"], 3);
        assert_eq!(arr["maxItems"], 4);
        assert_eq!(arr["items"]["type"], "string");
    }
}
