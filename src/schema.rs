use rmcp::model::JsonObject;
use rmcp::schemars::{self, JsonSchema, generate::SchemaSettings};
use std::sync::Arc;

/// Generate an inline JSON schema for MCP tools
///
/// Sets `inline_subschemas = true` so nested types are written in place instead
/// of as `$ref` definitions, and marks optional request fields as nullable.
pub fn inline_schema_for_type<T: JsonSchema>() -> Arc<JsonObject> {
    let mut settings = SchemaSettings::draft07();
    settings.transforms = vec![Box::new(schemars::transform::AddNullable::default())];
    settings.inline_subschemas = true;

    let generator = settings.into_generator();
    let schema = generator.into_root_schema_for::<T>();

    let json_object = match serde_json::to_value(schema) {
        Ok(serde_json::Value::Object(object)) => object,
        Ok(other) => {
            tracing::error!("Schema serialization produced non-object value: {}", other);
            JsonObject::new()
        }
        Err(e) => {
            tracing::error!("Failed to serialize schema: {}", e);
            JsonObject::new()
        }
    };

    Arc::new(json_object)
}
