use crate::source::LogRecord;
use serde_json::Value;

fn string_at(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn app_field<'a>(source: &'a Value, name: &str) -> Option<&'a Value> {
    match source.get("json") {
        Some(nested @ Value::Object(_)) => nested.get(name),
        _ => source.get(format!("json.{name}").as_str()),
    }
}

/// Flatten one search hit into a [`LogRecord`].
///
/// Application fields appear either nested under `_source.json` or as flat
/// dotted keys (`_source["json.asctime"]`); `@timestamp` and `ct_deployment`
/// are top-level in both shapes.
pub fn normalize_hit(hit: &Value) -> LogRecord {
    let source = hit.get("_source").unwrap_or(&Value::Null);
    let field = |name| app_field(source, name);

    LogRecord {
        timestamp: string_at(source.get("@timestamp")),
        asctime: string_at(field("asctime")),
        message: string_at(field("message")),
        level: string_at(field("levelname")),
        service: string_at(field("service_name")),
        deployment: string_at(source.get("ct_deployment")),
        extra: field("extra").filter(|v| !v.is_null()).cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_and_flat_shapes_match() {
        let nested = json!({
            "_source": {
                "@timestamp": "2025-12-15T17:30:01.123Z",
                "ct_deployment": "prod-eu",
                "json": {
                    "asctime": "2025-12-15 17:30:01,100",
                    "message": "Got message b'abc' with schedule_timestamp 1765819800.0",
                    "levelname": "INFO",
                    "service_name": "schedule_pubsub_reader",
                    "extra": { "attempt": 1 }
                }
            }
        });
        let flat = json!({
            "_source": {
                "@timestamp": "2025-12-15T17:30:01.123Z",
                "ct_deployment": "prod-eu",
                "json.asctime": "2025-12-15 17:30:01,100",
                "json.message": "Got message b'abc' with schedule_timestamp 1765819800.0",
                "json.levelname": "INFO",
                "json.service_name": "schedule_pubsub_reader",
                "json.extra": { "attempt": 1 }
            }
        });

        let record = normalize_hit(&nested);
        assert_eq!(record, normalize_hit(&flat));
        assert_eq!(record.level.as_deref(), Some("INFO"));
        assert_eq!(record.deployment.as_deref(), Some("prod-eu"));
        assert_eq!(record.extra, Some(json!({ "attempt": 1 })));
    }

    #[test]
    fn test_missing_fields_are_none() {
        let record = normalize_hit(&json!({ "_id": "x" }));
        assert_eq!(record, LogRecord::default());
    }
}
