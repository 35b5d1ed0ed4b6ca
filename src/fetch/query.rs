use super::window::TimeWindow;
use crate::config::FetchConfig;
use crate::source::timestamp::format_query_time;
use serde_json::{json, Value};

/// Fields requested from each hit.
pub const SOURCE_FIELDS: [&str; 7] = [
    "@timestamp",
    "json.message",
    "json.asctime",
    "json.levelname",
    "json.service_name",
    "ct_deployment",
    "json.extra",
];

/// Request body for one page of a window, wrapped for the search proxy.
pub fn build_query(config: &FetchConfig, window: &TimeWindow, offset: usize) -> Value {
    json!({
        "params": {
            "index": config.index_pattern,
            "body": {
                "query": {
                    "bool": {
                        "must": [
                            { "term": { "json.service_name.keyword": config.service_name } },
                            { "match_phrase": { "json.message": config.message_phrase } }
                        ],
                        "filter": [
                            {
                                "range": {
                                    "@timestamp": {
                                        "gte": format_query_time(&window.start),
                                        "lt": format_query_time(&window.end)
                                    }
                                }
                            }
                        ]
                    }
                },
                "sort": [ { "@timestamp": { "order": "asc" } } ],
                "_source": SOURCE_FIELDS,
                "from": offset,
                "size": config.page_size
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_query_shape() {
        let config = FetchConfig::default();
        let window = TimeWindow {
            start: Utc.with_ymd_and_hms(2025, 12, 15, 17, 30, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2025, 12, 15, 17, 30, 30).unwrap(),
        };

        let query = build_query(&config, &window, 5000);
        let body = &query["params"]["body"];

        assert_eq!(query["params"]["index"], "matrix-logs*");
        assert_eq!(
            body["query"]["bool"]["must"][0]["term"]["json.service_name.keyword"],
            "schedule_pubsub_reader"
        );
        assert_eq!(body["query"]["bool"]["must"][1]["match_phrase"]["json.message"], "Got message");
        let range = &body["query"]["bool"]["filter"][0]["range"]["@timestamp"];
        assert_eq!(range["gte"], "2025-12-15T17:30:00Z");
        assert_eq!(range["lt"], "2025-12-15T17:30:30Z");
        assert_eq!(body["sort"][0]["@timestamp"]["order"], "asc");
        assert_eq!(body["_source"].as_array().unwrap().len(), 7);
        assert_eq!(body["from"], 5000);
        assert_eq!(body["size"], 5000);
    }
}
