//! Example demonstrating how failed responses are normalized.
//!
//! This example shows how to:
//! - Classify an HTTP failure into an `ErrorKind`
//! - Read the `Retry-After` hint of a rate limit
//! - Ask the retry policy what it would do next
//! - Render the protocol error a tool caller sees
//!
//! No network access is needed.
//!
//! Run with: `cargo run --example error_handling`

use http::{HeaderMap, HeaderValue, StatusCode};
use taptools_mcp::{classify, RetryPolicy};

fn main() {
    let policy = RetryPolicy::default();

    let cases: Vec<(u16, Vec<(&str, &str)>, &str)> = vec![
        (
            401,
            vec![],
            r#"{"error": "Unauthorized", "message": "Invalid API key"}"#,
        ),
        (404, vec![], "no such token"),
        (429, vec![("retry-after", "12")], ""),
        (503, vec![], "<html>upstream down</html>"),
        (599, vec![], ""),
    ];

    for (status, headers, body) in cases {
        let mut header_map = HeaderMap::new();
        for (name, value) in headers {
            header_map.insert(name, HeaderValue::from_static(value));
        }

        let status = StatusCode::from_u16(status).expect("valid status");
        let error = classify(status, &header_map, body, None);
        let decision = policy.decide(1, &error);
        let protocol = error.to_protocol_error();

        println!("=== HTTP {} ===", status.as_u16());
        println!("  Kind:        {}", error.kind());
        println!("  Message:     {}", error.message());
        println!("  Retry delay: {:?}", error.retry_delay());
        println!(
            "  After attempt 1: {}",
            if decision.should_retry {
                format!("retry in {:?}", decision.delay)
            } else {
                "give up".to_string()
            }
        );
        println!("  Protocol:    [{}] {}", protocol.code, protocol.message);
        println!();
    }
}
