use std::fmt::Write;

use serde_json::{json, Map, Value};

use crate::parser::extract::SectionResults;

/// Human-readable report for one page, one block per section kind.
pub fn render_text(source: &str, results: &SectionResults) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "==== {} ====", source);
    for (kind, result) in results {
        match result {
            Ok(lists) => {
                let _ = writeln!(out, "----{} found----", kind.title());
                for (i, items) in lists.iter().enumerate() {
                    let _ = writeln!(out, "----List {}----", i + 1);
                    for (n, item) in items.iter().enumerate() {
                        let _ = writeln!(out, "{}. {}", n + 1, item);
                    }
                    let _ = writeln!(out, "---------------");
                }
            }
            Err(_) => {
                let _ = writeln!(out, "No {} found", kind);
            }
        }
    }
    out
}

/// `{"ingredients": {"lists": [[...]]}, "instructions": {"error": "..."}}`
pub fn sections_json(results: &SectionResults) -> Value {
    let sections: Map<String, Value> = results
        .iter()
        .map(|(kind, result)| {
            let value = match result {
                Ok(lists) => json!({ "lists": lists }),
                Err(e) => json!({ "error": e.to_string() }),
            };
            (kind.to_string(), value)
        })
        .collect();
    Value::Object(sections)
}

pub fn page_json(source: &str, results: &SectionResults) -> Value {
    json!({ "source": source, "sections": sections_json(results) })
}

pub fn failure_json(source: &str, error: &dyn std::fmt::Display) -> Value {
    json!({ "source": source, "error": error.to_string() })
}
