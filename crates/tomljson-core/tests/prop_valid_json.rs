//! Property-based tests: generated TOML documents must transcode into
//! well-formed JSON whose structure matches the generated input, and
//! streaming must be insensitive to how the input is chunked.

use proptest::prelude::*;
use serde_json::{Map, Value};
use tomljson_core::{transcode, Transcoder};

/// A generated TOML value together with the JSON value it must become.
#[derive(Debug, Clone)]
enum GenValue {
    Int(i64),
    Float(String),
    Bool(bool),
    Str(String),
    IntArray(Vec<i64>),
}

impl GenValue {
    fn toml_text(&self) -> String {
        match self {
            GenValue::Int(n) => n.to_string(),
            GenValue::Float(text) => text.clone(),
            GenValue::Bool(b) => b.to_string(),
            GenValue::Str(s) => format!("\"{s}\""),
            GenValue::IntArray(items) => {
                let body: Vec<String> = items.iter().map(|n| n.to_string()).collect();
                format!("[{}]", body.join(", "))
            }
        }
    }

    fn expected_json(&self) -> Value {
        match self {
            GenValue::Int(n) => Value::from(*n),
            GenValue::Float(text) => {
                let parsed: f64 = text.parse().expect("generated float text parses");
                Value::from(parsed)
            }
            GenValue::Bool(b) => Value::from(*b),
            GenValue::Str(s) => Value::from(s.clone()),
            GenValue::IntArray(items) => Value::from(items.clone()),
        }
    }
}

fn arb_key() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9-]{0,7}").expect("valid key regex")
}

/// String content that needs no escaping on either side.
fn arb_safe_string() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9 .,:+=-]{0,20}").expect("valid string regex")
}

/// Float text like -12.5 or 3.25e2 that parses identically as TOML and
/// as JSON.
fn arb_float_text() -> impl Strategy<Value = String> {
    (-1_000_000i64..1_000_000i64, 1u32..5u32).prop_map(|(mantissa, decimals)| {
        let divisor = 10i64.pow(decimals);
        let whole = mantissa / divisor;
        let frac = (mantissa % divisor).unsigned_abs();
        let sign = if mantissa < 0 && whole == 0 { "-" } else { "" };
        format!("{sign}{whole}.{frac:0width$}", width = decimals as usize)
    })
}

fn arb_value() -> impl Strategy<Value = GenValue> {
    prop_oneof![
        any::<i64>().prop_map(GenValue::Int),
        arb_float_text().prop_map(GenValue::Float),
        any::<bool>().prop_map(GenValue::Bool),
        arb_safe_string().prop_map(GenValue::Str),
        prop::collection::vec(any::<i64>(), 0..5).prop_map(GenValue::IntArray),
    ]
}

/// A document: unique top-level assignments plus unique tables, each with
/// unique assignments.
#[derive(Debug, Clone)]
struct GenDoc {
    top: Vec<(String, GenValue)>,
    tables: Vec<(String, Vec<(String, GenValue)>)>,
}

impl GenDoc {
    fn toml_text(&self) -> String {
        let mut doc = String::new();
        for (key, value) in &self.top {
            doc.push_str(&format!("k-{key} = {}\n", value.toml_text()));
        }
        for (name, entries) in &self.tables {
            doc.push_str(&format!("[t-{name}]\n"));
            for (key, value) in entries {
                doc.push_str(&format!("k-{key} = {}\n", value.toml_text()));
            }
        }
        doc
    }

    fn expected_json(&self) -> Value {
        let mut root = Map::new();
        for (key, value) in &self.top {
            root.insert(format!("k-{key}"), value.expected_json());
        }
        for (name, entries) in &self.tables {
            let mut table = Map::new();
            for (key, value) in entries {
                table.insert(format!("k-{key}"), value.expected_json());
            }
            root.insert(format!("t-{name}"), Value::Object(table));
        }
        Value::Object(root)
    }
}

fn arb_entries(max: usize) -> impl Strategy<Value = Vec<(String, GenValue)>> {
    prop::collection::hash_map(arb_key(), arb_value(), 0..max)
        .prop_map(|m| m.into_iter().collect())
}

fn arb_doc() -> impl Strategy<Value = GenDoc> {
    (
        arb_entries(6),
        prop::collection::hash_map(arb_key(), arb_entries(4), 0..4),
    )
        .prop_map(|(top, tables)| GenDoc {
            top,
            tables: tables.into_iter().collect(),
        })
}

proptest! {
    /// Every generated document transcodes into JSON that parses and is
    /// structurally identical to the input.
    #[test]
    fn output_matches_input_structure(doc in arb_doc()) {
        let toml = doc.toml_text();
        let json = transcode(&toml).expect("valid generated TOML must transcode");
        let parsed: Value = serde_json::from_str(&json).expect("output must be valid JSON");
        prop_assert_eq!(parsed, doc.expected_json());
    }

    /// Chunk boundaries are invisible: feeding in tiny pieces produces
    /// byte-identical output to feeding the whole document at once.
    #[test]
    fn chunking_is_invisible(doc in arb_doc(), chunk in 1usize..7) {
        let toml = doc.toml_text();
        let whole = transcode(&toml).expect("whole-document transcode");

        let mut transcoder = Transcoder::new();
        for piece in toml.as_bytes().chunks(chunk) {
            transcoder.feed(piece).expect("chunked feed");
        }
        let streamed = transcoder.finish().expect("chunked finish");
        prop_assert_eq!(streamed, whole);
    }

    /// Underscore digit grouping never leaks into the output.
    #[test]
    fn integer_grouping_is_dropped(n in 1_000i64..i64::MAX / 2) {
        let text = n.to_string();
        let (head, tail) = text.split_at(text.len() - 3);
        let toml = format!("n = {head}_{tail}");
        let json = transcode(&toml).expect("grouped integer must parse");
        prop_assert!(!json.contains('_'), "underscore leaked into {}", json);
        let parsed: Value = serde_json::from_str(&json).expect("valid JSON");
        prop_assert_eq!(parsed["n"].as_i64(), Some(n));
    }

    /// Hex, octal, and binary renditions of a value all transcode to the
    /// same decimal JSON number.
    #[test]
    fn prefixed_integers_agree(n in 0i64..i64::MAX) {
        for toml in [format!("n = {n:#x}"), format!("n = {n:#o}"), format!("n = {n:#b}")] {
            let json = transcode(&toml).expect("prefixed integer must parse");
            let parsed: Value = serde_json::from_str(&json).expect("valid JSON");
            prop_assert_eq!(parsed["n"].as_i64(), Some(n), "for {}", toml);
        }
    }
}
