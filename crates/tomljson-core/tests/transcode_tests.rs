use std::io::Read;

use tomljson_core::{transcode, JsonReader, Transcoder};

/// Assert the exact JSON text and that it is well-formed.
fn assert_json(doc: &str, expected: &str) {
    let json = transcode(doc).expect("transcode failed");
    assert!(
        serde_json::from_str::<serde_json::Value>(&json).is_ok(),
        "output is not valid JSON:\n  doc:  {doc}\n  json: {json}"
    );
    assert_eq!(
        json, expected,
        "JSON mismatch:\n  doc:      {doc}\n  got:      {json}\n  expected: {expected}"
    );
}

// ============================================================================
// Keys
// ============================================================================

#[test]
fn dotted_key_with_quoted_segment() {
    assert_json("a.\"b\".d=2", r#"{"a":{"b":{"d":2}}}"#);
}

#[test]
fn literal_key_segment_may_contain_dots() {
    assert_json(
        "a.'b.c.d'.d=2\na.b.c.d=2",
        r#"{"a":{"b.c.d":{"d":2},"b":{"c":{"d":2}}}}"#,
    );
}

#[test]
fn bare_key_with_dash() {
    assert_json("key-test=1", r#"{"key-test":1}"#);
}

#[test]
fn spaces_around_key_dots() {
    assert_json("k.e .y=1", r#"{"k":{"e":{"y":1}}}"#);
    assert_json("   k  .  e .y=1", r#"{"k":{"e":{"y":1}}}"#);
    assert_json("   \"k\"  .  'e'  .y=1", r#"{"k":{"e":{"y":1}}}"#);
}

#[test]
fn quoted_key_with_escapes() {
    assert_json("\"key\\r\\n\"=1", r#"{"key\r\n":1}"#);
    assert_json(
        "'quoted \"value\"' = \"value\"",
        r#"{"quoted \"value\"":"value"}"#,
    );
}

#[test]
fn unicode_escape_in_key() {
    assert_json("a.\"\\uFFFF\".c=1", r#"{"a":{"\uFFFF":{"c":1}}}"#);
    assert_json("a.\"\\UD7FF16\".c=1", r#"{"a":{"\\UD7FF16":{"c":1}}}"#);
}

// ============================================================================
// Strings
// ============================================================================

#[test]
fn basic_string_escapes() {
    assert_json("a = \"\\r\"", r#"{"a":"\r"}"#);
    assert_json("a = \"x\\ty\"", r#"{"a":"x\ty"}"#);
}

#[test]
fn hash_inside_string_is_not_a_comment() {
    assert_json("another = \"# test\"", r##"{"another":"# test"}"##);
}

#[test]
fn empty_strings() {
    assert_json("a = \"\"", r#"{"a":""}"#);
    assert_json("a = ''", r#"{"a":""}"#);
}

#[test]
fn literal_string_keeps_backslashes() {
    assert_json(
        "winpath  = 'C:\\Users\\nodejs\\templates'",
        r#"{"winpath":"C:\\Users\\nodejs\\templates"}"#,
    );
}

#[test]
fn multiline_string_drops_first_newline() {
    assert_json("key = \"\"\"\nvalue\"\"\"", r#"{"key":"value"}"#);
}

#[test]
fn multiline_string_line_ending_backslash() {
    assert_json("key = \"\"\"a b c \\\n      ooo\"\"\"", r#"{"key":"a b c ooo"}"#);
    assert_json(
        "key = \"\"\"value  \\\n      \"\"\"",
        r#"{"key":"value  "}"#,
    );
}

#[test]
fn multiline_string_escaped_crlf_text() {
    assert_json("key=\"\"\"value\\r\\n\"\"\"", r#"{"key":"value\r\n"}"#);
}

#[test]
fn multiline_string_quote_runs() {
    assert_json(
        "multiline_end_esc = \"\"\"When will it end? \\\"\"\"...\"\"\\\" should be here\\\"\"\"\"",
        r#"{"multiline_end_esc":"When will it end? \"\"\"...\"\"\" should be here\""}"#,
    );
}

#[test]
fn multiline_string_escaped_backslash_before_unicode_text() {
    assert_json(
        "multiline_not_unicode = \"\"\"\\\\u0041\"\"\"",
        r#"{"multiline_not_unicode":"\\u0041"}"#,
    );
}

#[test]
fn multiline_literal_string() {
    assert_json("a = '''\nraw \\ text'''", r#"{"a":"raw \\ text"}"#);
}

#[test]
fn unicode_escapes_in_values() {
    assert_json("key = \"\"\"\\uFFFF\"\"\"", r#"{"key":"\uFFFF"}"#);
    assert_json("key = \"\"\"\\UD7FF16\"\"\"", r#"{"key":"\\UD7FF16"}"#);
    assert_json("string_escape = \"\\U00000000\"", r#"{"string_escape":"\\U00000000"}"#);
}

// ============================================================================
// Numbers
// ============================================================================

#[test]
fn integers() {
    assert_json("n = 42", r#"{"n":42}"#);
    assert_json("n = +17", r#"{"n":17}"#);
    assert_json("n = -17", r#"{"n":-17}"#);
    assert_json("n = 0", r#"{"n":0}"#);
    assert_json("n = 1_000_000", r#"{"n":1000000}"#);
}

#[test]
fn prefixed_integers_convert_to_decimal() {
    assert_json("hex3 = 0x123_123", r#"{"hex3":1192227}"#);
    assert_json("hex3 = 0xdead_beef", r#"{"hex3":3735928559}"#);
    assert_json("oct = 0o755", r#"{"oct":493}"#);
    assert_json("bin = 0b1101", r#"{"bin":13}"#);
}

#[test]
fn prefixed_integer_max() {
    assert_json(
        "big = 0x7FFF_FFFF_FFFF_FFFF",
        r#"{"big":9223372036854775807}"#,
    );
}

#[test]
fn floats() {
    assert_json("f = 3.14", r#"{"f":3.14}"#);
    assert_json("f = -0.01", r#"{"f":-0.01}"#);
    assert_json("f = 5e+22", r#"{"f":5e+22}"#);
    assert_json("f = 1e6", r#"{"f":1e6}"#);
    assert_json("f = 6.626e-34", r#"{"f":6.626e-34}"#);
    assert_json("f = 9_224_617.445_991", r#"{"f":9224617.445991}"#);
}

#[test]
fn zero_floats() {
    assert_json("k = 0e0", r#"{"k":0e0}"#);
    assert_json("flt9 = -0e0", r#"{"flt9":-0e0}"#);
    assert_json("f = 0.5", r#"{"f":0.5}"#);
}

#[test]
fn infinities_and_nans_become_strings() {
    assert_json("sf6 = inf", r#"{"sf6":"inf"}"#);
    assert_json("sf6 = +inf", r#"{"sf6":"+inf"}"#);
    assert_json("sf6 = -inf", r#"{"sf6":"-inf"}"#);
    assert_json("sf6 = nan", r#"{"sf6":"nan"}"#);
    assert_json("sf6 = +nan", r#"{"sf6":"+nan"}"#);
    assert_json("sf6 = -nan", r#"{"sf6":"-nan"}"#);
}

// ============================================================================
// Dates and times
// ============================================================================

#[test]
fn offset_datetimes() {
    assert_json(
        "odt = 1979-05-27T07:32:00Z",
        r#"{"odt":"1979-05-27T07:32:00Z"}"#,
    );
    assert_json(
        "odt = 1979-05-27T00:32:00-07:00",
        r#"{"odt":"1979-05-27T00:32:00-07:00"}"#,
    );
    assert_json(
        "odt = 1979-05-27T00:32:00.999999+11:30",
        r#"{"odt":"1979-05-27T00:32:00.999999+11:30"}"#,
    );
}

#[test]
fn local_date_time_forms() {
    assert_json("d = 1979-05-27", r#"{"d":"1979-05-27"}"#);
    assert_json("t = 07:32:00", r#"{"t":"07:32:00"}"#);
    assert_json("t = 09:15:00.99999", r#"{"t":"09:15:00.99999"}"#);
    assert_json(
        "dt = 1979-05-27 07:32:00",
        r#"{"dt":"1979-05-27 07:32:00"}"#,
    );
}

#[test]
fn february_twenty_nine_always_allowed() {
    assert_json("d = 1976-02-29", r#"{"d":"1976-02-29"}"#);
}

// ============================================================================
// Booleans
// ============================================================================

#[test]
fn booleans() {
    assert_json("t = true\nf = false", r#"{"t":true,"f":false}"#);
}

// ============================================================================
// Inline arrays and tables
// ============================================================================

#[test]
fn inline_arrays() {
    assert_json("key = [0,1,2,3,4]", r#"{"key":[0,1,2,3,4]}"#);
    assert_json("key = [1,2,3,4,0]", r#"{"key":[1,2,3,4,0]}"#);
    assert_json("key = []", r#"{"key":[]}"#);
    assert_json("key = [ 1, 2 ]", r#"{"key":[1,2]}"#);
    assert_json("key = [\n  1,\n  2,\n]", r#"{"key":[1,2]}"#);
    assert_json("key = [[1,2],[3]]", r#"{"key":[[1,2],[3]]}"#);
    assert_json("key = [\"a\", 'b']", r#"{"key":["a","b"]}"#);
}

#[test]
fn inline_tables() {
    assert_json("key={a=0}", r#"{"key":{"a":0}}"#);
    assert_json("key = {}", r#"{"key":{}}"#);
    assert_json(
        "animal = { type.name = \"pug\"}",
        r#"{"animal":{"type":{"name":"pug"}}}"#,
    );
    assert_json("key = {v.y=1}", r#"{"key":{"v":{"y":1}}}"#);
    assert_json(
        "a = {x.y=1, x.z=2}",
        r#"{"a":{"x":{"y":1,"z":2}}}"#,
    );
}

#[test]
fn inline_tables_in_arrays() {
    assert_json(
        "points = [ { x = 1, y = 2 }, { x = 7, y = 8 } ]",
        r#"{"points":[{"x":1,"y":2},{"x":7,"y":8}]}"#,
    );
}

// ============================================================================
// Tables and arrays of tables
// ============================================================================

#[test]
fn table_headers_nest() {
    assert_json("[server]\nport = 8080", r#"{"server":{"port":8080}}"#);
    assert_json(
        "[a.b.c]\nx = 1\ny = 2",
        r#"{"a":{"b":{"c":{"x":1,"y":2}}}}"#,
    );
}

#[test]
fn implicit_table_then_explicit_parent() {
    assert_json(
        "[x.y.z.w] # for this to work\n[x]",
        r#"{"x":{"y":{"z":{"w":{}}}}}"#,
    );
}

#[test]
fn array_of_tables_elements() {
    assert_json(
        "[[arr]]\nx=1\n[[arr]]\nx=2",
        r#"{"arr":[{"x":1},{"x":2}]}"#,
    );
}

#[test]
fn array_of_tables_with_subtables() {
    assert_json(
        "[[arr.x]]\n[arr.x.table]\n[[arr.x]]\n[arr.x.table]\n[x]\n[[arr.x]]\n",
        r#"{"arr":{"x":[{"table":{}},{"table":{}}]},"x":{},"arr":{"x":[{}]}}"#,
    );
}

#[test]
fn reopened_inner_array_after_outer_element() {
    assert_json(
        "[[a]]\n[[a.b]]\nk = 1\n[[a]]\n[[a.b]]\nk = 2",
        r#"{"a":[{"b":[{"k":1}]},{"b":[{"k":2}]}]}"#,
    );
}

// ============================================================================
// Comments, whitespace, line endings
// ============================================================================

#[test]
fn comments() {
    assert_json("# nothing here\n", r#"{}"#);
    assert_json("a = 1 # trailing\nb = 2", r#"{"a":1,"b":2}"#);
    assert_json("[t] # after header\nx = 1", r#"{"t":{"x":1}}"#);
}

#[test]
fn crlf_line_endings() {
    assert_json("a = 1\r\nb = 2\r\n", r#"{"a":1,"b":2}"#);
}

#[test]
fn empty_document() {
    assert_json("", r#"{}"#);
    assert_json("\n\n", r#"{}"#);
}

// ============================================================================
// Streaming behavior
// ============================================================================

#[test]
fn byte_at_a_time_feeding_matches_whole_document() {
    let doc = "[[arr]]\nname = \"caf\u{e9} \\u00E9\"\n[[arr]]\nname = 'literal'\nn = 0xdead_beef\nd = 1979-05-27T07:32:00Z\n";
    let whole = transcode(doc).expect("whole-document transcode failed");

    let mut transcoder = Transcoder::new();
    let mut streamed = Vec::new();
    let mut chunk = [0u8; 16];
    for byte in doc.as_bytes() {
        transcoder.feed(std::slice::from_ref(byte)).expect("feed failed");
        loop {
            let n = transcoder.drain(&mut chunk).expect("drain failed");
            if n == 0 {
                break;
            }
            streamed.extend_from_slice(&chunk[..n]);
        }
    }
    transcoder.end_input();
    loop {
        let n = transcoder.drain(&mut chunk).expect("final drain failed");
        if n == 0 {
            break;
        }
        streamed.extend_from_slice(&chunk[..n]);
    }

    assert_eq!(String::from_utf8(streamed).expect("utf-8"), whole);
}

#[test]
fn drained_prefixes_never_overrun_their_closers() {
    // while feeding, the output must always be a prefix of a JSON object:
    // the number of closed braces can never exceed the opened ones
    let doc = "[a.b]\nx = 1\n[c]\ny = [1, {z = 2}]\n";
    let mut transcoder = Transcoder::new();
    let mut seen = Vec::new();
    let mut chunk = [0u8; 8];
    for byte in doc.as_bytes() {
        transcoder.feed(std::slice::from_ref(byte)).expect("feed failed");
        let n = transcoder.drain(&mut chunk).expect("drain failed");
        seen.extend_from_slice(&chunk[..n]);
        let opens = seen.iter().filter(|b| **b == b'{').count();
        let closes = seen.iter().filter(|b| **b == b'}').count();
        assert!(
            opens >= closes,
            "closers overran openers in prefix {:?}",
            String::from_utf8_lossy(&seen)
        );
    }
}

#[test]
fn json_reader_streams() {
    let doc = "[server]\nhost = \"local\"\nport = 8080\n";
    let mut json = String::new();
    JsonReader::new(doc.as_bytes())
        .read_to_string(&mut json)
        .expect("read failed");
    assert_eq!(json, r#"{"server":{"host":"local","port":8080}}"#);
}

#[test]
fn json_reader_small_buffer() {
    let doc = "key = \"value\"";
    let mut reader = JsonReader::new(doc.as_bytes());
    let mut json = Vec::new();
    let mut buf = [0u8; 3];
    loop {
        let n = reader.read(&mut buf).expect("read failed");
        if n == 0 {
            break;
        }
        json.extend_from_slice(&buf[..n]);
    }
    assert_eq!(String::from_utf8(json).expect("utf-8"), r#"{"key":"value"}"#);
}

#[test]
fn utf8_sequence_split_across_feeds() {
    let doc = "k = \"caf\u{e9}\"".as_bytes();
    // split inside the two-byte é sequence
    let split = doc.len() - 2;
    let mut transcoder = Transcoder::new();
    transcoder.feed(&doc[..split]).expect("first feed failed");
    transcoder.feed(&doc[split..]).expect("second feed failed");
    let json = transcoder.finish().expect("finish failed");
    assert_eq!(json, "{\"k\":\"caf\u{e9}\"}");
}
