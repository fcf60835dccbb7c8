//! Standard registry surface: dotted lookups and category behavior.

mod common;

use common::run_output;
use indexmap::IndexMap;
use omni::interpreter::Registry;
use omni::Value;

fn call(registry: &Registry, name: &str, args: &[Value]) -> Value {
    registry
        .call(name, args)
        .unwrap_or_else(|e| panic!("{} failed: {}", name, e))
}

#[test]
fn test_standard_catalog_covers_categories() {
    let registry = Registry::standard();
    for name in [
        "print",
        "println",
        "printf",
        "input",
        "len",
        "str",
        "int",
        "float",
        "typeof",
        "range",
        "Math.sqrt",
        "Math.random",
        "String.substring",
        "String.format",
        "File.read",
        "List.add",
        "Map.put",
        "Regex.find",
        "Date.now",
        "CSV.parse",
        "Serializer.toJSON",
        "System.getenv",
        "Path.join",
        "Integer.parseInt",
        "Double.parseDouble",
    ] {
        assert!(registry.has(name), "missing builtin: {}", name);
    }
    assert!(!registry.has("Math.nope"));
}

#[test]
fn test_math_builtins() {
    let registry = Registry::standard();
    assert_eq!(
        call(&registry, "Math.sqrt", &[Value::Int(16)]),
        Value::Double(4.0)
    );
    assert_eq!(
        call(&registry, "Math.pow", &[Value::Int(2), Value::Int(10)]),
        Value::Double(1024.0)
    );
    assert_eq!(
        call(&registry, "Math.floor", &[Value::Double(2.9)]),
        Value::Int(2)
    );
    assert_eq!(
        call(&registry, "Math.ceil", &[Value::Double(2.1)]),
        Value::Int(3)
    );
    assert_eq!(
        call(&registry, "Math.round", &[Value::Double(2.5)]),
        Value::Int(3)
    );
    assert_eq!(
        call(&registry, "Math.abs", &[Value::Int(-4)]),
        Value::Int(4)
    );
    assert_eq!(
        call(&registry, "Math.abs", &[Value::Double(-2.5)]),
        Value::Double(2.5)
    );
    let pi = call(&registry, "Math.PI", &[]);
    assert_eq!(pi, Value::Double(std::f64::consts::PI));
    let r = call(&registry, "Math.random", &[]).as_double();
    assert!((0.0..=1.0).contains(&r));
}

#[test]
fn test_string_builtins() {
    let registry = Registry::standard();
    let s = Value::string("Hello, World");
    assert_eq!(
        call(&registry, "String.toUpperCase", &[s.clone()]),
        Value::string("HELLO, WORLD")
    );
    assert_eq!(
        call(
            &registry,
            "String.substring",
            &[s.clone(), Value::Int(0), Value::Int(5)]
        ),
        Value::string("Hello")
    );
    assert_eq!(
        call(&registry, "String.substring", &[s.clone(), Value::Int(7)]),
        Value::string("World")
    );
    assert_eq!(
        call(
            &registry,
            "String.indexOf",
            &[s.clone(), Value::string("World")]
        ),
        Value::Int(7)
    );
    assert_eq!(
        call(
            &registry,
            "String.indexOf",
            &[s.clone(), Value::string("xyz")]
        ),
        Value::Int(-1)
    );
    assert_eq!(
        call(
            &registry,
            "String.split",
            &[Value::string("a,b,c"), Value::string(",")]
        ),
        Value::Array(vec![
            Value::string("a"),
            Value::string("b"),
            Value::string("c")
        ])
    );
    assert_eq!(
        call(&registry, "String.trim", &[Value::string("  x  ")]),
        Value::string("x")
    );
    assert_eq!(
        call(&registry, "String.charAt", &[s, Value::Int(1)]),
        Value::string("e")
    );
    assert_eq!(
        call(
            &registry,
            "String.equalsIgnoreCase",
            &[Value::string("ABC"), Value::string("abc")]
        ),
        Value::Bool(true)
    );
    assert_eq!(
        call(&registry, "Integer.parseInt", &[Value::string("42")]),
        Value::Int(42)
    );
    assert_eq!(
        call(&registry, "Integer.parseInt", &[Value::string("oops")]),
        Value::Int(0)
    );
}

#[test]
fn test_string_format() {
    let registry = Registry::standard();
    assert_eq!(
        call(
            &registry,
            "String.format",
            &[
                Value::string("%s has %d items"),
                Value::string("cart"),
                Value::Int(3)
            ]
        ),
        Value::string("cart has 3 items")
    );
    assert_eq!(
        call(
            &registry,
            "String.format",
            &[Value::string("%.2f"), Value::Double(3.14159)]
        ),
        Value::string("3.14")
    );
    assert_eq!(
        call(
            &registry,
            "String.format",
            &[Value::string("[%5d]"), Value::Int(7)]
        ),
        Value::string("[    7]")
    );
    assert_eq!(
        call(
            &registry,
            "String.format",
            &[Value::string("[%-5d]"), Value::Int(7)]
        ),
        Value::string("[7    ]")
    );
}

#[test]
fn test_range_builtin() {
    let registry = Registry::standard();
    assert_eq!(
        call(&registry, "range", &[Value::Int(3)]),
        Value::Array(vec![Value::Int(0), Value::Int(1), Value::Int(2)])
    );
    assert_eq!(
        call(&registry, "range", &[Value::Int(2), Value::Int(5)]),
        Value::Array(vec![Value::Int(2), Value::Int(3), Value::Int(4)])
    );
    assert_eq!(
        call(
            &registry,
            "range",
            &[Value::Int(0), Value::Int(10), Value::Int(4)]
        ),
        Value::Array(vec![Value::Int(0), Value::Int(4), Value::Int(8)])
    );
    assert_eq!(
        call(
            &registry,
            "range",
            &[Value::Int(0), Value::Int(10), Value::Int(0)]
        ),
        Value::Array(Vec::new())
    );
}

#[test]
fn test_list_builtins_are_immutable_style() {
    let registry = Registry::standard();
    let original = Value::Array(vec![Value::Int(1)]);
    let extended = call(&registry, "List.add", &[original.clone(), Value::Int(2)]);
    assert_eq!(original, Value::Array(vec![Value::Int(1)]));
    assert_eq!(
        extended,
        Value::Array(vec![Value::Int(1), Value::Int(2)])
    );

    assert_eq!(
        call(&registry, "List.get", &[extended.clone(), Value::Int(1)]),
        Value::Int(2)
    );
    assert_eq!(
        call(&registry, "List.get", &[extended.clone(), Value::Int(9)]),
        Value::Null
    );
    assert_eq!(
        call(&registry, "List.size", &[extended.clone()]),
        Value::Int(2)
    );
    assert_eq!(
        call(
            &registry,
            "List.contains",
            &[extended.clone(), Value::Int(2)]
        ),
        Value::Bool(true)
    );
    assert_eq!(
        call(
            &registry,
            "List.indexOf",
            &[extended.clone(), Value::Int(2)]
        ),
        Value::Int(1)
    );
    let removed = call(&registry, "List.remove", &[extended, Value::Int(0)]);
    assert_eq!(removed, Value::Array(vec![Value::Int(2)]));
}

#[test]
fn test_map_builtins() {
    let registry = Registry::standard();
    let map = call(&registry, "Map.new", &[]);
    assert_eq!(map, Value::Object(IndexMap::new()));
    assert_eq!(map.class_name(), None);

    let map = call(
        &registry,
        "Map.put",
        &[map, Value::string("k"), Value::Int(1)],
    );
    assert_eq!(
        call(&registry, "Map.get", &[map.clone(), Value::string("k")]),
        Value::Int(1)
    );
    assert_eq!(
        call(
            &registry,
            "Map.containsKey",
            &[map.clone(), Value::string("k")]
        ),
        Value::Bool(true)
    );
    assert_eq!(
        call(&registry, "Map.keys", &[map.clone()]),
        Value::Array(vec![Value::string("k")])
    );
    assert_eq!(call(&registry, "Map.size", &[map]), Value::Int(1));
}

#[test]
fn test_regex_builtins() {
    let registry = Registry::standard();
    assert_eq!(
        call(
            &registry,
            "Regex.matches",
            &[Value::string("abc123"), Value::string("[a-z]+[0-9]+")]
        ),
        Value::Bool(true)
    );
    assert_eq!(
        call(
            &registry,
            "Regex.matches",
            &[Value::string("abc"), Value::string("[0-9]+")]
        ),
        Value::Bool(false)
    );
    assert_eq!(
        call(
            &registry,
            "Regex.find",
            &[Value::string("abc123"), Value::string("[0-9]+")]
        ),
        Value::Int(3)
    );
    assert_eq!(
        call(
            &registry,
            "Regex.findAll",
            &[Value::string("a1 b2 c3"), Value::string("[0-9]")]
        ),
        Value::Array(vec![
            Value::string("1"),
            Value::string("2"),
            Value::string("3")
        ])
    );
    assert_eq!(
        call(
            &registry,
            "Regex.replace",
            &[
                Value::string("a1b2"),
                Value::string("[0-9]"),
                Value::string("_")
            ]
        ),
        Value::string("a_b_")
    );
    // Invalid patterns fall back instead of raising.
    assert_eq!(
        call(
            &registry,
            "Regex.replace",
            &[Value::string("abc"), Value::string("("), Value::string("_")]
        ),
        Value::string("abc")
    );
    assert_eq!(
        call(
            &registry,
            "Regex.groups",
            &[
                Value::string("2001-06-15"),
                Value::string("([0-9]{4})-([0-9]{2})")
            ]
        ),
        Value::Array(vec![
            Value::string("2001-06"),
            Value::string("2001"),
            Value::string("06")
        ])
    );
}

#[test]
fn test_date_builtins_round_trip() {
    let registry = Registry::standard();
    let ts = call(&registry, "Date.parse", &[Value::string("15/06/2001")]);
    assert!(matches!(ts, Value::Int(n) if n != 0));
    assert_eq!(call(&registry, "Date.year", &[ts.clone()]), Value::Int(2001));
    assert_eq!(call(&registry, "Date.month", &[ts.clone()]), Value::Int(6));
    assert_eq!(call(&registry, "Date.day", &[ts.clone()]), Value::Int(15));
    assert_eq!(
        call(
            &registry,
            "Date.format",
            &[ts.clone(), Value::string("dd/MM/yyyy")]
        ),
        Value::string("15/06/2001")
    );
    assert_eq!(
        call(&registry, "Date.before", &[ts.clone(), Value::Int(i64::MAX)]),
        Value::Bool(true)
    );
    assert_eq!(
        call(&registry, "Date.after", &[ts, Value::Int(i64::MAX)]),
        Value::Bool(false)
    );
    assert_eq!(
        call(&registry, "Date.parse", &[Value::string("junk")]),
        Value::Int(0)
    );
}

#[test]
fn test_csv_parse() {
    let registry = Registry::standard();
    let parsed = call(
        &registry,
        "CSV.parse",
        &[Value::string("a,b\n1,2\n")],
    );
    assert_eq!(
        parsed,
        Value::Array(vec![
            Value::Array(vec![Value::string("a"), Value::string("b")]),
            Value::Array(vec![Value::string("1"), Value::string("2")]),
        ])
    );
}

#[test]
fn test_path_builtins() {
    let registry = Registry::standard();
    assert_eq!(
        call(
            &registry,
            "Path.join",
            &[Value::string("a"), Value::string("b"), Value::string("c")]
        ),
        Value::string("a/b/c")
    );
    assert_eq!(
        call(&registry, "Path.dirname", &[Value::string("a/b/c.txt")]),
        Value::string("a/b")
    );
    assert_eq!(
        call(&registry, "Path.basename", &[Value::string("a/b/c.txt")]),
        Value::string("c.txt")
    );
    assert_eq!(
        call(&registry, "Path.extension", &[Value::string("a/b/c.txt")]),
        Value::string(".txt")
    );
    assert_eq!(
        call(&registry, "Path.extension", &[Value::string("noext")]),
        Value::string("")
    );
}

#[test]
fn test_json_round_trip() {
    let registry = Registry::standard();

    let mut inner = IndexMap::new();
    inner.insert("name".to_string(), Value::string("omni"));
    inner.insert("version".to_string(), Value::Int(1));
    inner.insert("pi".to_string(), Value::Double(3.25));
    inner.insert("ok".to_string(), Value::Bool(true));
    inner.insert("nothing".to_string(), Value::Null);
    let value = Value::Array(vec![Value::Object(inner), Value::Int(2)]);

    let json = call(&registry, "Serializer.toJSON", &[value.clone()]);
    let back = call(&registry, "Serializer.fromJSON", &[json]);
    assert_eq!(back, value);
}

#[test]
fn test_json_from_malformed_is_null() {
    let registry = Registry::standard();
    assert_eq!(
        call(&registry, "Serializer.fromJSON", &[Value::string("{nope")]),
        Value::Null
    );
}

#[test]
fn test_file_and_binary_round_trip() {
    let registry = Registry::standard();
    let dir = std::env::temp_dir();
    let text_path = dir.join(format!("omni_builtins_{}.txt", std::process::id()));
    let bin_path = dir.join(format!("omni_builtins_{}.bin", std::process::id()));
    let text_path_v = Value::string(text_path.to_string_lossy());
    let bin_path_v = Value::string(bin_path.to_string_lossy());

    assert_eq!(
        call(
            &registry,
            "File.write",
            &[text_path_v.clone(), Value::string("line1\n")]
        ),
        Value::Bool(true)
    );
    assert_eq!(
        call(
            &registry,
            "File.append",
            &[text_path_v.clone(), Value::string("line2")]
        ),
        Value::Bool(true)
    );
    assert_eq!(
        call(&registry, "File.exists", &[text_path_v.clone()]),
        Value::Bool(true)
    );
    assert_eq!(
        call(&registry, "File.read", &[text_path_v.clone()]),
        Value::string("line1\nline2")
    );

    let mut map = IndexMap::new();
    map.insert("k".to_string(), Value::Array(vec![Value::Int(1)]));
    let value = Value::Object(map);
    assert_eq!(
        call(
            &registry,
            "Serializer.saveBinary",
            &[bin_path_v.clone(), value.clone()]
        ),
        Value::Bool(true)
    );
    assert_eq!(
        call(&registry, "Serializer.loadBinary", &[bin_path_v.clone()]),
        value
    );

    std::fs::remove_file(&text_path).ok();
    std::fs::remove_file(&bin_path).ok();
}

#[test]
fn test_missing_file_reads_empty() {
    let registry = Registry::standard();
    assert_eq!(
        call(
            &registry,
            "File.read",
            &[Value::string("/no/such/file/anywhere")]
        ),
        Value::string("")
    );
    assert_eq!(
        call(
            &registry,
            "File.exists",
            &[Value::string("/no/such/file/anywhere")]
        ),
        Value::Bool(false)
    );
}

#[test]
fn test_type_conversions() {
    let registry = Registry::standard();
    assert_eq!(
        call(&registry, "str", &[Value::Int(42)]),
        Value::string("42")
    );
    assert_eq!(
        call(&registry, "int", &[Value::string("12")]),
        Value::Int(12)
    );
    assert_eq!(
        call(&registry, "int", &[Value::Double(9.9)]),
        Value::Int(9)
    );
    assert_eq!(
        call(&registry, "float", &[Value::Int(2)]),
        Value::Double(2.0)
    );
    assert_eq!(
        call(&registry, "typeof", &[Value::string("x")]),
        Value::string("string")
    );
    assert_eq!(call(&registry, "typeof", &[Value::Null]), Value::string("null"));
    assert_eq!(
        call(&registry, "len", &[Value::Array(vec![Value::Int(1)])]),
        Value::Int(1)
    );
    assert_eq!(call(&registry, "len", &[Value::string("abc")]), Value::Int(3));
}

#[test]
fn test_dotted_builtins_reachable_from_programs() {
    let source = "\
def main():
    print(Math.sqrt(16))
    print(String.toUpperCase(\"hi\"))
    print(\"hello\".length())
    print(\"hello\".substring(1, 3))
";
    assert_eq!(
        run_output(source),
        "4.000000\nHI\n5\nel\n"
    );
}

#[test]
fn test_system_getenv() {
    let registry = Registry::standard();
    std::env::set_var("OMNI_TEST_ENV", "value");
    assert_eq!(
        call(&registry, "System.getenv", &[Value::string("OMNI_TEST_ENV")]),
        Value::string("value")
    );
    assert_eq!(
        call(
            &registry,
            "System.getenv",
            &[Value::string("OMNI_TEST_UNSET_ENV")]
        ),
        Value::string("")
    );
}
