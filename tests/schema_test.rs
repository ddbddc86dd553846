// Validator scenarios through the public API
use jon_core::{check, parse, validate, Schema, SchemaError, ValueType};

#[test]
fn test_int_range_schema() {
    let schema = "{type:int, mini:0, maxi:10}";

    assert!(check("5", schema).unwrap().is_ok());

    let low = check("-1", schema).unwrap();
    assert_eq!(low.len(), 1);
    assert_eq!(low.violations()[0].path, "$");

    let high = check("11", schema).unwrap();
    assert_eq!(high.len(), 1);
    assert_eq!(high.violations()[0].message, "value 11 is greater than maximum 10");
}

#[test]
fn test_array_of_objects_reports_nested_path() {
    let result = check(
        r#"[{x: 1}, {x: "a"}]"#,
        "{type:array, items:{type:object, props:{x:{type:int}}}}",
    )
    .unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result.violations()[0].path, "$[1].x");
}

#[test]
fn test_nullable_ignores_other_constraints() {
    let schema = "{ type: string, nullable: true, minLen: 100 }";
    assert!(check("null", schema).unwrap().is_ok());
    assert!(check("short", schema).unwrap().is_err());
}

#[test]
fn test_config_document() {
    let schema = r#"
        type: object
        props: {
            server: {
                type: object
                props: {
                    host: { type: string, minLen: 1 }
                    port: { type: int, mini: 1, maxi: 65535 }
                }
            }
            workers: { type: int, mini: 1 }
            ratio: { type: float, minf: 0, maxf: 1 }
            users: {
                type: array
                maxSize: 2
                items: {
                    type: object
                    props: {
                        name: { type: string }
                        admin: { type: bool }
                    }
                }
            }
        }
    "#;

    let valid = r#"
        server: { host: localhost, port: 8080 }
        workers: 4
        ratio: 0.5
        users: [
            { name: ann, admin: true }
        ]
    "#;
    let result = check(valid, schema).unwrap();
    assert!(result.is_ok(), "unexpected violations:\n{result}");

    let invalid = r#"
        server: { host: '', port: 70000 }
        workers: 0
        ratio: 1
        users: [
            { name: ann, admin: yes }
            { name: bob }
            { name: cid, admin: false, email: 'c@example.com' }
        ]
    "#;
    let result = check(invalid, schema).unwrap();
    assert_eq!(
        result.errors(),
        vec![
            "$.server.host: length 0 is less than minimum length 1",
            "$.server.port: value 70000 is greater than maximum 65535",
            "$.workers: value 0 is less than minimum 1",
            "$.ratio: expected float, got int",
            "$.users: size 3 is greater than maximum size 2",
            "$.users[0].admin: expected bool, got string",
            "$.users[1]: missing property `admin`",
            "$.users[2]: unknown property `email`",
        ]
    );
}

#[test]
fn test_compiled_schema_is_reusable() {
    let schema = Schema::from_value(&parse("{ type: array, items: { type: int } }").unwrap()).unwrap();
    assert_eq!(schema.value_type(), ValueType::Array);

    for (source, violations) in [("[1, 2]", 0), ("[a, 2, b]", 2), ("{}", 1)] {
        let result = schema.validate(&parse(source).unwrap());
        assert_eq!(result.len(), violations, "{source}: {result}");
    }
}

#[test]
fn test_invalid_schema_is_an_error() {
    let err = validate(
        &parse("1").unwrap(),
        &parse("{ type: object, props: { a: 1 } }").unwrap(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        SchemaError::NotAnObject {
            path: "$.props.a".to_string(),
            found: ValueType::Int
        }
    );
    assert_eq!(
        err.to_string(),
        "Schema node at $.props.a must be an object, got int"
    );
}
