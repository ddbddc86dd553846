use jon_core::check;

fn main() {
    let jon_data = r#"
        // Users are written without quotes where possible.
        user: {
            name: "John Doe",
            email: john.doe@example.com
            age: 0x2A
        }
    "#;

    let schema = r#"
        type: object
        props: {
            user: {
                type: object
                props: {
                    name: { type: string, minLen: 1 }
                    email: { type: string, minLen: 3 }
                    age: { type: int, mini: 0, maxi: 150 }
                }
            }
        }
    "#;

    match jon_core::parse(jon_data) {
        Ok(value) => match value.to_json_pretty() {
            Ok(json_output) => println!("Successfully parsed jon to JSON:\n{json_output}"),
            Err(e) => eprintln!("Failed to serialize: {e}"),
        },
        Err(e) => {
            eprintln!("Failed to parse jon: {:?}", miette::Report::new(e));
            return;
        }
    }

    match check(jon_data, schema) {
        Ok(result) if result.is_ok() => println!("Document matches its schema."),
        Ok(result) => print!("Schema violations:\n{result}"),
        Err(e) => eprintln!("{}", e.render()),
    }
}
