use bolt::analyze;
use bolt::compiler::syntax::ast::ty::Type;
use helper::{test_error, test_with};
use indoc::indoc;

mod helper;

#[test]
fn test_minimal() {
    test_with("minimal");
}

#[test]
fn test_hello_world() {
    test_with("hello_world");
}

#[test]
fn test_arithmetic() {
    test_with("arithmetic");
}

#[test]
fn test_functions() {
    test_with("functions");
}

#[test]
fn test_lexical_error() {
    test_error(
        indoc! {"
            func main = () => {
                return 1 $ 2
            }
        "},
        "Unexpected character '$' (2:14)",
    );
}

#[test]
fn test_type_error() {
    test_error(
        indoc! {"
            number a = 1
            bool b = true
            number c = a + b
        "},
        "Cannot use the '+' operator on a number and boolean (3:14)",
    );
}

#[test]
fn test_undefined_variable() {
    test_error(
        indoc! {"
            func main = () => {
                return y
            }
        "},
        "The variable 'y' is undefined (2:12)",
    );
}

#[test]
fn test_missing_main() {
    test_error("number a = 1", "No main function was declared");
}

#[test]
fn test_unlowered_statement() {
    test_error(
        indoc! {"
            func main = () => {
                while true { }
            }
        "},
        "WhileLoop has not been implemented yet (2:5)",
    );
}

#[test]
fn test_analyze_types_every_statement() {
    let ast = analyze(indoc! {"
        number total = 1 + 2
        string name = \"bolt\"
        func check = (number n) => {
            return n > total
        }
    "})
    .unwrap();
    let types = ast
        .program()
        .scope
        .body
        .iter()
        .map(|&statement| ast.node(statement).ty)
        .collect::<Vec<_>>();
    assert_eq!(types, [Type::Number, Type::String, Type::Function]);
    let dump = ast.to_string();
    assert!(dump.contains("BinaryOperation"));
    assert!(dump.contains("FunctionLiteral"));
}
