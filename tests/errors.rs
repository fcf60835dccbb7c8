//! Exceptions, propagation and finally semantics.

mod common;

use common::{run_error, run_output};

#[test]
fn test_uncaught_throw_carries_message_and_line() {
    let err = run_error("def main():\n    x = 1\n    throw \"bad state\"\n");
    assert_eq!(err.message, "bad state");
    assert_eq!(err.line, 3);
    assert_eq!(
        err.to_string(),
        "Runtime Error at line 3: bad state"
    );
}

#[test]
fn test_catch_binds_message_string() {
    let source = "\
def main():
    try:
        throw \"kaput\"
    catch Exception as e:
        print(typeof(e))
        print(e)
";
    assert_eq!(run_output(source), "string\nkaput\n");
}

#[test]
fn test_thrown_value_is_stringified() {
    let source = "\
def main():
    try:
        throw 42
    catch Exception as e:
        print(e)
";
    assert_eq!(run_output(source), "42\n");
}

#[test]
fn test_exception_unwinds_through_calls() {
    let source = "\
def inner():
    throw \"deep\"

def outer():
    inner()
    print(\"unreached\")

def main():
    try:
        outer()
    catch Exception as e:
        print(\"caught \" + e)
";
    assert_eq!(run_output(source), "caught deep\n");
}

#[test]
fn test_unknown_function_is_catchable() {
    let source = "\
def main():
    try:
        nosuch()
    catch Exception as e:
        print(e)
";
    assert_eq!(run_output(source), "Unknown function: nosuch\n");
}

#[test]
fn test_finally_runs_without_exception() {
    let source = "\
def main():
    try:
        print(\"work\")
    catch Exception as e:
        print(\"caught\")
    finally:
        print(\"cleanup\")
";
    assert_eq!(run_output(source), "work\ncleanup\n");
}

#[test]
fn test_finally_runs_when_try_returns() {
    let source = "\
def f():
    try:
        return 1
    catch Exception as e:
        return 2
    finally:
        print(\"fin\")

def main():
    print(f())
";
    assert_eq!(run_output(source), "fin\n1\n");
}

#[test]
fn test_finally_runs_when_catch_rethrows() {
    let source = "\
def main():
    try:
        try:
            throw \"first\"
        catch Exception as e:
            throw \"second\"
        finally:
            print(\"fin\")
    catch Exception as e:
        print(e)
";
    assert_eq!(run_output(source), "fin\nsecond\n");
}

#[test]
fn test_catch_scope_is_discarded_afterwards() {
    let source = "\
def main():
    try:
        throw \"x\"
    catch Exception as err:
        print(err)
    print(err)
";
    // The catch binding lives only inside the catch scope.
    assert_eq!(run_output(source), "x\nnull\n");
}

#[test]
fn test_nested_try_rethrow_to_outer() {
    let source = "\
def main():
    try:
        try:
            throw \"inner\"
        catch Exception as e:
            print(\"inner caught\")
            throw e + \" again\"
    catch Exception as e:
        print(e)
";
    assert_eq!(run_output(source), "inner caught\ninner again\n");
}

#[test]
fn test_execution_continues_after_handled_exception() {
    let source = "\
def risky(n):
    if n == 1:
        throw \"one\"
    return n

def main():
    for i in range(3):
        try:
            print(risky(i))
        catch Exception as e:
            print(\"skip \" + e)
";
    assert_eq!(run_output(source), "0\nskip one\n2\n");
}
