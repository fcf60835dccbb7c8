use clap::Parser as ClapParser;
use omni::cli::{generate_completions, Args, Commands};
use omni::diagnostic::render_diagnostics;
use omni::interpreter::{Interpreter, Parser};
use omni::lexer::Lexer;
use omni::token::TokenKind;
use omni::Program;
use owo_colors::OwoColorize;
use std::panic::{self, AssertUnwindSafe};

// Fallback program executed when no source file is given.
const DEMO_SOURCE: &str = r#"
def greet(name: String):
    print("Hello, " + name + "!")

def main():
    print("=== OmniLang Demo ===")
    greet("World")

    x = 10
    y = 20
    print("x + y =", x + y)

    if x < y:
        print("x is less than y")

    print("Math.sqrt(16) =", Math.sqrt(16))
    print("Math.pow(2, 10) =", Math.pow(2, 10))

    print("=== Done! ===")
"#;

fn main() {
    let args = Args::parse();

    if let Some(Commands::Complete { shell }) = args.command {
        generate_completions(shell);
        return;
    }

    let use_color = args.color.enabled();

    let source = match &args.file {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(_) => {
                error_message(
                    use_color,
                    &format!("Error: Cannot open file {}", path.display()),
                );
                std::process::exit(1);
            }
        },
        None => DEMO_SOURCE.to_string(),
    };

    // Lexing
    let mut lexer = Lexer::new(&source);
    let tokens = lexer.tokenize();
    eprint!(
        "{}",
        render_diagnostics(lexer.diagnostics(), use_color)
    );

    if args.tokens {
        println!("=== Tokens ===");
        let mut dump = String::new();
        for token in &tokens {
            if token.kind != TokenKind::Newline {
                dump.push_str(&format!("{}({}) ", token.kind.name(), token.text));
            }
        }
        println!("{}", dump.trim_end());
        return;
    }

    // Parsing; errors are reported but the surviving program still runs.
    let (program, parse_errors) = Parser::new(tokens).parse();
    eprint!("{}", render_diagnostics(&parse_errors, use_color));

    if args.ast {
        print_ast(&program);
        return;
    }

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        Interpreter::new().execute(&program)
    }));

    match outcome {
        Ok(Ok(_)) => {}
        Ok(Err(err)) => {
            error_message(use_color, &err.to_string());
            std::process::exit(1);
        }
        Err(payload) => {
            let detail = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unexpected panic".to_string());
            error_message(use_color, &format!("Internal Error: {}", detail));
            std::process::exit(1);
        }
    }
}

fn print_ast(program: &Program) {
    println!("=== Omni AST ===");

    for import in &program.imports {
        println!("[IMPORT] {}", import.module);
    }

    for class in &program.classes {
        print!("\n[CLASS] {}", class.name);
        if let Some(parent) = &class.parent {
            print!(" extends {}", parent);
        }
        println!();

        for field in &class.fields {
            println!("  [FIELD] {} {}", field.ty.name, field.name);
        }
        if class.constructor.is_some() {
            println!("  [CONSTRUCTOR] __init__");
        }
        for method in &class.methods {
            println!("  [METHOD] {}()", method.name);
        }
    }

    for interface in &program.interfaces {
        println!("\n[INTERFACE] {}", interface.name);
        for method in &interface.methods {
            println!("  [METHOD] {}()", method.name);
        }
    }

    for func in &program.functions {
        let params: Vec<String> = func
            .args
            .iter()
            .map(|arg| {
                if arg.ty.name.is_empty() || arg.ty.name == "self" {
                    arg.name.clone()
                } else {
                    format!("{}: {}", arg.name, arg.ty.name)
                }
            })
            .collect();
        println!(
            "\n[FUNCTION] {}({}) -> {}",
            func.name,
            params.join(", "),
            func.return_type.name
        );
    }
}

fn error_message(use_color: bool, message: &str) {
    if use_color {
        eprintln!("{}", message.red().bold());
    } else {
        eprintln!("{}", message);
    }
}
