use std::fs;
use std::process;

use owo_colors::OwoColorize;

use verve::bytecode::{disassemble, Generator};
use verve::lexer::Token;
use verve::parser::Parser;
use verve::types::{self, Environment};
use verve::vm::Vm;

enum Mode {
    Run,
    Dump,
    Compile(String),
}

fn usage() -> ! {
    eprintln!("usage: verve <file> | verve -d <file> | verve -c <file> <out>");
    process::exit(64);
}

fn parse_args(args: &[String]) -> (Mode, String) {
    match args {
        [_, file] => (Mode::Run, file.clone()),
        [_, flag, file] if flag.as_str() == "-d" => (Mode::Dump, file.clone()),
        [_, flag, file, out] if flag.as_str() == "-c" => (Mode::Compile(out.clone()), file.clone()),
        _ => usage(),
    }
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let (mode, path) = parse_args(&args);

    let source = match fs::read_to_string(&path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!(
                "{}: {}",
                "error".red().bold(),
                format!("Failed to read {}: {}", path, e).red()
            );
            process::exit(1);
        }
    };

    let tokens = match Token::lex(&source) {
        Ok(tokens) => tokens,
        Err(e) => {
            eprintln!("{}: {}", "Lex Error".red().bold(), e);
            process::exit(1);
        }
    };

    let mut parser = Parser::new(tokens);
    let mut program = match parser.parse_program() {
        Ok(program) => program,
        Err(e) => {
            eprintln!("{}: {}", "Parse Error".red().bold(), e.message.red());
            if let Some(span) = &e.span {
                if !span.source.is_empty() {
                    eprintln!("{}", span.to_string(&e.message));
                }
            }
            process::exit(1);
        }
    };

    let mut env = Environment::global();
    if let Err(e) = types::check(&mut program, &mut env) {
        eprintln!("{}: {}", "Type Error".red().bold(), e.message().red());
        if !e.span().source.is_empty() {
            eprintln!("{}", e.span().to_string(&e.message()));
        }
        process::exit(1);
    }

    let mut generator = Generator::new();
    let bytecode = match generator.generate(&program) {
        Ok(bytecode) => bytecode,
        Err(e) => {
            eprintln!("{}: {}", "Codegen Error".red().bold(), e.message.red());
            process::exit(1);
        }
    };

    match mode {
        Mode::Dump => {
            print!("{}", disassemble(&bytecode));
        }
        Mode::Compile(out) => {
            let serialized = serde_json::to_string_pretty(&bytecode)?;
            fs::write(&out, serialized)?;
        }
        Mode::Run => {
            let mut vm = Vm::new();
            if let Err(e) = vm.run(&bytecode) {
                eprintln!("{}: {}", "Runtime Error".red().bold(), e.message.red());
                process::exit(1);
            }
        }
    }

    Ok(())
}
