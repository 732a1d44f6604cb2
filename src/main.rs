use std::fs;
use std::process;

use clap::{Parser, Subcommand};

use micro_c::error::{CompileError, render_caret};
use micro_c::parser;

#[derive(Parser)]
#[command(name = "micro-c")]
#[command(about = "Frontend for a minimal C-like language", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Распарсить исходник и показать ast
    Parse {
        /// Исходник
        input: String,

        /// Показать и поток токенов
        #[arg(long)]
        show_tokens: bool,
    },

    /// Показать только поток токенов
    Tokens {
        /// Исходник
        input: String,
    },
}

fn main() -> Result<(), CompileError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { input, show_tokens } => {
            println!("Parsing {}...", input);

            let source = fs::read_to_string(&input)?;

            if show_tokens {
                println!("=== TOKENS ===");
                match parser::lexer::tokenize(&source) {
                    Ok(tokens) => {
                        for token in &tokens {
                            println!("{:?}", token);
                        }
                    }
                    Err(e) => report_and_exit(&source, &e),
                }
            }

            match parser::parse(&source) {
                Ok(program) => {
                    println!("=== AST ===");
                    println!("{:#?}", program.statements);
                    println!("Stack frame: {} bytes", program.stack_size);
                }
                Err(e) => report_and_exit(&source, &e),
            }
        }
        Commands::Tokens { input } => {
            let source = fs::read_to_string(&input)?;

            match parser::lexer::tokenize(&source) {
                Ok(tokens) => {
                    for token in &tokens {
                        println!("{:?}", token);
                    }
                }
                Err(e) => report_and_exit(&source, &e),
            }
        }
    }

    Ok(())
}

/// Печатает ошибку с кареткой под позицией в исходнике и завершает процесс
fn report_and_exit(source: &str, err: &CompileError) -> ! {
    eprintln!("Error: {}", err);
    if let Some(pos) = err.position() {
        eprintln!("{}", render_caret(source, pos));
    }
    process::exit(1);
}
