//! `chameleonc` — command line driver for the chameleon compiler: reads a
//! grammar description file, normalizes it, and emits a C header/source pair.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as ClapParser;
use colored::Colorize;

use chameleon_compiler::emit::{CodeEmitter, EmitOptions};
use chameleon_compiler::{load_grammar_file, normalize};

/// Command line arguments accepted by the compiler.
#[derive(Clone, PartialEq, Eq, ClapParser)]
#[command(version, about)]
struct Args {
    /// grammar description file, in the JSON format documented alongside
    /// this tool
    input: PathBuf,
    /// directory the generated `<prefix>.h`/`<prefix>.c` are written to
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,
    /// prefix prepended to every emitted symbol name
    #[arg(short, long, default_value = "chameleon")]
    prefix: String,
    /// bake a thread-local PRNG state into the emitted module
    #[arg(long)]
    thread_safe: bool,
    /// export the ABI functions with default visibility
    #[arg(long)]
    visible: bool,
    /// default PRNG seed baked into the emitted module (0 picks the
    /// compiler's own default)
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// skip emitting the `_parse` entry point
    #[arg(long)]
    no_parse: bool,
    /// display messages that aid in tracing the compilation process
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();

    if args.verbose {
        println!("reading grammar from {:?}", &args.input);
    }

    let grammar = match load_grammar_file(&args.input) {
        Ok(grammar) => grammar,
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red(), e);
            return ExitCode::FAILURE;
        }
    };

    let (normalized, warnings) = match normalize(&grammar) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red(), e);
            return ExitCode::FAILURE;
        }
    };

    for warning in &warnings {
        eprintln!("{} {}", "[WARN]".yellow(), warning);
    }

    if args.verbose {
        println!(
            "{} non-terminal(s), step type {:?}, {} max rule(s) per non-terminal",
            normalized.rule_sets().len(),
            normalized.step_type(),
            normalized.max_num_of_rules()
        );
    }

    let options = EmitOptions {
        prefix: args.prefix.clone(),
        thread_safe: args.thread_safe,
        visible: args.visible,
        seed: if args.seed == 0 { EmitOptions::default().seed } else { args.seed },
        emit_parse: !args.no_parse,
    };

    let module = match CodeEmitter::emit(&normalized, &options) {
        Ok(module) => module,
        Err(e) => {
            eprintln!("{} failed to render output: {}", "[ERROR]".red(), e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = fs::create_dir_all(&args.out_dir) {
        eprintln!("{} {}", "[ERROR]".red(), e);
        return ExitCode::FAILURE;
    }

    let header_path = args.out_dir.join(format!("{}.h", args.prefix));
    let source_path = args.out_dir.join(format!("{}.c", args.prefix));

    if let Err(e) = fs::write(&header_path, &module.header) {
        eprintln!("{} {}", "[ERROR]".red(), e);
        return ExitCode::FAILURE;
    }
    if let Err(e) = fs::write(&source_path, &module.source) {
        eprintln!("{} {}", "[ERROR]".red(), e);
        return ExitCode::FAILURE;
    }

    println!(
        "{} wrote {} and {}",
        "[OK]".green(),
        header_path.display(),
        source_path.display()
    );

    ExitCode::SUCCESS
}
