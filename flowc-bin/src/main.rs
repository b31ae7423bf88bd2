use std::{
    fs,
    io::{self, BufWriter, Read, Write},
    path::PathBuf,
    process::ExitCode,
};

use anyhow::Context;
use clap::Parser;
use flowc::{lexer, util::fmt::tree, writer, Diagnostic, Session};
use log::{debug, LevelFilter};

#[derive(Debug, Parser)]
#[command(version, about = "Compiles structured scripts into flat assembly")]
struct Args {
    /// Source file to compile. Use `-` to read from stdin.
    input: PathBuf,

    /// Where to write the output. Defaults to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// What to produce.
    #[arg(long, value_enum, default_value_t = Emit::Asm)]
    emit: Emit,

    /// Log the compiler phases.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
#[clap(rename_all = "snake_case")]
enum Emit {
    /// Assembly source.
    Asm,
    /// The resolved syntax tree.
    Ast,
    /// The token stream.
    Tokens,
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let default_level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .init();

    let src = read_input(&args)?;
    debug!("read {} bytes", src.len());

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => {
            let file = fs::File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let mut session = Session::new();
    let result = match args.emit {
        Emit::Tokens => Ok(write_tokens(&mut out, &src)),
        Emit::Ast => flowc::parse(&src, &mut session)
            .map(|program| tree::print_program(&mut out, &program)),
        Emit::Asm => flowc::compile(&src, &mut session)
            .map(|units| writer::write_units(&mut out, &units)),
    };

    match result {
        Ok(written) => {
            written.context("failed to write output")?;
            out.flush().context("failed to write output")?;
            Ok(ExitCode::SUCCESS)
        }
        Err(diagnostics) => {
            report(&args, &diagnostics);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn read_input(args: &Args) -> anyhow::Result<String> {
    if args.input.as_os_str() == "-" {
        let mut src = String::new();
        io::stdin()
            .read_to_string(&mut src)
            .context("failed to read stdin")?;
        Ok(src)
    } else {
        fs::read_to_string(&args.input)
            .with_context(|| format!("failed to read {}", args.input.display()))
    }
}

fn write_tokens(w: &mut impl Write, src: &str) -> io::Result<()> {
    for token in lexer::lex_in_new(src) {
        if !token.kind.is_trivia() {
            writeln!(w, "{token:?} {:?}", lexer::extract::literal(token, src))?;
        }
    }
    Ok(())
}

fn report(args: &Args, diagnostics: &[Diagnostic]) {
    let name = args.input.display();
    for diagnostic in flowc::format_diagnostics(diagnostics) {
        eprintln!("{name}: {diagnostic}");
    }
    eprintln!("{name}: {} error(s), no output produced", diagnostics.len());
}
