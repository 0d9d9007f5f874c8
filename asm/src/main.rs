use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use arch::program::INTERRUPT_VECTORS;
use color_print::cprintln;
use ppasm::include::{FsLoader, Resolver};
use ppasm::sysinc::SYSTEM_INCLUDES;
use ppasm::{assemble_tokens, util, Config, Error};
use tracing::Level;

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, clap::Parser)]
#[clap(version, about, help_template = HELP_TEMPLATE)]
struct Args {
    /// Input file
    #[clap(default_value = "main.pp")]
    input: String,

    /// Output file
    #[clap(short, long, default_value = "main.pp.bin")]
    output: String,

    /// Dump assembly listing
    #[clap(short, long)]
    dump: bool,

    /// Prepend the PENPAL header
    #[clap(long)]
    header: bool,

    /// Do not emit the entry/interrupt vector table
    #[clap(long)]
    no_vectors: bool,

    /// Interrupt handler labels, in vector order (up to 3)
    #[clap(long = "irq", default_value = "on_tick")]
    irq: Vec<String>,

    /// Search directories for included files
    #[clap(short = 'I', long)]
    include_dir: Vec<PathBuf>,

    /// One of `TRACE`, `DEBUG`, `INFO`, `WARN`, or `ERROR`
    #[clap(short, long, default_value_t = Level::WARN)]
    log_level: Level,
}

fn main() -> ExitCode {
    use clap::Parser;

    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_writer(io::stderr)
        .init();
    println!("PENPAL Assembler");

    let mut dirs = args.include_dir.clone();
    if let Some(parent) = Path::new(&args.input).parent() {
        dirs.push(parent.to_path_buf());
    }
    let loader = FsLoader::new(dirs);
    let mut resolver = Resolver::new(&loader, &SYSTEM_INCLUDES);

    match run(&args, &mut resolver) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            err.print_diag(resolver.sources());
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args, resolver: &mut Resolver) -> Result<(), Error> {
    println!("1. Read Files and Resolve Includes");
    println!("  < {}", args.input);
    let code = std::fs::read_to_string(&args.input)
        .map_err(|e| Error::FileOpen(args.input.clone(), e))?;
    let tokens = resolver.resolve_source(&args.input, &code)?;
    for name in resolver.sources().keys().skip(1) {
        println!("  < {}", name);
    }

    if args.irq.len() > INTERRUPT_VECTORS {
        cprintln!(
            "<yellow,bold>warning</>: only {} interrupt vectors, ignoring {:?}",
            INTERRUPT_VECTORS,
            &args.irq[INTERRUPT_VECTORS..]
        );
    }
    let config = Config {
        vectors: !args.no_vectors,
        header: args.header,
        interrupts: std::array::from_fn(|i| args.irq.get(i).cloned()),
    };

    println!("2. Resolve Labels and Generate Binary");
    let assembly = assemble_tokens(&tokens, &config)?;
    println!("  > {}", args.output);
    std::fs::write(&args.output, assembly.to_bytes())
        .map_err(|e| Error::FileWrite(args.output.clone(), e))?;

    if args.dump {
        util::print_dump(&assembly);
    }
    Ok(())
}
