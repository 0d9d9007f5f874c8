use std::io;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use color_print::cprintln;
use tracing::Level;

use ppemu::hooks::{clock::Clock, dump::Dump, intr::Intr, midi::Midi, Hook};
use ppemu::Vm;

#[derive(Parser, Debug)]
#[clap(version, about = "Emulator for the PENPAL toy architecture")]
struct Args {
    /// Stop after this many ticks
    #[arg(short = 't', long)]
    tmax: Option<u64>,

    /// Ticks per second, used to derive the clock interrupt interval
    #[arg(long, default_value_t = 1000)]
    hz: u64,

    /// Sleep between ticks to run at `--hz`
    #[arg(long)]
    realtime: bool,

    #[arg(short, long)]
    dump_cfg: Option<String>,

    #[arg(short = 'a', long)]
    dump_all: bool,

    #[arg(short, long)]
    intr_cfg: Option<String>,

    /// Seed for `rand`
    #[arg(long)]
    seed: Option<u64>,

    /// One of `TRACE`, `DEBUG`, `INFO`, `WARN`, or `ERROR`
    #[arg(short, long, default_value_t = Level::WARN)]
    log_level: Level,

    #[arg(default_value = "main.pp.bin")]
    input_file: String,
}

fn main() -> ExitCode {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_writer(io::stderr)
        .init();
    println!("PENPAL Emulator");

    println!("+-----------------------------------------------+");
    println!("| {:<45} |", args.input_file);
    println!("+-----------------------------------------------+");

    // ------------------------------------------------------------------------
    // Initialize virtual machine
    let mut vm = match args.seed {
        Some(seed) => Vm::with_seed(seed),
        None => Vm::new(),
    };
    let bytes = match std::fs::read(&args.input_file) {
        Ok(bytes) => bytes,
        Err(e) => {
            cprintln!("<red,bold>error</>: Failed to open file: {}: {}", args.input_file, e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = vm.load(&bytes) {
        cprintln!("<red,bold>error</>: {}", e);
        return ExitCode::FAILURE;
    }

    // ------------------------------------------------------------------------
    // Initialize hooks
    println!("[INIT]");
    let mut hooks = match init_hooks(&args) {
        Ok(hooks) => hooks,
        Err(e) => {
            cprintln!("<red,bold>error</>: {}", e);
            return ExitCode::FAILURE;
        }
    };
    vm = hooks.iter_mut().fold(vm, |vm, hook| hook.init(vm));

    // ------------------------------------------------------------------------
    // Main loop
    let period = Duration::from_secs_f64(1.0 / args.hz.max(1) as f64);
    let mut deadline = Instant::now();
    for time in 0..args.tmax.unwrap_or(u64::MAX) {
        // Execute instruction
        let step = match vm.tick() {
            Ok(step) => step,
            Err(fault) => {
                cprintln!("<red,bold>fault</>: [{:0>6}] {}", time, fault);
                return ExitCode::FAILURE;
            }
        };
        // Execute side effects
        vm = hooks
            .iter_mut()
            .fold(vm, |vm, hook| hook.exec(time, step, vm));
        if vm.is_halted() {
            cprintln!("<bold>halt</> @{:0>4X} after {} ticks", step.addr, time + 1);
            break;
        }
        if args.realtime {
            deadline += period;
            std::thread::sleep(deadline.saturating_duration_since(Instant::now()));
        }
    }

    // Exit
    println!("=================================================");
    ExitCode::SUCCESS
}

fn init_hooks(args: &Args) -> Result<Vec<Box<dyn Hook>>, ppemu::hooks::ConfigError> {
    let hooks: Vec<Box<dyn Hook>> = vec![
        Box::new(Dump::arg(args.dump_cfg.clone(), args.dump_all)?),
        Box::new(Intr::arg(args.intr_cfg.clone())?),
        Box::new(Clock::new(args.hz)),
        Box::new(Midi::new()),
    ];
    Ok(hooks)
}
