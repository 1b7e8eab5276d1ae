use argh::FromArgs;
use cmdsh::Interpreter;
use log::debug;

#[derive(FromArgs)]
/// Line-oriented command interpreter with redirects, pipes, chains and history recall.
struct Args {
    #[argh(option, short = 'c')]
    /// run this command line instead of starting the prompt; may be repeated
    command: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args: Args = argh::from_env();

    cmdsh::ignore_interrupts()?;
    let mut shell = Interpreter::default();

    if args.command.is_empty() {
        return shell.repl();
    }

    let mut status = 0;
    for line in &args.command {
        status = shell.dispatch(line)?;
    }
    debug!("last status {status}");
    std::process::exit(status);
}
