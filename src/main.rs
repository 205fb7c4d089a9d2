use mini_shell::Interpreter;
use mini_shell::builtin::Builtins;
use mini_shell::config::Cli;
use mini_shell::io_adapters::{EditorLines, PlainLines};
use std::io::{self, IsTerminal};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli: Cli = argh::from_env();
    let mut shell = Interpreter::new(Builtins::default(), cli.settings());

    let result = if cli.no_editor || !io::stdin().is_terminal() {
        shell.repl(&mut PlainLines::new(io::stdin().lock()), &mut io::stdout())
    } else {
        EditorLines::new().and_then(|mut editor| shell.repl(&mut editor, &mut io::stdout()))
    };

    if let Err(err) = result {
        log::error!("{err:#}");
        std::process::exit(1);
    }
}
