/*!
A simple CLI interface to the library.

# Use

```sh
otter_pl_cli [--option(=value)]* [file.pl]*
```

Each file is consulted in order, then a REPL reads `.`-terminated goals.
After a solution, `;` asks for the next and anything else moves on; `halt.` leaves.

## Options

No option is required. Of note:

- `--goal=G` runs one goal after consulting and exits without a REPL, for scripting.
- `--quiet` suppresses the banner.

For full documentation of the supported options, see the source of [config::parse_args].
*/

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use otter_pl::config::Config;
use otter_pl::context::Context;
use otter_pl::types::err::ErrorKind;

mod config;
use config::{parse_args, CliConfig};

/// Entrypoint to the CLI.
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let mut cfg = Config::default();
    let mut cli_options = CliConfig::default();

    let args: Vec<String> = std::env::args().collect();
    let files = parse_args(&args, &mut cfg, &mut cli_options);

    let mut ctx = Context::from_config(cfg);

    for file in &files {
        match ctx.consult_path(file) {
            Ok(()) => {
                if !cli_options.quiet {
                    println!("% consulted {file}");
                }
            }
            Err(ErrorKind::Halted(code)) => std::process::exit(code),
            Err(e) => {
                eprintln!("% error consulting {file}: {e}");
                std::process::exit(1);
            }
        }
    }

    if let Some(goal) = &cli_options.goal {
        let text = ensure_terminated(goal);
        match run_goal(&mut ctx, &text, true) {
            Ok(any) => std::process::exit(if any { 0 } else { 1 }),
            Err(code) => std::process::exit(code),
        }
    }

    if !cli_options.quiet {
        println!("otter_pl {}", env!("CARGO_PKG_VERSION"));
        println!("% type a goal ending with '.', or halt. to leave");
    }

    let mut rl = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("% failed to create line editor: {e}");
            std::process::exit(1);
        }
    };
    let history = ".otter_pl_history";
    let _ = rl.load_history(history);

    loop {
        let line = match rl.readline("?- ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("% error reading input: {e}");
                continue;
            }
        };

        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(text);

        if text == "halt." || text == "halt" {
            break;
        }

        let text = ensure_terminated(text);
        match enumerate(&mut ctx, &text, &mut rl) {
            Ok(()) => {}
            Err(code) => {
                let _ = rl.save_history(history);
                std::process::exit(code);
            }
        }
    }

    let _ = rl.save_history(history);
}

fn ensure_terminated(text: &str) -> String {
    let trimmed = text.trim();
    match trimmed.ends_with('.') {
        true => trimmed.to_string(),
        false => format!("{trimmed}."),
    }
}

/// Runs a goal to completion, printing solutions. [Err] carries an exit code.
fn run_goal(ctx: &mut Context, text: &str, print: bool) -> Result<bool, i32> {
    let solutions = match ctx.query(text) {
        Ok(solutions) => solutions,
        Err(ErrorKind::Halted(code)) => return Err(code),
        Err(e) => {
            eprintln!("% {e}");
            return Ok(false);
        }
    };

    let mut any = false;
    for solution in solutions {
        match solution {
            Ok(solution) => {
                any = true;
                if print {
                    for (name, value) in &solution {
                        println!("{name} = {value}");
                    }
                }
            }
            Err(ErrorKind::Halted(code)) => return Err(code),
            Err(e) => {
                eprintln!("% {e}");
                return Ok(any);
            }
        }
    }
    Ok(any)
}

/// Enumerates solutions interactively: `;` continues, anything else stops.
fn enumerate(ctx: &mut Context, text: &str, rl: &mut DefaultEditor) -> Result<(), i32> {
    let mut solutions = match ctx.query(text) {
        Ok(solutions) => solutions,
        Err(ErrorKind::Halted(code)) => return Err(code),
        Err(e) => {
            println!("% {e}");
            return Ok(());
        }
    };

    loop {
        match solutions.next() {
            None => {
                println!("false.");
                return Ok(());
            }

            Some(Err(ErrorKind::Halted(code))) => return Err(code),

            Some(Err(e)) => {
                println!("% {e}");
                return Ok(());
            }

            Some(Ok(solution)) => {
                if solution.is_empty() {
                    println!("true.");
                    return Ok(());
                }

                let rendered: Vec<String> = solution
                    .iter()
                    .map(|(name, value)| format!("{name} = {value}"))
                    .collect();
                print!("{}", rendered.join(",\n"));

                // A ';' asks for another solution.
                match rl.readline(" ") {
                    Ok(more) if more.trim() == ";" => continue,
                    Ok(_) => {
                        println!("true.");
                        return Ok(());
                    }
                    Err(_) => return Ok(()),
                }
            }
        }
    }
}
