use otter_pl::config::Config;

/// Options which concern the CLI rather than the interpreter.
#[derive(Default)]
pub struct CliConfig {
    /// Suppress the banner and solution chrome.
    pub quiet: bool,

    /// A goal to run instead of entering the REPL.
    pub goal: Option<String>,
}

/// Parse CLI arguments into a [Config] and a [CliConfig], leaving file paths untouched.
///
/// If an unrecognised argument or invalid option is found a message is sent and the process is terminated.
pub fn parse_args(args: &[String], cfg: &mut Config, cli_options: &mut CliConfig) -> Vec<String> {
    let mut files = Vec::default();

    'arg_examination: for arg in args.iter().skip(1) {
        if !arg.starts_with("--") {
            files.push(arg.clone());
            continue 'arg_examination;
        }

        let mut split = arg.split('=');
        match split.next() {
            Some("--quiet") => {
                cli_options.quiet = true;
            }

            Some("--goal") => match split.next() {
                Some(goal) if !goal.is_empty() => {
                    cli_options.goal = Some(goal.to_string());
                }
                _ => {
                    println!("goal requires a value, e.g. --goal=main");
                    std::process::exit(1);
                }
            },

            // The remaining cases follow a common template.
            // If a value is present, may be parsed appropriately, and is valid, the config is updated.
            // Otherwise, a message is sent.
            //
            // Further, the cases should be in lexicographic order.
            //
            Some("--depth_limit") => {
                let (min, max) = cfg.depth_limit.min_max();

                if let Some(request) = split.next() {
                    if let Ok(value) = request.parse::<usize>() {
                        if min <= value && value <= max {
                            println!("% depth_limit set to: {value}");
                            cfg.depth_limit.value = value;
                            continue 'arg_examination;
                        }
                    }
                }

                println!("depth_limit requires a value between {min} and {max}");
                std::process::exit(1);
            }

            Some("--occurs_check") => {
                println!("% unification will check occurrence");
                cfg.occurs_check.value = true;
            }

            Some("--seed") => {
                if let Some(request) = split.next() {
                    if let Ok(value) = request.parse::<u64>() {
                        println!("% seed set to: {value}");
                        cfg.rng_seed.value = value;
                        continue 'arg_examination;
                    }
                }

                println!("seed requires an unsigned integer value");
                std::process::exit(1);
            }

            _ => {
                println!("unrecognised argument: {arg}");
                std::process::exit(1);
            }
        }
    }

    files
}
