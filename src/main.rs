use std::io::{self, Write};

use clap::Parser;
use vshell::interpreter::Outcome;
use vshell::shell::{Shell, ShellOptions};

#[derive(Parser)]
#[command(name = "vshell")]
#[command(about = "An interactive shell over an archive-backed virtual filesystem")]
#[command(version)]
struct Cli {
    /// Tar or tar.gz archive that seeds the virtual filesystem
    archive: String,

    /// JSON file the command log is written to
    log_file: String,

    /// Startup script executed before the prompt appears
    script: Option<String>,

    /// Username shown in the prompt
    #[arg(long, default_value = "user")]
    user: String,
}

fn main() {
    let cli = Cli::parse();

    let mut shell = match Shell::from_archive(
        &cli.archive,
        &cli.log_file,
        ShellOptions {
            username: cli.user,
            ..Default::default()
        },
    ) {
        Ok(shell) => shell,
        Err(e) => {
            eprintln!("vshell: {}", e);
            std::process::exit(1);
        }
    };

    if let Some(ref script_path) = cli.script {
        let script = match std::fs::read_to_string(script_path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("vshell: cannot read startup script: {}: {}", script_path, e);
                std::process::exit(1);
            }
        };
        match shell.run_script(&script) {
            Ok(run) => {
                for output in &run.outputs {
                    if !output.is_empty() {
                        println!("{}", output);
                    }
                }
                if run.exited {
                    return;
                }
            }
            Err(e) => {
                eprintln!("vshell: {}", e);
                std::process::exit(1);
            }
        }
    }

    repl(&mut shell);
}

/// Prompt, read a line, answer, repeat. EOF or `exit` ends the session.
fn repl(shell: &mut Shell) {
    let stdin = io::stdin();
    let mut line = String::new();

    loop {
        print!("{}", shell.prompt());
        if io::stdout().flush().is_err() {
            break;
        }

        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }

        match shell.submit(line.trim()) {
            Ok(Some(Outcome::Output(text))) => {
                if !text.is_empty() {
                    println!("{}", text);
                }
            }
            Ok(Some(Outcome::Exit)) => break,
            Ok(None) => {}
            Err(e) => {
                eprintln!("vshell: {}", e);
                std::process::exit(1);
            }
        }
    }
}
