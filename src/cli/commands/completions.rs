//! Shell completions generation command.
//!
//! # Usage
//!
//! ```bash
//! rpub completions bash > ~/.local/share/bash-completion/completions/rpub
//! rpub completions zsh -o ~/.zsh/completions/_rpub
//! ```

use crate::cli::{Cli, CompletionsArgs, ShellType};
use crate::error::Result;
use clap::CommandFactory;
use clap_complete::{Shell, generate};
use std::io;
use tracing::info;

const BIN_NAME: &str = "rpub";

/// Execute the completions command.
///
/// # Errors
///
/// Returns an error if the output file cannot be created.
pub fn execute(args: &CompletionsArgs) -> Result<()> {
    info!(shell = ?args.shell, output = ?args.output, "Generating shell completions");

    let mut cmd = Cli::command();
    let shell = convert_shell_type(args.shell);

    if let Some(output_path) = &args.output {
        let mut file = std::fs::File::create(output_path)?;
        generate(shell, &mut cmd, BIN_NAME, &mut file);
        eprintln!(
            "Generated {} completions to {}",
            shell_name(args.shell),
            output_path.display()
        );
        print_install_hint(args.shell);
    } else {
        generate(shell, &mut cmd, BIN_NAME, &mut io::stdout());
    }

    Ok(())
}

const fn convert_shell_type(shell: ShellType) -> Shell {
    match shell {
        ShellType::Bash => Shell::Bash,
        ShellType::Zsh => Shell::Zsh,
        ShellType::Fish => Shell::Fish,
        ShellType::PowerShell => Shell::PowerShell,
        ShellType::Elvish => Shell::Elvish,
    }
}

const fn shell_name(shell: ShellType) -> &'static str {
    match shell {
        ShellType::Bash => "bash",
        ShellType::Zsh => "zsh",
        ShellType::Fish => "fish",
        ShellType::PowerShell => "PowerShell",
        ShellType::Elvish => "elvish",
    }
}

fn print_install_hint(shell: ShellType) {
    let hint = match shell {
        ShellType::Bash => "Place the file in ~/.local/share/bash-completion/completions/",
        ShellType::Zsh => "Place the file in a directory on $fpath, then run: exec zsh",
        ShellType::Fish => "Place the file in ~/.config/fish/completions/",
        ShellType::PowerShell => "Dot-source the file from your $PROFILE",
        ShellType::Elvish => "Place the file in ~/.elvish/lib/ and add `use rpub` to rc.elv",
    };
    eprintln!("{hint}");
}
