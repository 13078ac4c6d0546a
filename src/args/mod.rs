//! CLI surface: the command line to run inside the translating pty.

use clap::Parser;

/// Run a program that speaks CP437 inside a UTF-8 terminal.
///
/// The command is executed in a pseudo-terminal. Its output is translated
/// from CP437 to the terminal's encoding and keyboard input is translated
/// back, so legacy box-drawing and block-graphics output renders correctly.
#[derive(Debug, Parser)]
#[command(name = "cp437", version, about)]
pub struct Args {
    /// Program to execute and its arguments.
    #[arg(
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "COMMAND"
    )]
    pub command: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::Args;
    use clap::Parser;

    #[test]
    fn requires_a_command() {
        let err = Args::try_parse_from(["cp437"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn passes_through_child_flags() {
        let args = Args::try_parse_from(["cp437", "nethack", "-d", "/tmp/dungeon"]).unwrap();
        assert_eq!(args.command, ["nethack", "-d", "/tmp/dungeon"]);
    }
}
