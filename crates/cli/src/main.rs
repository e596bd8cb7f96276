use std::process::ExitCode;

fn main() -> ExitCode {
    propfair_cli::run()
}
