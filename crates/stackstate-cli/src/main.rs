use std::process::ExitCode;

fn main() -> ExitCode {
    stackstate_cli::init_tracing();
    let matches = stackstate_cli::command().get_matches();

    let mut stdout = std::io::stdout().lock();
    match stackstate_cli::run(&matches, &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", stackstate_cli::render::report(&err));
            ExitCode::FAILURE
        }
    }
}
