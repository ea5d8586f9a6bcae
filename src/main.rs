use std::process::ExitCode;

fn main() -> ExitCode {
    match time_dilation::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("tdil: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
