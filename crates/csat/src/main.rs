#![forbid(unsafe_code)]

fn main() {
    if let Err(error) = csat::run_from_env() {
        eprintln!("csat: {error}");
        std::process::exit(error.exit_code());
    }
}
