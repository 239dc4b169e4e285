#![forbid(unsafe_code)]

fn main() -> std::process::ExitCode {
    bids_sidecar_cli::main_entry()
}
