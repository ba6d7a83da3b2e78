fn main() {
    if let Err(err) = csv_scout::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
