fn main() {
    if let Err(err) = price_lists::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
