fn main() {
    if let Err(e) = docwallet_lib::run() {
        eprintln!("docwallet: {e}");
        std::process::exit(1);
    }
}
