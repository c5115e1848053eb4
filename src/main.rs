fn main() {
    let code = match linkready_lib::run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("linkready: {err:#}");
            2
        }
    };
    std::process::exit(code);
}
