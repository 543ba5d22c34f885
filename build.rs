fn main() {
    println!("cargo:rustc-env=APP_VERSION={}", env!("CARGO_PKG_VERSION"));
}
