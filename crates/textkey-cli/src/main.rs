fn main() {
    textkey_cli::run_main();
}
