fn main() -> std::process::ExitCode {
    scanner_pdf_lib::run()
}
