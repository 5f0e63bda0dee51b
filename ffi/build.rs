use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=src/types.rs");

    let (Ok(crate_dir), Ok(out_dir)) = (env::var("CARGO_MANIFEST_DIR"), env::var("OUT_DIR")) else {
        println!("cargo:warning=cbindgen skipped: cargo build environment not set");
        return;
    };
    let header = PathBuf::from(out_dir).join("ocr_ffi.h");
    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("OCR_FFI_H")
        .generate()
    {
        Ok(bindings) => {
            bindings.write_to_file(&header);
            println!("cargo:rustc-env=OCR_FFI_HEADER={}", header.display());
        }
        Err(e) => println!("cargo:warning=cbindgen failed: {e}"),
    }
}
