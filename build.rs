use std::env;
use std::fs;
use std::path::Path;

fn main() {
    println!("cargo:rerun-if-changed=src/");
    println!("cargo:rerun-if-changed=build.rs");

    // The Thumb delay routine is only cycle-exact on ARMv7-M cores.
    println!("cargo:rustc-check-cfg=cfg(rdi_cycle_exact)");
    let target = env::var("TARGET").unwrap_or_default();
    if is_armv7m(&target) {
        println!("cargo:rustc-cfg=rdi_cycle_exact");
    }

    // The C header only matters to firmware linking the staticlib.
    if env::var_os("CARGO_FEATURE_FFI").is_none() {
        return;
    }

    let crate_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    let bindings = match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("RDI_H")
        .generate()
    {
        Ok(bindings) => bindings,
        Err(e) => {
            println!("cargo:warning=cbindgen generation failed: {}", e);
            return;
        }
    };

    let header_path = Path::new(&crate_dir).join("include/rdi.h");
    if let Some(parent) = header_path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            println!("cargo:warning=Failed to create include/ directory: {}", e);
        }
    }

    if !bindings.write_to_file(&header_path) {
        println!("cargo:warning=rdi.h unchanged");
    }
}

/// ARMv7-M: Thumb-2 only. Cortex-M7 shares the triple but dual-issues, so
/// boards using it must pass `delay::dwt::self_test` before relying on it.
fn is_armv7m(target: &str) -> bool {
    target.starts_with("thumbv7m-") || target.starts_with("thumbv7em-")
}
