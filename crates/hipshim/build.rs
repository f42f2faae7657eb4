use std::env;

fn main() {
    if env::var("CARGO_FEATURE_HIP_REAL").is_ok() {
        if let Ok(rocm) = env::var("ROCM_PATH").or_else(|_| env::var("HIP_PATH")) {
            println!("cargo:rustc-link-search=native={}/lib", rocm);
            println!("cargo:rustc-link-search=native={}/lib64", rocm);
        }
        println!("cargo:rustc-link-lib=dylib=amdhip64");
    }
}
