// build.rs

fn main() {
    // Generate build info (VERGEN_BUILD_DATE is used by `--version`)
    if let Err(e) = vergen::EmitBuilder::builder().all_build().emit() {
        println!("cargo:warning=Unable to generate build info: {e}");
        println!("cargo:rustc-env=VERGEN_BUILD_DATE=unknown");
    }
}
