fn main() {
    // templates and static assets are embedded with rust-embed
    println!("cargo:rerun-if-changed=templates");
    println!("cargo:rerun-if-changed=static");
}
