// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_ini_content(sections: usize, keys_per_section: usize) -> String {
    let mut content = String::new();

    for section in 0..sections {
        if section > 0 {
            content.push('\n');
        }
        content.push_str(&format!("; settings group {section}\n[section{section}]\n"));
        for key in 0..keys_per_section {
            if key % 4 == 0 {
                content.push_str("; a comment about the next key\n");
            }
            content.push_str(&format!("key{key} = value number {key}\n"));
        }
    }

    content
}
