use std::fs;
use std::path::{Path, PathBuf};

/// Create `<root>/in`, `<root>/out/yay`, and `<root>/out/nay`; returns (input, output).
pub fn corpus_dirs(root: &Path) -> (PathBuf, PathBuf) {
    let input = root.join("in");
    let output = root.join("out");
    fs::create_dir_all(&input).expect("create input dir");
    fs::create_dir_all(output.join("yay")).expect("create yay");
    fs::create_dir_all(output.join("nay")).expect("create nay");
    (input, output)
}
