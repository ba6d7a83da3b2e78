use std::fs;
use std::path::{Path, PathBuf};

pub fn write_csv(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut content = lines.join("\n");
    content.push('\n');
    fs::write(&path, content).expect("write fixture");
    path
}
