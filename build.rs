//! # Build Script for Locale Validation / 本地化校验构建脚本
//!
//! Flattens the TOML translation files under `locales/` into dotted keys,
//! checks that every language defines every key of the base language (`de`)
//! and writes the key list to `OUT_DIR/locale_keys.rs` so tests can verify
//! each key resolves at runtime.
//!
//! 将 `locales/` 下的 TOML 翻译文件展开为点分隔的键，检查每种语言是否定义了
//! 基础语言（`de`）的全部键，并将键列表写入 `OUT_DIR/locale_keys.rs`。

use std::collections::BTreeSet;
use std::env;
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};

/// Walks a TOML table and collects `section.key` paths of all string leaves.
/// 遍历 TOML 表并收集所有字符串叶子节点的 `section.key` 路径。
fn flatten(prefix: &str, table: &toml::Table, out: &mut BTreeSet<String>) {
    for (key, value) in table {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            toml::Value::Table(inner) => flatten(&path, inner, out),
            toml::Value::String(_) => {
                out.insert(path);
            }
            _ => println!("cargo:warning=Locale key '{}' is not a string", path),
        }
    }
}

fn read_keys(path: &Path) -> std::io::Result<BTreeSet<String>> {
    let content = fs::read_to_string(path)?;
    let table: toml::Table = toml::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse {:?}: {}", path, e));
    let mut keys = BTreeSet::new();
    flatten("", &table, &mut keys);
    Ok(keys)
}

fn main() -> std::io::Result<()> {
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR not set");
    let dest_path = Path::new(&out_dir).join("locale_keys.rs");
    let locales_dir = Path::new("locales");

    let lang_files: Vec<PathBuf> = fs::read_dir(locales_dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("toml"))
        .collect();

    let base_keys = read_keys(&locales_dir.join("de.toml"))?;

    for path in &lang_files {
        let keys = read_keys(path)?;
        for missing in base_keys.difference(&keys) {
            println!(
                "cargo:warning=Locale {:?} is missing key '{}'",
                path.file_name().unwrap_or_default(),
                missing
            );
        }
        for extra in keys.difference(&base_keys) {
            println!(
                "cargo:warning=Locale {:?} defines key '{}' unknown to de.toml",
                path.file_name().unwrap_or_default(),
                extra
            );
        }
    }

    let mut code = String::new();
    writeln!(&mut code, "pub const LOCALE_KEYS: &[&str] = &[").unwrap();
    for key in &base_keys {
        writeln!(&mut code, "    r#\"{}\"#,", key).unwrap();
    }
    writeln!(&mut code, "];").unwrap();

    fs::write(&dest_path, code)?;
    println!("cargo:rerun-if-changed=locales/");

    Ok(())
}
