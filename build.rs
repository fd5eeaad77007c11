use std::env;
use std::fs;
use std::path::Path;

const DEFAULT_LOCALE: &str = "en-US";

fn main() {
    println!("cargo:rerun-if-changed=locales");

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR must be set for build scripts");
    let mut locale_files = fs::read_dir("locales")
        .expect("locales directory must exist")
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|extension| extension == "toml"))
        .collect::<Vec<_>>();
    locale_files.sort();

    let mut locales = Vec::new();
    for path in locale_files {
        let tag = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_else(|| panic!("locale file {} has no usable name", path.display()))
            .to_string();
        let contents = fs::read_to_string(&path)
            .unwrap_or_else(|error| panic!("failed to read {}: {error}", path.display()));
        let table = contents
            .parse::<toml::Table>()
            .unwrap_or_else(|error| panic!("failed to parse {}: {error}", path.display()));
        let mut entries = Vec::new();
        flatten("", &table, &mut entries);
        entries.sort();
        locales.push((tag, entries));
    }

    let mut generated = String::new();
    generated.push_str(&format!(
        "pub(crate) static DEFAULT_LOCALE: &str = {DEFAULT_LOCALE:?};\n"
    ));
    generated.push_str("pub(crate) static LOCALES: &[(&str, &[(&str, &str)])] = &[\n");
    for (tag, entries) in &locales {
        generated.push_str(&format!("    ({tag:?}, &[\n"));
        for (key, value) in entries {
            generated.push_str(&format!("        ({key:?}, {value:?}),\n"));
        }
        generated.push_str("    ]),\n");
    }
    generated.push_str("];\n");

    fs::write(
        Path::new(&out_dir).join("nimbusui_i18n_generated.rs"),
        generated,
    )
    .expect("failed to write generated i18n catalog");
}

fn flatten(prefix: &str, table: &toml::Table, entries: &mut Vec<(String, String)>) {
    for (key, value) in table {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            toml::Value::String(text) => entries.push((full_key, text.clone())),
            toml::Value::Table(nested) => flatten(&full_key, nested, entries),
            other => panic!("unsupported locale value at {full_key}: {other:?}"),
        }
    }
}
