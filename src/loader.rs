//! Config file discovery and loading
//!
//! Files are JSON with `//` and `/* */` comments and trailing commas allowed.
//! The root is either one bar object or an array of them. Objects may pull
//! in other files through `include`; keys of the including object win.

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::bar::BarConfig;
use crate::constants::config::{APP_DIR, FILENAMES, INCLUDE_KEY, MAX_INCLUDE_DEPTH, SYSTEM_DIR};

/// Every bar defined by one config file
#[derive(Debug)]
pub struct LoadedConfig {
    pub path: PathBuf,
    pub bars: Vec<BarConfig>,
}

/// Directories searched for a config, user directory first
pub fn search_dirs() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = dirs::config_dir().into_iter().collect();
    dirs.push(PathBuf::from(SYSTEM_DIR));
    dirs
}

/// First existing config file under `dirs`
pub fn find_config_in(dirs: &[PathBuf]) -> Option<PathBuf> {
    dirs.iter()
        .flat_map(|dir| FILENAMES.iter().map(move |name| dir.join(APP_DIR).join(name)))
        .find(|path| path.is_file())
}

/// Load `custom` if given, otherwise the first config found in the search dirs
pub fn load(custom: Option<&Path>) -> Result<LoadedConfig> {
    let path = match custom {
        Some(path) => path.to_path_buf(),
        None => match find_config_in(&search_dirs()) {
            Some(path) => path,
            None => bail!("No config file found in {:?}", search_dirs()),
        },
    };
    load_from(&path)
}

pub fn load_from(path: &Path) -> Result<LoadedConfig> {
    info!(path = %path.display(), "Loading config");
    let mut root = read_document(path)?;

    // Each bar resolves its includes on its own, so bars may share a file
    let base = path.parent().unwrap_or(Path::new("."));
    match &mut root {
        Value::Array(items) => {
            for item in items.iter_mut() {
                resolve_includes(item, base, &mut vec![canonical(path)]);
            }
        }
        other => resolve_includes(other, base, &mut vec![canonical(path)]),
    }

    let bars = bar_documents(root)
        .into_iter()
        .map(BarConfig::new)
        .collect();
    Ok(LoadedConfig { path: path.to_path_buf(), bars })
}

/// Split a document root into one object per bar
pub fn bar_documents(root: Value) -> Vec<Value> {
    match root {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| {
                if item.is_object() {
                    Some(item)
                } else {
                    warn!(index, "Ignoring bar config that is not an object");
                    None
                }
            })
            .collect(),
        Value::Object(_) => vec![root],
        _ => {
            warn!("Config root is neither an object nor an array");
            Vec::new()
        }
    }
}

fn read_document(path: &Path) -> Result<Value> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    parse_document(&contents).with_context(|| format!("Failed to parse config file {}", path.display()))
}

pub fn parse_document(contents: &str) -> Result<Value> {
    let json = strip_jsonc(contents);
    serde_json::from_str(&json).context("Invalid JSON")
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// `~/x` goes to the home directory, relative paths to `base`
pub fn expand_path(raw: &str, base: &Path) -> PathBuf {
    let expanded = match raw.strip_prefix("~/") {
        Some(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => PathBuf::from(raw),
        },
        None if raw == "~" => dirs::home_dir().unwrap_or_else(|| PathBuf::from(raw)),
        None => PathBuf::from(raw),
    };
    if expanded.is_relative() { base.join(expanded) } else { expanded }
}

fn include_paths(value: &Value) -> Vec<&str> {
    match value {
        Value::String(path) => vec![path.as_str()],
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

/// Merge the files named by `doc`'s `include` key into `doc`.
///
/// `chain` holds the files currently being included, outermost first. A file
/// already on it would include itself and is skipped.
fn resolve_includes(doc: &mut Value, base: &Path, chain: &mut Vec<PathBuf>) {
    let Value::Object(obj) = doc else {
        return;
    };
    let Some(include) = obj.remove(INCLUDE_KEY) else {
        return;
    };

    let depth = chain.len().saturating_sub(1);
    if depth >= MAX_INCLUDE_DEPTH {
        warn!(depth, max = MAX_INCLUDE_DEPTH, "Include depth exceeded, ignoring further includes");
        return;
    }

    for raw in include_paths(&include) {
        let path = expand_path(raw, base);
        let canonical_path = canonical(&path);
        if chain.contains(&canonical_path) {
            warn!(path = %path.display(), "Include cycle, skipping");
            continue;
        }

        let mut included = match read_document(&path) {
            Ok(included) => included,
            Err(e) => {
                warn!(path = %path.display(), error = %format!("{e:#}"), "Failed to include config");
                continue;
            }
        };
        let included_base = path.parent().unwrap_or(base);
        chain.push(canonical_path);
        resolve_includes(&mut included, included_base, chain);
        chain.pop();

        match included {
            Value::Object(included) => {
                debug!(path = %path.display(), "Included config");
                merge_missing(obj, included);
            }
            _ => warn!(path = %path.display(), "Included config is not an object, skipping"),
        }
    }
}

/// Copy keys of `from` that `into` does not define
fn merge_missing(into: &mut Map<String, Value>, from: Map<String, Value>) {
    for (key, value) in from {
        into.entry(key).or_insert(value);
    }
}

/// Remove comments and trailing commas, keeping line numbers intact
pub fn strip_jsonc(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    let mut chars = src.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => out.extend(chars.next()),
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match (c, chars.peek().copied()) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                while chars.next_if(|&n| n != '\n').is_some() {}
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for n in chars.by_ref() {
                    if n == '\n' {
                        out.push('\n');
                    }
                    if prev == '*' && n == '/' {
                        break;
                    }
                    prev = n;
                }
            }
            _ => out.push(c),
        }
    }

    remove_trailing_commas(&out)
}

fn remove_trailing_commas(src: &str) -> String {
    let chars: Vec<char> = src.chars().collect();
    let mut out = String::with_capacity(src.len());
    let mut in_string = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if in_string {
            out.push(c);
            if c == '\\' {
                if let Some(&escaped) = chars.get(i + 1) {
                    out.push(escaped);
                    i += 1;
                }
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
            out.push(c);
        } else if c == ',' {
            let next = chars[i + 1..].iter().copied().find(|n| !n.is_whitespace());
            if !matches!(next, Some('}' | ']')) {
                out.push(c);
            }
        } else {
            out.push(c);
        }
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::sections;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_strip_comments() {
        let src = r#"{
            // line comment
            "a": "http://example.com", /* block */ "b": 1,
            /* multi
               line */
            "c": "/* not a comment */"
        }"#;
        let value = parse_document(src).unwrap();
        assert_eq!(value, json!({"a": "http://example.com", "b": 1, "c": "/* not a comment */"}));
        assert_eq!(strip_jsonc(src).lines().count(), src.lines().count());
    }

    #[test]
    fn test_trailing_commas() {
        let value = parse_document(r#"{"a": [1, 2, ], "b": {"c": "x,]", }, }"#).unwrap();
        assert_eq!(value, json!({"a": [1, 2], "b": {"c": "x,]"}}));
    }

    #[test]
    fn test_escaped_quotes() {
        let value = parse_document(r#"{"a": "say \"hi\" // still text", }"#).unwrap();
        assert_eq!(value["a"], "say \"hi\" // still text");
    }

    #[test]
    fn test_invalid_json() {
        assert!(parse_document("{\"a\": }").is_err());
    }

    #[test]
    fn test_find_config_order() {
        let user = TempDir::new().unwrap();
        let system = TempDir::new().unwrap();
        let dirs = [user.path().to_path_buf(), system.path().to_path_buf()];
        assert_eq!(find_config_in(&dirs), None);

        let system_config = write(&system, "wlbar/config.jsonc", "{}");
        assert_eq!(find_config_in(&dirs), Some(system_config));

        let plain = write(&user, "wlbar/config", "{}");
        assert_eq!(find_config_in(&dirs), Some(plain));

        let json = write(&user, "wlbar/config.json", "{}");
        assert_eq!(find_config_in(&dirs), Some(json));

        let jsonc = write(&user, "wlbar/config.jsonc", "{}");
        assert_eq!(find_config_in(&dirs), Some(jsonc));
    }

    #[test]
    fn test_load_single_bar() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "config.jsonc", r#"{
            // main bar
            "position": "bottom",
            "modules-left": ["clock"],
        }"#);

        let loaded = load(Some(path.as_path())).unwrap();
        assert_eq!(loaded.path, path);
        assert_eq!(loaded.bars.len(), 1);
        assert_eq!(loaded.bars[0].get_module_list(sections::LEFT), vec!["clock"]);
    }

    #[test]
    fn test_load_array_of_bars() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "config", r#"[
            {"name": "top"},
            42,
            {"name": "bottom", "position": "bottom"}
        ]"#);

        let loaded = load_from(&path).unwrap();
        let names: Vec<_> = loaded.bars.iter().map(|b| b.name.as_deref()).collect();
        assert_eq!(names, vec![Some("top"), Some("bottom")]);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_from(&dir.path().join("nope")).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to read config file"));
    }

    #[test]
    fn test_load_bad_syntax_names_file() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "config", "{\"a\": ");
        let err = load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config file"));
    }

    #[test]
    fn test_include_merges_under_own_keys() {
        let dir = TempDir::new().unwrap();
        write(&dir, "modules.json", r#"{"clock": {"interval": 5}, "height": 40, "modules-left": ["cpu"]}"#);
        write(&dir, "more/extra.json", r#"{"height": 50, "spacing": 2}"#);
        let path = write(&dir, "config", r#"{
            "include": ["modules.json", "more/extra.json", "missing.json"],
            "height": 30
        }"#);

        let loaded = load_from(&path).unwrap();
        let bar = &loaded.bars[0];
        assert_eq!(bar.height, 30);
        assert_eq!(bar.spacing, Some(2));
        assert_eq!(bar.get_module_config("clock")["interval"], 5);
        assert_eq!(bar.get_module_list(sections::LEFT), vec!["cpu"]);
        assert!(bar.json().get(INCLUDE_KEY).is_none());
    }

    #[test]
    fn test_include_relative_to_including_file() {
        let dir = TempDir::new().unwrap();
        write(&dir, "nested/inner.json", r#"{"name": "inner"}"#);
        write(&dir, "nested/outer.json", r#"{"include": "inner.json"}"#);
        let path = write(&dir, "config", r#"{"include": "nested/outer.json"}"#);

        let loaded = load_from(&path).unwrap();
        assert_eq!(loaded.bars[0].name.as_deref(), Some("inner"));
    }

    #[test]
    fn test_include_cycle_is_skipped() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.json", r#"{"include": "b.json", "name": "a"}"#);
        write(&dir, "b.json", r#"{"include": ["a.json", "config"], "spacing": 3}"#);
        let path = write(&dir, "config", r#"{"include": "a.json"}"#);

        let loaded = load_from(&path).unwrap();
        assert_eq!(loaded.bars[0].name.as_deref(), Some("a"));
        assert_eq!(loaded.bars[0].spacing, Some(3));
    }

    #[test]
    fn test_include_depth_limit() {
        let dir = TempDir::new().unwrap();
        let chain = MAX_INCLUDE_DEPTH + 2;
        for i in 0..chain {
            write(&dir, &format!("{i}.json"), &format!(r#"{{"include": "{}.json", "level-{i}": true}}"#, i + 1));
        }
        let path = write(&dir, "config", r#"{"include": "0.json"}"#);

        let loaded = load_from(&path).unwrap();
        let doc = loaded.bars[0].json();
        assert_eq!(doc[format!("level-{}", MAX_INCLUDE_DEPTH - 1)], true);
        assert!(doc.get(format!("level-{MAX_INCLUDE_DEPTH}")).is_none());
    }

    #[test]
    fn test_include_in_array_root() {
        let dir = TempDir::new().unwrap();
        write(&dir, "shared.json", r#"{"spacing": 6}"#);
        let path = write(&dir, "config", r#"[{"include": "shared.json"}, {"name": "plain"}]"#);

        let loaded = load_from(&path).unwrap();
        assert_eq!(loaded.bars[0].spacing, Some(6));
        assert_eq!(loaded.bars[1].spacing, None);
    }

    #[test]
    fn test_shared_include_in_every_bar() {
        let dir = TempDir::new().unwrap();
        write(&dir, "shared.json", r#"{"spacing": 6}"#);
        write(&dir, "left.json", r#"{"include": "shared.json", "name": "left"}"#);
        let path = write(
            &dir,
            "config",
            r#"[{"include": "shared.json"}, {"include": "shared.json"}, {"include": "left.json"}]"#,
        );

        let loaded = load_from(&path).unwrap();
        assert_eq!(loaded.bars.len(), 3);
        assert!(loaded.bars.iter().all(|bar| bar.spacing == Some(6)));
        assert_eq!(loaded.bars[2].name.as_deref(), Some("left"));
    }

    #[test]
    fn test_include_same_file_through_two_branches() {
        let dir = TempDir::new().unwrap();
        write(&dir, "common.json", r#"{"spacing": 2, "height": 24}"#);
        write(&dir, "a.json", r#"{"include": "common.json", "name": "a"}"#);
        write(&dir, "b.json", r#"{"include": "common.json", "position": "bottom"}"#);
        let path = write(&dir, "config", r#"{"include": ["a.json", "b.json"]}"#);

        let loaded = load_from(&path).unwrap();
        let bar = &loaded.bars[0];
        assert_eq!(bar.name.as_deref(), Some("a"));
        assert_eq!(bar.spacing, Some(2));
        assert_eq!(bar.height, 24);
    }

    #[test]
    fn test_expand_path() {
        let base = Path::new("/etc/xdg/wlbar");
        assert_eq!(expand_path("/abs/x.json", base), PathBuf::from("/abs/x.json"));
        assert_eq!(expand_path("x.json", base), PathBuf::from("/etc/xdg/wlbar/x.json"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~/x.json", base), home.join("x.json"));
        }
    }

    #[test]
    fn test_bar_documents() {
        assert_eq!(bar_documents(json!({"a": 1})).len(), 1);
        assert_eq!(bar_documents(json!([{"a": 1}, "x", {"b": 2}])).len(), 2);
        assert!(bar_documents(json!("x")).is_empty());
    }
}
