use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::CliError;

/// Write `contents` to `out`, or to stdout when no path is given.
pub fn write_output(out: Option<&Path>, contents: &str) -> Result<(), CliError> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, contents)?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(contents.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<String, CliError> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::{to_pretty_json, write_output};
    use std::collections::BTreeMap;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        path.push(format!("ftl_i18n_{name}_{nanos}"));
        path
    }

    #[test]
    fn writes_into_missing_directories() {
        let dir = temp_path("artifacts");
        let path = dir.join("nested/out.txt");
        write_output(Some(&path), "hello\n").expect("write");
        assert_eq!(fs::read_to_string(&path).expect("read"), "hello\n");
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn pretty_json_ends_with_newline() {
        let mut map = BTreeMap::new();
        map.insert("a", "A");
        assert_eq!(to_pretty_json(&map).expect("json"), "{\n  \"a\": \"A\"\n}\n");
    }
}
