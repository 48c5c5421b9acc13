//! Problem loading

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use tabula_core::LpProblem;
use tracing::debug;

use crate::error::{CliError, CliResult};

/// Load a problem from a `.json`, `.yaml` or `.yml` file.
pub(crate) fn load_problem(path: &Path) -> CliResult<LpProblem> {
    let contents = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let problem = match extension.as_str() {
        "json" => serde_json::from_str(&contents)?,
        "yaml" | "yml" => serde_yaml::from_str(&contents)?,
        _ => return Err(CliError::UnsupportedFormat(path.display().to_string())),
    };
    debug!(path = %path.display(), "loaded problem");
    Ok(problem)
}

/// Read a problem from standard input.
///
/// YAML is a superset of JSON, so both are accepted.
pub(crate) fn read_stdin() -> CliResult<LpProblem> {
    let mut contents = String::new();
    io::stdin().read_to_string(&mut contents)?;
    Ok(serde_yaml::from_str(&contents)?)
}

/// Three-product example used by `--demo`
pub(crate) fn demo_problem() -> CliResult<LpProblem> {
    Ok(LpProblem::new(
        vec![40.0, 30.0, 20.0],
        vec![
            vec![2.0, 5.0, 10.0],
            vec![2.0, 5.0, 1.0],
            vec![4.0, 2.0, 2.0],
        ],
        vec![900.0, 400.0, 600.0],
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = env::temp_dir().join(format!("tabula_input_{}_{}", std::process::id(), name));
        fs::write(&path, contents).expect("write temp file");
        path
    }

    #[test]
    fn test_demo_problem() {
        let problem = demo_problem().expect("demo is valid");
        assert_eq!(problem.num_vars(), 3);
        assert_eq!(problem.num_constraints(), 3);
    }

    #[test]
    fn test_load_json_and_yaml() {
        let json = write_temp(
            "p.json",
            r#"{"objective":[1.0],"constraints":[[1.0]],"limits":[10.0]}"#,
        );
        let yaml = write_temp("p.yaml", "objective: [1]\nconstraints:\n  - [1]\nlimits: [10]\n");
        let a = load_problem(&json).expect("json");
        let b = load_problem(&yaml).expect("yaml");
        assert_eq!(a, b);
        let _ = fs::remove_file(json);
        let _ = fs::remove_file(yaml);
    }

    #[test]
    fn test_unknown_extension() {
        let path = write_temp("p.txt", "{}");
        assert!(matches!(
            load_problem(&path),
            Err(CliError::UnsupportedFormat(_))
        ));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_missing_file() {
        let path = env::temp_dir().join("tabula_input_does_not_exist.json");
        assert!(matches!(load_problem(&path), Err(CliError::Io { .. })));
    }

    #[test]
    fn test_negative_limit_rejected_at_parse() {
        let path = write_temp(
            "neg.json",
            r#"{"objective":[1.0],"constraints":[[1.0]],"limits":[-1.0]}"#,
        );
        assert!(matches!(load_problem(&path), Err(CliError::Json(_))));
        let _ = fs::remove_file(path);
    }
}
